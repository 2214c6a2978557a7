// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a dataset row and a model-ready batch.
//
//   <split>.jsonl
//       │
//       ▼
//   JsonlExampleSource  → Example { text, codebooks[8] }
//       │
//       ▼
//   LengthFilter        → drop len(codebook 0) > B
//       │
//       ├──▶ UnitTokenMapper + CodebookAligner → input_ids [8, L], mask [L]
//       └──▶ LabelBuilder                      → labels [L]
//       │
//       ▼
//   PreparedDataset     → Burn Dataset
//       │
//       ▼
//   Seq2SeqBatcher      → Seq2SeqBatch tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads dataset splits from JSON-lines files
pub mod loader;

/// Drops examples over the length budget
pub mod filter;

/// (codebook, quantizer index) → vocabulary id
pub mod unit_mapper;

/// Maps, pads and masks the 8 codebook streams
pub mod aligner;

/// Tokenises, pads and ignore-masks target text
pub mod labels;

/// Per-example and batched transform
pub mod preprocessor;

/// Implements Burn's Dataset trait for prepared samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
