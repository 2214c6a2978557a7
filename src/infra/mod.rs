// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns shared by the use cases:
//
//   tokenizer_store.rs — load tokenizer.json, or build a
//                        word-level tokenizer with the unit
//                        vocabulary blocks
//
//   hf_tokenizer.rs    — adapts `tokenizers::Tokenizer` to the
//                        domain TextTokenizer trait
//
//   config_store.rs    — PipelineConfig JSON persistence
//
//   metrics.rs         — WER rows appended to a CSV log

/// Tokenizer loading, building and saving
pub mod tokenizer_store;

/// TextTokenizer implementation over HuggingFace tokenizers
pub mod hf_tokenizer;

/// Pipeline config save/load
pub mod config_store;

/// Score CSV logger
pub mod metrics;
