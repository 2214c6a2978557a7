// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case wires the data, eval and infra layers together
// for one command. No tensor math and no printing here; the
// CLI layer prints whatever the use case returns.

/// Load a split, filter, transform, write prepared samples
pub mod prepare_use_case;

/// Decode predictions + labels and compute WER
pub mod score_use_case;

/// Build and save a unit-vocabulary tokenizer
pub mod build_vocab_use_case;
