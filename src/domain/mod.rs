// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types for the things this pipeline talks about:
// an audio/transcript example, the fixed-shape code matrix
// derived from it, and the two black boxes it consumes (an
// example source and a text tokenizer).
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums and traits

/// One (transcript, 8 codebook streams) record
pub mod example;

/// Fixed 8 × L matrix of vocabulary ids with named axes
pub mod matrix;

/// Abstractions over the dataset source and the tokenizer
pub mod traits;
