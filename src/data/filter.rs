// ============================================================
// Layer 4 — Length Filter
// ============================================================
// Drops examples whose codebook-0 stream is longer than the
// budget B before any mapping or padding happens. With
// L >= B this guarantees the aligner never sees an example it
// would have to truncate.

use crate::domain::example::Example;

#[derive(Debug, Clone, Copy)]
pub struct LengthFilter {
    budget: usize,
}

impl LengthFilter {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Keep iff `len(codebooks[0]) <= budget`.
    pub fn keep(&self, example: &Example) -> bool {
        example.frames() <= self.budget
    }
}
