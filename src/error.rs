// ============================================================
// Per-example pipeline errors
// ============================================================
// Every variant here is LOCAL to one example: the batched
// transform logs it, counts it, and moves on. Run-level
// failures (missing files, bad CLI input) go through anyhow.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A codebook stream disagrees with codebook 0 on frame count.
    #[error("codebook {codebook} has {found} frames, codebook 0 has {expected}")]
    CodebookLengthMismatch {
        codebook: usize,
        expected: usize,
        found:    usize,
    },

    /// The example has more frames than the padding target.
    /// The Length Filter should have removed it upstream.
    #[error("example has {frames} frames but max_len is {max_len}")]
    ExceedsMaxLength { frames: usize, max_len: usize },

    /// Predictions and labels passed to the evaluator differ in count.
    #[error("{predictions} predictions but {labels} label sequences")]
    BatchSizeMismatch { predictions: usize, labels: usize },

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    pub(crate) fn tokenizer(err: impl std::fmt::Display) -> Self {
        Self::Tokenizer(err.to_string())
    }
}
