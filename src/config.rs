// ============================================================
// Pipeline Configuration
// ============================================================
// The handful of constants that fix the tensor layout for a
// whole run. Serialisable so `prepare` can leave a copy next to
// its output and `score` can pick up the same ignore index.
//
//   codebook_size  — vocabulary block per codebook (1000)
//   max_len        — padding target L for codes and labels
//   length_budget  — Length Filter bound B on codebook 0
//   ignore_index   — label sentinel excluded from loss/decoding

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Number of residual quantisation levels emitted by the codec.
/// Fixed at compile time so the code matrix has a static row count.
pub const NUM_CODEBOOKS: usize = 8;

/// Label value the loss function skips.
pub const DEFAULT_IGNORE_INDEX: i32 = -100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub codebook_size:      u32,
    pub max_len:            usize,
    pub length_budget:      usize,
    pub ignore_index:       i32,
    pub unit_token_prefix:  String,
    pub pad_token:          String,
    pub unk_token:          String,
    pub num_logged_samples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            codebook_size:      1000,
            max_len:            1023,
            length_budget:      1000,
            ignore_index:       DEFAULT_IGNORE_INDEX,
            unit_token_prefix:  "v_tok_".to_string(),
            pad_token:          "<pad>".to_string(),
            unk_token:          "<unk>".to_string(),
            num_logged_samples: 10,
        }
    }
}

impl PipelineConfig {
    /// Check the relationships between fields that the rest of the
    /// pipeline relies on. Called once, at the edge, before any
    /// component is built.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.codebook_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "codebook_size must be positive".into(),
            ));
        }
        if self.max_len < self.length_budget {
            return Err(PipelineError::InvalidConfig(format!(
                "max_len ({}) must be >= length_budget ({})",
                self.max_len, self.length_budget
            )));
        }
        if self.ignore_index >= 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "ignore_index ({}) must be negative so it never collides with a vocabulary id",
                self.ignore_index
            )));
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_max_len_below_budget_rejected() {
        let cfg = PipelineConfig { max_len: 999, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_negative_ignore_index_rejected() {
        let cfg = PipelineConfig { ignore_index: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_codebook_size_rejected() {
        let cfg = PipelineConfig { codebook_size: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
