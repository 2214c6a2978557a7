// ============================================================
// Layer 4 — Codebook Aligner & Padder
// ============================================================
// Turns one example's 8 raw codebook streams into the model
// input for that example:
//
//   1. check all streams share codebook 0's frame count n
//   2. map every index through the UnitTokenMapper
//   3. right-pad every row with the pad id up to L
//   4. build ONE attention mask of length L: n ones, L-n zeros
//
// The mask is shared by all 8 rows; step 1 is what makes that
// sound. Examples longer than L are refused, never truncated.

use crate::config::{PipelineConfig, NUM_CODEBOOKS};
use crate::data::unit_mapper::UnitTokenMapper;
use crate::domain::{example::Example, matrix::CodebookMatrix, traits::TextTokenizer};
use crate::error::PipelineError;

/// Model-input fields for one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedCodes {
    /// `[8, L]` vocabulary ids
    pub input_ids: CodebookMatrix,
    /// `[L]` — 1 = real frame, 0 = padding
    pub attention_mask: Vec<u32>,
    /// Natural frame count n before padding
    pub frames: usize,
    /// Units that fell back to the unknown token
    pub vocab_misses: usize,
}

pub struct CodebookAligner<'a> {
    mapper:  UnitTokenMapper<'a>,
    pad_id:  u32,
    max_len: usize,
}

impl<'a> CodebookAligner<'a> {
    pub fn new(tokenizer: &'a dyn TextTokenizer, cfg: &PipelineConfig) -> Self {
        Self {
            mapper:  UnitTokenMapper::new(tokenizer, cfg),
            pad_id:  tokenizer.pad_token_id(),
            max_len: cfg.max_len,
        }
    }

    pub fn align(&self, example: &Example) -> Result<AlignedCodes, PipelineError> {
        let frames = example.lockstep_frames()?;
        if frames > self.max_len {
            return Err(PipelineError::ExceedsMaxLength { frames, max_len: self.max_len });
        }

        let mut vocab_misses = 0usize;
        let rows: [Vec<u32>; NUM_CODEBOOKS] = std::array::from_fn(|cb| {
            let (mut ids, misses) = self.mapper.map_stream(cb, &example.codebooks[cb]);
            vocab_misses += misses;
            ids.resize(self.max_len, self.pad_id);
            ids
        });

        Ok(AlignedCodes {
            input_ids: CodebookMatrix::from_rows(rows),
            attention_mask: attention_mask(frames, self.max_len),
            frames,
            vocab_misses,
        })
    }
}

/// `n` ones followed by `max_len - n` zeros.
pub fn attention_mask(n: usize, max_len: usize) -> Vec<u32> {
    let mut mask = vec![0u32; max_len];
    mask[..n.min(max_len)].fill(1);
    mask
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{hf_tokenizer::HfTokenizer, tokenizer_store::build_unit_vocab_tokenizer};

    fn tokenizer(cfg: &PipelineConfig) -> HfTokenizer {
        let t = build_unit_vocab_tokenizer(&[], cfg).unwrap();
        HfTokenizer::new(t, cfg).unwrap()
    }

    fn example(rows: [Vec<u32>; NUM_CODEBOOKS]) -> Example {
        Example::new("text", rows)
    }

    #[test]
    fn test_two_frame_scenario() {
        let cfg = PipelineConfig { max_len: 4, length_budget: 4, ..Default::default() };
        let tok = tokenizer(&cfg);
        let aligner = CodebookAligner::new(&tok, &cfg);

        let mut rows: [Vec<u32>; NUM_CODEBOOKS] = std::array::from_fn(|_| vec![0, 0]);
        rows[0] = vec![5, 900];
        rows[1] = vec![3, 10];
        let out = aligner.align(&example(rows)).unwrap();

        let id = |s: &str| tok.token_to_id(s).unwrap();
        let pad = tok.pad_token_id();
        assert_eq!(out.input_ids.codebook(0), &[id("v_tok_5"), id("v_tok_900"), pad, pad]);
        assert_eq!(out.input_ids.codebook(1), &[id("v_tok_1003"), id("v_tok_1010"), pad, pad]);
        assert_eq!(out.attention_mask, vec![1, 1, 0, 0]);
        assert_eq!(out.frames, 2);
        assert_eq!(out.vocab_misses, 0);
    }

    #[test]
    fn test_shape_is_fixed_for_any_length() {
        let cfg = PipelineConfig { max_len: 12, length_budget: 10, ..Default::default() };
        let tok = tokenizer(&cfg);
        let aligner = CodebookAligner::new(&tok, &cfg);
        for n in [0usize, 1, 7, 10, 12] {
            let out = aligner
                .align(&example(std::array::from_fn(|cb| vec![cb as u32; n])))
                .unwrap();
            assert_eq!(out.input_ids.shape(), [NUM_CODEBOOKS, 12]);
            assert_eq!(out.attention_mask.len(), 12);
            assert_eq!(out.attention_mask.iter().sum::<u32>() as usize, n);
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let cfg = PipelineConfig { max_len: 8, length_budget: 8, ..Default::default() };
        let tok = tokenizer(&cfg);
        let aligner = CodebookAligner::new(&tok, &cfg);
        let mut rows: [Vec<u32>; NUM_CODEBOOKS] = std::array::from_fn(|_| vec![1, 2, 3]);
        rows[2] = vec![1, 2];
        assert_eq!(
            aligner.align(&example(rows)),
            Err(PipelineError::CodebookLengthMismatch { codebook: 2, expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_over_length_not_truncated() {
        let cfg = PipelineConfig { max_len: 3, length_budget: 3, ..Default::default() };
        let tok = tokenizer(&cfg);
        let aligner = CodebookAligner::new(&tok, &cfg);
        let err = aligner
            .align(&example(std::array::from_fn(|_| vec![0; 4])))
            .unwrap_err();
        assert_eq!(err, PipelineError::ExceedsMaxLength { frames: 4, max_len: 3 });
    }

    #[test]
    fn test_vocab_misses_counted_across_codebooks() {
        let cfg = PipelineConfig { max_len: 2, length_budget: 2, ..Default::default() };
        let tok = tokenizer(&cfg);
        let aligner = CodebookAligner::new(&tok, &cfg);
        let mut rows: [Vec<u32>; NUM_CODEBOOKS] = std::array::from_fn(|_| vec![1]);
        rows[6] = vec![4000];
        rows[7] = vec![4000];
        let out = aligner.align(&example(rows)).unwrap();
        assert_eq!(out.vocab_misses, 2);
        assert_eq!(out.input_ids.get(7, 0), Some(tok.unk_token_id()));
    }

    #[test]
    fn test_attention_mask_helper() {
        assert_eq!(attention_mask(0, 3), vec![0, 0, 0]);
        assert_eq!(attention_mask(3, 3), vec![1, 1, 1]);
    }
}
