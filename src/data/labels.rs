// ============================================================
// Layer 4 — Label Builder
// ============================================================
// Builds the decoder target for one example:
//
//   "hello world"  ──encode, truncate to L──▶  [h, w]
//                  ──pad to L, padding = ignore index──▶
//                  [h, w, -100, -100, …, -100]
//
// Truncation is the tokenizer's own, so a tokenizer that wraps
// text in `<s> … </s>` still ends a truncated target with `</s>`.
//
// Padding slots are written as the ignore index directly, so
// which positions are ignored depends only on where padding
// was added. A real token that happens to share the pad id is
// left alone.

use crate::config::PipelineConfig;
use crate::domain::traits::TextTokenizer;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSequence {
    /// Exactly L entries
    pub ids: Vec<i32>,
    /// Number of real (non-ignored) positions
    pub len: usize,
    /// True if the tokenised text was longer than L
    pub truncated: bool,
}

pub struct LabelBuilder<'a> {
    tokenizer:    &'a dyn TextTokenizer,
    max_len:      usize,
    ignore_index: i32,
}

impl<'a> LabelBuilder<'a> {
    pub fn new(tokenizer: &'a dyn TextTokenizer, cfg: &PipelineConfig) -> Self {
        Self {
            tokenizer,
            max_len:      cfg.max_len,
            ignore_index: cfg.ignore_index,
        }
    }

    pub fn build(&self, text: &str) -> Result<LabelSequence, PipelineError> {
        let encoded = self.tokenizer.encode(text, self.max_len, true)?;
        let len = encoded.ids.len();

        let mut labels = Vec::with_capacity(self.max_len);
        for id in encoded.ids {
            let id = i32::try_from(id)
                .map_err(|_| PipelineError::Tokenizer(format!("token id {id} does not fit a label")))?;
            labels.push(id);
        }
        labels.resize(self.max_len, self.ignore_index);

        Ok(LabelSequence { ids: labels, len, truncated: encoded.truncated })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        hf_tokenizer::{tests::bart_style, HfTokenizer},
        tokenizer_store::build_unit_vocab_tokenizer,
    };

    fn setup(max_len: usize) -> (HfTokenizer, PipelineConfig) {
        let cfg = PipelineConfig { max_len, length_budget: max_len, codebook_size: 2, ..Default::default() };
        let texts = vec!["hello world the cat sat".to_string()];
        let t = build_unit_vocab_tokenizer(&texts, &cfg).unwrap();
        (HfTokenizer::new(t, &cfg).unwrap(), cfg)
    }

    #[test]
    fn test_hello_world_scenario() {
        let (tok, cfg) = setup(10);
        let labels = LabelBuilder::new(&tok, &cfg).build("hello world").unwrap();

        let hello = tok.token_to_id("hello").unwrap() as i32;
        let world = tok.token_to_id("world").unwrap() as i32;
        let mut expected = vec![hello, world];
        expected.extend(std::iter::repeat(-100).take(8));

        assert_eq!(labels.ids, expected);
        assert_eq!(labels.len, 2);
        assert!(!labels.truncated);
    }

    #[test]
    fn test_truncates_to_max_len() {
        let (tok, cfg) = setup(3);
        let labels = LabelBuilder::new(&tok, &cfg).build("the cat sat hello world").unwrap();
        assert_eq!(labels.ids.len(), 3);
        assert_eq!(labels.len, 3);
        assert!(labels.truncated);
        assert!(labels.ids.iter().all(|&id| id >= 0));
    }

    #[test]
    fn test_truncated_target_ends_with_eos() {
        let cfg = PipelineConfig { max_len: 4, length_budget: 4, codebook_size: 1, ..Default::default() };
        let tok = bart_style(&["a b c d"], &cfg);
        let labels = LabelBuilder::new(&tok, &cfg).build("a b c d").unwrap();

        let id = |s: &str| tok.token_to_id(s).unwrap() as i32;
        assert_eq!(labels.ids, vec![id("<s>"), id("a"), id("b"), id("</s>")]);
        assert!(labels.truncated);
    }

    #[test]
    fn test_short_target_padded_after_eos() {
        let cfg = PipelineConfig { max_len: 6, length_budget: 6, codebook_size: 1, ..Default::default() };
        let tok = bart_style(&["a b"], &cfg);
        let labels = LabelBuilder::new(&tok, &cfg).build("a b").unwrap();

        let id = |s: &str| tok.token_to_id(s).unwrap() as i32;
        assert_eq!(labels.ids, vec![id("<s>"), id("a"), id("b"), id("</s>"), -100, -100]);
        assert_eq!(labels.len, 4);
        assert!(!labels.truncated);
    }

    #[test]
    fn test_idempotent() {
        let (tok, cfg) = setup(6);
        let b = LabelBuilder::new(&tok, &cfg);
        assert_eq!(b.build("the cat").unwrap(), b.build("the cat").unwrap());
    }

    #[test]
    fn test_real_pad_token_kept_inside_text() {
        let (tok, cfg) = setup(5);
        // "<pad>" in the text is an added special token, so it encodes to the pad id
        let labels = LabelBuilder::new(&tok, &cfg).build("the <pad> cat").unwrap();
        assert_eq!(labels.len, 3);
        assert_eq!(labels.ids[1], tok.pad_token_id() as i32);
        assert_eq!(&labels.ids[3..], &[-100, -100]);
    }

    #[test]
    fn test_empty_text_all_ignored() {
        let (tok, cfg) = setup(4);
        let labels = LabelBuilder::new(&tok, &cfg).build("").unwrap();
        assert_eq!(labels.ids, vec![-100; 4]);
        assert_eq!(labels.len, 0);
    }
}
