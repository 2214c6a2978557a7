// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two collaborators this pipeline treats as black boxes.
//
//   ExampleSource — yields examples for a named split
//                   ("train", "validation", …)
//   TextTokenizer — encode / decode / token lookup over the
//                   shared text + unit vocabulary
//
// Components receive a tokenizer reference at construction
// time; there is no process-wide tokenizer.

use anyhow::Result;

use crate::domain::example::Example;
use crate::error::PipelineError;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Anything that can produce the examples of a named split.
///
/// Implementations:
///   - JsonlExampleSource → `<dir>/<split>.jsonl`
pub trait ExampleSource {
    fn load_split(&self, split: &str) -> Result<Vec<Example>>;
}

// ─── TextTokenizer ────────────────────────────────────────────────────────────
/// Ids produced by one `encode` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub ids: Vec<u32>,
    /// True if ids were cut to fit the requested max length
    pub truncated: bool,
}

/// The tokenizer surface the pipeline depends on.
///
/// `Send + Sync` because batched preprocessing shares one
/// tokenizer across worker threads.
pub trait TextTokenizer: Send + Sync {
    /// Text → ids, special tokens included, never padded.
    ///
    /// With `truncate`, the result holds at most `max_length` ids and
    /// the special tokens the tokenizer adds (e.g. a closing `</s>`)
    /// survive the cut. Without it, `max_length` is ignored.
    fn encode(&self, text: &str, max_length: usize, truncate: bool) -> Result<EncodedText, PipelineError>;

    /// Ids → text. With `skip_special` the control tokens are dropped.
    fn decode(&self, ids: &[u32], skip_special: bool) -> Result<String, PipelineError>;

    /// Exact vocabulary lookup; None if the token string is absent.
    fn token_to_id(&self, token: &str) -> Option<u32>;

    fn pad_token_id(&self) -> u32;

    /// Fallback id for tokens missing from the vocabulary.
    fn unk_token_id(&self) -> u32;
}
