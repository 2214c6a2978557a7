// ============================================================
// Layer 6 — HuggingFace Tokenizer Adapter
// ============================================================
// Wraps a `tokenizers::Tokenizer` behind the domain's
// TextTokenizer trait. The pad and unk ids are resolved once,
// from the token strings in PipelineConfig, so a tokenizer that
// lacks either is rejected up front instead of failing per
// example.
//
// Truncation goes through the library's own TruncationParams, so
// the post-processor's specials (`<s> … </s>`) are re-added after
// the cut. A truncating copy for the configured max_len is built
// once; other lengths get a fresh copy per call.

use anyhow::{anyhow, Result};
use tokenizers::{PostProcessor, Tokenizer, TruncationParams};

use crate::config::PipelineConfig;
use crate::domain::traits::{EncodedText, TextTokenizer};
use crate::error::PipelineError;

pub struct HfTokenizer {
    inner:        Tokenizer,
    truncating:   Tokenizer,
    max_len:      usize,
    added_tokens: usize,
    pad_token_id: u32,
    unk_token_id: u32,
}

impl HfTokenizer {
    pub fn new(inner: Tokenizer, cfg: &PipelineConfig) -> Result<Self> {
        let pad_token_id = inner
            .token_to_id(&cfg.pad_token)
            .ok_or_else(|| anyhow!("tokenizer has no pad token '{}'", cfg.pad_token))?;
        let unk_token_id = inner
            .token_to_id(&cfg.unk_token)
            .ok_or_else(|| anyhow!("tokenizer has no unknown token '{}'", cfg.unk_token))?;

        let added_tokens = inner
            .get_post_processor()
            .map_or(0, |p| p.added_tokens(false));
        let truncating = with_truncation(&inner, cfg.max_len, added_tokens)?;

        tracing::debug!(
            "Tokenizer ready: vocab={} pad_id={} unk_id={} added_specials={}",
            inner.get_vocab_size(false),
            pad_token_id,
            unk_token_id,
            added_tokens
        );

        Ok(Self {
            inner,
            truncating,
            max_len: cfg.max_len,
            added_tokens,
            pad_token_id,
            unk_token_id,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(false)
    }
}

/// A copy of `inner` that truncates to `max_length` ids, specials included.
fn with_truncation(inner: &Tokenizer, max_length: usize, added_tokens: usize) -> Result<Tokenizer, PipelineError> {
    if max_length < added_tokens {
        return Err(PipelineError::InvalidConfig(format!(
            "max length {max_length} cannot hold the {added_tokens} special tokens the tokenizer adds"
        )));
    }
    let mut tokenizer = inner.clone();
    tokenizer
        .with_truncation(Some(TruncationParams { max_length, ..Default::default() }))
        .map_err(PipelineError::tokenizer)?;
    Ok(tokenizer)
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str, max_length: usize, truncate: bool) -> Result<EncodedText, PipelineError> {
        let enc = if !truncate {
            self.inner.encode(text, true)
        } else if max_length == self.max_len {
            self.truncating.encode(text, true)
        } else {
            with_truncation(&self.inner, max_length, self.added_tokens)?.encode(text, true)
        }
        .map_err(PipelineError::tokenizer)?;

        Ok(EncodedText {
            truncated: !enc.get_overflowing().is_empty(),
            ids:       enc.get_ids().to_vec(),
        })
    }

    fn decode(&self, ids: &[u32], skip_special: bool) -> Result<String, PipelineError> {
        self.inner
            .decode(ids, skip_special)
            .map_err(PipelineError::tokenizer)
    }

    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.inner.token_to_id(token)
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }

    fn unk_token_id(&self) -> u32 {
        self.unk_token_id
    }
}
