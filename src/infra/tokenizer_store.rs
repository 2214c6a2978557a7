// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the shared text + unit tokenizer from
// `<dir>/tokenizer.json`, or builds one when none exists.
//
// A built tokenizer is word-level and carries, in id order:
//   0..4        <pad> <unk> <s> </s>   (special)
//   4..4+8*K    v_tok_0 … v_tok_{8K-1} (one block of K per codebook)
//   then        transcript words, most frequent first
//
// The JSON is written by hand in HuggingFace format and loaded
// back through `Tokenizer::from_bytes`, which sidesteps the
// trainer/ModelWrapper type mismatch in tokenizers 0.15.

use anyhow::{Context, Result};
use std::{collections::HashMap, fs, path::PathBuf};
use tokenizers::{
    normalizers::BertNormalizer, pre_tokenizers::whitespace::Whitespace, NormalizedString,
    Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer,
};

use crate::config::{PipelineConfig, NUM_CODEBOOKS};
use crate::data::unit_mapper::unit_token;

const BOS_TOKEN: &str = "<s>";
const EOS_TOKEN: &str = "</s>";

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }

    /// Load an existing tokenizer or build a new one from texts
    pub fn load_or_build(&self, texts: &[String], cfg: &PipelineConfig) -> Result<Tokenizer> {
        if self.path().exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new unit tokenizer from {} transcripts", texts.len());
            self.build_and_save(texts, cfg)
        }
    }

    /// Load a previously saved tokenizer from its JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Build a unit-vocabulary tokenizer and write it to disk.
    pub fn build_and_save(&self, texts: &[String], cfg: &PipelineConfig) -> Result<Tokenizer> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let json = tokenizer_json(texts, cfg)?;
        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("Cannot write tokenizer JSON to '{}'", path.display()))?;

        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            tokenizer.get_vocab_size(false),
            path.display()
        );
        Ok(tokenizer)
    }
}

/// Build the unit-vocabulary tokenizer in memory.
pub fn build_unit_vocab_tokenizer(texts: &[String], cfg: &PipelineConfig) -> Result<Tokenizer> {
    let bytes = serde_json::to_vec(&tokenizer_json(texts, cfg)?)?;
    Tokenizer::from_bytes(bytes).map_err(|e| anyhow::anyhow!("Cannot build tokenizer: {e}"))
}

fn tokenizer_json(texts: &[String], cfg: &PipelineConfig) -> Result<serde_json::Value> {
    // lowercase, accents stripped, CJK characters split apart
    let normalizer = BertNormalizer::default();
    let specials = [cfg.pad_token.as_str(), cfg.unk_token.as_str(), BOS_TOKEN, EOS_TOKEN];

    // ── Step 1: Special tokens ────────────────────────────────────────────────
    let mut vocab = serde_json::Map::new();
    let mut added_tokens = Vec::new();
    for (id, tok) in specials.iter().enumerate() {
        vocab.insert(tok.to_string(), serde_json::json!(id));
        added_tokens.push(serde_json::json!({
            "id": id, "content": tok, "single_word": false, "lstrip": false,
            "rstrip": false, "normalized": false, "special": true
        }));
    }

    // ── Step 2: One block of unit tokens per codebook ─────────────────────────
    let mut next_id = vocab.len();
    for codebook in 0..NUM_CODEBOOKS {
        for unit in 0..cfg.codebook_size {
            vocab.insert(unit_token(cfg, codebook, unit), serde_json::json!(next_id));
            next_id += 1;
        }
    }

    // ── Step 3: Transcript words by descending frequency ──────────────────────
    for word in words_by_frequency(texts, &normalizer)? {
        if !vocab.contains_key(&word) {
            vocab.insert(word, serde_json::json!(next_id));
            next_id += 1;
        }
    }

    Ok(serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": serde_json::to_value(normalizer)?,
        "pre_tokenizer": serde_json::to_value(Whitespace)?,
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": cfg.unk_token
        }
    }))
}

/// Normalised pre-tokens, most frequent first, ties alphabetical.
fn words_by_frequency(texts: &[String], normalizer: &BertNormalizer) -> Result<Vec<String>> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for piece in pre_tokenize(text, normalizer)? {
            *freq.entry(piece).or_insert(0) += 1;
        }
    }
    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(words.into_iter().map(|(w, _)| w).collect())
}

/// Run the tokenizer's own normalizer and pre-tokenizer, so every
/// piece counted here is one the model lookup sees at encode time.
fn pre_tokenize(text: &str, normalizer: &BertNormalizer) -> Result<Vec<String>> {
    let mut normalized = NormalizedString::from(text);
    normalizer
        .normalize(&mut normalized)
        .map_err(|e| anyhow::anyhow!("Cannot normalise transcript: {e}"))?;

    let mut pretokenized = PreTokenizedString::from(normalized);
    Whitespace
        .pre_tokenize(&mut pretokenized)
        .map_err(|e| anyhow::anyhow!("Cannot pre-tokenise transcript: {e}"))?;

    let pieces = pretokenized
        .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
        .into_iter()
        .map(|(piece, _, _)| piece.to_string())
        .collect();
    Ok(pieces)
}
