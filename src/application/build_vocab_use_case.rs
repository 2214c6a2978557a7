// ============================================================
// Layer 2 — BuildVocabUseCase
// ============================================================
// Builds the shared word + unit tokenizer from the transcripts
// of one or more splits and saves it as tokenizer.json.
//
//   Step 1: Load transcripts of every requested split (Layer 4)
//   Step 2: Build and save the tokenizer               (Layer 6)

use anyhow::{ensure, Result};
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::data::loader::JsonlExampleSource;
use crate::domain::traits::ExampleSource;
use crate::infra::tokenizer_store::TokenizerStore;

#[derive(Debug, Clone)]
pub struct BuildVocabConfig {
    pub data_dir:   PathBuf,
    pub splits:     Vec<String>,
    pub output_dir: PathBuf,
    pub pipeline:   PipelineConfig,
}

pub struct BuildVocabUseCase {
    config: BuildVocabConfig,
}

impl BuildVocabUseCase {
    pub fn new(config: BuildVocabConfig) -> Self {
        Self { config }
    }

    /// Returns the size of the saved vocabulary.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;
        cfg.pipeline.validate()?;
        ensure!(!cfg.splits.is_empty(), "at least one split is required");

        // ── Step 1: Transcripts ───────────────────────────────────────────────
        let source = JsonlExampleSource::new(&cfg.data_dir);
        let mut texts = Vec::new();
        for split in &cfg.splits {
            texts.extend(source.load_split(split)?.into_iter().map(|e| e.text));
        }

        // ── Step 2: Build + save ──────────────────────────────────────────────
        let tokenizer = TokenizerStore::new(&cfg.output_dir).build_and_save(&texts, &cfg.pipeline)?;
        Ok(tokenizer.get_vocab_size(false))
    }
}
