// ============================================================
// Layer 6 — Config Store
// ============================================================
// Saves and restores the PipelineConfig as JSON next to the
// prepared data, so a later `score` run uses the same ignore
// index, pad token and max_len that `prepare` used.
//
// File layout:
//   <dir>/
//     pipeline_config.json
//     <split>.jsonl          ← written by PrepareUseCase

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::config::PipelineConfig;

const CONFIG_FILE: &str = "pipeline_config.json";

pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Write the config as pretty JSON, creating the directory if needed.
    pub fn save(&self, cfg: &PipelineConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.path();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved pipeline config to '{}'", path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<PipelineConfig> {
        load_config_file(&self.path())
    }
}

/// Read and validate a config JSON file.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!(
            "Cannot read config from '{}'. Has 'prepare' been run?",
            path.display()
        ))?;

    let cfg: PipelineConfig = serde_json::from_str(&json)
        .with_context(|| format!("Malformed config '{}'", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
