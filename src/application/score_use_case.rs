// ============================================================
// Layer 2 — ScoreUseCase
// ============================================================
// Scores one evaluation pass of an external model:
//
//   Step 1: Read (predicted_ids, label_ids) rows   (JSONL)
//   Step 2: Load the tokenizer                     (Layer 6 - infra)
//   Step 3: Decode + compute corpus WER            (Layer 5 - eval)
//   Step 4: Append the result to metrics.csv       (Layer 6 - infra)
//
// Input rows look like:
//   {"predicted_ids": [2, 417, 9, 3], "label_ids": [417, 9, -100, -100]}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::config::PipelineConfig;
use crate::eval::evaluator::{DecodeScoreEvaluator, Evaluation};
use crate::infra::{
    hf_tokenizer::HfTokenizer,
    metrics::{MetricsLogger, ScoreRecord},
    tokenizer_store::TokenizerStore,
};

/// One evaluated example as handed over by the training driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub predicted_ids: Vec<i32>,
    pub label_ids:     Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub input:         PathBuf,
    pub tokenizer_dir: PathBuf,
    pub metrics_dir:   Option<PathBuf>,
    pub run_name:      String,
    pub pipeline:      PipelineConfig,
}

pub struct ScoreUseCase {
    config: ScoreConfig,
}

impl ScoreUseCase {
    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Evaluation> {
        let cfg = &self.config;
        cfg.pipeline.validate()?;

        // ── Step 1: Read rows ─────────────────────────────────────────────────
        let rows = read_rows(&cfg.input)?;
        tracing::info!("Scoring {} examples from '{}'", rows.len(), cfg.input.display());

        let (predictions, labels): (Vec<Vec<i32>>, Vec<Vec<i32>>) = rows
            .into_iter()
            .map(|r| (r.predicted_ids, r.label_ids))
            .unzip();

        // ── Step 2: Tokenizer ─────────────────────────────────────────────────
        let tokenizer = TokenizerStore::new(&cfg.tokenizer_dir).load()?;
        let tokenizer = HfTokenizer::new(tokenizer, &cfg.pipeline)?;

        // ── Step 3: Evaluate ──────────────────────────────────────────────────
        let evaluator  = DecodeScoreEvaluator::new(&tokenizer, &cfg.pipeline);
        let evaluation = evaluator.evaluate(&predictions, &labels)?;
        tracing::info!(
            "WER {:.4} ({} edits / {} reference words)",
            evaluation.wer,
            evaluation.edits,
            evaluation.reference_words
        );

        // ── Step 4: Metrics log ───────────────────────────────────────────────
        if let Some(dir) = &cfg.metrics_dir {
            MetricsLogger::new(dir)?.log(&ScoreRecord::new(&cfg.run_name, &evaluation))?;
        }

        Ok(evaluation)
    }
}

fn read_rows(path: &Path) -> Result<Vec<ScoreRow>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    let mut rows = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // A bad row would silently shift the metric, so it is an error here
        let row: ScoreRow = serde_json::from_str(&line)
            .with_context(|| format!("Malformed row at line {} of '{}'", line_no + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::TextTokenizer;
    use std::fs;

    #[test]
    fn test_score_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PipelineConfig { codebook_size: 1, ..Default::default() };
        let tok = TokenizerStore::new(dir.path())
            .build_and_save(&["the cat sat sit".to_string()], &pipeline)
            .unwrap();
        let tok = HfTokenizer::new(tok, &pipeline).unwrap();

        let enc = |s: &str| -> Vec<i32> {
            tok.encode(s, 0, false).unwrap().ids.into_iter().map(|i| i as i32).collect()
        };
        let mut label = enc("the cat sit");
        label.extend([-100, -100]);
        let row = ScoreRow { predicted_ids: enc("the cat sat"), label_ids: label };

        let input = dir.path().join("eval.jsonl");
        fs::write(&input, serde_json::to_string(&row).unwrap()).unwrap();

        let eval = ScoreUseCase::new(ScoreConfig {
            input,
            tokenizer_dir: dir.path().to_path_buf(),
            metrics_dir:   Some(dir.path().join("metrics")),
            run_name:      "epoch-1".into(),
            pipeline,
        })
        .execute()
        .unwrap();

        assert!((eval.wer - 1.0 / 3.0).abs() < 1e-12);
        let csv = fs::read_to_string(dir.path().join("metrics").join("metrics.csv")).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("epoch-1,1,3,1,"));
    }

    #[test]
    fn test_malformed_row_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("eval.jsonl");
        fs::write(&input, "{\"predicted_ids\": [1]}\n").unwrap();
        assert!(read_rows(&input).is_err());
    }
}
