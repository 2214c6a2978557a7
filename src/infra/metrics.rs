// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one row per `score` run to a CSV file so WER can be
// tracked across checkpoints of an external training run.
//
// Output file: <dir>/metrics.csv
//
//   run,samples,reference_words,edits,wer,invalid_label_ids
//   epoch-3,2703,54402,9120,0.167641,0
//   epoch-4,2703,54402,8311,0.152770,0
//
// The header is written only when the file is created, so
// repeated runs append to the same log.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::eval::evaluator::Evaluation;

/// One row of the metrics log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Free-form run label (checkpoint name, epoch, …)
    pub run: String,

    pub samples: usize,

    pub reference_words: usize,

    pub edits: usize,

    /// Corpus word error rate. Lower is better; can exceed 1.0.
    pub wer: f64,

    pub invalid_label_ids: usize,
}

impl ScoreRecord {
    pub fn new(run: impl Into<String>, eval: &Evaluation) -> Self {
        Self {
            run:             run.into(),
            samples:         eval.samples,
            reference_words: eval.reference_words,
            edits:           eval.edits,
            wer:             eval.wer,
            invalid_label_ids: eval.invalid_label_ids,
        }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and the CSV header if they don't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "run,samples,reference_words,edits,wer,invalid_label_ids")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, r: &ScoreRecord) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        // commas would break the row
        let run = r.run.replace(',', "_");
        writeln!(
            f,
            "{},{},{},{},{:.6},{}",
            run, r.samples, r.reference_words, r.edits, r.wer, r.invalid_label_ids
        )?;

        tracing::debug!("Logged run '{}': wer={:.4}", r.run, r.wer);
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(run: &str, wer: f64) -> ScoreRecord {
        let eval = Evaluation { wer, edits: 3, reference_words: 9, samples: 2, invalid_label_ids: 0 };
        ScoreRecord::new(run, &eval)
    }

    #[test]
    fn test_appends_rows_under_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&record("epoch-1", 0.5)).unwrap();

        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&record("epoch,2", 0.25)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec![
            "run,samples,reference_words,edits,wer,invalid_label_ids",
            "epoch-1,2,9,3,0.500000,0",
            "epoch_2,2,9,3,0.250000,0",
        ]);
    }
}
