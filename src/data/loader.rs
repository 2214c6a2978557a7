// ============================================================
// Layer 4 — JSONL Example Loader
// ============================================================
// Loads a named split from `<data_dir>/<split>.jsonl`, one
// dataset row per line:
//
//   {"text": "...", "encodec_0": [..], …, "encodec_7": [..]}
//
// A malformed line is logged and skipped; the rest of the split
// still loads. A missing split file is an error.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::example::Example;
use crate::domain::traits::ExampleSource;

pub struct JsonlExampleSource {
    dir: PathBuf,
}

impl JsonlExampleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn split_path(&self, split: &str) -> PathBuf {
        self.dir.join(format!("{split}.jsonl"))
    }
}

impl ExampleSource for JsonlExampleSource {
    fn load_split(&self, split: &str) -> Result<Vec<Example>> {
        let path = self.split_path(split);
        let examples = read_examples(&path)
            .with_context(|| format!("Cannot load split '{split}'"))?;
        tracing::info!("Loaded {} examples from split '{}'", examples.len(), split);
        Ok(examples)
    }
}

fn read_examples(path: &Path) -> Result<Vec<Example>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    let mut examples = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Cannot read '{}'", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Example>(&line) {
            Ok(ex) => examples.push(ex),
            Err(e) => tracing::warn!(
                "Skipping line {} of '{}': {}",
                line_no + 1,
                path.display(),
                e
            ),
        }
    }
    Ok(examples)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn row(text: &str, frames: usize) -> String {
        let codes: Vec<String> = (0..8)
            .map(|i| format!("\"encodec_{i}\":{:?}", vec![i; frames]))
            .collect();
        format!("{{\"text\":\"{text}\",{}}}", codes.join(","))
    }

    #[test]
    fn test_loads_split_and_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let body = [row("a b", 2), "not json".to_string(), String::new(), row("c", 3)].join("\n");
        fs::write(dir.path().join("validation.jsonl"), body).unwrap();

        let src = JsonlExampleSource::new(dir.path());
        let examples = src.load_split("validation").unwrap();

        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].text, "a b");
        assert_eq!(examples[1].frames(), 3);
        assert_eq!(examples[1].codebooks[7], vec![7, 7, 7]);
    }

    #[test]
    fn test_missing_split_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = JsonlExampleSource::new(dir.path());
        let err = src.load_split("train").unwrap_err();
        assert!(format!("{err:#}").contains("train"));
    }
}
