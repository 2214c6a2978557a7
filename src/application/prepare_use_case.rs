// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Orchestrates dataset preparation for one split:
//
//   Step 1: Load the split                 (Layer 4 - data)
//   Step 2: Load the tokenizer             (Layer 6 - infra)
//   Step 3: Filter + transform examples    (Layer 4 - data)
//   Step 4: Write prepared samples (JSONL) (Layer 2)
//   Step 5: Save the pipeline config       (Layer 6 - infra)
//   Step 6: Stream once through a DataLoader and check every
//           batch has the [N, 8, L] / [N, L] layout
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use anyhow::{ensure, Context, Result};
use burn::{
    backend::NdArray,
    data::dataloader::DataLoaderBuilder,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::config::{PipelineConfig, NUM_CODEBOOKS};
use crate::data::{
    batcher::Seq2SeqBatcher,
    dataset::{PreparedDataset, PreparedSample},
    loader::JsonlExampleSource,
    preprocessor::{ExamplePreprocessor, PrepareReport},
};
use crate::domain::traits::ExampleSource;
use crate::infra::{
    config_store::ConfigStore,
    hf_tokenizer::HfTokenizer,
    tokenizer_store::TokenizerStore,
};

type CheckBackend = NdArray;

#[derive(Debug, Clone)]
pub struct PrepareConfig {
    pub data_dir:      PathBuf,
    pub split:         String,
    pub tokenizer_dir: PathBuf,
    pub output_dir:    PathBuf,
    pub batch_size:    usize,
    pub pipeline:      PipelineConfig,
}

pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PrepareReport> {
        let cfg = &self.config;
        cfg.pipeline.validate()?;
        ensure!(cfg.batch_size > 0, "batch_size must be positive");

        // ── Step 1: Load the split ────────────────────────────────────────────
        let source   = JsonlExampleSource::new(&cfg.data_dir);
        let examples = source.load_split(&cfg.split)?;

        // ── Step 2: Tokenizer ─────────────────────────────────────────────────
        let tokenizer = TokenizerStore::new(&cfg.tokenizer_dir).load()?;
        let tokenizer = HfTokenizer::new(tokenizer, &cfg.pipeline)?;
        tracing::info!("Tokenizer vocabulary: {} entries", tokenizer.vocab_size());

        // ── Step 3: Filter + transform ────────────────────────────────────────
        let preprocessor = ExamplePreprocessor::new(&tokenizer, &cfg.pipeline);
        let (samples, report) = preprocessor.process_all(&examples);

        // ── Step 4: Write prepared samples ────────────────────────────────────
        let out_path = cfg.output_dir.join(format!("{}.jsonl", cfg.split));
        write_samples(&out_path, &samples)?;
        let frames: usize = samples.iter().map(PreparedSample::frames).sum();
        tracing::info!(
            "Wrote {} samples ({} audio frames) to '{}'",
            samples.len(),
            frames,
            out_path.display()
        );

        // ── Step 5: Save config alongside the samples ─────────────────────────
        ConfigStore::new(&cfg.output_dir).save(&cfg.pipeline)?;

        // ── Step 6: Verify batch layout ───────────────────────────────────────
        let batches = check_batches(samples, cfg.batch_size, cfg.pipeline.max_len)?;
        tracing::info!("Verified {} batches of up to {} samples", batches, cfg.batch_size);

        Ok(report)
    }
}

fn write_samples(path: &Path, samples: &[PreparedSample]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut w = BufWriter::new(file);
    for sample in samples {
        serde_json::to_writer(&mut w, sample)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

/// Run the samples through Burn's DataLoader and check tensor shapes.
/// Returns the number of batches seen.
fn check_batches(samples: Vec<PreparedSample>, batch_size: usize, max_len: usize) -> Result<usize> {
    if samples.is_empty() {
        return Ok(0);
    }

    let device  = Default::default();
    let batcher = Seq2SeqBatcher::<CheckBackend>::new(device);
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(PreparedDataset::new(samples));

    let mut batches = 0usize;
    for batch in loader.iter() {
        let [n, codebooks, l] = batch.input_ids.dims();
        ensure!(
            codebooks == NUM_CODEBOOKS && l == max_len,
            "input_ids batch has shape [{n}, {codebooks}, {l}], expected [{n}, {NUM_CODEBOOKS}, {max_len}]"
        );
        ensure!(
            batch.attention_mask.dims() == [n, max_len] && batch.labels.dims() == [n, max_len],
            "mask/labels batch shape does not match input_ids"
        );
        batches += 1;
    }
    Ok(batches)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::Example;

    fn write_split(dir: &std::path::Path, examples: &[Example]) {
        let body: Vec<String> = examples
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect();
        fs::write(dir.join("train.jsonl"), body.join("\n")).unwrap();
    }

    #[test]
    fn test_prepare_end_to_end() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        let pipeline = PipelineConfig {
            codebook_size: 16,
            max_len: 6,
            length_budget: 5,
            ..Default::default()
        };

        let ex = |text: &str, n: usize| {
            Example::new(text, std::array::from_fn(|cb| (0..n as u32).map(|u| (u + cb as u32) % 16).collect()))
        };
        write_split(data.path(), &[ex("go do you hear", 3), ex("too long", 6), ex("yes", 5)]);

        TokenizerStore::new(data.path())
            .build_and_save(&["go do you hear yes".to_string()], &pipeline)
            .unwrap();

        let report = PrepareUseCase::new(PrepareConfig {
            data_dir:      data.path().to_path_buf(),
            split:         "train".into(),
            tokenizer_dir: data.path().to_path_buf(),
            output_dir:    out.path().to_path_buf(),
            batch_size:    2,
            pipeline:      pipeline.clone(),
        })
        .execute()
        .unwrap();

        assert_eq!(report.seen, 3);
        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped_over_length, 1);

        let written = fs::read_to_string(out.path().join("train.jsonl")).unwrap();
        let samples: Vec<PreparedSample> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].input_ids.shape(), [NUM_CODEBOOKS, 6]);
        assert_eq!(samples[1].frames(), 5);

        assert_eq!(ConfigStore::new(out.path()).load().unwrap(), pipeline);
    }

    #[test]
    fn test_check_batches_counts_partial_batch() {
        let sample = PreparedSample {
            input_ids: crate::domain::matrix::CodebookMatrix::from_rows(std::array::from_fn(|_| vec![0; 4])),
            attention_mask: vec![1, 0, 0, 0],
            labels: vec![7, -100, -100, -100],
        };
        let batches = check_batches(vec![sample; 5], 2, 4).unwrap();
        assert_eq!(batches, 3);
    }
}
