// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `prepare`, `score` and `build-vocab`.
// The pipeline constants are shared by all three through
// PipelineArgs, which can also be replaced wholesale by a
// saved pipeline_config.json (--config).

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    build_vocab_use_case::BuildVocabConfig,
    prepare_use_case::PrepareConfig,
    score_use_case::ScoreConfig,
};
use crate::config::{PipelineConfig, DEFAULT_IGNORE_INDEX};
use crate::infra::config_store::load_config_file;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter, map, pad and mask one dataset split for seq2seq training
    Prepare(PrepareArgs),

    /// Decode predictions and labels and report corpus WER
    Score(ScoreArgs),

    /// Build a word-level tokenizer with the unit vocabulary blocks
    BuildVocab(BuildVocabArgs),
}

/// Layout constants shared by every command
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Load these settings from a pipeline_config.json instead of the flags below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Vocabulary block size per codebook
    #[arg(long, default_value_t = 1000)]
    pub codebook_size: u32,

    /// Padding target L for unit codes and labels
    #[arg(long, default_value_t = 1023)]
    pub max_len: usize,

    /// Drop examples whose codebook-0 stream is longer than this
    #[arg(long, default_value_t = 1000)]
    pub length_budget: usize,

    /// Label value excluded from loss and decoding (must be negative)
    #[arg(long, default_value_t = DEFAULT_IGNORE_INDEX, allow_negative_numbers = true)]
    pub ignore_index: i32,

    /// Prefix of the synthesised unit token strings
    #[arg(long, default_value = "v_tok_")]
    pub unit_token_prefix: String,

    #[arg(long, default_value = "<pad>")]
    pub pad_token: String,

    #[arg(long, default_value = "<unk>")]
    pub unk_token: String,

    /// How many (reference, prediction) pairs the evaluator logs
    #[arg(long, default_value_t = 10)]
    pub num_logged_samples: usize,
}

impl PipelineArgs {
    /// Flags → PipelineConfig, or the --config file if one was given.
    pub fn resolve(self) -> Result<PipelineConfig> {
        if let Some(path) = &self.config {
            tracing::info!("Using pipeline config '{}'", path.display());
            return load_config_file(path);
        }
        let cfg = PipelineConfig::from(self);
        cfg.validate()?;
        Ok(cfg)
    }
}

impl From<PipelineArgs> for PipelineConfig {
    fn from(a: PipelineArgs) -> Self {
        PipelineConfig {
            codebook_size:      a.codebook_size,
            max_len:            a.max_len,
            length_budget:      a.length_budget,
            ignore_index:       a.ignore_index,
            unit_token_prefix:  a.unit_token_prefix,
            pad_token:          a.pad_token,
            unk_token:          a.unk_token,
            num_logged_samples: a.num_logged_samples,
        }
    }
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Directory holding <split>.jsonl files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Split to prepare (e.g. train, validation)
    #[arg(long, default_value = "train")]
    pub split: String,

    /// Directory containing tokenizer.json
    #[arg(long, default_value = "tokenizer")]
    pub tokenizer_dir: PathBuf,

    /// Where prepared samples and pipeline_config.json are written
    #[arg(long, default_value = "prepared")]
    pub output_dir: PathBuf,

    /// Batch size used when checking tensor layout
    #[arg(long, default_value_t = 2)]
    pub batch_size: usize,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl PrepareArgs {
    pub fn into_config(self) -> Result<PrepareConfig> {
        Ok(PrepareConfig {
            data_dir:      self.data_dir,
            split:         self.split,
            tokenizer_dir: self.tokenizer_dir,
            output_dir:    self.output_dir,
            batch_size:    self.batch_size,
            pipeline:      self.pipeline.resolve()?,
        })
    }
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// JSONL file of {"predicted_ids": [...], "label_ids": [...]} rows
    #[arg(long)]
    pub input: PathBuf,

    /// Directory containing tokenizer.json
    #[arg(long, default_value = "tokenizer")]
    pub tokenizer_dir: PathBuf,

    /// Append the result to <dir>/metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<PathBuf>,

    /// Label for this run in metrics.csv
    #[arg(long, default_value = "eval")]
    pub run_name: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl ScoreArgs {
    pub fn into_config(self) -> Result<ScoreConfig> {
        Ok(ScoreConfig {
            input:         self.input,
            tokenizer_dir: self.tokenizer_dir,
            metrics_dir:   self.metrics_dir,
            run_name:      self.run_name,
            pipeline:      self.pipeline.resolve()?,
        })
    }
}

#[derive(Args, Debug)]
pub struct BuildVocabArgs {
    /// Directory holding <split>.jsonl files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Splits whose transcripts feed the word vocabulary (repeatable)
    #[arg(long = "split", default_values = ["train"])]
    pub splits: Vec<String>,

    /// Where tokenizer.json is written
    #[arg(long, default_value = "tokenizer")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl BuildVocabArgs {
    pub fn into_config(self) -> Result<BuildVocabConfig> {
        Ok(BuildVocabConfig {
            data_dir:   self.data_dir,
            splits:     self.splits,
            output_dir: self.output_dir,
            pipeline:   self.pipeline.resolve()?,
        })
    }
}
