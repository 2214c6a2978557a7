//! Multi-codebook EnCodec unit preprocessing and WER scoring for
//! seq2seq speech recognition.
//!
//! The training driver and the model live elsewhere. This crate gives
//! them:
//!
//! - a filter predicate: [`data::filter::LengthFilter`]
//! - a per-example transform: [`data::preprocessor::ExamplePreprocessor`]
//! - a batcher producing `input_ids [N, 8, L]`, `attention_mask [N, L]`
//!   and `labels [N, L]`: [`data::batcher::Seq2SeqBatcher`]
//! - a metric function `(predictions, labels) -> {"wer": x}`:
//!   [`eval::evaluator::DecodeScoreEvaluator`]

pub mod application;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod eval;
pub mod infra;
