// ============================================================
// Layer 5 — Decode & Score Evaluator
// ============================================================
// Called by the training driver after an evaluation pass with
// the generated ids and the stored labels:
//
//   labels      ──strip ignore index──▶ decode ──▶ references
//   predictions ──strip negative ids──▶ decode ──▶ hypotheses
//                                          │
//                                          ▼
//                               corpus WER → {"wer": x}
//
// Ignore-index slots are removed BEFORE decoding; they are not
// vocabulary ids. Special tokens are dropped by the decoder.
// Any other negative label id is dropped too, with a warning and
// a count on the Evaluation; one bad row never fails the call.
// A handful of (reference, prediction) pairs are logged for
// eyeballing; logging never changes the returned metric.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::domain::traits::TextTokenizer;
use crate::error::PipelineError;
use crate::eval::{normalizer::TranscriptNormalizer, wer::CorpusWer};

/// Full result of one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub wer:             f64,
    pub edits:           usize,
    pub reference_words: usize,
    pub samples:         usize,
    /// Negative label ids other than the ignore index, dropped before decoding
    pub invalid_label_ids: usize,
}

pub struct DecodeScoreEvaluator<'a> {
    tokenizer:          &'a dyn TextTokenizer,
    normalizer:         TranscriptNormalizer,
    ignore_index:       i32,
    num_logged_samples: usize,
}

impl<'a> DecodeScoreEvaluator<'a> {
    pub fn new(tokenizer: &'a dyn TextTokenizer, cfg: &PipelineConfig) -> Self {
        Self {
            tokenizer,
            normalizer:         TranscriptNormalizer::new(),
            ignore_index:       cfg.ignore_index,
            num_logged_samples: cfg.num_logged_samples,
        }
    }

    /// Decode label sequences, dropping ignore-index positions first.
    /// Also returns how many other negative ids were dropped.
    pub fn decode_labels(&self, labels: &[Vec<i32>]) -> Result<(Vec<String>, usize), PipelineError> {
        let mut invalid = 0;
        let mut texts = Vec::with_capacity(labels.len());
        for (row, seq) in labels.iter().enumerate() {
            let mut ids = Vec::with_capacity(seq.len());
            for &id in seq.iter().filter(|&&id| id != self.ignore_index) {
                match u32::try_from(id) {
                    Ok(id) => ids.push(id),
                    Err(_) => {
                        tracing::warn!("Dropping invalid label id {} in row {}", id, row);
                        invalid += 1;
                    }
                }
            }
            texts.push(self.tokenizer.decode(&ids, true)?);
        }
        Ok((texts, invalid))
    }

    /// Decode generated sequences. Negative ids (generation padding)
    /// are dropped.
    pub fn decode_predictions(&self, predictions: &[Vec<i32>]) -> Result<Vec<String>, PipelineError> {
        predictions
            .iter()
            .map(|seq| {
                let ids: Vec<u32> = seq.iter().filter_map(|&id| u32::try_from(id).ok()).collect();
                self.tokenizer.decode(&ids, true)
            })
            .collect()
    }

    pub fn evaluate(
        &self,
        predictions: &[Vec<i32>],
        labels:      &[Vec<i32>],
    ) -> Result<Evaluation, PipelineError> {
        if predictions.len() != labels.len() {
            return Err(PipelineError::BatchSizeMismatch {
                predictions: predictions.len(),
                labels:      labels.len(),
            });
        }

        let hypotheses = self.decode_predictions(predictions)?;
        let (references, invalid_label_ids) = self.decode_labels(labels)?;

        let mut corpus = CorpusWer::default();
        for (reference, hypothesis) in references.iter().zip(&hypotheses) {
            let reference  = self.normalizer.normalize(reference);
            let hypothesis = self.normalizer.normalize(hypothesis);
            corpus.add(
                &self.normalizer.words(&reference),
                &self.normalizer.words(&hypothesis),
            );
        }

        self.log_samples(&references, &hypotheses);

        Ok(Evaluation {
            wer:             corpus.rate(),
            edits:           corpus.edits,
            reference_words: corpus.reference_words,
            samples:         references.len(),
            invalid_label_ids,
        })
    }

    /// The metric function handed to a training driver.
    pub fn compute_metrics(
        &self,
        predictions: &[Vec<i32>],
        labels:      &[Vec<i32>],
    ) -> Result<BTreeMap<String, f64>, PipelineError> {
        let eval = self.evaluate(predictions, labels)?;
        Ok(BTreeMap::from([("wer".to_string(), eval.wer)]))
    }

    fn log_samples(&self, references: &[String], hypotheses: &[String]) {
        if self.num_logged_samples == 0 || references.is_empty() {
            return;
        }
        tracing::info!("pred_result");
        tracing::info!("=================================");
        for (reference, hypothesis) in references.iter().zip(hypotheses).take(self.num_logged_samples) {
            tracing::info!("{}  /////  {}", reference, hypothesis);
        }
        tracing::info!("=================================");
    }
}
