// ============================================================
// Layer 4 — Example Preprocessor
// ============================================================
// The per-example transform exposed to a training driver,
// plus a batched form of it.
//
//   Example ──▶ CodebookAligner ──▶ input_ids [8, L], attention_mask [L]
//           └─▶ LabelBuilder    ──▶ labels [L]
//
// `process_all` runs the Length Filter first, then transforms
// the survivors in parallel with rayon. Output order always
// follows input order. Examples that fail the transform are
// skipped and counted; they never abort the batch.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::data::{
    aligner::CodebookAligner,
    dataset::PreparedSample,
    filter::LengthFilter,
    labels::LabelBuilder,
};
use crate::domain::{example::Example, traits::TextTokenizer};
use crate::error::PipelineError;

/// Result of transforming one example, with its data-quality counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedExample {
    pub sample:          PreparedSample,
    pub vocab_misses:    usize,
    pub label_truncated: bool,
}

/// Counters for one `process_all` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrepareReport {
    pub seen:                usize,
    pub kept:                usize,
    pub dropped_over_length: usize,
    pub rejected:            usize,
    pub vocab_misses:        usize,
    pub truncated_labels:    usize,
}

pub struct ExamplePreprocessor<'a> {
    filter:  LengthFilter,
    aligner: CodebookAligner<'a>,
    labels:  LabelBuilder<'a>,
}

impl<'a> ExamplePreprocessor<'a> {
    pub fn new(tokenizer: &'a dyn TextTokenizer, cfg: &PipelineConfig) -> Self {
        Self {
            filter:  LengthFilter::new(cfg.length_budget),
            aligner: CodebookAligner::new(tokenizer, cfg),
            labels:  LabelBuilder::new(tokenizer, cfg),
        }
    }

    /// The filter predicate.
    pub fn keep(&self, example: &Example) -> bool {
        self.filter.keep(example)
    }

    /// The per-example transform. Does not apply the filter.
    pub fn process(&self, example: &Example) -> Result<ProcessedExample, PipelineError> {
        let codes  = self.aligner.align(example)?;
        let labels = self.labels.build(&example.text)?;

        if codes.vocab_misses > 0 {
            tracing::debug!("{} unit(s) mapped to <unk>", codes.vocab_misses);
        }
        if labels.truncated {
            tracing::debug!("Label truncated to {} tokens", labels.len);
        }

        Ok(ProcessedExample {
            sample: PreparedSample {
                input_ids:      codes.input_ids,
                attention_mask: codes.attention_mask,
                labels:         labels.ids,
            },
            vocab_misses:    codes.vocab_misses,
            label_truncated: labels.truncated,
        })
    }

    /// Filter, then transform every surviving example.
    pub fn process_all(&self, examples: &[Example]) -> (Vec<PreparedSample>, PrepareReport) {
        let mut report = PrepareReport { seen: examples.len(), ..Default::default() };

        let kept: Vec<(usize, &Example)> = examples
            .iter()
            .enumerate()
            .filter(|(_, ex)| self.filter.keep(ex))
            .collect();
        report.dropped_over_length = examples.len() - kept.len();

        // par_iter + collect keeps the input order
        let results: Vec<(usize, Result<ProcessedExample, PipelineError>)> = kept
            .par_iter()
            .map(|&(index, ex)| (index, self.process(ex)))
            .collect();

        let mut samples = Vec::with_capacity(results.len());
        for (index, result) in results {
            match result {
                Ok(p) => {
                    report.vocab_misses += p.vocab_misses;
                    report.truncated_labels += usize::from(p.label_truncated);
                    samples.push(p.sample);
                }
                Err(e) => {
                    tracing::warn!("Skipping example {}: {}", index, e);
                    report.rejected += 1;
                }
            }
        }
        report.kept = samples.len();

        tracing::info!(
            "Prepared {}/{} examples (over length: {}, rejected: {}, unk units: {}, truncated labels: {})",
            report.kept,
            report.seen,
            report.dropped_over_length,
            report.rejected,
            report.vocab_misses,
            report.truncated_labels,
        );

        (samples, report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NUM_CODEBOOKS;
    use crate::infra::{hf_tokenizer::HfTokenizer, tokenizer_store::build_unit_vocab_tokenizer};

    fn setup() -> (HfTokenizer, PipelineConfig) {
        let cfg = PipelineConfig {
            max_len: 6,
            length_budget: 4,
            codebook_size: 10,
            ..Default::default()
        };
        let texts = vec!["one two three four five six seven eight".to_string()];
        let t = build_unit_vocab_tokenizer(&texts, &cfg).unwrap();
        (HfTokenizer::new(t, &cfg).unwrap(), cfg)
    }

    fn example(text: &str, frames: usize) -> Example {
        Example::new(text, std::array::from_fn(|cb| vec![cb as u32; frames]))
    }

    #[test]
    fn test_process_fills_all_fields() {
        let (tok, cfg) = setup();
        let pre = ExamplePreprocessor::new(&tok, &cfg);
        let out = pre.process(&example("one two", 3)).unwrap();

        assert_eq!(out.sample.input_ids.shape(), [NUM_CODEBOOKS, 6]);
        assert_eq!(out.sample.attention_mask, vec![1, 1, 1, 0, 0, 0]);
        assert_eq!(out.sample.labels.len(), 6);
        assert_eq!(&out.sample.labels[2..], &[-100; 4]);
        assert_eq!(out.sample.frames(), 3);
        assert!(!out.label_truncated);
    }

    #[test]
    fn test_process_all_filters_and_counts() {
        let (tok, cfg) = setup();
        let pre = ExamplePreprocessor::new(&tok, &cfg);

        let mut ragged = example("three", 2);
        ragged.codebooks[4].pop();

        let examples = vec![
            example("one", 4),                                       // kept, at budget
            example("two", 5),                                       // over budget
            ragged,                                                  // length mismatch
            example("one two three four five six seven eight", 1),   // truncated label
        ];
        let (samples, report) = pre.process_all(&examples);

        assert_eq!(samples.len(), 2);
        assert_eq!(report, PrepareReport {
            seen: 4,
            kept: 2,
            dropped_over_length: 1,
            rejected: 1,
            vocab_misses: 0,
            truncated_labels: 1,
        });
    }

    #[test]
    fn test_process_all_preserves_order() {
        let (tok, cfg) = setup();
        let pre = ExamplePreprocessor::new(&tok, &cfg);
        let examples: Vec<Example> = (0..40).map(|i| example("one", i % 5)).collect();
        let (samples, _) = pre.process_all(&examples);

        let expected: Vec<usize> = (0..40).map(|i| i % 5).filter(|&n| n <= 4).collect();
        let got: Vec<usize> = samples.iter().map(|s| s.frames()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_keep_uses_budget() {
        let (tok, cfg) = setup();
        let pre = ExamplePreprocessor::new(&tok, &cfg);
        assert!(pre.keep(&example("x", 4)));
        assert!(!pre.keep(&example("x", 5)));
    }
}
