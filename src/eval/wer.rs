// ============================================================
// Layer 5 — Word Error Rate
// ============================================================
// Per-pair word-level Levenshtein distance, aggregated at corpus
// level: the batch WER is Σ edits / Σ reference words, not the
// mean of per-utterance rates.

/// Minimum substitutions + deletions + insertions turning
/// `reference` into `hypothesis`, counted in words.
pub fn word_edit_distance(reference: &[&str], hypothesis: &[&str]) -> usize {
    // Two rolling rows of the DP table
    let mut prev: Vec<usize> = (0..=hypothesis.len()).collect();
    let mut curr = vec![0usize; hypothesis.len() + 1];

    for (i, r) in reference.iter().enumerate() {
        curr[0] = i + 1;
        for (j, h) in hypothesis.iter().enumerate() {
            let cost = usize::from(r != h);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[hypothesis.len()]
}

/// Running corpus totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusWer {
    pub edits:           usize,
    pub reference_words: usize,
}

impl CorpusWer {
    pub fn add(&mut self, reference: &[&str], hypothesis: &[&str]) {
        self.edits += word_edit_distance(reference, hypothesis);
        self.reference_words += reference.len();
    }

    /// `edits / reference_words`.
    ///
    /// With no reference words at all this is 0.0 when nothing was
    /// hypothesised either, and `f64::INFINITY` otherwise.
    pub fn rate(&self) -> f64 {
        if self.reference_words == 0 {
            return if self.edits == 0 { 0.0 } else { f64::INFINITY };
        }
        self.edits as f64 / self.reference_words as f64
    }
}
