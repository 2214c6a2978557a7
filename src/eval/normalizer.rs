// ============================================================
// Layer 5 — Transcript Normalizer
// ============================================================
// Brings decoded predictions and references to the same surface
// form before they are split into words:
//
//   1. Map tab, NBSP, zero-width space, BOM and any other
//      control character to a plain space
//   2. Collapse runs of whitespace into one space
//   3. Trim both ends
//
// Case and punctuation are left alone; both sides of the
// comparison went through the same tokenizer already.

#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptNormalizer;

impl TranscriptNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, text: &str) -> String {
        let spaced: String = text
            .chars()
            .map(|c| match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect();

        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Normalised text split into words.
    pub fn words<'t>(&self, normalized: &'t str) -> Vec<&'t str> {
        normalized.split(' ').filter(|w| !w.is_empty()).collect()
    }
}
