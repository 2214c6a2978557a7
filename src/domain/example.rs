// ============================================================
// Layer 3 — Example Domain Type
// ============================================================
// A single training/evaluation record: the reference transcript
// plus one quantizer-index stream per codebook level.
//
// On disk the codebooks are flat fields `encodec_0` … `encodec_7`;
// in memory they are an array indexed by codebook level so that
// codebook-major access is the only access there is.

use serde::{Deserialize, Serialize};

use crate::config::NUM_CODEBOOKS;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExampleRecord", into = "ExampleRecord")]
pub struct Example {
    /// Reference transcript
    pub text: String,

    /// `codebooks[i][t]` = index emitted by level `i` for frame `t`.
    /// All streams are expected to have the same length.
    pub codebooks: [Vec<u32>; NUM_CODEBOOKS],
}

impl Example {
    pub fn new(text: impl Into<String>, codebooks: [Vec<u32>; NUM_CODEBOOKS]) -> Self {
        Self { text: text.into(), codebooks }
    }

    /// Frame count as seen by codebook 0. This is the length the
    /// Length Filter and the attention mask are computed from.
    pub fn frames(&self) -> usize {
        self.codebooks[0].len()
    }

    /// Verify the lockstep-length invariant and return the shared
    /// frame count. The first disagreeing codebook is reported.
    pub fn lockstep_frames(&self) -> Result<usize, PipelineError> {
        let expected = self.frames();
        for (codebook, stream) in self.codebooks.iter().enumerate().skip(1) {
            if stream.len() != expected {
                return Err(PipelineError::CodebookLengthMismatch {
                    codebook,
                    expected,
                    found: stream.len(),
                });
            }
        }
        Ok(expected)
    }
}

// ─── Wire Record ──────────────────────────────────────────────────────────────
/// Dataset row layout: `text` plus `encodec_0` … `encodec_7`.
/// Unknown fields (ids, speaker, audio paths) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExampleRecord {
    text:      String,
    encodec_0: Vec<u32>,
    encodec_1: Vec<u32>,
    encodec_2: Vec<u32>,
    encodec_3: Vec<u32>,
    encodec_4: Vec<u32>,
    encodec_5: Vec<u32>,
    encodec_6: Vec<u32>,
    encodec_7: Vec<u32>,
}

impl From<ExampleRecord> for Example {
    fn from(r: ExampleRecord) -> Self {
        Example {
            text: r.text,
            codebooks: [
                r.encodec_0, r.encodec_1, r.encodec_2, r.encodec_3,
                r.encodec_4, r.encodec_5, r.encodec_6, r.encodec_7,
            ],
        }
    }
}

impl From<Example> for ExampleRecord {
    fn from(e: Example) -> Self {
        let [c0, c1, c2, c3, c4, c5, c6, c7] = e.codebooks;
        ExampleRecord {
            text:      e.text,
            encodec_0: c0,
            encodec_1: c1,
            encodec_2: c2,
            encodec_3: c3,
            encodec_4: c4,
            encodec_5: c5,
            encodec_6: c6,
            encodec_7: c7,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(text: &str, frames: usize) -> Example {
        Example::new(text, std::array::from_fn(|i| vec![i as u32; frames]))
    }

    #[test]
    fn test_frames_reads_codebook_zero() {
        assert_eq!(uniform("a", 7).frames(), 7);
    }

    #[test]
    fn test_lockstep_ok() {
        assert_eq!(uniform("a", 3).lockstep_frames(), Ok(3));
    }

    #[test]
    fn test_lockstep_reports_first_mismatch() {
        let mut ex = uniform("a", 3);
        ex.codebooks[5].push(9);
        ex.codebooks[6].clear();
        assert_eq!(
            ex.lockstep_frames(),
            Err(PipelineError::CodebookLengthMismatch { codebook: 5, expected: 3, found: 4 })
        );
    }

    #[test]
    fn test_deserialises_dataset_row() {
        let line = r#"{"id":"84-121123-0000","text":"GO DO YOU HEAR",
            "encodec_0":[1,2],"encodec_1":[3,4],"encodec_2":[5,6],"encodec_3":[7,8],
            "encodec_4":[9,10],"encodec_5":[11,12],"encodec_6":[13,14],"encodec_7":[15,16]}"#;
        let ex: Example = serde_json::from_str(line).unwrap();
        assert_eq!(ex.text, "GO DO YOU HEAR");
        assert_eq!(ex.codebooks[0], vec![1, 2]);
        assert_eq!(ex.codebooks[7], vec![15, 16]);
    }

    #[test]
    fn test_missing_codebook_field_is_an_error() {
        let line = r#"{"text":"x","encodec_0":[1]}"#;
        assert!(serde_json::from_str::<Example>(line).is_err());
    }
}
