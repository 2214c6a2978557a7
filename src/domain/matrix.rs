// ============================================================
// Layer 3 — Codebook Matrix
// ============================================================
// The flattened token matrix for one example: NUM_CODEBOOKS
// rows (codebook axis) × L columns (frame axis) of vocabulary
// ids. Every row has the same length; the constructor and the
// deserialiser both enforce that, so a matrix that exists is a
// matrix with a rectangular shape.
//
//            frame 0   frame 1   …   frame L-1
//   cb 0   [ id        id        …   pad ]
//   cb 1   [ id        id        …   pad ]
//   …
//   cb 7   [ id        id        …   pad ]

use serde::{Deserialize, Serialize};

use crate::config::NUM_CODEBOOKS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct CodebookMatrix {
    rows: [Vec<u32>; NUM_CODEBOOKS],
}

impl CodebookMatrix {
    /// Build from codebook-major rows.
    ///
    /// # Panics
    /// Panics if the rows differ in length.
    pub fn from_rows(rows: [Vec<u32>; NUM_CODEBOOKS]) -> Self {
        let frames = rows[0].len();
        assert!(
            rows.iter().all(|r| r.len() == frames),
            "all codebook rows must have the same frame count"
        );
        Self { rows }
    }

    /// Size of the frame axis (L once padded).
    pub fn frames(&self) -> usize {
        self.rows[0].len()
    }

    /// `[codebooks, frames]`
    pub fn shape(&self) -> [usize; 2] {
        [NUM_CODEBOOKS, self.frames()]
    }

    /// All frames of one codebook level.
    pub fn codebook(&self, codebook: usize) -> &[u32] {
        &self.rows[codebook]
    }

    /// The id at (codebook, frame), or None when out of range.
    pub fn get(&self, codebook: usize, frame: usize) -> Option<u32> {
        self.rows.get(codebook)?.get(frame).copied()
    }

    /// All codebook levels at one frame.
    pub fn frame(&self, frame: usize) -> [u32; NUM_CODEBOOKS] {
        std::array::from_fn(|cb| self.rows[cb][frame])
    }

    /// Codebook-major flat iterator: row 0 left to right, then row 1, …
    /// This is the memory order of an `[8, L]` tensor.
    pub fn iter_codebook_major(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.iter().flat_map(|r| r.iter().copied())
    }
}

impl TryFrom<Vec<Vec<u32>>> for CodebookMatrix {
    type Error = String;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self, Self::Error> {
        let rows: [Vec<u32>; NUM_CODEBOOKS] = rows
            .try_into()
            .map_err(|v: Vec<Vec<u32>>| {
                format!("expected {NUM_CODEBOOKS} codebook rows, got {}", v.len())
            })?;
        let frames = rows[0].len();
        if let Some(bad) = rows.iter().position(|r| r.len() != frames) {
            return Err(format!(
                "codebook row {bad} has {} frames, row 0 has {frames}",
                rows[bad].len()
            ));
        }
        Ok(Self { rows })
    }
}

impl From<CodebookMatrix> for Vec<Vec<u32>> {
    fn from(m: CodebookMatrix) -> Self {
        m.rows.into()
    }
}
