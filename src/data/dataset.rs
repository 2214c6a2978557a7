use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::matrix::CodebookMatrix;

/// One example after mapping, padding and label building.
/// Every field has the run's fixed length L.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedSample {
    pub input_ids:      CodebookMatrix,
    pub attention_mask: Vec<u32>,
    pub labels:         Vec<i32>,
}

impl PreparedSample {
    pub fn max_len(&self) -> usize {
        self.attention_mask.len()
    }

    pub fn frames(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

pub struct PreparedDataset {
    samples: Vec<PreparedSample>,
}

impl PreparedDataset {
    pub fn new(samples: Vec<PreparedSample>) -> Self { Self { samples } }
}

impl Dataset<PreparedSample> for PreparedDataset {
    fn get(&self, index: usize) -> Option<PreparedSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
