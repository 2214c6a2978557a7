// ============================================================
// Layer 4 — Seq2Seq Batcher
// ============================================================
// Implements Burn's Batcher trait to stack PreparedSamples
// into the three tensors a seq2seq model consumes:
//
//   input_ids       Int [N, 8, L]
//   attention_mask  Int [N, L]
//   labels          Int [N, L]
//
// Every sample is already padded to the same L, so batching is
// flatten-then-reshape. input_ids are flattened sample-major,
// then codebook-major, then frame. This is the memory order of
// [N, 8, L].
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::config::NUM_CODEBOOKS;
use crate::data::dataset::PreparedSample;

// ─── Seq2SeqBatch ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Seq2SeqBatch<B: Backend> {
    /// Unit token ids — shape: [batch_size, 8, max_len]
    pub input_ids: Tensor<B, 3, Int>,

    /// One mask per example, shared by its 8 codebooks — shape: [batch_size, max_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Decoder targets with ignore-index padding — shape: [batch_size, max_len]
    pub labels: Tensor<B, 2, Int>,
}

// ─── Seq2SeqBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct Seq2SeqBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> Seq2SeqBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<PreparedSample, Seq2SeqBatch<B>> for Seq2SeqBatcher<B> {
    /// # Panics
    /// Panics on an empty batch or on samples with differing L;
    /// the DataLoader never produces the former and the
    /// preprocessor never produces the latter.
    fn batch(&self, items: Vec<PreparedSample>) -> Seq2SeqBatch<B> {
        let batch_size = items.len();
        let max_len    = items[0].max_len();
        assert!(
            items.iter().all(|s| s.max_len() == max_len && s.labels.len() == max_len),
            "all samples in a batch must share max_len"
        );

        // Burn Int tensors are built from i32
        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter_codebook_major().map(|x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
            .collect();

        let labels_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.labels.iter().copied())
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, NUM_CODEBOOKS, max_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(
            mask_flat.as_slice(), &self.device
        ).reshape([batch_size, max_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(
            labels_flat.as_slice(), &self.device
        ).reshape([batch_size, max_len]);

        Seq2SeqBatch { input_ids, attention_mask, labels }
    }
}
