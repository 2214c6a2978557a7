// ============================================================
// Layer 4 — Unit Token Mapper
// ============================================================
// Maps (codebook level i, quantizer index u) to the id of the
// token string "v_tok_{u + i*K}" where K is the codebook size.
//
// This gives every codebook its own block of K ids in the
// shared vocabulary:
//
//   codebook 0 → v_tok_0    … v_tok_999
//   codebook 1 → v_tok_1000 … v_tok_1999
//   …
//   codebook 7 → v_tok_7000 … v_tok_7999
//
// so the same raw index in two codebooks never maps to the
// same id. The id for every in-block (i, u) is looked up once
// at construction; indices outside the block go through the
// tokenizer on each call.

use crate::config::{PipelineConfig, NUM_CODEBOOKS};
use crate::domain::traits::TextTokenizer;

/// Token string for one quantizer index of one codebook.
pub fn unit_token(cfg: &PipelineConfig, codebook: usize, unit: u32) -> String {
    let offset = unit as u64 + codebook as u64 * cfg.codebook_size as u64;
    format!("{}{}", cfg.unit_token_prefix, offset)
}

pub struct UnitTokenMapper<'a> {
    tokenizer: &'a dyn TextTokenizer,
    cfg:       PipelineConfig,
    /// `table[i * K + u]` = id of v_tok_{u + i*K}, if present
    table:     Vec<Option<u32>>,
}

impl<'a> UnitTokenMapper<'a> {
    pub fn new(tokenizer: &'a dyn TextTokenizer, cfg: &PipelineConfig) -> Self {
        let k = cfg.codebook_size;
        let table: Vec<Option<u32>> = (0..NUM_CODEBOOKS)
            .flat_map(|cb| (0..k).map(move |u| (cb, u)))
            .map(|(cb, u)| tokenizer.token_to_id(&unit_token(cfg, cb, u)))
            .collect();

        let missing = table.iter().filter(|id| id.is_none()).count();
        if missing > 0 {
            tracing::warn!(
                "{} of {} unit tokens are missing from the vocabulary and will map to <unk>",
                missing,
                table.len()
            );
        }

        Self { tokenizer, cfg: cfg.clone(), table }
    }

    /// Exact lookup. None means the synthesised token string is not
    /// in the vocabulary.
    pub fn lookup(&self, codebook: usize, unit: u32) -> Option<u32> {
        if unit < self.cfg.codebook_size {
            let k = self.cfg.codebook_size as usize;
            self.table[codebook * k + unit as usize]
        } else {
            self.tokenizer.token_to_id(&unit_token(&self.cfg, codebook, unit))
        }
    }

    /// Lookup with the tokenizer's unknown-token fallback.
    pub fn map(&self, codebook: usize, unit: u32) -> u32 {
        self.lookup(codebook, unit)
            .unwrap_or_else(|| self.tokenizer.unk_token_id())
    }

    /// Map a whole codebook stream, returning the ids and how many
    /// of them fell back to the unknown token.
    pub fn map_stream(&self, codebook: usize, units: &[u32]) -> (Vec<u32>, usize) {
        let unk = self.tokenizer.unk_token_id();
        let mut misses = 0usize;
        let ids = units
            .iter()
            .map(|&u| {
                self.lookup(codebook, u).unwrap_or_else(|| {
                    misses += 1;
                    unk
                })
            })
            .collect();
        (ids, misses)
    }
}
