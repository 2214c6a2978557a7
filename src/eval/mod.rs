// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Turns model output back into text and scores it.
//
//   normalizer.rs — whitespace / invisible-character cleanup
//   wer.rs        — word edit distance and corpus WER totals
//   evaluator.rs  — decode predictions + labels, log samples,
//                   return {"wer": x}

pub mod normalizer;

pub mod wer;

pub mod evaluator;
