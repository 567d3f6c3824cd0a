// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Writes the artifacts of a preparation run:
//
//   annotations.rs — R2Gen-style train/val/test JSON for the
//                    downstream captioning trainer
//
//   vocab_store.rs — vocab.json and a HuggingFace tokenizer.json
//                    carrying the same token ids
//
//   run_store.rs   — the config and report of each run, so a
//                    seeded run can be reproduced

/// Trainer annotation JSON
pub mod annotations;

/// Vocabulary persistence and tokenizer export
pub mod vocab_store;

/// Run config and report persistence
pub mod run_store;
