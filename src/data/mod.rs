// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw inputs and the prepared splits.
//
// The pipeline flows in this order:
//
//   caption table + image vectors
//       │
//       ▼
//   Loaders           → TSV captions, JSON vectors
//       │
//       ▼
//   Splitter          → shuffled train / dev / test ids
//       │
//       ▼
//   OutlierFilter     → drops over-long training captions
//       │
//       ▼
//   Preprocessor      → normalises training captions
//       │
//       ▼
//   VocabularyBuilder → frequency-thresholded token ↔ index map
//       │
//       ▼
//   DatasetAssembler  → DatasetBundles + Vocabulary + report
//
// Each module does one step and is tested on its own.

/// Reads caption tables and vector stores from disk
pub mod loader;

/// Normalises caption text
pub mod preprocessor;

/// Word-level tokenisation
pub mod tokenizer;

/// Holdout and k-fold identifier splits
pub mod splitter;

/// Token-length outlier removal
pub mod outlier;

/// Token ↔ index mapping
pub mod vocabulary;

/// Per-split bundles and the run report
pub mod dataset;

/// Orchestrates the steps above
pub mod assembler;
