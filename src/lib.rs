// ============================================================
// caption_prep
// ============================================================
// Prepares image-captioning datasets for training:
//
//   captions.tsv + vectors.json
//        │
//        ▼
//   split by image id → filter long captions → clean text
//        │
//        ▼
//   train / dev / test bundles + vocabulary
//        │
//        ▼
//   annotations.json, vocab.json, tokenizer.json, report.json
//
// Layers:
//   domain       — caption table, image vectors, source traits
//   data         — loading, splitting, filtering, vocabulary, assembly
//   infra        — writing run artifacts
//   application  — configuration and the end-to-end job

pub mod error;
pub mod telemetry;

pub mod domain;
pub mod data;
pub mod infra;
pub mod application;

pub use application::prepare_use_case::{PrepConfig, PrepareUseCase};
pub use data::assembler::DatasetAssembler;
pub use data::dataset::{AssemblyReport, DatasetBundle, FoldDataset, PreparedDataset, Split};
pub use data::outlier::{FilterScope, OutlierFilter};
pub use data::preprocessor::Preprocessor;
pub use data::splitter::{HoldoutSplitter, KFold, SplitAssignment};
pub use data::vocabulary::{Vocabulary, VocabularyBuilder};
pub use domain::caption::{CaptionRecord, CaptionTable, ImageId};
pub use domain::image_vectors::ImageVectorStore;
pub use error::{PrepError, Result};
