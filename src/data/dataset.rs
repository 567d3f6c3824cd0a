// ============================================================
// Layer 4 — Dataset Types
// ============================================================
// The output side of the pipeline: one DatasetBundle per split,
// the vocabulary, and an AssemblyReport of what was dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::vocabulary::Vocabulary;
use crate::domain::caption::{CaptionRecord, ImageId};

/// Which partition a bundle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Dev, Split::Test];

    /// Key used by the annotation file ("val" for dev)
    pub fn annotation_key(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev   => "val",
            Split::Test  => "test",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Dev   => "dev",
            Split::Test  => "test",
        };
        f.write_str(name)
    }
}

/// Vectors and captions for one split.
///
/// `captions` is what a trainer consumes: preprocessed for train,
/// raw for dev and test. `records` always holds the raw rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBundle {
    pub split:    Split,
    pub vectors:  BTreeMap<ImageId, Vec<f32>>,
    pub captions: Vec<String>,
    pub records:  Vec<CaptionRecord>,
}

impl DatasetBundle {
    pub fn empty(split: Split) -> Self {
        Self {
            split,
            vectors:  BTreeMap::new(),
            captions: Vec::new(),
            records:  Vec::new(),
        }
    }

    pub fn image_count(&self) -> usize {
        self.vectors.len()
    }

    pub fn caption_count(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(String::as_str)
    }
}

/// One number per split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCounts {
    pub train: usize,
    pub dev:   usize,
    pub test:  usize,
}

impl SplitCounts {
    pub fn get(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train,
            Split::Dev   => self.dev,
            Split::Test  => self.test,
        }
    }

    pub fn set(&mut self, split: Split, value: usize) {
        match split {
            Split::Train => self.train = value,
            Split::Dev   => self.dev = value,
            Split::Test  => self.test = value,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.dev + self.test
    }
}

/// What happened during one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Distinct identifiers in the caption table
    pub total_ids:        usize,
    /// Identifiers per split straight out of the splitter
    pub split_ids:        SplitCounts,
    /// Images (per-image scope) or captions (per-caption scope) dropped as outliers
    pub outliers_removed: usize,
    /// Identifiers dropped because the vector store has no entry
    pub missing_vectors:  SplitCounts,
    /// Images in each final bundle
    pub images:           SplitCounts,
    /// Captions in each final bundle
    pub captions:         SplitCounts,
    pub empty_splits:     Vec<Split>,
    pub vocab_size:       usize,
}

/// Everything the assembler produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDataset {
    pub train:  DatasetBundle,
    pub dev:    DatasetBundle,
    pub test:   DatasetBundle,
    pub vocab:  Vocabulary,
    pub report: AssemblyReport,
}

impl PreparedDataset {
    pub fn bundle(&self, split: Split) -> &DatasetBundle {
        match split {
            Split::Train => &self.train,
            Split::Dev   => &self.dev,
            Split::Test  => &self.test,
        }
    }
}

/// Train/dev pair built from one cross-validation fold.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldDataset {
    pub train:  DatasetBundle,
    pub dev:    DatasetBundle,
    pub vocab:  Vocabulary,
    pub report: AssemblyReport,
}
