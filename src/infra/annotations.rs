// ============================================================
// Layer 6 — Annotation Writer
// ============================================================
// Emits the prepared splits in the R2Gen annotation format
// that the downstream report-generation trainer reads:
//
//   {
//     "train": [ { "id": "img_0001",
//                  "report": "No acute findings.",
//                  "image_path": ["img_0001.jpg"],
//                  "split": "train" }, ... ],
//     "val":   [ ... ],
//     "test":  [ ... ]
//   }
//
// One entry per caption row of a split, with the raw caption
// text as the report. Dev is written under the "val" key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::data::dataset::{DatasetBundle, PreparedDataset, Split};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    pub id:         String,
    pub report:     String,
    pub image_path: Vec<String>,
    pub split:      String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub train: Vec<AnnotationEntry>,
    pub val:   Vec<AnnotationEntry>,
    pub test:  Vec<AnnotationEntry>,
}

impl Annotations {
    pub fn from_prepared(prepared: &PreparedDataset, image_extension: &str) -> Self {
        Self {
            train: entries(&prepared.train, image_extension),
            val:   entries(&prepared.dev, image_extension),
            test:  entries(&prepared.test, image_extension),
        }
    }

    pub fn get(&self, split: Split) -> &[AnnotationEntry] {
        match split {
            Split::Train => &self.train,
            Split::Dev   => &self.val,
            Split::Test  => &self.test,
        }
    }

    /// Total entries across all splits
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write compact JSON, creating the parent directory if needed.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        fs::write(path, serde_json::to_string(self)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::info!(
            "Annotations written to '{}' ({} train, {} val, {} test)",
            path.display(),
            self.train.len(),
            self.val.len(),
            self.test.len()
        );
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn entries(bundle: &DatasetBundle, image_extension: &str) -> Vec<AnnotationEntry> {
    let split = bundle.split.annotation_key();
    bundle
        .records
        .iter()
        .map(|r| AnnotationEntry {
            id:         r.id.clone(),
            report:     r.caption.clone(),
            image_path: vec![format!("{}{}", r.id, image_extension)],
            split:      split.to_string(),
        })
        .collect()
}
