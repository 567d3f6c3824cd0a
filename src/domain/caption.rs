// ============================================================
// Layer 3 — Caption Domain Types
// ============================================================
// A CaptionRecord is one row of the caption table:
// an image identifier and one caption describing it.
//
// Several rows may share the same identifier when an image
// has more than one caption. CaptionTable keeps rows in file
// order so every lookup below is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Image identifiers are the `ID` column of the caption table.
pub type ImageId = String;

/// One (identifier, caption) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionRecord {
    pub id:      ImageId,
    pub caption: String,
}

impl CaptionRecord {
    pub fn new(id: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            id:      id.into(),
            caption: caption.into(),
        }
    }
}

/// All caption rows, in the order they were loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionTable {
    records: Vec<CaptionRecord>,
}

impl CaptionTable {
    pub fn new(records: Vec<CaptionRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: CaptionRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CaptionRecord] {
        &self.records
    }

    /// One identifier per row, duplicates included.
    pub fn ids(&self) -> Vec<ImageId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Distinct identifiers in first-seen order.
    pub fn unique_ids(&self) -> Vec<ImageId> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.id.as_str()))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Rows whose identifier is in `ids`, in table order.
    pub fn records_for(&self, ids: &HashSet<ImageId>) -> Vec<CaptionRecord> {
        self.records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect()
    }

    /// Caption text of every row whose identifier is in `ids`.
    pub fn captions_for(&self, ids: &HashSet<ImageId>) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .map(|r| r.caption.clone())
            .collect()
    }

    /// Collapse to one caption per identifier: the last row wins.
    pub fn last_caption_per_id(&self, ids: &HashSet<ImageId>) -> BTreeMap<ImageId, String> {
        let mut out = BTreeMap::new();
        for r in self.records.iter().filter(|r| ids.contains(&r.id)) {
            out.insert(r.id.clone(), r.caption.clone());
        }
        out
    }
}

impl FromIterator<CaptionRecord> for CaptionTable {
    fn from_iter<I: IntoIterator<Item = CaptionRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
