// ============================================================
// Layer 4 — Outlier Filter
// ============================================================
// Drops training captions that are too long to be useful.
// A caption is an outlier when its word-token count exceeds
// the threshold (default 80). Exactly `threshold` tokens is kept.
//
// Only the training split is ever filtered.
//
// FilterScope decides what one "entry" is when an image has
// several captions:
//   PerImage   — collapse to the last caption of each image,
//                keep or drop the whole image by that caption
//   PerCaption — judge every caption row on its own; an image
//                survives while at least one caption does

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::tokenizer::WordTokenizer;
use crate::domain::caption::{CaptionRecord, ImageId};
use crate::error::Result;

pub const DEFAULT_TOKEN_THRESHOLD: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterScope {
    #[default]
    PerImage,
    PerCaption,
}

/// Entries that survived plus how many were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome<T> {
    pub kept:    T,
    pub removed: usize,
}

#[derive(Debug, Clone)]
pub struct OutlierFilter {
    threshold: usize,
    tokenizer: WordTokenizer,
}

impl OutlierFilter {
    pub fn new(threshold: usize) -> Self {
        Self { threshold, tokenizer: WordTokenizer::new() }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_outlier(&self, caption: &str) -> Result<bool> {
        Ok(self.tokenizer.count(caption)? > self.threshold)
    }

    /// Filter a one-caption-per-image mapping.
    pub fn filter(
        &self,
        captions: BTreeMap<ImageId, String>,
    ) -> Result<FilterOutcome<BTreeMap<ImageId, String>>> {
        let before = captions.len();
        let mut kept = BTreeMap::new();

        for (id, caption) in captions {
            if !self.is_outlier(&caption)? {
                kept.insert(id, caption);
            }
        }

        let removed = before - kept.len();
        tracing::info!(
            "Outlier filter (> {} tokens): removed {} of {} images",
            self.threshold,
            removed,
            before
        );
        Ok(FilterOutcome { kept, removed })
    }

    /// Filter individual caption rows, keeping table order.
    pub fn filter_records(
        &self,
        records: Vec<CaptionRecord>,
    ) -> Result<FilterOutcome<Vec<CaptionRecord>>> {
        let before = records.len();
        let mut kept = Vec::with_capacity(before);

        for r in records {
            if !self.is_outlier(&r.caption)? {
                kept.push(r);
            }
        }

        let removed = before - kept.len();
        tracing::info!(
            "Outlier filter (> {} tokens): removed {} of {} captions",
            self.threshold,
            removed,
            before
        );
        Ok(FilterOutcome { kept, removed })
    }
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_THRESHOLD)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    #[test]
    fn test_threshold_boundary() {
        let f = OutlierFilter::default();
        assert!(!f.is_outlier(&words(80)).unwrap());
        assert!(f.is_outlier(&words(81)).unwrap());
    }

    #[test]
    fn test_filter_map_removes_long_captions() {
        let f = OutlierFilter::new(80);
        let mut input = BTreeMap::new();
        input.insert("keep".to_string(), words(80));
        input.insert("drop".to_string(), words(81));
        input.insert("short".to_string(), "small opacity".to_string());

        let out = f.filter(input).unwrap();
        assert_eq!(out.removed, 1);
        assert!(out.kept.contains_key("keep"));
        assert!(out.kept.contains_key("short"));
        assert!(!out.kept.contains_key("drop"));
    }

    #[test]
    fn test_no_kept_caption_exceeds_threshold() {
        let tok = WordTokenizer::new();
        for threshold in [0, 1, 3, 10] {
            let f = OutlierFilter::new(threshold);
            let input: BTreeMap<_, _> = (0..15)
                .map(|n| (format!("img{n}"), words(n)))
                .collect();
            let out = f.filter(input).unwrap();
            assert_eq!(out.kept.len() + out.removed, 15);
            for caption in out.kept.values() {
                assert!(tok.count(caption).unwrap() <= threshold);
            }
        }
    }

    #[test]
    fn test_filter_records_per_caption() {
        let f = OutlierFilter::new(3);
        let records = vec![
            CaptionRecord::new("a", "one two"),
            CaptionRecord::new("a", "one two three four"),
            CaptionRecord::new("b", "x y z"),
        ];
        let out = f.filter_records(records).unwrap();
        assert_eq!(out.removed, 1);
        assert_eq!(
            out.kept,
            vec![CaptionRecord::new("a", "one two"), CaptionRecord::new("b", "x y z")]
        );
    }

    #[test]
    fn test_scope_deserialises_snake_case() {
        let s: FilterScope = serde_json::from_str("\"per_caption\"").unwrap();
        assert_eq!(s, FilterScope::PerCaption);
        assert_eq!(FilterScope::default(), FilterScope::PerImage);
    }
}
