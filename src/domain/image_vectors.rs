// ============================================================
// Layer 3 — Image Vector Store
// ============================================================
// Maps an image identifier to its precomputed feature vector
// (e.g. a DenseNet-121 pooled embedding).
//
// Every vector in one store has the same length. The first
// vector inserted fixes the dimension; later inserts with a
// different length are rejected.

use std::collections::HashMap;

use crate::domain::caption::ImageId;
use crate::error::{PrepError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageVectorStore {
    vectors: HashMap<ImageId, Vec<f32>>,
    dim:     Option<usize>,
}

impl ImageVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from (identifier, vector) pairs, checking dimensions.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ImageId, Vec<f32>)>,
    {
        let mut store = Self::new();
        for (id, v) in pairs {
            store.insert(id, v)?;
        }
        Ok(store)
    }

    /// Insert or replace a vector. Replacing keeps dict-update semantics.
    pub fn insert(&mut self, id: impl Into<String>, vector: Vec<f32>) -> Result<()> {
        let id = id.into();
        match self.dim {
            Some(expected) if expected != vector.len() => {
                return Err(PrepError::DimensionMismatch {
                    id,
                    expected,
                    found: vector.len(),
                });
            }
            None => self.dim = Some(vector.len()),
            _ => {}
        }
        self.vectors.insert(id, vector);
        Ok(())
    }

    /// Merge `other` into this store. Entries in `other` overwrite ours.
    pub fn merge(&mut self, other: ImageVectorStore) -> Result<()> {
        for (id, v) in other.vectors {
            self.insert(id, v)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vectors.contains_key(id)
    }

    /// Identifiers in arbitrary order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector length, or None for an empty store
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_fixes_dim() {
        let mut s = ImageVectorStore::new();
        assert_eq!(s.dim(), None);
        s.insert("a", vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(s.dim(), Some(3));
        assert_eq!(s.get("a"), Some(&[0.0, 1.0, 2.0][..]));
        assert!(s.contains("a"));
        assert!(!s.contains("b"));
    }

    #[test]
    fn test_wrong_dim_rejected() {
        let mut s = ImageVectorStore::new();
        s.insert("a", vec![0.0; 4]).unwrap();
        let err = s.insert("b", vec![0.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            PrepError::DimensionMismatch { expected: 4, found: 5, .. }
        ));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut train = ImageVectorStore::from_pairs(vec![
            ("a".to_string(), vec![1.0, 1.0]),
            ("b".to_string(), vec![2.0, 2.0]),
        ])
        .unwrap();
        let valid = ImageVectorStore::from_pairs(vec![
            ("b".to_string(), vec![9.0, 9.0]),
            ("c".to_string(), vec![3.0, 3.0]),
        ])
        .unwrap();

        train.merge(valid).unwrap();
        assert_eq!(train.len(), 3);
        assert_eq!(train.get("b"), Some(&[9.0, 9.0][..]));
    }
}
