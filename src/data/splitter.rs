// ============================================================
// Layer 4 — Train/Dev/Test Splitter
// ============================================================
// Two ways of partitioning image identifiers:
//
//   HoldoutSplitter — one shuffled train/dev/test partition
//     1. Shuffle all identifiers (Fisher-Yates)
//     2. Trailing ceil(test_fraction * N) → test
//     3. From the remaining M, trailing ceil(dev_fraction * M) → dev
//     4. Everything else → train
//
//     Example with N = 100 and the default fractions:
//       test = 15, dev = ceil(0.10 * 85) = 9, train = 76
//
//   KFold — k contiguous test blocks over an already shuffled
//     list, yielded lazily as (train, test) folds.
//
// Randomness always comes from a caller-supplied Rng, so a
// seeded StdRng reproduces the same split every run.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::caption::ImageId;
use crate::error::{PrepError, Result};

/// Three disjoint identifier lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAssignment<T = ImageId> {
    pub train: Vec<T>,
    pub dev:   Vec<T>,
    pub test:  Vec<T>,
}

impl<T> SplitAssignment<T> {
    pub fn total(&self) -> usize {
        self.train.len() + self.dev.len() + self.test.len()
    }
}

// ─── HoldoutSplitter ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldoutSplitter {
    test_fraction: f64,
    dev_fraction:  f64,
}

impl HoldoutSplitter {
    /// Both fractions must lie in [0, 1].
    pub fn new(test_fraction: f64, dev_fraction: f64) -> Result<Self> {
        for (name, f) in [("test_fraction", test_fraction), ("dev_fraction", dev_fraction)] {
            if !(0.0..=1.0).contains(&f) {
                return Err(PrepError::Config(format!("{name} must be in [0, 1], got {f}")));
            }
        }
        Ok(Self { test_fraction, dev_fraction })
    }

    /// Shuffle `ids` with `rng` and cut it into train/dev/test.
    ///
    /// Duplicates are not removed: each entry lands in exactly one list.
    pub fn split<T, R>(&self, mut ids: Vec<T>, rng: &mut R) -> SplitAssignment<T>
    where
        R: Rng + ?Sized,
    {
        ids.shuffle(rng);

        let total  = ids.len();
        let n_test = holdout_count(self.test_fraction, total);
        let test   = ids.split_off(total - n_test);

        let remaining = ids.len();
        let n_dev     = holdout_count(self.dev_fraction, remaining);
        let dev       = ids.split_off(remaining - n_dev);

        tracing::debug!(
            "Split {} ids: {} train, {} dev, {} test",
            total,
            ids.len(),
            dev.len(),
            test.len(),
        );

        SplitAssignment { train: ids, dev, test }
    }
}

impl Default for HoldoutSplitter {
    fn default() -> Self {
        Self { test_fraction: 0.15, dev_fraction: 0.10 }
    }
}

/// ceil(fraction * total), except that products which are whole
/// numbers up to float error are not rounded up (0.15 * 100 = 15).
fn holdout_count(fraction: f64, total: usize) -> usize {
    let raw     = fraction * total as f64;
    let nearest = raw.round();
    let count   = if (raw - nearest).abs() < 1e-9 { nearest } else { raw.ceil() };
    (count.max(0.0) as usize).min(total)
}

// ─── KFold ────────────────────────────────────────────────────────────────────
/// One cross-validation fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold<T = ImageId> {
    pub train: Vec<T>,
    pub test:  Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Lazily yield `n_splits` folds over `ids`, in order.
    ///
    /// The first `len % n_splits` test blocks hold one extra element.
    /// Fails when fewer than two folds are requested or there are
    /// more folds than identifiers.
    pub fn folds<T: Clone>(&self, ids: Vec<T>) -> Result<Folds<T>> {
        if self.n_splits < 2 || self.n_splits > ids.len() {
            return Err(PrepError::InvalidFolds {
                n_splits:  self.n_splits,
                n_samples: ids.len(),
            });
        }
        Ok(Folds { ids, n_splits: self.n_splits, next: 0 })
    }
}

impl Default for KFold {
    fn default() -> Self {
        Self::new(15)
    }
}

/// Iterator over folds. Clone it, or call `restart`, to iterate again.
#[derive(Debug, Clone)]
pub struct Folds<T> {
    ids:      Vec<T>,
    n_splits: usize,
    next:     usize,
}

impl<T> Folds<T> {
    pub fn restart(&mut self) {
        self.next = 0;
    }

    /// Half-open index range of fold `i`'s test block
    fn test_range(&self, i: usize) -> (usize, usize) {
        let base  = self.ids.len() / self.n_splits;
        let extra = self.ids.len() % self.n_splits;
        let start = i * base + i.min(extra);
        let size  = base + usize::from(i < extra);
        (start, start + size)
    }
}

impl<T: Clone> Iterator for Folds<T> {
    type Item = Fold<T>;

    fn next(&mut self) -> Option<Fold<T>> {
        if self.next >= self.n_splits {
            return None;
        }
        let (start, end) = self.test_range(self.next);
        self.next += 1;

        let test  = self.ids[start..end].to_vec();
        let train = self.ids[..start]
            .iter()
            .chain(&self.ids[end..])
            .cloned()
            .collect();
        Some(Fold { train, test })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.n_splits - self.next;
        (left, Some(left))
    }
}

impl<T: Clone> ExactSizeIterator for Folds<T> {}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_default_fraction_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let s = HoldoutSplitter::default().split(items, &mut rng());
        assert_eq!(s.test.len(),  15);
        assert_eq!(s.dev.len(),   9);
        assert_eq!(s.train.len(), 76);
    }

    #[test]
    fn test_all_items_preserved_and_disjoint() {
        let items: Vec<usize> = (0..57).collect();
        let s = HoldoutSplitter::default().split(items, &mut rng());
        assert_eq!(s.total(), 57);

        let train: HashSet<_> = s.train.iter().collect();
        let dev:   HashSet<_> = s.dev.iter().collect();
        let test:  HashSet<_> = s.test.iter().collect();
        assert!(train.is_disjoint(&dev));
        assert!(train.is_disjoint(&test));
        assert!(dev.is_disjoint(&test));
        assert_eq!(train.len() + dev.len() + test.len(), 57);
    }

    #[test]
    fn test_same_seed_same_split() {
        let items: Vec<usize> = (0..40).collect();
        let a = HoldoutSplitter::default().split(items.clone(), &mut StdRng::seed_from_u64(7));
        let b = HoldoutSplitter::default().split(items, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let s = HoldoutSplitter::default().split(Vec::<usize>::new(), &mut rng());
        assert!(s.train.is_empty());
        assert!(s.dev.is_empty());
        assert!(s.test.is_empty());
    }

    #[test]
    fn test_tiny_dataset_goes_to_test_first() {
        // ceil(0.15 * 1) = 1 → the only id is held out
        let s = HoldoutSplitter::default().split(vec![1], &mut rng());
        assert_eq!(s.test, vec![1]);
        assert!(s.dev.is_empty());
        assert!(s.train.is_empty());
    }

    #[test]
    fn test_zero_fractions_keep_everything_in_train() {
        let s = HoldoutSplitter::new(0.0, 0.0)
            .unwrap()
            .split((0..10).collect::<Vec<_>>(), &mut rng());
        assert_eq!(s.train.len(), 10);
        assert!(s.dev.is_empty());
        assert!(s.test.is_empty());
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        assert!(HoldoutSplitter::new(1.5, 0.1).is_err());
        assert!(HoldoutSplitter::new(0.1, -0.1).is_err());
    }

    #[test]
    fn test_duplicates_pass_through() {
        let s = HoldoutSplitter::default().split(vec![1, 1, 1, 2], &mut rng());
        assert_eq!(s.total(), 4);
    }

    #[test]
    fn test_kfold_every_id_tested_once() {
        let ids: Vec<usize> = (0..47).collect();
        let folds: Vec<_> = KFold::new(5).folds(ids).unwrap().collect();
        assert_eq!(folds.len(), 5);

        let mut seen = Vec::new();
        for f in &folds {
            assert_eq!(f.train.len() + f.test.len(), 47);
            seen.extend(f.test.iter().copied());
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..47).collect::<Vec<_>>());

        // 47 = 5 * 9 + 2 → two folds of 10, three of 9
        let sizes: Vec<_> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![10, 10, 9, 9, 9]);
    }

    #[test]
    fn test_kfold_restartable() {
        let mut folds = KFold::new(3).folds(vec!['a', 'b', 'c', 'd']).unwrap();
        let first: Vec<_> = folds.by_ref().collect();
        assert_eq!(folds.len(), 0);
        folds.restart();
        let second: Vec<_> = folds.collect();
        assert_eq!(first, second);
        assert_eq!(first[0].test, vec!['a', 'b']);
        assert_eq!(first[0].train, vec!['c', 'd']);
    }

    #[test]
    fn test_kfold_rejects_bad_counts() {
        assert!(KFold::new(1).folds(vec![1, 2, 3]).is_err());
        assert!(KFold::new(4).folds(vec![1, 2, 3]).is_err());
    }
}
