// ============================================================
// Layer 4 — Dataset Assembler
// ============================================================
// Turns a caption table and a vector store into train/dev/test
// bundles plus a vocabulary:
//
//   Step 1: Distinct image ids from the caption table
//   Step 2: Shuffle + split into train/dev/test     (splitter)
//   Step 3: Drop long training captions             (outlier)
//   Step 4: Look up image vectors for every split
//   Step 5: Collect captions of the resolved ids
//   Step 6: Preprocess training captions            (preprocessor)
//   Step 7: Build the vocabulary from them          (vocabulary)
//
// Ids without a vector are dropped in step 4. Each drop is
// counted per split in the AssemblyReport and logged.

use rand::Rng;
use std::collections::{BTreeMap, HashSet};

use crate::application::prepare_use_case::PrepConfig;
use crate::data::{
    dataset::{AssemblyReport, DatasetBundle, FoldDataset, PreparedDataset, Split},
    outlier::{FilterScope, OutlierFilter},
    preprocessor::Preprocessor,
    splitter::{Folds, HoldoutSplitter, KFold},
    vocabulary::{Vocabulary, VocabularyBuilder},
};
use crate::domain::caption::{CaptionRecord, CaptionTable, ImageId};
use crate::domain::image_vectors::ImageVectorStore;
use crate::error::Result;

pub struct DatasetAssembler<'a> {
    vectors:      &'a ImageVectorStore,
    captions:     &'a CaptionTable,
    config:       &'a PrepConfig,
    preprocessor: Preprocessor,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(
        vectors:  &'a ImageVectorStore,
        captions: &'a CaptionTable,
        config:   &'a PrepConfig,
    ) -> Self {
        Self {
            vectors,
            captions,
            config,
            preprocessor: Preprocessor::new(),
        }
    }

    /// Run the full split → filter → lookup → vocabulary pipeline.
    pub fn assemble<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PreparedDataset> {
        let cfg = self.config;

        // ── Step 1 + 2: Split distinct ids ────────────────────────────────────
        let ids      = self.captions.unique_ids();
        let splitter = HoldoutSplitter::new(cfg.test_fraction, cfg.dev_fraction_of_remainder)?;
        let split    = splitter.split(ids, rng);

        let mut report = AssemblyReport {
            total_ids: split.total(),
            ..AssemblyReport::default()
        };
        report.split_ids.set(Split::Train, split.train.len());
        report.split_ids.set(Split::Dev, split.dev.len());
        report.split_ids.set(Split::Test, split.test.len());

        // ── Step 3 – 6: Bundles ───────────────────────────────────────────────
        let train = self.train_bundle(&split.train, &mut report)?;
        let dev   = self.eval_bundle(Split::Dev, &split.dev, &mut report);
        let test  = self.eval_bundle(Split::Test, &split.test, &mut report);

        // ── Step 7: Vocabulary from preprocessed training captions ────────────
        let vocab = self.build_vocab(&train.captions)?;
        report.vocab_size = vocab.len();

        for bundle in [&train, &dev, &test] {
            self.record_bundle(bundle, &mut report);
        }

        Ok(PreparedDataset { train, dev, test, vocab, report })
    }

    /// Distinct ids shuffled with `rng`, cut into `kfold_splits` folds.
    pub fn cv_folds<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Folds<ImageId>> {
        use rand::seq::SliceRandom;

        let mut ids = self.captions.unique_ids();
        ids.shuffle(rng);
        KFold::new(self.config.kfold_splits).folds(ids)
    }

    /// Train/dev bundles for one explicit fold. No test bundle.
    pub fn assemble_fold(&self, train_ids: &[ImageId], dev_ids: &[ImageId]) -> Result<FoldDataset> {
        let mut report = AssemblyReport {
            total_ids: train_ids.len() + dev_ids.len(),
            ..AssemblyReport::default()
        };
        report.split_ids.set(Split::Train, train_ids.len());
        report.split_ids.set(Split::Dev, dev_ids.len());

        let train = self.train_bundle(train_ids, &mut report)?;
        let dev   = self.eval_bundle(Split::Dev, dev_ids, &mut report);
        let vocab = self.build_vocab(&train.captions)?;
        report.vocab_size = vocab.len();

        for bundle in [&train, &dev] {
            self.record_bundle(bundle, &mut report);
        }

        Ok(FoldDataset { train, dev, vocab, report })
    }

    fn train_bundle(&self, ids: &[ImageId], report: &mut AssemblyReport) -> Result<DatasetBundle> {
        let cfg    = self.config;
        let id_set: HashSet<ImageId> = ids.iter().cloned().collect();

        // Training rows that survive the outlier filter
        let records: Vec<CaptionRecord> = if !cfg.clear_long_captions {
            self.captions.records_for(&id_set)
        } else {
            let filter = OutlierFilter::new(cfg.outlier_token_threshold);
            match cfg.filter_scope {
                FilterScope::PerImage => {
                    let collapsed = self.captions.last_caption_per_id(&id_set);
                    tracing::info!(
                        "Deleting outliers. Train images before cleaning: {}",
                        collapsed.len()
                    );
                    let outcome = filter.filter(collapsed)?;
                    report.outliers_removed = outcome.removed;
                    let kept: HashSet<ImageId> = outcome.kept.into_keys().collect();
                    self.captions.records_for(&kept)
                }
                FilterScope::PerCaption => {
                    let all = self.captions.records_for(&id_set);
                    tracing::info!(
                        "Deleting outliers. Train captions before cleaning: {}",
                        all.len()
                    );
                    let outcome = filter.filter_records(all)?;
                    report.outliers_removed = outcome.removed;
                    outcome.kept
                }
            }
        };

        let surviving: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let candidates = ids.iter().filter(|id| surviving.contains(id.as_str()));
        let vectors    = self.resolve_vectors(Split::Train, candidates, report);

        let records: Vec<CaptionRecord> = records
            .into_iter()
            .filter(|r| vectors.contains_key(&r.id))
            .collect();
        let raw: Vec<String> = records.iter().map(|r| r.caption.clone()).collect();
        let captions = self.preprocessor.preprocess_all(&raw);

        Ok(DatasetBundle { split: Split::Train, vectors, captions, records })
    }

    fn eval_bundle(&self, split: Split, ids: &[ImageId], report: &mut AssemblyReport) -> DatasetBundle {
        let vectors  = self.resolve_vectors(split, ids.iter(), report);
        let resolved = vectors.keys().cloned().collect::<HashSet<_>>();
        let records  = self.captions.records_for(&resolved);
        let captions = records.iter().map(|r| r.caption.clone()).collect();

        DatasetBundle { split, vectors, captions, records }
    }

    /// Vectors for `ids`; ids missing from the store are counted and skipped.
    fn resolve_vectors<'i, I>(
        &self,
        split:  Split,
        ids:    I,
        report: &mut AssemblyReport,
    ) -> BTreeMap<ImageId, Vec<f32>>
    where
        I: Iterator<Item = &'i ImageId>,
    {
        let mut vectors = BTreeMap::new();
        let mut missing = 0usize;

        for id in ids {
            match self.vectors.get(id) {
                Some(v) => {
                    vectors.insert(id.clone(), v.to_vec());
                }
                None => missing += 1,
            }
        }

        if missing > 0 {
            tracing::warn!(
                "{}: {} identifiers have no image vector and were dropped",
                split,
                missing
            );
        }
        report.missing_vectors.set(split, missing);
        vectors
    }

    fn build_vocab(&self, train_captions: &[String]) -> Result<Vocabulary> {
        VocabularyBuilder::new(self.config.vocab_min_frequency).build(train_captions)
    }

    fn record_bundle(&self, bundle: &DatasetBundle, report: &mut AssemblyReport) {
        tracing::info!(
            "{}: {} images, {} captions",
            bundle.split,
            bundle.image_count(),
            bundle.caption_count()
        );
        report.images.set(bundle.split, bundle.image_count());
        report.captions.set(bundle.split, bundle.caption_count());

        if bundle.is_empty() {
            tracing::warn!("{} split is empty", bundle.split);
            report.empty_splits.push(bundle.split);
        }
    }
}
