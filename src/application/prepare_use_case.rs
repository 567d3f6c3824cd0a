// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Runs the whole preparation job end to end:
//
//   Step 1: Validate the configuration
//   Step 2: Load the caption table          (Layer 4 - data)
//   Step 3: Load and merge image vectors    (Layer 4 - data)
//   Step 4: Assemble splits + vocabulary    (Layer 4 - data)
//   Step 5: Write trainer annotations       (Layer 6 - infra)
//   Step 6: Save vocabulary artifacts       (Layer 6 - infra)
//   Step 7: Save config and run report      (Layer 6 - infra)

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::{
    assembler::DatasetAssembler,
    dataset::PreparedDataset,
    loader::{JsonVectorLoader, TsvCaptionLoader},
    outlier::{FilterScope, DEFAULT_TOKEN_THRESHOLD},
    vocabulary::DEFAULT_MIN_FREQUENCY,
};
use crate::domain::caption::CaptionTable;
use crate::domain::image_vectors::ImageVectorStore;
use crate::domain::traits::CaptionSource;
use crate::error::PrepError;
use crate::infra::{annotations::Annotations, run_store::RunStore, vocab_store::VocabStore};

// ─── Preparation Configuration ───────────────────────────────────────────────
// Every field has a default, so a config file only needs the
// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Delimited caption table with `ID` and `caption` columns
    pub captions_path:     String,
    /// One or more JSON vector stores, merged in order
    pub vector_paths:      Vec<String>,
    /// Where annotations, vocabulary and the report are written
    pub output_dir:        String,
    pub annotations_file:  String,
    /// Appended to an id to form the annotation image path
    pub image_extension:   String,
    pub caption_delimiter: char,

    pub outlier_token_threshold:   usize,
    pub test_fraction:             f64,
    pub dev_fraction_of_remainder: f64,
    pub vocab_min_frequency:       usize,
    pub clear_long_captions:       bool,
    pub filter_scope:              FilterScope,
    /// Fixed seed for reproducible splits; None draws from the OS
    pub seed:                      Option<u64>,
    pub kfold_splits:              usize,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            captions_path:     "data/captions.tsv".to_string(),
            vector_paths:      vec!["data/image_vectors.json".to_string()],
            output_dir:        "output".to_string(),
            annotations_file:  "annotations.json".to_string(),
            image_extension:   ".jpg".to_string(),
            caption_delimiter: '\t',

            outlier_token_threshold:   DEFAULT_TOKEN_THRESHOLD,
            test_fraction:             0.15,
            dev_fraction_of_remainder: 0.10,
            vocab_min_frequency:       DEFAULT_MIN_FREQUENCY,
            clear_long_captions:       true,
            filter_scope:              FilterScope::PerImage,
            seed:                      None,
            kfold_splits:              15,
        }
    }
}

impl PrepConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
        let cfg: Self = serde_json::from_str(&json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        for (name, f) in [
            ("test_fraction", self.test_fraction),
            ("dev_fraction_of_remainder", self.dev_fraction_of_remainder),
        ] {
            if !(0.0..=1.0).contains(&f) {
                return Err(PrepError::Config(format!("{name} must be in [0, 1], got {f}")));
            }
        }
        if self.outlier_token_threshold == 0 {
            return Err(PrepError::Config("outlier_token_threshold must be at least 1".into()));
        }
        if self.vocab_min_frequency == 0 {
            return Err(PrepError::Config("vocab_min_frequency must be at least 1".into()));
        }
        if self.kfold_splits < 2 {
            return Err(PrepError::Config("kfold_splits must be at least 2".into()));
        }
        Ok(())
    }

    /// Seeded RNG when `seed` is set, OS entropy otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn annotations_path(&self) -> PathBuf {
        Path::new(&self.output_dir).join(&self.annotations_file)
    }
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    /// Load inputs from the configured paths, then run the job.
    pub fn execute(&self) -> Result<PreparedDataset> {
        let cfg = &self.config;
        cfg.validate().context("Invalid preparation config")?;

        // ── Step 2: Caption table ─────────────────────────────────────────────
        let captions = TsvCaptionLoader::new(&cfg.captions_path)
            .with_delimiter(cfg.caption_delimiter)
            .load_all()
            .with_context(|| format!("Cannot load captions from '{}'", cfg.captions_path))?;

        // ── Step 3: Image vectors (e.g. train + valid stores) ─────────────────
        let vectors = JsonVectorLoader::load_merged(&cfg.vector_paths)
            .with_context(|| format!("Cannot load image vectors from {:?}", cfg.vector_paths))?;

        self.execute_with(&captions, &vectors)
    }

    /// Run the job on inputs that are already in memory.
    pub fn execute_with(
        &self,
        captions: &CaptionTable,
        vectors:  &ImageVectorStore,
    ) -> Result<PreparedDataset> {
        let cfg = &self.config;
        cfg.validate().context("Invalid preparation config")?;

        // ── Step 4: Split, filter, look up, build vocabulary ──────────────────
        let mut rng  = cfg.rng();
        let prepared = DatasetAssembler::new(vectors, captions, cfg).assemble(&mut rng)?;

        // ── Step 5: Trainer annotations ───────────────────────────────────────
        let annotations_path = cfg.annotations_path();
        Annotations::from_prepared(&prepared, &cfg.image_extension)
            .write(&annotations_path)
            .with_context(|| {
                format!("Cannot write annotations to '{}'", annotations_path.display())
            })?;

        // ── Step 6: Vocabulary files ──────────────────────────────────────────
        let vocab_store = VocabStore::new(&cfg.output_dir);
        vocab_store.save(&prepared.vocab)?;
        vocab_store.export_tokenizer(&prepared.vocab)?;

        // ── Step 7: Config + report for reproducibility ───────────────────────
        let run_store = RunStore::new(&cfg.output_dir);
        run_store.save_config(cfg)?;
        run_store.save_report(&prepared.report)?;

        tracing::info!(
            "Preparation complete: vocabulary of {} tokens, outputs in '{}'",
            prepared.vocab.len(),
            cfg.output_dir
        );
        Ok(prepared)
    }
}
