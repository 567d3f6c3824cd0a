// ============================================================
// Layer 6 — Run Store
// ============================================================
// Saves the configuration and report of a preparation run
// next to its outputs:
//
//   output/
//     prep_config.json   ← every option used, including the seed
//     report.json        ← split sizes, outliers, missing vectors
//
// Re-running with prep_config.json (and its seed) reproduces
// the same splits and vocabulary.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::application::prepare_use_case::PrepConfig;
use crate::data::dataset::AssemblyReport;

pub const CONFIG_FILE: &str = "prep_config.json";
pub const REPORT_FILE: &str = "report.json";

pub struct RunStore {
    dir: PathBuf,
}

impl RunStore {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        // Errors surface on the first write
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn save_config(&self, cfg: &PrepConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved preparation config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<PrepConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_report(&self, report: &AssemblyReport) -> Result<()> {
        let path = self.dir.join(REPORT_FILE);
        fs::write(&path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("Cannot write report to '{}'", path.display()))?;
        tracing::debug!("Saved run report to '{}'", path.display());
        Ok(())
    }

    pub fn load_report(&self) -> Result<AssemblyReport> {
        let path = self.dir.join(REPORT_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read report from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::Split;

    #[test]
    fn test_config_and_report_persist() {
        let dir   = tempfile::tempdir().unwrap();
        let store = RunStore::new(dir.path().join("run"));

        let cfg = PrepConfig { seed: Some(99), ..PrepConfig::default() };
        store.save_config(&cfg).unwrap();
        assert_eq!(store.load_config().unwrap(), cfg);

        let mut report = AssemblyReport { total_ids: 10, ..AssemblyReport::default() };
        report.empty_splits.push(Split::Dev);
        report.missing_vectors.set(Split::Test, 2);
        store.save_report(&report).unwrap();
        assert_eq!(store.load_report().unwrap(), report);
    }

    #[test]
    fn test_missing_config_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunStore::new(dir.path()).load_config().unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE));
    }
}
