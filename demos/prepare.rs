// Runs a full preparation job.
//
//   cargo run --example prepare -- prep_config.json
//
// Without an argument the default configuration is used
// (data/captions.tsv and data/image_vectors.json into output/).

use anyhow::{Context, Result};
use caption_prep::{telemetry, PrepConfig, PrepareUseCase};

fn main() -> Result<()> {
    telemetry::init_tracing();

    let cfg = match std::env::args().nth(1) {
        Some(path) => PrepConfig::from_file(&path)
            .with_context(|| format!("Cannot load config '{}'", path))?,
        None => PrepConfig::default(),
    };

    let prepared = PrepareUseCase::new(cfg).execute()?;
    let report   = &prepared.report;

    println!("Images per split : {:?}", report.images);
    println!("Captions per split: {:?}", report.captions);
    println!("Outliers removed : {}", report.outliers_removed);
    println!("Missing vectors  : {}", report.missing_vectors.total());
    println!("Vocabulary size  : {}", report.vocab_size);
    Ok(())
}
