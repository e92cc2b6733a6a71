//! Validate command: merge fragments and check them without running.

use anyhow::{Context, Result, bail};
use tracing::info_span;

use themis_config::EvaluationConfig;

use crate::cli::ValidateArgs;
use crate::fragments;

/// Merge and validate configuration fragments.
pub fn run(args: ValidateArgs) -> Result<()> {
    let _cmd = info_span!("validate").entered();

    let document = fragments::load_and_merge(&args.config)?;
    let config =
        EvaluationConfig::from_document(document).context("configuration does not match schema")?;

    if let Err(e) = config.validate() {
        bail!("configuration is invalid: {e}");
    }

    println!(
        "configuration '{}' is valid: {} observation dataset(s), {} prediction dataset(s), \
         {} crosswalk(s), {} threshold source(s), {} metric(s)",
        config.name,
        config.observations.len(),
        config.predictions.len(),
        config.crosswalks.len(),
        config.thresholds.len(),
        config.scheme.metrics.len(),
    );
    Ok(())
}
