//! Evaluate command: run a full evaluation from merged fragments.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use themis_config::EvaluationConfig;
use themis_evaluate::{CancelToken, evaluate, to_json};

use crate::cli::EvaluateArgs;
use crate::fragments;

/// Run the evaluation pipeline.
pub fn run(args: EvaluateArgs) -> Result<()> {
    let _cmd = info_span!("evaluate").entered();

    // 1. Merge fragments into one document
    let document = fragments::load_and_merge(&args.config)?;

    // 2. Deserialize and validate
    let config =
        EvaluationConfig::from_document(document).context("configuration does not match schema")?;
    config
        .validate()
        .context("configuration failed validation")?;

    info!(
        evaluation = config.name,
        n_observations = config.observations.len(),
        n_predictions = config.predictions.len(),
        n_crosswalks = config.crosswalks.len(),
        n_threshold_sources = config.thresholds.len(),
        "running evaluation"
    );

    // 3. Run
    let output = match evaluate(&config, &CancelToken::new()) {
        Ok(output) => output,
        Err(failure) => {
            for diagnostic in &failure.diagnostics {
                info!(
                    phase = %diagnostic.phase,
                    location = diagnostic.location.as_deref().unwrap_or("-"),
                    "{}",
                    diagnostic.message
                );
            }
            return Err(failure).context("evaluation failed");
        }
    };

    info!(
        n_scored = output.summary.n_scored,
        n_excluded = output.summary.n_excluded,
        "evaluation complete"
    );

    // 4. Write the result document
    let json = to_json(&output).context("failed to serialize results")?;
    fragments::write_output(&json, args.output.as_ref())
}
