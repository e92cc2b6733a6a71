//! Shared fragment loading for the CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use themis_config::merge_fragments;
use tracing::info;

/// Reads each fragment file and merges them, in order, into one document.
pub fn load_and_merge(paths: &[PathBuf]) -> Result<serde_json::Value> {
    let mut fragments = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let fragment: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse JSON config: {}", path.display()))?;
        fragments.push(fragment);
    }

    let merged = merge_fragments(fragments).context("failed to merge config fragments")?;
    info!(n_fragments = paths.len(), "configuration fragments merged");
    Ok(merged)
}

/// Writes text to a file, or to stdout when no path is given.
pub fn write_output(text: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
