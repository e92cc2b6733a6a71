//! Merge command: combine configuration fragments into one document.

use anyhow::{Context, Result};
use tracing::info_span;

use crate::cli::MergeArgs;
use crate::fragments;

/// Merge fragments and emit the combined document.
pub fn run(args: MergeArgs) -> Result<()> {
    let _cmd = info_span!("merge").entered();

    let document = fragments::load_and_merge(&args.config)?;
    let json =
        serde_json::to_string_pretty(&document).context("failed to serialize merged document")?;
    fragments::write_output(&json, args.output.as_ref())
}
