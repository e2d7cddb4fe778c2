//! Console summary and JSON export.

use crate::error::Result;
use crate::state::save_state;
use crate::types::{BucketSummary, Summary};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Print the summary with severity-coded prefixes
pub fn write_summary<W: Write>(out: &mut W, source: &str, summary: &Summary) -> Result<()> {
    writeln!(out, "📊 Initiative summary")?;
    writeln!(out, "ℹ Source: {}", source)?;
    writeln!(out, "✅ Total initiatives: {}", summary.total)?;
    writeln!(out, "ℹ Without status: {}", summary.without_status)?;
    writeln!(out)?;

    writeln!(out, "✅ Positive outcome: {}", summary.positive.total)?;
    write_bucket(out, &summary.positive)?;
    writeln!(out)?;

    writeln!(out, "❌ Failed: {}", summary.failed.total)?;
    write_bucket(out, &summary.failed)?;
    writeln!(out)?;

    writeln!(out, "✅ Analysis complete.")?;
    Ok(())
}

fn write_bucket<W: Write>(out: &mut W, bucket: &BucketSummary) -> Result<()> {
    writeln!(out, "ℹ → with positive name: {}", bucket.with_positive_name)?;
    writeln!(out, "ℹ → with negative name: {}", bucket.with_negative_name)?;
    writeln!(out, "ℹ → neutral: {}", bucket.neutral)?;
    Ok(())
}

/// Write the export document
pub fn export_summary(path: &Path, summary: &Summary) -> Result<()> {
    save_state(path, summary)?;
    info!(path = %path.display(), "exported summary");
    Ok(())
}
