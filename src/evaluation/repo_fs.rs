//! Filesystem persistence of the JSON report.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::common::error::EvalResult;

use super::report::Report;

/// Write `report` as pretty JSON, creating parent directories.
pub fn save_report(report: &Report, path: &Path) -> EvalResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, report)?;
    out.write_all(b"\n")?;
    out.flush()?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
