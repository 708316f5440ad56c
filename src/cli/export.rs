use std::path::{Path, PathBuf};

use crate::error::{PainelError, Result};
use crate::export::{self, ExportFormat};
use crate::models::RowSet;
use crate::settings::Settings;

/// `<export dir>/orcamento-YYYY-MM-DD.<ext>`
pub fn default_path(settings: &Settings, format: ExportFormat) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    settings
        .export_dir()
        .join(format!("orcamento-{date}.{}", format.extension()))
}

/// Explicit `--format` wins, then the output extension, then xlsx.
pub fn resolve_format(format: Option<&str>, output: Option<&Path>) -> Result<ExportFormat> {
    if let Some(key) = format {
        return ExportFormat::from_key(key)
            .ok_or_else(|| PainelError::Other(format!("Unknown export format: {key} (expected xlsx or csv)")));
    }
    let from_ext = output
        .and_then(|p| p.extension())
        .and_then(|ext| ExportFormat::from_key(&ext.to_string_lossy()));
    Ok(from_ext.unwrap_or(ExportFormat::Xlsx))
}

/// Write the row-set and return the path written.
pub fn export_to(
    rows: &RowSet,
    output: Option<&Path>,
    format: ExportFormat,
    settings: &Settings,
) -> Result<PathBuf> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_path(settings, format));
    export::write(rows, &path, format)?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}

pub fn run(
    rows: &RowSet,
    output: Option<String>,
    format: Option<String>,
    settings: &Settings,
) -> Result<()> {
    let output = output.map(PathBuf::from);
    let format = resolve_format(format.as_deref(), output.as_deref())?;
    let path = export_to(rows, output.as_deref(), format, settings)?;
    println!("Wrote {}", path.display());
    Ok(())
}
