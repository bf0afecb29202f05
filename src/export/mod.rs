//! Export module - download-ready accident data
//!
//! Builds the export table from the filtered accidents and serialises it
//! as a spreadsheet.

mod xlsx;

use crate::data::AccidentTable;
use crate::schema::Field;
use log::info;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

pub use xlsx::XlsxWriter;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Zip error: {0}")]
    ZipError(#[from] ::zip::result::ZipError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// File name offered for the download, e.g. `NYCAccidents.xlsx`.
pub fn export_file_name(dataset_name: &str) -> String {
    format!("{dataset_name}.xlsx")
}

/// Export table: crash date ascending, columns exactly as in `manifest`.
///
/// Rows with the same crash time keep their table order. Polars frames
/// carry no row index, so none has to be dropped.
pub fn build_export(table: &AccidentTable, manifest: &[Field]) -> Result<DataFrame, ExportError> {
    let frame = table
        .lazy()
        .sort_by_exprs(
            [col(Field::Datetime.label())],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select(manifest.iter().map(|f| col(f.label())).collect::<Vec<_>>())
        .collect()?;
    Ok(frame)
}

/// First `rows` rows of the export table, shown as a sample before download.
pub fn export_preview(
    table: &AccidentTable,
    manifest: &[Field],
    rows: usize,
) -> Result<DataFrame, ExportError> {
    Ok(build_export(table, manifest)?.head(Some(rows)))
}

/// Build the export table and serialise it as workbook bytes.
pub fn export_workbook(
    table: &AccidentTable,
    manifest: &[Field],
    sheet_name: &str,
) -> Result<Vec<u8>, ExportError> {
    let frame = build_export(table, manifest)?;
    let bytes = XlsxWriter::write_workbook(&frame, sheet_name)?;
    info!(
        "Exported {} rows x {} columns ({} bytes)",
        frame.height(),
        frame.width(),
        bytes.len()
    );
    Ok(bytes)
}

/// Write workbook bytes to `path`.
pub fn save_workbook(bytes: &[u8], path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, bytes)?;
    info!("Saved export to {}", path.display());
    Ok(())
}
