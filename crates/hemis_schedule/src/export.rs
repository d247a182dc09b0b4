//! XLSX export of the stored schedule.

use crate::db::{CellValue, ScheduleTable};
use crate::error::ScheduleError;
use std::io::Cursor;
use tracing::info;

/// File name offered for download.
pub const EXPORT_FILE_NAME: &str = "schedule.xlsx";

/// MIME type of the exported workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Serializes the whole table into a single-sheet workbook.
///
/// The first row holds the column names, followed by one row per stored record. Returns
/// `Ok(None)` when the table has no rows, so the caller can show a message instead of an empty
/// file.
pub fn export_spreadsheet(table: &ScheduleTable) -> Result<Option<Vec<u8>>, ScheduleError> {
    if table.is_empty() {
        return Ok(None);
    }

    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).ok_or_else(|| ScheduleError::Export {
        message: "default worksheet missing".to_string(),
    })?;

    for (col_idx, name) in table.columns.iter().enumerate() {
        sheet
            .get_cell_mut(((col_idx as u32) + 1, 1))
            .set_value(name.as_str());
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = (row_idx as u32) + 2;
        for (col_idx, value) in row.cells().into_iter().enumerate() {
            let cell = sheet.get_cell_mut(((col_idx as u32) + 1, row_num));
            match value {
                CellValue::Integer(n) => {
                    cell.set_value_number(n as f64);
                }
                CellValue::Text(s) => {
                    cell.set_value(s);
                }
                CellValue::Empty => {}
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buf).map_err(|e| {
        ScheduleError::Export {
            message: format!("XLSX generation failed: {}", e),
        }
    })?;

    let bytes = buf.into_inner();
    info!(rows = table.len(), bytes = bytes.len(), "Exported schedule workbook");
    Ok(Some(bytes))
}
