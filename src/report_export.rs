use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::state::StarsReport;

pub struct ExportPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
}

pub fn report_file_stem(report: &StarsReport) -> String {
    let team: String = report
        .team_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!(
        "stars_report_{}_{}_{}",
        team,
        report.range.start_param(),
        report.range.end_param()
    )
}

/// Writes the body exactly as downloaded plus a one-sheet workbook of the
/// parsed table.
pub fn export_report(dir: &Path, report: &StarsReport) -> Result<ExportPaths> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let stem = report_file_stem(report);
    let csv = dir.join(format!("{stem}.csv"));
    let xlsx = dir.join(format!("{stem}.xlsx"));

    fs::write(&csv, &report.raw).with_context(|| format!("write {}", csv.display()))?;

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("StarsReport")?;
        write_rows(sheet, &report.table.rows)?;
    }
    workbook
        .save(&xlsx)
        .with_context(|| format!("failed writing workbook to {}", xlsx.display()))?;

    Ok(ExportPaths { csv, xlsx })
}

fn write_rows(sheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    let bold = Format::new().set_bold();
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (row_num, col_num) = cell_index(row_idx, col_idx)?;
            if row_idx == 0 {
                sheet
                    .write_string_with_format(row_num, col_num, value, &bold)
                    .with_context(|| format!("write header ({row_idx},{col_idx})"))?;
            } else {
                sheet
                    .write_string(row_num, col_num, value)
                    .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
            }
        }
    }
    Ok(())
}

/// Worksheet coordinates for a table position; too-large indexes are an error.
pub fn cell_index(row_idx: usize, col_idx: usize) -> Result<(u32, u16)> {
    let row = u32::try_from(row_idx)
        .with_context(|| format!("report row {row_idx} does not fit a worksheet"))?;
    let col = u16::try_from(col_idx)
        .with_context(|| format!("report column {col_idx} does not fit a worksheet"))?;
    Ok((row, col))
}
