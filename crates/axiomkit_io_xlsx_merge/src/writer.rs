//! Replay a [`SheetGrid`] onto a `rust_xlsxwriter` worksheet.
//!
//! Saving the workbook stays with the caller.

use rust_xlsxwriter::{Format, FormatBorder, Worksheet};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::document::{SheetGrid, SpecGridCell};
use crate::spec::{EnumBorderStyle, EnumCellValue, SpecCellBorder, XlsxMergeError};

/// Write every cell and merged region of `sheet` in `grid` to `worksheet`.
///
/// Cells covered by a merged region (other than its anchor) are left to
/// `merge_range`, which receives the anchor value and the region's perimeter
/// borders.
pub fn write_grid_to_worksheet(
    grid: &SheetGrid,
    sheet: &str,
    worksheet: &mut Worksheet,
) -> Result<(), XlsxMergeError> {
    let set_covered = grid.merge_covered_cells(sheet);
    for (n_row, n_col, cell) in grid.cells_in(sheet) {
        if set_covered.contains(&(n_row, n_col)) {
            continue;
        }
        let format = derive_rust_xlsx_format(&cell.border);
        write_cell_with_format(worksheet, n_row, n_col, &cell.value, &format)?;
    }

    for region in grid.merged_regions_in(sheet) {
        if region.row_first == region.row_last && region.col_first == region.col_last {
            log::warn!("Skipped single-cell merged region {region}");
            continue;
        }
        let cell_anchor = grid.cell(sheet, region.row_first, region.col_first);
        let border_of = |row: usize, col: usize| {
            grid.cell(sheet, row, col)
                .map(|cell| cell.border)
                .unwrap_or_default()
        };
        let border = SpecCellBorder {
            top: border_of(region.row_first, region.col_first).top,
            left: border_of(region.row_first, region.col_first).left,
            right: border_of(region.row_first, region.col_last).right,
            bottom: border_of(region.row_last, region.col_first).bottom,
        };
        let format = derive_rust_xlsx_format(&border);

        let c_text = match cell_anchor.map(|cell| &cell.value) {
            Some(EnumCellValue::String(text)) => text.as_str(),
            _ => "",
        };
        worksheet.merge_range(
            cast_row_num(region.row_first)?,
            cast_col_num(region.col_first)?,
            cast_row_num(region.row_last)?,
            cast_col_num(region.col_last)?,
            c_text,
            &format,
        )?;
        if let Some(SpecGridCell {
            value: EnumCellValue::Number(value),
            ..
        }) = cell_anchor
        {
            worksheet.write_number_with_format(
                cast_row_num(region.row_first)?,
                cast_col_num(region.col_first)?,
                *value,
                &format,
            )?;
        }
    }

    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxMergeError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(border: &SpecCellBorder) -> Format {
    Format::new()
        .set_border_top(derive_format_border(border.top))
        .set_border_right(derive_format_border(border.right))
        .set_border_bottom(derive_format_border(border.bottom))
        .set_border_left(derive_format_border(border.left))
}

fn derive_format_border(border: EnumBorderStyle) -> FormatBorder {
    match border {
        EnumBorderStyle::None => FormatBorder::None,
        EnumBorderStyle::Thin => FormatBorder::Thin,
        EnumBorderStyle::Medium => FormatBorder::Medium,
        EnumBorderStyle::Dashed => FormatBorder::Dashed,
        EnumBorderStyle::Dotted => FormatBorder::Dotted,
        EnumBorderStyle::Thick => FormatBorder::Thick,
        EnumBorderStyle::Double => FormatBorder::Double,
        EnumBorderStyle::Hair => FormatBorder::Hair,
        EnumBorderStyle::MediumDashed => FormatBorder::MediumDashed,
        EnumBorderStyle::DashDot => FormatBorder::DashDot,
        EnumBorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        EnumBorderStyle::DashDotDot => FormatBorder::DashDotDot,
        EnumBorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        EnumBorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxMergeError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(XlsxMergeError::IndexOverflow { axis: "row", value });
    }
    u32::try_from(value).map_err(|_| XlsxMergeError::IndexOverflow { axis: "row", value })
}

fn cast_col_num(value: usize) -> Result<u16, XlsxMergeError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(XlsxMergeError::IndexOverflow {
            axis: "column",
            value,
        });
    }
    u16::try_from(value).map_err(|_| XlsxMergeError::IndexOverflow {
        axis: "column",
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SheetDocument;
    use crate::spec::SpecCellAddress;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_write_grid_with_merged_regions() {
        let mut grid = SheetGrid::new();
        let border = SpecCellBorder::uniform(EnumBorderStyle::Thin);
        for n_row in 2..=4 {
            grid.write_cell(
                &SpecCellAddress::new("Sheet1", n_row, 2),
                EnumCellValue::String(format!("sub{n_row}")),
                border,
            );
        }
        grid.write_cell(
            &SpecCellAddress::new("Sheet1", 2, 0),
            EnumCellValue::Number(1.0),
            border,
        );
        grid.write_cell(
            &SpecCellAddress::new("Sheet1", 2, 1),
            EnumCellValue::String("row1".to_string()),
            border,
        );
        grid.add_merged_region("Sheet1", 2, 4, 0, 0);
        grid.add_merged_region("Sheet1", 2, 4, 1, 1);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_grid_to_worksheet(&grid, "Sheet1", worksheet).expect("write grid");

        let v_bytes = workbook.save_to_buffer().expect("save to buffer");
        assert!(!v_bytes.is_empty());
    }

    #[test]
    fn test_index_overflow_is_reported() {
        assert!(matches!(
            cast_row_num(N_NROWS_EXCEL_MAX),
            Err(XlsxMergeError::IndexOverflow { axis: "row", .. })
        ));
        assert!(matches!(
            cast_col_num(N_NCOLS_EXCEL_MAX),
            Err(XlsxMergeError::IndexOverflow { axis: "column", .. })
        ));
        assert_eq!(cast_col_num(3).expect("col"), 3);
    }

    #[test]
    fn test_border_mapping_matches_codes() {
        assert_eq!(
            derive_format_border(EnumBorderStyle::from_code(5)),
            FormatBorder::Thick
        );
        assert_eq!(
            derive_format_border(EnumBorderStyle::from_code(0)),
            FormatBorder::None
        );
    }
}
