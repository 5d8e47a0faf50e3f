//! Merge executor: writes merged-region records and paints their borders.

use std::collections::BTreeSet;

use crate::document::SheetDocument;
use crate::report::ReportMerge;
use crate::spec::{
    EnumBorderSide, SpecCellAddress, SpecCellBorder, SpecMergeOptions, SpecRegion, SpecRowSpan,
};
use crate::util::format_column_set;

/// Merge every span over every column in `cols_merge`.
///
/// For each `(span, col)` pair this registers a single-column merged region and
/// paints its perimeter with the borders of the cell at `(cell_style_source.row, col)`.
/// When that cell is vacant, all four sides get `merge_options.border_fallback`.
/// Spans covering one row or less are skipped with a warning. An empty span list
/// performs no document mutation.
pub fn commit_merges(
    doc: &mut dyn SheetDocument,
    sheet: &str,
    spans: &[SpecRowSpan],
    cols_merge: &BTreeSet<usize>,
    cell_style_source: &SpecCellAddress,
    merge_options: &SpecMergeOptions,
) -> ReportMerge {
    let mut report = ReportMerge::default();
    if spans.is_empty() {
        return report;
    }

    log::debug!(
        "merge: sheet={sheet}, spans={}, cols={}",
        spans
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
        format_column_set(cols_merge)
    );

    for span in spans {
        report.cnt_spans += 1;
        merge_span_rows(
            doc,
            sheet,
            *span,
            cols_merge,
            cell_style_source,
            merge_options,
            &mut report,
        );
    }
    report
}

fn merge_span_rows(
    doc: &mut dyn SheetDocument,
    sheet: &str,
    span: SpecRowSpan,
    cols_merge: &BTreeSet<usize>,
    cell_style_source: &SpecCellAddress,
    merge_options: &SpecMergeOptions,
    report: &mut ReportMerge,
) {
    if span.row_from >= span.row_to {
        log::warn!(
            "No need to merge because same row: row_from={}, row_to={}",
            span.row_from,
            span.row_to
        );
        report.cnt_skipped += 1;
        report.warn(format!("Skipped span {span}: row_from >= row_to."));
        return;
    }

    for &n_col in cols_merge {
        log::debug!(
            "row_from={}, row_to={}, col={n_col}",
            span.row_from,
            span.row_to
        );
        let region = SpecRegion {
            sheet: sheet.to_string(),
            row_first: span.row_from,
            row_last: span.row_to,
            col_first: n_col,
            col_last: n_col,
        };
        doc.add_merged_region(sheet, span.row_from, span.row_to, n_col, n_col);
        report.cnt_merged += 1;

        let border = match doc.get_cell_border(sheet, cell_style_source.row, n_col) {
            Some(border) => border,
            None => {
                log::info!("Missing cell: row={}, col={n_col}", cell_style_source.row);
                report.cnt_missing_style += 1;
                SpecCellBorder::uniform(merge_options.border_fallback)
            }
        };
        for side in EnumBorderSide::ALL {
            doc.set_region_border(side, border.get(side), &region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SheetGrid;
    use crate::spec::{EnumBorderStyle, EnumCellValue};

    fn cell(row: usize, col: usize) -> SpecCellAddress {
        SpecCellAddress::new("Sheet1", row, col)
    }

    #[test]
    fn test_empty_spans_do_not_touch_document() {
        let mut grid = SheetGrid::new();
        let report = commit_merges(
            &mut grid,
            "Sheet1",
            &[],
            &BTreeSet::from([0, 1]),
            &cell(2, 0),
            &SpecMergeOptions::default(),
        );

        assert_eq!(grid.mutation_count(), 0);
        assert_eq!(report, ReportMerge::default());
    }

    #[test]
    fn test_style_source_borders_are_copied_to_perimeter() {
        let mut grid = SheetGrid::new();
        let border_source = SpecCellBorder {
            top: EnumBorderStyle::Thick,
            ..SpecCellBorder::uniform(EnumBorderStyle::Thin)
        };
        grid.write_cell(&cell(2, 0), EnumCellValue::Number(1.0), border_source);

        let report = commit_merges(
            &mut grid,
            "Sheet1",
            &[SpecRowSpan::new(2, 4)],
            &BTreeSet::from([0]),
            &cell(2, 0),
            &SpecMergeOptions::default(),
        );

        assert_eq!(report.cnt_merged, 1);
        assert_eq!(report.cnt_missing_style, 0);
        assert_eq!(
            grid.merged_regions(),
            &[SpecRegion::new("Sheet1", 2, 4, 0, 0).expect("region")]
        );

        let border = |row| grid.get_cell_border("Sheet1", row, 0).expect("cell");
        assert_eq!(border(2).top, EnumBorderStyle::Thick);
        assert_eq!(border(4).bottom, EnumBorderStyle::Thin);
        for n_row in 2..=4 {
            assert_eq!(border(n_row).left, EnumBorderStyle::Thin);
            assert_eq!(border(n_row).right, EnumBorderStyle::Thin);
        }
        assert_eq!(border(3).top, EnumBorderStyle::None);
    }

    #[test]
    fn test_vacant_style_source_gets_fallback_border() {
        let mut grid = SheetGrid::new();

        let report = commit_merges(
            &mut grid,
            "Sheet1",
            &[SpecRowSpan::new(5, 6)],
            &BTreeSet::from([1]),
            &cell(5, 0),
            &SpecMergeOptions::default(),
        );

        assert_eq!(report.cnt_missing_style, 1);
        let border = |row| grid.get_cell_border("Sheet1", row, 1).expect("cell");
        assert_eq!(border(5).top, EnumBorderStyle::Thin);
        assert_eq!(border(6).bottom, EnumBorderStyle::Thin);
        assert_eq!(border(5).left, EnumBorderStyle::Thin);
        assert_eq!(border(6).right, EnumBorderStyle::Thin);
    }

    #[test]
    fn test_single_row_span_is_skipped_with_warning() {
        let mut grid = SheetGrid::new();

        let report = commit_merges(
            &mut grid,
            "Sheet1",
            &[SpecRowSpan::new(3, 3), SpecRowSpan::new(4, 2)],
            &BTreeSet::from([0, 1]),
            &cell(3, 0),
            &SpecMergeOptions::default(),
        );

        assert_eq!(report.cnt_spans, 2);
        assert_eq!(report.cnt_skipped, 2);
        assert_eq!(report.warning_count(), 2);
        assert!(grid.merged_regions().is_empty());
        assert_eq!(grid.mutation_count(), 0);
    }

    #[test]
    fn test_every_span_is_merged_for_every_column() {
        let mut grid = SheetGrid::new();
        let merge_options = SpecMergeOptions {
            border_fallback: EnumBorderStyle::Medium,
        };

        let report = commit_merges(
            &mut grid,
            "Sheet1",
            &[SpecRowSpan::new(2, 4), SpecRowSpan::new(6, 7)],
            &BTreeSet::from([0, 1]),
            &cell(6, 0),
            &merge_options,
        );

        assert_eq!(report.cnt_merged, 4);
        let l_regions: Vec<(usize, usize, usize)> = grid
            .merged_regions()
            .iter()
            .map(|region| (region.row_first, region.row_last, region.col_first))
            .collect();
        assert_eq!(l_regions, vec![(2, 4, 0), (2, 4, 1), (6, 7, 0), (6, 7, 1)]);
        assert_eq!(
            grid.get_cell_border("Sheet1", 2, 1).expect("cell").top,
            EnumBorderStyle::Medium
        );
    }
}
