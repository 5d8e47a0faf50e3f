//! Document-model boundary and the in-memory sheet grid.

use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{
    EnumBorderSide, EnumBorderStyle, EnumCellValue, SpecCellAddress, SpecCellBorder, SpecRegion,
};

/// Spreadsheet document operations the merge engine and the template expander rely on.
///
/// Implementations are mutated in place by a single rendering thread.
pub trait SheetDocument {
    /// Record a merged region.
    fn add_merged_region(
        &mut self,
        sheet: &str,
        row_from: usize,
        row_to: usize,
        col_from: usize,
        col_to: usize,
    );

    /// Border of the cell at `(row, col)`, or `None` when the grid has no cell there.
    fn get_cell_border(&self, sheet: &str, row: usize, col: usize) -> Option<SpecCellBorder>;

    /// Paint one side of `region`'s perimeter.
    fn set_region_border(&mut self, side: EnumBorderSide, style: EnumBorderStyle, region: &SpecRegion);

    /// Store a materialized cell, replacing any previous content.
    fn write_cell(&mut self, cell: &SpecCellAddress, value: EnumCellValue, border: SpecCellBorder);
}

/// One stored cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecGridCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Cell border.
    pub border: SpecCellBorder,
}

/// Ordered in-memory [`SheetDocument`].
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    dict_cells: BTreeMap<(String, usize, usize), SpecGridCell>,
    l_merged_regions: Vec<SpecRegion>,
    cnt_mutations: u64,
}

impl SheetGrid {
    /// Empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored cell, if any.
    pub fn cell(&self, sheet: &str, row: usize, col: usize) -> Option<&SpecGridCell> {
        self.dict_cells.get(&(sheet.to_string(), row, col))
    }

    /// Cells of `sheet` in row-major order.
    pub fn cells_in<'a>(
        &'a self,
        sheet: &'a str,
    ) -> impl Iterator<Item = (usize, usize, &'a SpecGridCell)> + 'a {
        self.dict_cells
            .iter()
            .filter(move |((c_sheet, _, _), _)| c_sheet == sheet)
            .map(|((_, row, col), cell)| (*row, *col, cell))
    }

    /// Every merged region in insertion order.
    pub fn merged_regions(&self) -> &[SpecRegion] {
        &self.l_merged_regions
    }

    /// Merged regions of `sheet` in insertion order.
    pub fn merged_regions_in<'a>(&'a self, sheet: &'a str) -> impl Iterator<Item = &'a SpecRegion> {
        self.l_merged_regions
            .iter()
            .filter(move |region| region.sheet == sheet)
    }

    /// Cells of `sheet` covered by a merged region other than the region's anchor.
    pub fn merge_covered_cells(&self, sheet: &str) -> BTreeSet<(usize, usize)> {
        let mut set_covered = BTreeSet::new();
        for region in self.merged_regions_in(sheet) {
            for n_row in region.row_first..=region.row_last {
                for n_col in region.col_first..=region.col_last {
                    if (n_row, n_col) != (region.row_first, region.col_first) {
                        set_covered.insert((n_row, n_col));
                    }
                }
            }
        }
        set_covered
    }

    /// Names of sheets that hold at least one cell or merged region.
    pub fn sheet_names(&self) -> BTreeSet<String> {
        self.dict_cells
            .keys()
            .map(|(sheet, _, _)| sheet.clone())
            .chain(self.l_merged_regions.iter().map(|region| region.sheet.clone()))
            .collect()
    }

    /// Number of mutating calls received so far.
    pub fn mutation_count(&self) -> u64 {
        self.cnt_mutations
    }

    fn entry(&mut self, sheet: &str, row: usize, col: usize) -> &mut SpecGridCell {
        self.dict_cells
            .entry((sheet.to_string(), row, col))
            .or_default()
    }
}

impl SheetDocument for SheetGrid {
    fn add_merged_region(
        &mut self,
        sheet: &str,
        row_from: usize,
        row_to: usize,
        col_from: usize,
        col_to: usize,
    ) {
        self.cnt_mutations += 1;
        self.l_merged_regions.push(SpecRegion {
            sheet: sheet.to_string(),
            row_first: row_from,
            row_last: row_to,
            col_first: col_from,
            col_last: col_to,
        });
    }

    fn get_cell_border(&self, sheet: &str, row: usize, col: usize) -> Option<SpecCellBorder> {
        self.cell(sheet, row, col).map(|cell| cell.border)
    }

    // Top/bottom paint every cell of the first/last row; left/right paint the
    // first/last column of every row. Missing cells are created blank.
    fn set_region_border(&mut self, side: EnumBorderSide, style: EnumBorderStyle, region: &SpecRegion) {
        self.cnt_mutations += 1;
        match side {
            EnumBorderSide::Top | EnumBorderSide::Bottom => {
                let n_row = if side == EnumBorderSide::Top {
                    region.row_first
                } else {
                    region.row_last
                };
                for n_col in region.col_first..=region.col_last {
                    self.entry(&region.sheet, n_row, n_col).border.set(side, style);
                }
            }
            EnumBorderSide::Left | EnumBorderSide::Right => {
                let n_col = if side == EnumBorderSide::Left {
                    region.col_first
                } else {
                    region.col_last
                };
                for n_row in region.row_first..=region.row_last {
                    self.entry(&region.sheet, n_row, n_col).border.set(side, style);
                }
            }
        }
    }

    fn write_cell(&mut self, cell: &SpecCellAddress, value: EnumCellValue, border: SpecCellBorder) {
        self.cnt_mutations += 1;
        self.dict_cells.insert(
            (cell.sheet.clone(), cell.row, cell.col),
            SpecGridCell { value, border },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_region_border_paints_perimeter_only() {
        let mut grid = SheetGrid::new();
        let region = SpecRegion::new("Sheet1", 1, 3, 0, 1).expect("region");

        grid.set_region_border(EnumBorderSide::Top, EnumBorderStyle::Thick, &region);
        grid.set_region_border(EnumBorderSide::Bottom, EnumBorderStyle::Double, &region);
        grid.set_region_border(EnumBorderSide::Left, EnumBorderStyle::Thin, &region);
        grid.set_region_border(EnumBorderSide::Right, EnumBorderStyle::Medium, &region);

        let border = |row, col| grid.get_cell_border("Sheet1", row, col).expect("cell");
        assert_eq!(border(1, 0).top, EnumBorderStyle::Thick);
        assert_eq!(border(1, 1).top, EnumBorderStyle::Thick);
        assert_eq!(border(3, 0).bottom, EnumBorderStyle::Double);
        assert_eq!(border(3, 1).bottom, EnumBorderStyle::Double);
        assert_eq!(border(2, 0).left, EnumBorderStyle::Thin);
        assert_eq!(border(2, 1).right, EnumBorderStyle::Medium);

        assert_eq!(border(2, 0).top, EnumBorderStyle::None);
        assert_eq!(border(2, 1).left, EnumBorderStyle::None);
        assert_eq!(grid.get_cell_border("Sheet1", 0, 0), None);
        assert_eq!(grid.mutation_count(), 4);
    }

    #[test]
    fn test_merge_covered_excludes_anchor() {
        let mut grid = SheetGrid::new();
        grid.add_merged_region("Sheet1", 2, 4, 0, 0);
        grid.add_merged_region("Sheet1", 6, 7, 1, 2);
        grid.add_merged_region("Other", 3, 4, 0, 0);

        assert_eq!(
            grid.merge_covered_cells("Sheet1"),
            BTreeSet::from([(3, 0), (4, 0), (6, 2), (7, 1), (7, 2)])
        );
        assert_eq!(grid.merge_covered_cells("Other"), BTreeSet::from([(4, 0)]));
        assert!(grid.merge_covered_cells("Missing").is_empty());
        assert_eq!(grid.merged_regions_in("Sheet1").count(), 2);
    }
}
