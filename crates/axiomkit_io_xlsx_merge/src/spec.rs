//! Shared merge-engine specification models and the crate error type.

use std::fmt;

use thiserror::Error;

use crate::conf::{COMMAND_NAME_EACH, COMMAND_NAME_EACH_MERGE, ENUM_BORDER_FALLBACK};
use crate::util::derive_cell_name;

////////////////////////////////////////////////////////////////////////////////
// #region GeometrySpecification

/// Rectangular sheet-bound area. Rows and columns are zero-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecRegion {
    /// Owning sheet name.
    pub sheet: String,
    /// First row index.
    pub row_first: usize,
    /// Last row index.
    pub row_last: usize,
    /// First column index.
    pub col_first: usize,
    /// Last column index.
    pub col_last: usize,
}

impl SpecRegion {
    /// Build a validated region.
    pub fn new(
        sheet: impl Into<String>,
        row_first: usize,
        row_last: usize,
        col_first: usize,
        col_last: usize,
    ) -> Result<Self, XlsxMergeError> {
        let region = Self {
            sheet: sheet.into(),
            row_first,
            row_last,
            col_first,
            col_last,
        };
        region.validate()?;
        Ok(region)
    }

    /// Reject inverted bounds.
    pub fn validate(&self) -> Result<(), XlsxMergeError> {
        if self.row_first > self.row_last || self.col_first > self.col_last {
            return Err(XlsxMergeError::InvalidRegion {
                region: self.to_string(),
            });
        }
        Ok(())
    }

    /// Number of rows covered.
    pub fn height(&self) -> usize {
        self.row_last.saturating_sub(self.row_first) + 1
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.col_last.saturating_sub(self.col_first) + 1
    }

    /// Whether `cell` lies inside this region (same sheet).
    pub fn contains(&self, cell: &SpecCellAddress) -> bool {
        self.sheet == cell.sheet
            && (self.row_first..=self.row_last).contains(&cell.row)
            && (self.col_first..=self.col_last).contains(&cell.col)
    }
}

impl fmt::Display for SpecRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}:{}",
            self.sheet,
            derive_cell_name(self.row_first, self.col_first),
            derive_cell_name(self.row_last, self.col_last)
        )
    }
}

/// Single cell coordinate bound to a sheet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellAddress {
    /// Owning sheet name.
    pub sheet: String,
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column index.
    pub col: usize,
}

impl SpecCellAddress {
    /// Build a cell address.
    pub fn new(sheet: impl Into<String>, row: usize, col: usize) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            col,
        }
    }
}

impl fmt::Display for SpecCellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, derive_cell_name(self.row, self.col))
    }
}

/// Inclusive row range to merge within one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecRowSpan {
    /// First row of the merged cell.
    pub row_from: usize,
    /// Last row of the merged cell.
    pub row_to: usize,
}

impl SpecRowSpan {
    /// Build a span.
    pub fn new(row_from: usize, row_to: usize) -> Self {
        Self { row_from, row_to }
    }
}

impl fmt::Display for SpecRowSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.row_from, self.row_to)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellStyleSpecification

/// Border line style. Codes follow the xlsx writer numbering (`0..=13`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EnumBorderStyle {
    /// No border.
    #[default]
    None,
    /// Thin line.
    Thin,
    /// Medium line.
    Medium,
    /// Dashed line.
    Dashed,
    /// Dotted line.
    Dotted,
    /// Thick line.
    Thick,
    /// Double line.
    Double,
    /// Hairline.
    Hair,
    /// Medium dashed line.
    MediumDashed,
    /// Dash-dot line.
    DashDot,
    /// Medium dash-dot line.
    MediumDashDot,
    /// Dash-dot-dot line.
    DashDotDot,
    /// Medium dash-dot-dot line.
    MediumDashDotDot,
    /// Slanted dash-dot line.
    SlantDashDot,
}

impl EnumBorderStyle {
    /// Integer code of this style.
    pub fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Thin => 1,
            Self::Medium => 2,
            Self::Dashed => 3,
            Self::Dotted => 4,
            Self::Thick => 5,
            Self::Double => 6,
            Self::Hair => 7,
            Self::MediumDashed => 8,
            Self::DashDot => 9,
            Self::MediumDashDot => 10,
            Self::DashDotDot => 11,
            Self::MediumDashDotDot => 12,
            Self::SlantDashDot => 13,
        }
    }

    /// Style for an integer code; unknown codes map to [`EnumBorderStyle::None`].
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Thin,
            2 => Self::Medium,
            3 => Self::Dashed,
            4 => Self::Dotted,
            5 => Self::Thick,
            6 => Self::Double,
            7 => Self::Hair,
            8 => Self::MediumDashed,
            9 => Self::DashDot,
            10 => Self::MediumDashDot,
            11 => Self::DashDotDot,
            12 => Self::MediumDashDotDot,
            13 => Self::SlantDashDot,
            _ => Self::None,
        }
    }
}

/// One side of a cell or region perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumBorderSide {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

impl EnumBorderSide {
    /// All sides in painting order.
    pub const ALL: [EnumBorderSide; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];
}

/// Per-side cell border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpecCellBorder {
    /// Top border style.
    pub top: EnumBorderStyle,
    /// Right border style.
    pub right: EnumBorderStyle,
    /// Bottom border style.
    pub bottom: EnumBorderStyle,
    /// Left border style.
    pub left: EnumBorderStyle,
}

impl SpecCellBorder {
    /// Same style on all four sides.
    pub fn uniform(style: EnumBorderStyle) -> Self {
        Self {
            top: style,
            right: style,
            bottom: style,
            left: style,
        }
    }

    /// Style of one side.
    pub fn get(&self, side: EnumBorderSide) -> EnumBorderStyle {
        match side {
            EnumBorderSide::Top => self.top,
            EnumBorderSide::Right => self.right,
            EnumBorderSide::Bottom => self.bottom,
            EnumBorderSide::Left => self.left,
        }
    }

    /// Overwrite one side.
    pub fn set(&mut self, side: EnumBorderSide, style: EnumBorderStyle) {
        match side {
            EnumBorderSide::Top => self.top = style,
            EnumBorderSide::Right => self.right = style,
            EnumBorderSide::Bottom => self.bottom = style,
            EnumBorderSide::Left => self.left = style,
        }
    }
}

/// Value stored in a materialized cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TemplateSpecification

/// Content of one template cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCellContent {
    /// Copied verbatim.
    Literal(String),
    /// Dotted variable path resolved against the render context, e.g. `row.name`.
    Field(String),
}

/// Static template cell owned by one area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTemplateCell {
    /// Template row index.
    pub row: usize,
    /// Template column index.
    pub col: usize,
    /// Cell content.
    pub content: EnumCellContent,
    /// Border copied onto every materialized cell.
    pub border: SpecCellBorder,
}

impl SpecTemplateCell {
    /// Literal text cell without borders.
    pub fn literal(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            content: EnumCellContent::Literal(text.into()),
            border: SpecCellBorder::default(),
        }
    }

    /// Variable-path cell without borders.
    pub fn field(row: usize, col: usize, path: impl Into<String>) -> Self {
        Self {
            row,
            col,
            content: EnumCellContent::Field(path.into()),
            border: SpecCellBorder::default(),
        }
    }

    /// Return the same cell with `border`.
    pub fn with_border(mut self, border: SpecCellBorder) -> Self {
        self.border = border;
        self
    }
}

/// Listener behavior attached to an `each` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnumEachMode {
    /// Plain repeat.
    #[default]
    Plain,
    /// Attach the listener bound to this context variable name (if any).
    Listener(Option<String>),
    /// Build a span tracker over the nested commands and merge parent cells.
    Merge,
}

impl EnumEachMode {
    /// Template command name this mode is declared with.
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Merge => COMMAND_NAME_EACH_MERGE,
            Self::Plain | Self::Listener(_) => COMMAND_NAME_EACH,
        }
    }
}

/// Vertical repeat command: renders `area` once per element of `items`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecEachCommand {
    /// Loop variable name bound to the current element.
    pub var: String,
    /// Variable path of the list to iterate.
    pub items: String,
    /// Repeated area.
    pub area: SpecTemplateArea,
    /// Listener behavior.
    pub mode: EnumEachMode,
}

impl SpecEachCommand {
    /// Build a plain command.
    pub fn new(var: impl Into<String>, items: impl Into<String>, area: SpecTemplateArea) -> Self {
        Self {
            var: var.into(),
            items: items.into(),
            area,
            mode: EnumEachMode::Plain,
        }
    }

    /// Return the same command with `mode`.
    pub fn with_mode(mut self, mode: EnumEachMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Template area: a region with static cells and nested commands.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTemplateArea {
    /// Template geometry.
    pub region: SpecRegion,
    /// Static cells (not owned by any nested command).
    pub cells: Vec<SpecTemplateCell>,
    /// Directly nested commands.
    pub commands: Vec<SpecEachCommand>,
}

impl SpecTemplateArea {
    /// Area without content.
    pub fn new(region: SpecRegion) -> Self {
        Self {
            region,
            cells: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Return the same area with one more static cell.
    pub fn with_cell(mut self, cell: SpecTemplateCell) -> Self {
        self.cells.push(cell);
        self
    }

    /// Return the same area with one more nested command.
    pub fn with_command(mut self, command: SpecEachCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Regions of every command area nested under this one, depth-first pre-order.
    pub fn descendant_regions(&self) -> Vec<SpecRegion> {
        let mut l_regions = Vec::new();
        for command in &self.commands {
            l_regions.push(command.area.region.clone());
            l_regions.extend(command.area.descendant_regions());
        }
        l_regions
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionsSpecification

/// Merge executor options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecMergeOptions {
    /// Border painted on all four sides when the style-source cell is vacant.
    pub border_fallback: EnumBorderStyle,
}

impl Default for SpecMergeOptions {
    fn default() -> Self {
        Self {
            border_fallback: ENUM_BORDER_FALLBACK,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Configuration errors. Any of these aborts the render.
#[derive(Debug, Error)]
pub enum XlsxMergeError {
    /// Region with first bound after last bound.
    #[error("Invalid region {region}: first bound exceeds last bound.")]
    InvalidRegion {
        /// Offending region in A1 notation.
        region: String,
    },
    /// The parent anchor column lies inside a child region.
    #[error("Parent anchor column {col} is claimed by a child region.")]
    AnchorColumnClaimed {
        /// Parent anchor column index.
        col: usize,
    },
    /// Listener name has no binding.
    #[error("The listener attribute value '{name}' is not bound in the render context.")]
    ListenerNotFound {
        /// Listener variable name.
        name: String,
    },
    /// Listener name is bound to something that is not a listener.
    #[error(
        "The listener attribute value '{name}' should be set to an area listener, found {found}."
    )]
    ListenerTypeMismatch {
        /// Listener variable name.
        name: String,
        /// Kind of the bound value.
        found: &'static str,
    },
    /// Items path has no binding.
    #[error("Items variable '{name}' is not bound in the render context.")]
    ItemsNotFound {
        /// Items variable path.
        name: String,
    },
    /// Items path is bound to something that is not a list.
    #[error("Items variable '{name}' should be a list, found {found}.")]
    ItemsNotList {
        /// Items variable path.
        name: String,
        /// Kind of the bound value.
        found: &'static str,
    },
    /// Text could not be parsed as an integer.
    #[error("Cannot convert {text:?} to an integer.")]
    InvalidInteger {
        /// Input text.
        text: String,
    },
    /// Row/column index does not fit the xlsx writer types.
    #[error("{axis} index overflow: {value}")]
    IndexOverflow {
        /// `row` or `column`.
        axis: &'static str,
        /// Offending index.
        value: usize,
    },
    /// Error raised by the xlsx writer.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_rejects_inverted_bounds() {
        let err = SpecRegion::new("Sheet1", 3, 2, 0, 1).expect_err("rows inverted");
        assert!(matches!(err, XlsxMergeError::InvalidRegion { .. }));
        assert!(SpecRegion::new("Sheet1", 0, 0, 2, 1).is_err());
        assert!(SpecRegion::new("Sheet1", 2, 2, 0, 3).is_ok());
    }

    #[test]
    fn test_region_contains_checks_sheet_and_bounds() {
        let region = SpecRegion::new("Sheet1", 2, 4, 1, 2).expect("region");
        assert!(region.contains(&SpecCellAddress::new("Sheet1", 3, 2)));
        assert!(!region.contains(&SpecCellAddress::new("Sheet1", 5, 2)));
        assert!(!region.contains(&SpecCellAddress::new("Sheet1", 3, 0)));
        assert!(!region.contains(&SpecCellAddress::new("Sheet2", 3, 2)));
        assert_eq!((region.height(), region.width()), (3, 2));
    }

    #[test]
    fn test_region_display_uses_a1_notation() {
        let region = SpecRegion::new("Sheet2", 2, 2, 0, 3).expect("region");
        assert_eq!(region.to_string(), "Sheet2!A3:D3");
        assert_eq!(SpecCellAddress::new("Sheet2", 2, 2).to_string(), "Sheet2!C3");
    }

    #[test]
    fn test_border_code_mapping_is_symmetric() {
        for code in 0..=13 {
            assert_eq!(EnumBorderStyle::from_code(code).code(), code);
        }
        assert_eq!(EnumBorderStyle::from_code(99), EnumBorderStyle::None);
    }

    #[test]
    fn test_descendant_regions_walks_full_tree() {
        let region = |c0, c1| SpecRegion::new("Sheet1", 0, 0, c0, c1).expect("region");
        let area_grandchild = SpecTemplateArea::new(region(3, 4));
        let area_child = SpecTemplateArea::new(region(2, 3))
            .with_command(SpecEachCommand::new("g", "c.items", area_grandchild));
        let area_parent = SpecTemplateArea::new(region(0, 4))
            .with_command(SpecEachCommand::new("c", "p.items", area_child));

        assert_eq!(
            area_parent.descendant_regions(),
            vec![region(2, 3), region(3, 4)]
        );
    }
}
