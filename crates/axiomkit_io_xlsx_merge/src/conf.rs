//! Merge-engine constants and default preset factories.

use crate::spec::{EnumBorderStyle, SpecMergeOptions};

/// Template command name of a plain vertical repeat.
pub const COMMAND_NAME_EACH: &str = "each";
/// Template command name of a repeat that merges its parent cells.
pub const COMMAND_NAME_EACH_MERGE: &str = "each-merge";

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;

/// Border painted around a merged region whose style source is vacant.
pub const ENUM_BORDER_FALLBACK: EnumBorderStyle = EnumBorderStyle::Thin;

/// Build default merge options.
pub fn derive_default_merge_options() -> SpecMergeOptions {
    SpecMergeOptions::default()
}
