//! `axiomkit_io_xlsx_merge` v1:
//! Vertical merge kernel for nested repeating template regions.
//!
//! Modules:
//! - `conf`     : constants and default presets
//! - `spec`     : regions, template model, options, errors
//! - `util`     : pure column and naming helpers
//! - `report`   : merge commit report
//! - `document` : sheet document seam and in-memory grid
//! - `listener` : area listener trait and per-render registration
//! - `tracker`  : span tracker observing materialized cells
//! - `merge`    : merge commit against a document
//! - `context`  : render-time variable bindings
//! - `render`   : depth-first `each` expander
//! - `writer`   : grid replay onto `rust_xlsxwriter`
//! - `func`     : stateless expression helpers
pub mod conf;
pub mod context;
pub mod document;
pub mod func;
pub mod listener;
pub mod merge;
pub mod render;
pub mod report;
pub mod spec;
pub mod tracker;
pub mod util;
pub mod writer;

pub use conf::{
    COMMAND_NAME_EACH, COMMAND_NAME_EACH_MERGE, ENUM_BORDER_FALLBACK, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, derive_default_merge_options,
};
pub use context::{EnumContextValue, RenderContext};
pub use document::{SheetDocument, SheetGrid, SpecGridCell};
pub use listener::{
    AreaListener, RenderSession, SharedAreaListener, register_external_listener,
    register_merge_tracker,
};
pub use merge::commit_merges;
pub use render::render_template;
pub use report::ReportMerge;
pub use spec::{
    EnumBorderSide, EnumBorderStyle, EnumCellContent, EnumCellValue, EnumEachMode,
    SpecCellAddress, SpecCellBorder, SpecEachCommand, SpecMergeOptions, SpecRegion, SpecRowSpan,
    SpecTemplateArea, SpecTemplateCell, XlsxMergeError,
};
pub use tracker::{SimpleSpanTracker, SpanTracker};
pub use util::{
    derive_cell_name, derive_column_name, derive_contiguous_ranges, derive_region_columns,
    difference_columns, format_column_set, union_columns,
};
pub use writer::write_grid_to_worksheet;
