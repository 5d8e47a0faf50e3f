//! Span trackers: infer parent merge ranges from the materialization stream.
//!
//! A parent item's final height is unknown until its descendants are rendered.
//! The expander reports every descendant cell of an item before the item's own
//! anchor cell, so on the anchor event the tracker knows how far down the
//! descendants reached since the previous anchor. A parent anchor row strictly
//! above that reach means the item occupies several rows and gets one span.

use std::collections::BTreeSet;

use crate::document::SheetDocument;
use crate::listener::AreaListener;
use crate::merge::commit_merges;
use crate::report::ReportMerge;
use crate::spec::{SpecCellAddress, SpecMergeOptions, SpecRegion, SpecRowSpan, XlsxMergeError};
use crate::util::{
    derive_region_columns, difference_columns, format_column_set, union_columns,
};

////////////////////////////////////////////////////////////////////////////////
// #region SpanTracker

/// Tracker over one parent region and any number of descendant regions.
///
/// Columns of grandchildren are absorbed into the child column set, so deeper
/// nesting needs no special handling.
#[derive(Debug)]
pub struct SpanTracker {
    col_parent: usize,
    set_cols_child: BTreeSet<usize>,
    set_cols_merge: BTreeSet<usize>,
    n_parents_expected: usize,
    n_parents_observed: usize,
    n_row_child_max: usize,
    l_spans_pending: Vec<SpecRowSpan>,
    c_sheet_name: Option<String>,
    merge_options: SpecMergeOptions,
    report_last: Option<ReportMerge>,
}

impl SpanTracker {
    /// Build a tracker for `region_parent` watching `regions_child`.
    ///
    /// The parent anchor column is the parent region's first column; merge columns
    /// are the parent columns not covered by any child region.
    pub fn new(
        region_parent: &SpecRegion,
        regions_child: &[SpecRegion],
        n_parents_expected: usize,
    ) -> Result<Self, XlsxMergeError> {
        region_parent.validate()?;
        for region_child in regions_child {
            region_child.validate()?;
        }

        let l_sets_child: Vec<BTreeSet<usize>> =
            regions_child.iter().map(derive_region_columns).collect();
        let set_cols_child = union_columns(&l_sets_child);
        let set_cols_merge =
            difference_columns(&derive_region_columns(region_parent), &set_cols_child);

        log::debug!(
            "parent={region_parent}, parent_col={}, child_cols={}, merge_cols={}",
            region_parent.col_first,
            format_column_set(&set_cols_child),
            format_column_set(&set_cols_merge)
        );

        Self::from_columns(
            region_parent.col_first,
            set_cols_child,
            set_cols_merge,
            n_parents_expected,
        )
    }

    fn from_columns(
        col_parent: usize,
        set_cols_child: BTreeSet<usize>,
        set_cols_merge: BTreeSet<usize>,
        n_parents_expected: usize,
    ) -> Result<Self, XlsxMergeError> {
        if set_cols_child.contains(&col_parent) {
            return Err(XlsxMergeError::AnchorColumnClaimed { col: col_parent });
        }
        Ok(Self {
            col_parent,
            set_cols_child,
            set_cols_merge,
            n_parents_expected,
            n_parents_observed: 0,
            n_row_child_max: 0,
            l_spans_pending: Vec::new(),
            c_sheet_name: None,
            merge_options: SpecMergeOptions::default(),
            report_last: None,
        })
    }

    /// Return the same tracker with `merge_options`.
    pub fn with_merge_options(mut self, merge_options: SpecMergeOptions) -> Self {
        self.merge_options = merge_options;
        self
    }

    /// Start a new lifecycle expecting `n_parents_expected` parent items.
    ///
    /// Geometry is kept; counters, pending spans, captured sheet and last report are cleared.
    pub fn restart(&mut self, n_parents_expected: usize) {
        self.n_parents_expected = n_parents_expected;
        self.n_parents_observed = 0;
        self.n_row_child_max = 0;
        self.l_spans_pending.clear();
        self.c_sheet_name = None;
        self.report_last = None;
    }

    /// Consume one materialized cell.
    ///
    /// The merge commit happens inside the call that observes the last expected
    /// parent anchor, using that anchor as the style source.
    pub fn on_cell_materialized(&mut self, cell: &SpecCellAddress, doc: &mut dyn SheetDocument) {
        if self.c_sheet_name.is_none() {
            self.c_sheet_name = Some(cell.sheet.clone());
        }

        if self.set_cols_child.contains(&cell.col) {
            self.n_row_child_max = usize::max(self.n_row_child_max, cell.row);
            log::debug!("child: cell={cell}, row_child_max={}", self.n_row_child_max);
            return;
        }
        if cell.col != self.col_parent {
            return;
        }

        if self.n_parents_observed >= self.n_parents_expected {
            log::warn!(
                "Ignored parent cell {cell}: all {} parent items already observed.",
                self.n_parents_expected
            );
            return;
        }

        log::debug!("parent: cell={cell}, row_child_max={}", self.n_row_child_max);
        // A single-row item leaves the child reach on (or above) its own row.
        if cell.row < self.n_row_child_max {
            self.l_spans_pending
                .push(SpecRowSpan::new(cell.row, self.n_row_child_max));
        }
        self.n_parents_observed += 1;

        if self.n_parents_observed == self.n_parents_expected {
            let c_sheet_name = self
                .c_sheet_name
                .clone()
                .unwrap_or_else(|| cell.sheet.clone());
            let report = commit_merges(
                doc,
                &c_sheet_name,
                &self.l_spans_pending,
                &self.set_cols_merge,
                cell,
                &self.merge_options,
            );
            log::debug!("{report}");
            self.report_last = Some(report);
        }
        self.n_row_child_max = 0;
    }

    /// Parent anchor column.
    pub fn parent_column(&self) -> usize {
        self.col_parent
    }

    /// Columns claimed by descendant regions.
    pub fn child_columns(&self) -> &BTreeSet<usize> {
        &self.set_cols_child
    }

    /// Columns that get merged.
    pub fn merge_columns(&self) -> &BTreeSet<usize> {
        &self.set_cols_merge
    }

    /// Spans collected in the current lifecycle.
    pub fn pending_spans(&self) -> &[SpecRowSpan] {
        &self.l_spans_pending
    }

    /// Parent items expected in the current lifecycle.
    pub fn expected_parent_count(&self) -> usize {
        self.n_parents_expected
    }

    /// Parent anchor events seen in the current lifecycle.
    pub fn observed_parent_count(&self) -> usize {
        self.n_parents_observed
    }

    /// Sheet captured from the first event of the current lifecycle.
    pub fn sheet_name(&self) -> Option<&str> {
        self.c_sheet_name.as_deref()
    }

    /// Whether the current lifecycle has committed its merges.
    pub fn is_committed(&self) -> bool {
        self.report_last.is_some()
    }

    /// Report of the current lifecycle's commit.
    pub fn last_report(&self) -> Option<&ReportMerge> {
        self.report_last.as_ref()
    }
}

impl AreaListener for SpanTracker {
    fn after_transform_cell(
        &mut self,
        _src: &SpecCellAddress,
        target: &SpecCellAddress,
        doc: &mut dyn SheetDocument,
    ) -> Result<(), XlsxMergeError> {
        self.on_cell_materialized(target, doc);
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SimpleSpanTracker

/// One-level tracker fixed to one parent column, one child column and an
/// explicit set of merge columns.
#[derive(Debug)]
pub struct SimpleSpanTracker {
    tracker: SpanTracker,
}

impl SimpleSpanTracker {
    /// Build a tracker watching `col_parent` and `col_child`.
    pub fn new(
        col_parent: usize,
        col_child: usize,
        cols_merge: BTreeSet<usize>,
        n_parents_expected: usize,
    ) -> Result<Self, XlsxMergeError> {
        let tracker = SpanTracker::from_columns(
            col_parent,
            BTreeSet::from([col_child]),
            cols_merge,
            n_parents_expected,
        )?;
        Ok(Self { tracker })
    }

    /// Set the expected parent item count and start a new lifecycle.
    pub fn set_parent_count(&mut self, n_parents_expected: usize) {
        self.tracker.restart(n_parents_expected);
    }

    /// See [`SpanTracker::on_cell_materialized`].
    pub fn on_cell_materialized(&mut self, cell: &SpecCellAddress, doc: &mut dyn SheetDocument) {
        self.tracker.on_cell_materialized(cell, doc);
    }

    /// Underlying tracker state.
    pub fn tracker(&self) -> &SpanTracker {
        &self.tracker
    }
}

impl AreaListener for SimpleSpanTracker {
    fn after_transform_cell(
        &mut self,
        _src: &SpecCellAddress,
        target: &SpecCellAddress,
        doc: &mut dyn SheetDocument,
    ) -> Result<(), XlsxMergeError> {
        self.tracker.on_cell_materialized(target, doc);
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
