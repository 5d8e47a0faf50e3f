//! Stateless geometry helpers: column-set arithmetic and cell naming.

use std::collections::BTreeSet;

use crate::spec::SpecRegion;

////////////////////////////////////////////////////////////////////////////////
// #region ColumnSetArithmetic

/// Inclusive column range of `region` as a set.
pub fn derive_region_columns(region: &SpecRegion) -> BTreeSet<usize> {
    (region.col_first..=region.col_last).collect()
}

/// Union of column sets.
pub fn union_columns<'a, I>(sets: I) -> BTreeSet<usize>
where
    I: IntoIterator<Item = &'a BTreeSet<usize>>,
{
    let mut set_union = BTreeSet::new();
    for set_cols in sets {
        set_union.extend(set_cols.iter().copied());
    }
    set_union
}

/// Columns in `a` that are not in `b`.
pub fn difference_columns(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> BTreeSet<usize> {
    a.difference(b).copied().collect()
}

/// Convert sorted indices to contiguous inclusive ranges.
pub fn derive_contiguous_ranges(sorted_indices: &[usize]) -> Vec<(usize, usize)> {
    let Some((&n_idx_first, l_rest)) = sorted_indices.split_first() else {
        return vec![];
    };

    let mut l_contiguous_ranges = Vec::new();
    let mut n_idx_start = n_idx_first;
    let mut n_idx_end = n_idx_first;

    for idx in l_rest {
        if *idx == n_idx_end + 1 {
            n_idx_end = *idx;
        } else {
            l_contiguous_ranges.push((n_idx_start, n_idx_end));
            n_idx_start = *idx;
            n_idx_end = *idx;
        }
    }

    l_contiguous_ranges.push((n_idx_start, n_idx_end));
    l_contiguous_ranges
}

/// Compact text form of a column set for log output, e.g. `A:B,E`.
pub fn format_column_set(columns: &BTreeSet<usize>) -> String {
    let l_cols: Vec<usize> = columns.iter().copied().collect();
    derive_contiguous_ranges(&l_cols)
        .into_iter()
        .map(|(n_start, n_end)| {
            if n_start == n_end {
                derive_column_name(n_start)
            } else {
                format!(
                    "{}:{}",
                    derive_column_name(n_start),
                    derive_column_name(n_end)
                )
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellNaming

/// Zero-based column index to letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_name(col_idx: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col_idx + 1;
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push(char::from(b'A' + n_rem as u8));
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// Zero-based coordinates to A1 notation.
pub fn derive_cell_name(row_idx: usize, col_idx: usize) -> String {
    format!("{}{}", derive_column_name(col_idx), row_idx + 1)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
