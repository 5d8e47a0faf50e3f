//! Merge commit report model.

use std::collections::BTreeMap;
use std::fmt;

/// Counters and diagnostics for one merge commit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportMerge {
    /// Spans handed to the executor.
    pub cnt_spans: u64,
    /// Merged-region records written.
    pub cnt_merged: u64,
    /// Spans skipped because they cover a single row (or less).
    pub cnt_skipped: u64,
    /// Merged regions painted with the fallback border.
    pub cnt_missing_style: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ReportMerge {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_spans".to_string(), self.cnt_spans);
        dict_counts.insert("cnt_merged".to_string(), self.cnt_merged);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_missing_style".to_string(), self.cnt_missing_style);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} spans={} merged={} skipped={} missing_style={} warnings={}",
            self.cnt_spans,
            self.cnt_merged,
            self.cnt_skipped,
            self.cnt_missing_style,
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MERGE]"))
    }
}

#[cfg(test)]
mod tests {
    use super::ReportMerge;

    #[test]
    fn report_merge_to_dict_and_format_agree() {
        let mut report = ReportMerge {
            cnt_spans: 3,
            cnt_merged: 4,
            cnt_skipped: 1,
            cnt_missing_style: 2,
            warnings: vec![],
        };
        report.warn("same row");

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_spans"], 3);
        assert_eq!(dict_counts["cnt_merged"], 4);
        assert_eq!(dict_counts["cnt_skipped"], 1);
        assert_eq!(dict_counts["cnt_missing_style"], 2);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[MERGE]");
        assert_eq!(
            txt,
            "[MERGE] spans=3 merged=4 skipped=1 missing_style=2 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }
}
