//! Access validation tracker (spec §3 "Access records", §4.5).
//!
//! Records one [`AccessRecord`] per atomic property/index access performed
//! while the interpreter is in `SAFE` mode. Disabled entirely in `SILENT`
//! mode and in `STRICT` mode (where a broken access raises instead), so the
//! common case of "tracking off" costs nothing: [`Tracker::Disabled`] never
//! allocates.

use serde::Serialize;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessStatus {
    Success,
    ValueNull,
    ValueEmpty,
    PathBroken,
    KeyNotFound,
    IndexOutOfBounds,
    ExpectedNull,
}

impl AccessStatus {
    /// `EXPECTED_NULL` is never an error — the template opted in with
    /// `?.`/`?[` (spec §4.5). The remaining broken-path statuses are.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::PathBroken | Self::KeyNotFound | Self::IndexOutOfBounds)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessRecord {
    pub full_path: String,
    pub status: AccessStatus,
    pub segment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub line: u32,
    pub safe: bool,
}

/// Either a live recorder or the zero-cost disabled variant (spec §4.5,
/// "can be globally disabled (no allocations in SILENT)").
pub enum Tracker {
    Disabled,
    Recording(Vec<AccessRecord>),
}

impl Tracker {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Self::Recording(Vec::new())
        } else {
            Self::Disabled
        }
    }

    pub fn record(
        &mut self,
        full_path: impl Into<String>,
        status: AccessStatus,
        segment: impl Into<String>,
        value: Option<&Value>,
        line: u32,
        safe: bool,
    ) {
        if let Self::Recording(records) = self {
            records.push(AccessRecord {
                full_path: full_path.into(),
                status,
                segment: segment.into(),
                value: value.map(Value::py_str),
                line,
                safe,
            });
        }
    }

    #[must_use]
    pub fn into_report(self) -> ValidationReport {
        match self {
            Self::Disabled => ValidationReport { records: Vec::new() },
            Self::Recording(records) => ValidationReport { records },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub records: Vec<AccessRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub successful: usize,
    pub path_errors: usize,
    pub key_not_found: usize,
    pub index_errors: usize,
    pub null_values: usize,
    pub empty_values: usize,
    pub expected_nulls: usize,
}

impl ValidationReport {
    #[must_use]
    pub fn by_status(&self, status: AccessStatus) -> Vec<&AccessRecord> {
        self.records.iter().filter(|r| r.status == status).collect()
    }

    /// Groups records by the segment at which a non-success access broke.
    #[must_use]
    pub fn group_by_segment(&self) -> indexmap::IndexMap<String, Vec<&AccessRecord>> {
        let mut groups: indexmap::IndexMap<String, Vec<&AccessRecord>> = indexmap::IndexMap::new();
        for record in &self.records {
            groups.entry(record.segment.clone()).or_default().push(record);
        }
        groups
    }

    #[must_use]
    pub fn group_by_line(&self) -> indexmap::IndexMap<u32, Vec<&AccessRecord>> {
        let mut groups: indexmap::IndexMap<u32, Vec<&AccessRecord>> = indexmap::IndexMap::new();
        for record in &self.records {
            groups.entry(record.line).or_default().push(record);
        }
        groups
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary { total: self.records.len(), ..Default::default() };
        for record in &self.records {
            match record.status {
                AccessStatus::Success => summary.successful += 1,
                AccessStatus::PathBroken => summary.path_errors += 1,
                AccessStatus::KeyNotFound => summary.key_not_found += 1,
                AccessStatus::IndexOutOfBounds => summary.index_errors += 1,
                AccessStatus::ValueNull => summary.null_values += 1,
                AccessStatus::ValueEmpty => summary.empty_values += 1,
                AccessStatus::ExpectedNull => summary.expected_nulls += 1,
            }
        }
        summary
    }

    #[must_use]
    pub fn has_any_errors(&self) -> bool {
        self.records.iter().any(|r| r.status.is_error())
    }

    #[must_use]
    pub fn has_path_errors(&self) -> bool {
        self.records.iter().any(|r| r.status == AccessStatus::PathBroken)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.has_any_errors()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_tracker_never_allocates_records() {
        let mut tracker = Tracker::new(false);
        tracker.record("INPUT.a", AccessStatus::Success, "a", None, 1, false);
        assert!(tracker.into_report().records.is_empty());
    }

    #[test]
    fn summary_counts_add_up() {
        let mut tracker = Tracker::new(true);
        tracker.record("INPUT.a", AccessStatus::Success, "a", None, 1, false);
        tracker.record("INPUT.b", AccessStatus::ExpectedNull, "b", None, 2, true);
        tracker.record("INPUT.c", AccessStatus::PathBroken, "c", None, 3, false);
        let report = tracker.into_report();
        let summary = report.summary();
        assert_eq!(
            summary.successful
                + summary.path_errors
                + summary.key_not_found
                + summary.index_errors
                + summary.null_values
                + summary.empty_values
                + summary.expected_nulls,
            summary.total
        );
        assert!(report.has_any_errors());
        assert!(report.has_path_errors());
    }

    #[test]
    fn expected_null_is_never_an_error() {
        assert!(!AccessStatus::ExpectedNull.is_error());
        assert!(AccessStatus::PathBroken.is_error());
    }
}
