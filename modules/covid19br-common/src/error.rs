use chrono::NaiveDate;
use covid19br_world::State;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A bulletin field was malformed at construction time.
    #[error("Validation error on {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// An adapter tried to set the imported/undefined bulletin twice.
    #[error("undefined_or_imported_cases_bulletin was already set in the {state} report for {date}")]
    DuplicateBulletin { state: State, date: NaiveDate },

    /// Totals did not match what the source itself published.
    #[error("Bad report: {0}")]
    BadReport(String),
}

impl ReportError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ReportError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Data-quality failures are expected during a crawl; callers flag the
    /// report instead of aborting the run.
    pub fn is_data_quality(&self) -> bool {
        matches!(self, ReportError::BadReport(_))
    }
}
