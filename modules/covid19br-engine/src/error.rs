use chrono::NaiveDate;
use covid19br_common::{ReportError, State};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The bulletin's (state, date) is outside what this crawl asked for.
    #[error("no report was requested for {state} on {date}")]
    UnrequestedReport { state: State, date: NaiveDate },
}
