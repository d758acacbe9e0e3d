//! What a running source sees of the crawl.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use covid19br_common::{Bulletin, State};
use tracing::warn;

use crate::error::CrawlError;
use crate::registry::ReportRegistry;

/// Totals a site published alongside its detailed data. Checked against the
/// consolidated report after every source has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedTotals {
    pub state: State,
    pub date: NaiveDate,
    pub confirmed_cases: Option<u64>,
    pub deaths: Option<u64>,
    /// Where the expectation was read from
    pub source: String,
}

impl ExpectedTotals {
    pub fn new(state: State, date: NaiveDate, source: impl Into<String>) -> Self {
        Self {
            state,
            date,
            confirmed_cases: None,
            deaths: None,
            source: source.into(),
        }
    }

    pub fn with_confirmed_cases(mut self, expected: u64) -> Self {
        self.confirmed_cases = Some(expected);
        self
    }

    pub fn with_deaths(mut self, expected: u64) -> Self {
        self.deaths = Some(expected);
        self
    }
}

/// Handle given to one source for the duration of its `collect`.
pub struct CrawlContext {
    source_name: String,
    registry: Arc<ReportRegistry>,
    requested_dates: Arc<[NaiveDate]>,
    expectations: Mutex<Vec<ExpectedTotals>>,
    admitted: AtomicU32,
    rejected: AtomicU32,
}

/// What a source left behind once `collect` returned.
#[derive(Debug, Default)]
pub(crate) struct SourceTally {
    pub admitted: u32,
    pub rejected: u32,
    pub expectations: Vec<ExpectedTotals>,
}

impl CrawlContext {
    pub(crate) fn new(
        source_name: impl Into<String>,
        registry: Arc<ReportRegistry>,
        requested_dates: Arc<[NaiveDate]>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            registry,
            requested_dates,
            expectations: Mutex::new(Vec::new()),
            admitted: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn requested_dates(&self) -> &[NaiveDate] {
        &self.requested_dates
    }

    pub fn is_requested(&self, date: NaiveDate) -> bool {
        self.requested_dates.contains(&date)
    }

    /// Hand a bulletin to the report for its (state, date).
    pub fn add_new_bulletin_to_report(
        &self,
        bulletin: impl Into<Bulletin>,
    ) -> Result<(), CrawlError> {
        match self.registry.admit(bulletin.into()) {
            Ok(()) => {
                self.admitted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(source = self.source_name.as_str(), error = %e, "Bulletin rejected");
                Err(e)
            }
        }
    }

    /// Register totals the site itself published, to be checked at the end.
    pub fn expect_totals(&self, expected: ExpectedTotals) {
        self.expectations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(expected);
    }

    pub(crate) fn finish(self) -> SourceTally {
        SourceTally {
            admitted: self.admitted.into_inner(),
            rejected: self.rejected.into_inner(),
            expectations: self
                .expectations
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}
