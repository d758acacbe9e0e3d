//! Per-(state, date) reports shared by concurrently running sources.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use covid19br_common::{Bulletin, CrawlConfig, FullReport, State};
use tracing::debug;

use crate::error::CrawlError;

/// Every report a crawl may produce, created before any source runs.
///
/// The map is fixed at construction, so lookups take no lock. Each report
/// has its own mutex: admissions to one report are serialized (a bulletin
/// and its contribution to the total land together), admissions to
/// different reports never contend.
pub struct ReportRegistry {
    reports: BTreeMap<(State, NaiveDate), Mutex<FullReport>>,
}

impl ReportRegistry {
    pub fn new(states: &[State], dates: &[NaiveDate]) -> Self {
        let reports = states
            .iter()
            .flat_map(|state| {
                dates
                    .iter()
                    .map(move |date| ((*state, *date), Mutex::new(FullReport::new(*date, *state))))
            })
            .collect();
        Self { reports }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(&config.states, &config.requested_dates())
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn contains(&self, state: State, date: NaiveDate) -> bool {
        self.reports.contains_key(&(state, date))
    }

    /// Route a bulletin to the report for its (state, date).
    ///
    /// Unrecognized bulletin kinds carry no routing key and are dropped.
    pub fn admit(&self, bulletin: Bulletin) -> Result<(), CrawlError> {
        let Some(meta) = bulletin.meta() else {
            debug!("Dropping unrecognized bulletin kind");
            return Ok(());
        };
        let (state, date) = (meta.state, meta.date);
        let report = self
            .reports
            .get(&(state, date))
            .ok_or(CrawlError::UnrequestedReport { state, date })?;

        debug!(state = %state, date = %date, kind = bulletin.kind(), "Admitting bulletin");
        lock(report).add_new_bulletin(bulletin)?;
        Ok(())
    }

    /// Read a report under its lock.
    pub fn with_report<R>(
        &self,
        state: State,
        date: NaiveDate,
        f: impl FnOnce(&FullReport) -> R,
    ) -> Option<R> {
        self.reports.get(&(state, date)).map(|report| f(&*lock(report)))
    }

    /// Copies of every report, ordered by (state, date).
    pub fn snapshot(&self) -> Vec<FullReport> {
        self.reports.values().map(|report| lock(report).clone()).collect()
    }

    /// Every report, ordered by (state, date).
    pub fn into_reports(self) -> Vec<FullReport> {
        self.reports
            .into_values()
            .map(|report| report.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}

// Admission never leaves a report half-updated, so a poisoned lock still
// guards a consistent report.
fn lock(report: &Mutex<FullReport>) -> MutexGuard<'_, FullReport> {
    report.lock().unwrap_or_else(PoisonError::into_inner)
}
