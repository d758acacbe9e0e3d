//! The crawl loop.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use covid19br_common::{CrawlConfig, FullReport, ReportError, ReportQuality, State};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::{CrawlContext, ExpectedTotals, SourceTally};
use crate::registry::ReportRegistry;
use crate::stats::CrawlStats;
use crate::traits::BulletinSource;

/// A report whose totals contradicted what its source published.
#[derive(Debug, Clone)]
pub struct RejectedReport {
    pub report: FullReport,
    pub error: ReportError,
}

#[derive(Debug)]
pub struct CrawlOutcome {
    pub run_id: String,
    /// Non-empty reports that passed every total check, ordered by (state, date)
    pub reports: Vec<FullReport>,
    pub rejected: Vec<RejectedReport>,
    pub stats: CrawlStats,
}

/// Runs every source over the configured dates and consolidates what they
/// report.
///
/// Sources run concurrently → each admits into the shared registry → once
/// all are done, published totals are checked → reports are handed back.
pub struct Crawl {
    config: CrawlConfig,
    run_id: String,
}

impl Crawl {
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub async fn run(&self, sources: &[Arc<dyn BulletinSource>]) -> CrawlOutcome {
        let mut stats = CrawlStats::default();
        let requested_dates: Arc<[NaiveDate]> = Arc::from(self.config.requested_dates());
        let registry = Arc::new(ReportRegistry::new(&self.config.states, &requested_dates));

        info!(
            run_id = self.run_id.as_str(),
            sources = sources.len(),
            reports = registry.len(),
            "Starting crawl"
        );

        let mut declared: HashMap<State, BTreeSet<ReportQuality>> = HashMap::new();
        let mut runnable: Vec<&Arc<dyn BulletinSource>> = Vec::new();
        for source in sources {
            let profile = source.profile();
            if !self.config.states.contains(&profile.state) {
                info!(source = source.name(), state = %profile.state, "State not requested, skipping source");
                stats.sources_skipped += 1;
                continue;
            }
            declared
                .entry(profile.state)
                .or_default()
                .extend(profile.report_qualities);
            runnable.push(source);
        }

        // 1. Collect (parallel, bounded)
        let runs: Vec<_> = stream::iter(runnable.into_iter().map(|source| {
            let registry = Arc::clone(&registry);
            let requested_dates = Arc::clone(&requested_dates);
            async move {
                let ctx = CrawlContext::new(source.name(), registry, requested_dates);
                let result = source.collect(&ctx).await;
                (source.name().to_string(), result, ctx.finish())
            }
        }))
        .buffer_unordered(self.config.max_concurrent_sources.max(1))
        .collect()
        .await;

        let mut expectations: Vec<ExpectedTotals> = Vec::new();
        for (name, result, tally) in runs {
            let SourceTally {
                admitted,
                rejected,
                expectations: source_expectations,
            } = tally;
            stats.sources_run += 1;
            stats.bulletins_admitted += admitted;
            stats.bulletins_rejected += rejected;
            match result {
                Ok(()) => info!(source = name.as_str(), admitted, rejected, "Source finished"),
                Err(e) => {
                    warn!(source = name.as_str(), error = %e, admitted, "Source failed");
                    stats.sources_failed += 1;
                }
            }
            expectations.extend(source_expectations);
        }

        // 2. Consolidate
        let all_reports = match Arc::try_unwrap(registry) {
            Ok(registry) => registry.into_reports(),
            Err(shared) => shared.snapshot(),
        };

        let mut expectations_by_report: HashMap<(State, NaiveDate), Vec<ExpectedTotals>> =
            HashMap::new();
        for expected in expectations {
            expectations_by_report
                .entry((expected.state, expected.date))
                .or_default()
                .push(expected);
        }

        // 3. Validate
        let mut reports = Vec::new();
        let mut rejected = Vec::new();
        for report in all_reports {
            let key = (report.state(), report.date());
            let checks = expectations_by_report.remove(&key).unwrap_or_default();

            if report.is_empty() {
                // Published totals still bind a report that received no bulletins
                match self.check_expectations(&report, &checks) {
                    Ok(mismatches) => {
                        stats.total_mismatches += mismatches;
                        stats.reports_empty += 1;
                    }
                    Err(error) => {
                        warn!(report = %report, error = %error, "Report rejected");
                        stats.reports_rejected += 1;
                        rejected.push(RejectedReport { report, error });
                    }
                }
                continue;
            }

            if let Some(declared) = declared.get(&key.0) {
                let undeclared: Vec<ReportQuality> = report
                    .observed_qualities()
                    .difference(declared)
                    .copied()
                    .collect();
                if !undeclared.is_empty() {
                    warn!(
                        state = %key.0,
                        date = %key.1,
                        undeclared = ?undeclared,
                        "Report holds data no source declared"
                    );
                    stats.quality_mismatches += 1;
                }
            }

            match self.check_expectations(&report, &checks) {
                Ok(mismatches) => {
                    stats.total_mismatches += mismatches;
                    stats.reports_built += 1;
                    reports.push(report);
                }
                Err(error) => {
                    warn!(report = %report, error = %error, "Report rejected");
                    stats.reports_rejected += 1;
                    rejected.push(RejectedReport { report, error });
                }
            }
        }

        for ((state, date), unchecked) in &expectations_by_report {
            warn!(
                state = %state,
                date = %date,
                expectations = unchecked.len(),
                "Published totals for a report outside the crawl"
            );
        }

        info!(run_id = self.run_id.as_str(), "{stats}");

        CrawlOutcome {
            run_id: self.run_id.clone(),
            reports,
            rejected,
            stats,
        }
    }

    /// Check a report against every published total registered for it.
    /// Returns the number of tolerated mismatches in `CheckMode::Report`.
    fn check_expectations(
        &self,
        report: &FullReport,
        checks: &[ExpectedTotals],
    ) -> Result<u32, ReportError> {
        let mode = self.config.check_mode;
        let mut mismatches = 0;
        for expected in checks {
            if let Some(cases) = expected.confirmed_cases {
                if !report.check_total_confirmed_cases_with(cases, mode)? {
                    warn!(report = %report, expected = cases, source = expected.source.as_str(), "Confirmed cases mismatch");
                    mismatches += 1;
                }
            }
            if let Some(deaths) = expected.deaths {
                if !report.check_total_deaths_with(deaths, mode)? {
                    warn!(report = %report, expected = deaths, source = expected.source.as_str(), "Deaths mismatch");
                    mismatches += 1;
                }
            }
        }
        Ok(mismatches)
    }
}
