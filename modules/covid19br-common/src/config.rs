use std::env;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use covid19br_world::{State, VOCABULARY_VERSION};

use crate::report::CheckMode;

const DEFAULT_MAX_CONCURRENT_SOURCES: usize = 8;

/// Crawl configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// States to build reports for
    pub states: Vec<State>,

    /// What a mismatching site-published total does to its report
    pub check_mode: CheckMode,

    pub max_concurrent_sources: usize,
}

impl CrawlConfig {
    /// Config for a date range covering every state, strict total checks.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if end_date < start_date {
            bail!("end date {end_date} is before start date {start_date}");
        }
        Ok(Self {
            start_date,
            end_date,
            states: State::ALL.to_vec(),
            check_mode: CheckMode::Raise,
            max_concurrent_sources: DEFAULT_MAX_CONCURRENT_SOURCES,
        })
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let start_date = lookup("COVID19BR_START_DATE")
            .context("COVID19BR_START_DATE environment variable is required")?;
        let start_date = parse_date("COVID19BR_START_DATE", &start_date)?;
        let end_date = match lookup("COVID19BR_END_DATE") {
            Some(raw) => parse_date("COVID19BR_END_DATE", &raw)?,
            None => start_date,
        };

        let mut config = Self::new(start_date, end_date)?;

        if let Some(raw) = lookup("COVID19BR_STATES") {
            let states = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<State>())
                .collect::<Result<Vec<_>, _>>()
                .context("COVID19BR_STATES must be a comma-separated list of UF codes")?;
            if !states.is_empty() {
                config.states = states;
            }
        }

        if let Some(raw) = lookup("COVID19BR_STRICT_TOTALS") {
            let strict: bool = raw
                .trim()
                .parse()
                .context("COVID19BR_STRICT_TOTALS must be true or false")?;
            config.check_mode = if strict {
                CheckMode::Raise
            } else {
                CheckMode::Report
            };
        }

        if let Some(raw) = lookup("COVID19BR_MAX_CONCURRENT_SOURCES") {
            let max: usize = raw
                .trim()
                .parse()
                .context("COVID19BR_MAX_CONCURRENT_SOURCES must be a number")?;
            config.max_concurrent_sources = max.max(1);
        }

        Ok(config)
    }

    pub fn with_states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.states = states.into_iter().collect();
        self
    }

    pub fn with_check_mode(mut self, check_mode: CheckMode) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn with_max_concurrent_sources(mut self, max: usize) -> Self {
        self.max_concurrent_sources = max.max(1);
        self
    }

    /// Every date from start to end, inclusive.
    pub fn requested_dates(&self) -> Vec<NaiveDate> {
        self.start_date
            .iter_days()
            .take_while(|d| *d <= self.end_date)
            .collect()
    }

    pub fn log_summary(&self) {
        let states: Vec<&str> = self.states.iter().map(State::as_str).collect();
        tracing::info!("Crawl config loaded (vocabulary v{VOCABULARY_VERSION}):");
        tracing::info!("  dates: {} to {}", self.start_date, self.end_date);
        tracing::info!("  states: {}", states.join(","));
        tracing::info!("  check mode: {:?}", self.check_mode);
        tracing::info!("  max concurrent sources: {}", self.max_concurrent_sources);
    }
}

fn parse_date(key: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("{key} must be a date in YYYY-MM-DD format, got {raw:?}"))
}
