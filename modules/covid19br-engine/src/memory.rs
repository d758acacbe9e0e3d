//! In-memory source for tests and dry runs. Replays prepared bulletins
//! instead of fetching anything.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use covid19br_common::{Bulletin, ReportQuality, State};

use crate::context::{CrawlContext, ExpectedTotals};
use crate::traits::{BulletinSource, SourceProfile};

pub struct MemoryBulletinSource {
    name: String,
    profile: SourceProfile,
    bulletins: Vec<Bulletin>,
    expectations: Vec<ExpectedTotals>,
    failure: Option<String>,
}

impl MemoryBulletinSource {
    pub fn new(name: impl Into<String>, state: State) -> Self {
        Self {
            name: name.into(),
            profile: SourceProfile::new(state, []),
            bulletins: Vec::new(),
            expectations: Vec::new(),
            failure: None,
        }
    }

    pub fn with_qualities(mut self, qualities: impl IntoIterator<Item = ReportQuality>) -> Self {
        self.profile.report_qualities = qualities.into_iter().collect();
        self
    }

    pub fn with_bulletin(mut self, bulletin: impl Into<Bulletin>) -> Self {
        self.bulletins.push(bulletin.into());
        self
    }

    pub fn with_bulletins(mut self, bulletins: impl IntoIterator<Item = Bulletin>) -> Self {
        self.bulletins.extend(bulletins);
        self
    }

    pub fn with_expected_totals(mut self, expected: ExpectedTotals) -> Self {
        self.expectations.push(expected);
        self
    }

    /// Fail after replaying, the way a source dies mid-crawl.
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }
}

#[async_trait]
impl BulletinSource for MemoryBulletinSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn profile(&self) -> SourceProfile {
        self.profile.clone()
    }

    async fn collect(&self, ctx: &CrawlContext) -> Result<()> {
        for bulletin in &self.bulletins {
            if bulletin.date().is_some_and(|d| !ctx.is_requested(d)) {
                continue;
            }
            ctx.add_new_bulletin_to_report(bulletin.clone())?;
            // Let other sources interleave their admissions.
            tokio::task::yield_now().await;
        }
        for expected in &self.expectations {
            if ctx.is_requested(expected.date) {
                ctx.expect_totals(expected.clone());
            }
        }
        match &self.failure {
            Some(reason) => Err(anyhow!("{}: {reason}", self.name)),
            None => Ok(()),
        }
    }
}
