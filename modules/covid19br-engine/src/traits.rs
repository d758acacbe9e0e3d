//! The seam between government-site adapters and the crawl.

use anyhow::Result;
use async_trait::async_trait;
use covid19br_common::{ReportQuality, State};

use crate::context::CrawlContext;

/// What a source covers and which data shapes it publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProfile {
    pub state: State,
    pub report_qualities: Vec<ReportQuality>,
}

impl SourceProfile {
    pub fn new(state: State, report_qualities: impl IntoIterator<Item = ReportQuality>) -> Self {
        Self {
            state,
            report_qualities: report_qualities.into_iter().collect(),
        }
    }
}

/// One government data source.
///
/// `collect` fetches whatever the source publishes for
/// `ctx.requested_dates()` and hands each bulletin to
/// `ctx.add_new_bulletin_to_report`. Site-published totals go to
/// `ctx.expect_totals` and are checked once every source has finished.
///
/// A returned error fails this source only; other sources keep running.
#[async_trait]
pub trait BulletinSource: Send + Sync {
    fn name(&self) -> &str;

    fn profile(&self) -> SourceProfile;

    async fn collect(&self, ctx: &CrawlContext) -> Result<()>;
}
