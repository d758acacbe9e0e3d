//! Concurrent crawl harness.
//!
//! Sources (one per government site) run concurrently and admit bulletins
//! into a shared `ReportRegistry`: run sources → admit → check published
//! totals → hand back consolidated reports.
//!
//! Consumers add a site by implementing `BulletinSource`.

pub mod context;
pub mod crawl;
pub mod error;
pub mod memory;
pub mod registry;
pub mod stats;
pub mod traits;

pub use context::{CrawlContext, ExpectedTotals};
pub use crawl::{Crawl, CrawlOutcome, RejectedReport};
pub use error::CrawlError;
pub use memory::MemoryBulletinSource;
pub use registry::ReportRegistry;
pub use stats::CrawlStats;
pub use traits::{BulletinSource, SourceProfile};
