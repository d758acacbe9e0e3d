pub mod bulletin;
pub mod config;
pub mod error;
pub mod report;

pub use bulletin::*;
pub use config::CrawlConfig;
pub use error::ReportError;
pub use report::{CheckMode, FullReport, TotalMode};

pub use covid19br_world::{CaseCount, PlaceType, ReportQuality, State, NOT_INFORMED_CODE};
