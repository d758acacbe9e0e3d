//! Shared vocabulary between source adapters and the consolidation engine.
//!
//! Everything here is immutable and referenced by value: the state list,
//! the "not informed" sentinel and the output column vocabulary.

pub mod types;
pub mod values;

pub use types::{PlaceType, ReportQuality, State};
pub use values::{
    CaseCount, InvalidCaseCount, UnknownState, IMPORTED_OR_UNDEFINED_CITY, NOT_INFORMED_CODE,
    VOCABULARY_VERSION,
};
