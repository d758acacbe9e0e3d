use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Version of the shared vocabulary (sentinel, states, output columns).
/// Bump when any of them changes representation.
pub const VOCABULARY_VERSION: &str = "1";

/// Wire value a source uses to say "we do not publish this number".
/// Distinct from zero and from a missing field.
pub const NOT_INFORMED_CODE: i64 = -1;

/// City label of the imported/undefined row in the output.
pub const IMPORTED_OR_UNDEFINED_CITY: &str = "Importados/Indefinidos";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("count must be non-negative or {code} (not informed), got {0}", code = NOT_INFORMED_CODE)]
pub struct InvalidCaseCount(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown state code: {0:?}")]
pub struct UnknownState(pub String);

/// A case or death count as published by a source.
///
/// Absence (`Option::None` at the field level) means the field does not
/// apply; `NotInformed` means the source explicitly declined to state it.
/// On the wire both variants are a plain integer, the sentinel being
/// [`NOT_INFORMED_CODE`]. Counts keep their full `u64` range there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseCount {
    NotInformed,
    Count(u64),
}

impl CaseCount {
    /// Interpret a raw integer from a source. `-1` is the sentinel, any
    /// other negative value is rejected.
    pub fn from_raw(raw: i64) -> Result<Self, InvalidCaseCount> {
        match raw {
            NOT_INFORMED_CODE => Ok(CaseCount::NotInformed),
            n if n >= 0 => Ok(CaseCount::Count(n as u64)),
            n => Err(InvalidCaseCount(n)),
        }
    }

    /// The known count, or `None` for the sentinel.
    pub fn known(&self) -> Option<u64> {
        match self {
            CaseCount::Count(n) => Some(*n),
            CaseCount::NotInformed => None,
        }
    }

    pub fn is_not_informed(&self) -> bool {
        matches!(self, CaseCount::NotInformed)
    }
}

impl TryFrom<i64> for CaseCount {
    type Error = InvalidCaseCount;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        CaseCount::from_raw(raw)
    }
}

impl Serialize for CaseCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CaseCount::NotInformed => serializer.serialize_i64(NOT_INFORMED_CODE),
            CaseCount::Count(n) => serializer.serialize_u64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for CaseCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_i64(CaseCountVisitor)
    }
}

struct CaseCountVisitor;

impl Visitor<'_> for CaseCountVisitor {
    type Value = CaseCount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative count or {NOT_INFORMED_CODE}")
    }

    fn visit_i64<E: de::Error>(self, raw: i64) -> Result<CaseCount, E> {
        CaseCount::from_raw(raw).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, raw: u64) -> Result<CaseCount, E> {
        Ok(CaseCount::Count(raw))
    }
}

impl From<u64> for CaseCount {
    fn from(n: u64) -> Self {
        CaseCount::Count(n)
    }
}

impl fmt::Display for CaseCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseCount::NotInformed => write!(f, "not informed"),
            CaseCount::Count(n) => write!(f, "{n}"),
        }
    }
}
