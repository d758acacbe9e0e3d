use chrono::NaiveDate;
use covid19br_world::{CaseCount, PlaceType, State, IMPORTED_OR_UNDEFINED_CITY};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Provenance of a total that was summed from its parts rather than published.
pub const AUTO_COMPUTED_SOURCE: &str = "auto computed";

// --- City names ---

/// Non-empty county name. Ordering is ordinal on the stored string, which
/// is what the output sort relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CityName(String);

impl CityName {
    pub fn new(name: impl Into<String>) -> Result<Self, ReportError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ReportError::validation("city", "must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CityName {
    type Error = ReportError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        CityName::new(name)
    }
}

impl From<CityName> for String {
    fn from(city: CityName) -> Self {
        city.0
    }
}

impl std::fmt::Display for CityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Shared fields ---

/// Fields every bulletin carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinMeta {
    pub date: NaiveDate,
    pub state: State,
    /// None = not applicable; `NotInformed` = source declined to say
    #[serde(default)]
    pub confirmed_cases: Option<CaseCount>,
    #[serde(default)]
    pub deaths: Option<CaseCount>,
    /// Where the numbers came from (usually a URL)
    pub source: String,
}

impl BulletinMeta {
    pub fn new(date: NaiveDate, state: State, source: impl Into<String>) -> Self {
        Self {
            date,
            state,
            confirmed_cases: None,
            deaths: None,
            source: source.into(),
        }
    }

    /// True when either count is known and non-zero.
    pub fn has_confirmed_cases_or_deaths(&self) -> bool {
        let has = |count: Option<CaseCount>| matches!(count, Some(CaseCount::Count(n)) if n > 0);
        has(self.confirmed_cases) || has(self.deaths)
    }

    fn set_raw_counts(
        &mut self,
        confirmed_cases: Option<i64>,
        deaths: Option<i64>,
    ) -> Result<(), ReportError> {
        self.confirmed_cases = confirmed_cases
            .map(CaseCount::from_raw)
            .transpose()
            .map_err(|e| ReportError::validation("confirmed_cases", e.to_string()))?;
        self.deaths = deaths
            .map(CaseCount::from_raw)
            .transpose()
            .map_err(|e| ReportError::validation("deaths", e.to_string()))?;
        Ok(())
    }

    fn csv_row(&self, city: String, place_type: PlaceType) -> CsvRow {
        CsvRow {
            date: self.date,
            state: self.state,
            city,
            confirmed_cases: self.confirmed_cases,
            deaths: self.deaths,
            source: self.source.clone(),
            place_type,
        }
    }
}

// --- Output row ---

/// One flat output record, ready to be written as CSV or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    pub date: NaiveDate,
    pub state: State,
    /// Empty for the state-wide row
    pub city: String,
    /// Serialized as the plain count, or `-1` when not informed
    pub confirmed_cases: Option<CaseCount>,
    pub deaths: Option<CaseCount>,
    pub source: String,
    pub place_type: PlaceType,
}

impl CsvRow {
    pub const HEADER: [&'static str; 7] = [
        "date",
        "state",
        "city",
        "confirmed_cases",
        "deaths",
        "source",
        "place_type",
    ];
}

// --- Variants ---

/// Counts for a single county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyBulletin {
    #[serde(flatten)]
    pub meta: BulletinMeta,
    pub city: CityName,
}

impl CountyBulletin {
    pub fn new(
        date: NaiveDate,
        state: State,
        city: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, ReportError> {
        Ok(Self {
            meta: BulletinMeta::new(date, state, source),
            city: CityName::new(city)?,
        })
    }

    pub fn with_confirmed_cases(mut self, count: impl Into<CaseCount>) -> Self {
        self.meta.confirmed_cases = Some(count.into());
        self
    }

    pub fn with_deaths(mut self, count: impl Into<CaseCount>) -> Self {
        self.meta.deaths = Some(count.into());
        self
    }

    /// Set both counts from raw source integers (`-1` = not informed).
    pub fn with_raw_counts(
        mut self,
        confirmed_cases: Option<i64>,
        deaths: Option<i64>,
    ) -> Result<Self, ReportError> {
        self.meta.set_raw_counts(confirmed_cases, deaths)?;
        Ok(self)
    }

    pub fn has_confirmed_cases_or_deaths(&self) -> bool {
        self.meta.has_confirmed_cases_or_deaths()
    }

    pub fn to_csv_row(&self) -> CsvRow {
        self.meta.csv_row(self.city.to_string(), PlaceType::City)
    }
}

/// Cases and deaths that cannot be attributed to a county: residents of
/// other states, or of unknown origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedUndefinedBulletin {
    #[serde(flatten)]
    pub meta: BulletinMeta,
}

impl ImportedUndefinedBulletin {
    pub fn new(date: NaiveDate, state: State, source: impl Into<String>) -> Self {
        Self {
            meta: BulletinMeta::new(date, state, source),
        }
    }

    pub fn with_confirmed_cases(mut self, count: impl Into<CaseCount>) -> Self {
        self.meta.confirmed_cases = Some(count.into());
        self
    }

    pub fn with_deaths(mut self, count: impl Into<CaseCount>) -> Self {
        self.meta.deaths = Some(count.into());
        self
    }

    pub fn with_raw_counts(
        mut self,
        confirmed_cases: Option<i64>,
        deaths: Option<i64>,
    ) -> Result<Self, ReportError> {
        self.meta.set_raw_counts(confirmed_cases, deaths)?;
        Ok(self)
    }

    pub fn has_confirmed_cases_or_deaths(&self) -> bool {
        self.meta.has_confirmed_cases_or_deaths()
    }

    pub fn to_csv_row(&self) -> CsvRow {
        self.meta
            .csv_row(IMPORTED_OR_UNDEFINED_CITY.to_string(), PlaceType::City)
    }
}

/// The state-wide total, either published by a source or summed by a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTotalBulletin {
    #[serde(flatten)]
    pub meta: BulletinMeta,
}

impl StateTotalBulletin {
    pub fn new(date: NaiveDate, state: State, source: impl Into<String>) -> Self {
        Self {
            meta: BulletinMeta::new(date, state, source),
        }
    }

    /// Zeroed total that a report accumulates into.
    pub fn auto_computed(date: NaiveDate, state: State) -> Self {
        let mut meta = BulletinMeta::new(date, state, AUTO_COMPUTED_SOURCE);
        meta.confirmed_cases = Some(CaseCount::Count(0));
        meta.deaths = Some(CaseCount::Count(0));
        Self { meta }
    }

    pub fn with_confirmed_cases(mut self, count: impl Into<CaseCount>) -> Self {
        self.meta.confirmed_cases = Some(count.into());
        self
    }

    pub fn with_deaths(mut self, count: impl Into<CaseCount>) -> Self {
        self.meta.deaths = Some(count.into());
        self
    }

    pub fn with_raw_counts(
        mut self,
        confirmed_cases: Option<i64>,
        deaths: Option<i64>,
    ) -> Result<Self, ReportError> {
        self.meta.set_raw_counts(confirmed_cases, deaths)?;
        Ok(self)
    }

    pub fn increase_confirmed_cases(&mut self, amount: u64) {
        self.meta.confirmed_cases = Some(increased(self.meta.confirmed_cases, amount));
    }

    pub fn increase_deaths(&mut self, amount: u64) {
        self.meta.deaths = Some(increased(self.meta.deaths, amount));
    }

    pub fn has_confirmed_cases_or_deaths(&self) -> bool {
        self.meta.has_confirmed_cases_or_deaths()
    }

    pub fn to_csv_row(&self) -> CsvRow {
        self.meta.csv_row(String::new(), PlaceType::State)
    }
}

// A null or not-informed total restarts from the amount.
fn increased(current: Option<CaseCount>, amount: u64) -> CaseCount {
    match current {
        Some(CaseCount::Count(n)) => CaseCount::Count(n.saturating_add(amount)),
        Some(CaseCount::NotInformed) | None => CaseCount::Count(amount),
    }
}

// --- Bulletin ---

/// One partial observation handed to a report.
///
/// Kinds this build does not know about deserialize as `Unrecognized` and
/// are ignored on admission, so older engines keep working when newer
/// adapters start emitting new kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bulletin {
    County(CountyBulletin),
    ImportedUndefined(ImportedUndefinedBulletin),
    StateTotal(StateTotalBulletin),
    #[serde(other)]
    Unrecognized,
}

impl Bulletin {
    pub fn meta(&self) -> Option<&BulletinMeta> {
        match self {
            Bulletin::County(b) => Some(&b.meta),
            Bulletin::ImportedUndefined(b) => Some(&b.meta),
            Bulletin::StateTotal(b) => Some(&b.meta),
            Bulletin::Unrecognized => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.meta().map(|m| m.date)
    }

    pub fn state(&self) -> Option<State> {
        self.meta().map(|m| m.state)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Bulletin::County(_) => "county",
            Bulletin::ImportedUndefined(_) => "imported_undefined",
            Bulletin::StateTotal(_) => "state_total",
            Bulletin::Unrecognized => "unrecognized",
        }
    }

    pub fn has_confirmed_cases_or_deaths(&self) -> bool {
        self.meta()
            .is_some_and(BulletinMeta::has_confirmed_cases_or_deaths)
    }

    pub fn to_csv_row(&self) -> Option<CsvRow> {
        match self {
            Bulletin::County(b) => Some(b.to_csv_row()),
            Bulletin::ImportedUndefined(b) => Some(b.to_csv_row()),
            Bulletin::StateTotal(b) => Some(b.to_csv_row()),
            Bulletin::Unrecognized => None,
        }
    }
}

impl From<CountyBulletin> for Bulletin {
    fn from(b: CountyBulletin) -> Self {
        Bulletin::County(b)
    }
}

impl From<ImportedUndefinedBulletin> for Bulletin {
    fn from(b: ImportedUndefinedBulletin) -> Self {
        Bulletin::ImportedUndefined(b)
    }
}

impl From<StateTotalBulletin> for Bulletin {
    fn from(b: StateTotalBulletin) -> Self {
        Bulletin::StateTotal(b)
    }
}
