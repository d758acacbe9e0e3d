//! Consolidated per-date, per-state report.
//!
//! A `FullReport` owns every bulletin admitted for its (date, state): the
//! county bulletins, at most one imported/undefined bulletin, and exactly one
//! total. While no source has published a total, the total is the running
//! sum of everything admitted. The first published total wins for good.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use covid19br_world::{CaseCount, ReportQuality, State};
use serde::Serialize;
use tracing::{debug, warn};

use crate::bulletin::{
    Bulletin, BulletinMeta, CountyBulletin, CsvRow, ImportedUndefinedBulletin, StateTotalBulletin,
};
use crate::error::ReportError;

/// How the report's total is maintained. Moves `AutoComputed → Overridden`
/// once, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalMode {
    AutoComputed,
    Overridden,
}

/// What a total check does on mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Fail with `ReportError::BadReport`
    #[default]
    Raise,
    /// Return `Ok(false)`
    Report,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    date: NaiveDate,
    state: State,
    county_bulletins: Vec<CountyBulletin>,
    undefined_or_imported_cases_bulletin: Option<ImportedUndefinedBulletin>,
    total_bulletin: StateTotalBulletin,
    total_mode: TotalMode,
}

impl FullReport {
    pub fn new(date: NaiveDate, state: State) -> Self {
        Self {
            date,
            state,
            county_bulletins: Vec::new(),
            undefined_or_imported_cases_bulletin: None,
            total_bulletin: StateTotalBulletin::auto_computed(date, state),
            total_mode: TotalMode::AutoComputed,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn county_bulletins(&self) -> &[CountyBulletin] {
        &self.county_bulletins
    }

    pub fn undefined_or_imported_cases_bulletin(&self) -> Option<&ImportedUndefinedBulletin> {
        self.undefined_or_imported_cases_bulletin.as_ref()
    }

    pub fn total_bulletin(&self) -> &StateTotalBulletin {
        &self.total_bulletin
    }

    pub fn total_mode(&self) -> TotalMode {
        self.total_mode
    }

    pub fn is_total_auto_computed(&self) -> bool {
        self.total_mode == TotalMode::AutoComputed
    }

    pub fn total_confirmed_cases(&self) -> Option<CaseCount> {
        self.total_bulletin.meta.confirmed_cases
    }

    pub fn total_deaths(&self) -> Option<CaseCount> {
        self.total_bulletin.meta.deaths
    }

    /// Nothing has been admitted yet (unrecognized kinds aside).
    pub fn is_empty(&self) -> bool {
        self.county_bulletins.is_empty()
            && self.undefined_or_imported_cases_bulletin.is_none()
            && self.total_mode == TotalMode::AutoComputed
    }

    pub fn has_undefined_or_imported_cases(&self) -> bool {
        self.undefined_or_imported_cases_bulletin
            .as_ref()
            .is_some_and(ImportedUndefinedBulletin::has_confirmed_cases_or_deaths)
    }

    /// Admit one bulletin into the report.
    ///
    /// County and imported/undefined bulletins feed the total while it is
    /// auto-computed. A state total replaces the current one and stops
    /// accumulation. Unrecognized kinds are ignored.
    pub fn add_new_bulletin(&mut self, bulletin: Bulletin) -> Result<(), ReportError> {
        match bulletin {
            Bulletin::County(county) => {
                let counts = Contribution::of(&county.meta);
                self.county_bulletins.push(county);
                self.accumulate(counts);
            }
            Bulletin::ImportedUndefined(imported) => {
                if self.undefined_or_imported_cases_bulletin.is_some() {
                    warn!(
                        state = %self.state,
                        date = %self.date,
                        source = imported.meta.source.as_str(),
                        "Imported/undefined bulletin already set, rejecting duplicate"
                    );
                    return Err(ReportError::DuplicateBulletin {
                        state: self.state,
                        date: self.date,
                    });
                }
                let counts = Contribution::of(&imported.meta);
                self.undefined_or_imported_cases_bulletin = Some(imported);
                self.accumulate(counts);
            }
            Bulletin::StateTotal(total) => {
                debug!(
                    state = %self.state,
                    date = %self.date,
                    source = total.meta.source.as_str(),
                    "Published total overrides computed total"
                );
                self.total_bulletin = total;
                self.total_mode = TotalMode::Overridden;
            }
            Bulletin::Unrecognized => {
                debug!(state = %self.state, date = %self.date, "Ignoring unrecognized bulletin kind");
            }
        }
        Ok(())
    }

    fn accumulate(&mut self, counts: Contribution) {
        if self.total_mode != TotalMode::AutoComputed {
            return;
        }
        if let Some(n) = counts.confirmed_cases {
            self.total_bulletin.increase_confirmed_cases(n);
        }
        if let Some(n) = counts.deaths {
            self.total_bulletin.increase_deaths(n);
        }
    }

    pub fn check_total_deaths(&self, expected: u64) -> Result<bool, ReportError> {
        self.check_total_deaths_with(expected, CheckMode::Raise)
    }

    pub fn check_total_deaths_with(
        &self,
        expected: u64,
        mode: CheckMode,
    ) -> Result<bool, ReportError> {
        self.check_total("death cases", self.total_deaths(), expected, mode)
    }

    pub fn check_total_confirmed_cases(&self, expected: u64) -> Result<bool, ReportError> {
        self.check_total_confirmed_cases_with(expected, CheckMode::Raise)
    }

    pub fn check_total_confirmed_cases_with(
        &self,
        expected: u64,
        mode: CheckMode,
    ) -> Result<bool, ReportError> {
        self.check_total("confirmed cases", self.total_confirmed_cases(), expected, mode)
    }

    fn check_total(
        &self,
        what: &str,
        actual: Option<CaseCount>,
        expected: u64,
        mode: CheckMode,
    ) -> Result<bool, ReportError> {
        let matches = actual == Some(CaseCount::Count(expected));
        if !matches && mode == CheckMode::Raise {
            return Err(ReportError::BadReport(format!(
                "Expected {expected} {what}, but got {self} instead."
            )));
        }
        Ok(matches)
    }

    /// Which data shapes this report actually holds.
    pub fn observed_qualities(&self) -> BTreeSet<ReportQuality> {
        let mut qualities = BTreeSet::new();
        if !self.county_bulletins.is_empty() {
            qualities.insert(ReportQuality::CountyBulletins);
        }
        if self.undefined_or_imported_cases_bulletin.is_some() {
            qualities.insert(ReportQuality::UndefinedOrImportedCases);
        }
        if qualities.is_empty() && self.total_mode == TotalMode::Overridden {
            qualities.insert(ReportQuality::OnlyTotal);
        }
        qualities
    }

    /// Output rows: counties by name, then imported/undefined, then the
    /// total. Rows without data are dropped, except the total.
    pub fn to_csv_rows(&self) -> Vec<CsvRow> {
        let mut counties: Vec<&CountyBulletin> = self.county_bulletins.iter().collect();
        counties.sort_by(|a, b| a.city.cmp(&b.city));

        let mut rows: Vec<CsvRow> = counties
            .into_iter()
            .filter(|b| b.has_confirmed_cases_or_deaths())
            .map(CountyBulletin::to_csv_row)
            .collect();

        if let Some(imported) = &self.undefined_or_imported_cases_bulletin {
            if imported.has_confirmed_cases_or_deaths() {
                rows.push(imported.to_csv_row());
            }
        }
        rows.push(self.total_bulletin.to_csv_row());
        rows
    }
}

impl std::fmt::Display for FullReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FullReport(state={}, date={}, qtd_county_bulletins={}, \
             has_undefined_or_imported_cases={}, total_deaths={}, total_confirmed_cases={})",
            self.state,
            self.date.format("%d/%m/%Y"),
            self.county_bulletins.len(),
            self.has_undefined_or_imported_cases(),
            display_count(self.total_deaths()),
            display_count(self.total_confirmed_cases()),
        )
    }
}

fn display_count(count: Option<CaseCount>) -> String {
    count.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Known, non-sentinel counts a bulletin adds to the total.
#[derive(Clone, Copy)]
struct Contribution {
    confirmed_cases: Option<u64>,
    deaths: Option<u64>,
}

impl Contribution {
    fn of(meta: &BulletinMeta) -> Self {
        Self {
            confirmed_cases: meta.confirmed_cases.and_then(|c| c.known()),
            deaths: meta.deaths.and_then(|c| c.known()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covid19br_world::PlaceType;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()
    }

    fn county(city: &str, cases: impl Into<CaseCount>, deaths: impl Into<CaseCount>) -> Bulletin {
        CountyBulletin::new(day(), State::PR, city, "https://saude.pr.gov.br/casos.csv")
            .unwrap()
            .with_confirmed_cases(cases)
            .with_deaths(deaths)
            .into()
    }

    fn imported(cases: impl Into<CaseCount>, deaths: impl Into<CaseCount>) -> Bulletin {
        ImportedUndefinedBulletin::new(day(), State::PR, "https://saude.pr.gov.br/informe.pdf")
            .with_confirmed_cases(cases)
            .with_deaths(deaths)
            .into()
    }

    fn published_total(cases: u64, deaths: u64) -> Bulletin {
        StateTotalBulletin::new(day(), State::PR, "https://saude.pr.gov.br")
            .with_confirmed_cases(cases)
            .with_deaths(deaths)
            .into()
    }

    #[test]
    fn new_report_has_zeroed_auto_total() {
        let report = FullReport::new(day(), State::PR);
        assert!(report.is_total_auto_computed());
        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(0)));
        assert_eq!(report.total_deaths(), Some(CaseCount::Count(0)));
        assert!(report.county_bulletins().is_empty());
        assert!(report.undefined_or_imported_cases_bulletin().is_none());
    }

    #[test]
    fn total_is_sum_of_counties_and_imported() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(county("Curitiba", 100u64, 4u64)).unwrap();
        report.add_new_bulletin(county("Londrina", 30u64, 1u64)).unwrap();
        report.add_new_bulletin(imported(7u64, 2u64)).unwrap();

        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(137)));
        assert_eq!(report.total_deaths(), Some(CaseCount::Count(7)));
    }

    #[test]
    fn sentinel_contributes_nothing_but_sibling_field_still_counts() {
        let mut report = FullReport::new(day(), State::PR);
        report
            .add_new_bulletin(county("Curitiba", CaseCount::NotInformed, 5u64))
            .unwrap();

        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(0)));
        assert_eq!(report.total_deaths(), Some(CaseCount::Count(5)));
    }

    #[test]
    fn null_counts_contribute_nothing() {
        let mut report = FullReport::new(day(), State::PR);
        let bulletin = CountyBulletin::new(day(), State::PR, "Curitiba", "src")
            .unwrap()
            .with_confirmed_cases(3u64);
        report.add_new_bulletin(bulletin.into()).unwrap();

        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(3)));
        assert_eq!(report.total_deaths(), Some(CaseCount::Count(0)));
    }

    #[test]
    fn published_total_overrides_and_freezes() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(county("Curitiba", 100u64, 4u64)).unwrap();
        report.add_new_bulletin(published_total(500, 20)).unwrap();

        assert_eq!(report.total_mode(), TotalMode::Overridden);
        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(500)));
        assert_eq!(report.total_deaths(), Some(CaseCount::Count(20)));

        report.add_new_bulletin(county("Londrina", 30u64, 1u64)).unwrap();
        report.add_new_bulletin(imported(7u64, 2u64)).unwrap();

        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(500)));
        assert_eq!(report.total_deaths(), Some(CaseCount::Count(20)));
        assert_eq!(report.total_bulletin().meta.source, "https://saude.pr.gov.br");
        assert_eq!(report.county_bulletins().len(), 2);
    }

    #[test]
    fn later_published_total_replaces_earlier_one() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(published_total(500, 20)).unwrap();
        report.add_new_bulletin(published_total(510, 21)).unwrap();
        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(510)));
        assert_eq!(report.total_mode(), TotalMode::Overridden);
    }

    #[test]
    fn second_imported_bulletin_is_rejected() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(imported(7u64, 2u64)).unwrap();

        let err = report.add_new_bulletin(imported(9u64, 9u64)).unwrap_err();
        assert_eq!(
            err,
            ReportError::DuplicateBulletin {
                state: State::PR,
                date: day()
            }
        );

        let kept = report.undefined_or_imported_cases_bulletin().unwrap();
        assert_eq!(kept.meta.confirmed_cases, Some(CaseCount::Count(7)));
        assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(7)));
        assert_eq!(report.total_deaths(), Some(CaseCount::Count(2)));
    }

    #[test]
    fn unrecognized_bulletin_is_a_no_op() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(Bulletin::Unrecognized).unwrap();
        assert!(report.is_total_auto_computed());
        assert!(report.is_empty());
        assert_eq!(report.to_csv_rows().len(), 1);
    }

    #[test]
    fn rows_are_ordered_counties_imported_total() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(county("Zeta", 1u64, 0u64)).unwrap();
        report.add_new_bulletin(county("Alfa", 2u64, 0u64)).unwrap();
        report.add_new_bulletin(imported(3u64, 0u64)).unwrap();

        let rows = report.to_csv_rows();
        let cities: Vec<&str> = rows.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(cities, vec!["Alfa", "Zeta", "Importados/Indefinidos", ""]);
        assert_eq!(rows[3].place_type, PlaceType::State);
        assert_eq!(rows[3].confirmed_cases, Some(CaseCount::Count(6)));
    }

    #[test]
    fn empty_rows_are_suppressed_but_total_is_kept() {
        let mut report = FullReport::new(day(), State::PR);
        report
            .add_new_bulletin(county("Curitiba", CaseCount::NotInformed, CaseCount::NotInformed))
            .unwrap();
        let null_county = CountyBulletin::new(day(), State::PR, "Londrina", "src").unwrap();
        report.add_new_bulletin(null_county.into()).unwrap();
        report.add_new_bulletin(imported(0u64, 0u64)).unwrap();

        let rows = report.to_csv_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].place_type, PlaceType::State);
        assert_eq!(rows[0].confirmed_cases, Some(CaseCount::Count(0)));
        assert_eq!(rows[0].deaths, Some(CaseCount::Count(0)));
        assert!(!report.has_undefined_or_imported_cases());
    }

    #[test]
    fn total_check_passes_on_match() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(county("Curitiba", 50u64, 10u64)).unwrap();

        assert_eq!(report.check_total_deaths(10), Ok(true));
        assert_eq!(report.check_total_confirmed_cases(50), Ok(true));
    }

    #[test]
    fn total_check_raises_or_reports_on_mismatch() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(county("Curitiba", 50u64, 10u64)).unwrap();

        let err = report.check_total_deaths(11).unwrap_err();
        match err {
            ReportError::BadReport(msg) => {
                assert!(msg.contains("Expected 11 death cases"), "{msg}");
                assert!(msg.contains("FullReport(state=PR, date=01/05/2020"), "{msg}");
            }
            other => panic!("expected BadReport, got {other:?}"),
        }
        assert_eq!(report.check_total_deaths_with(11, CheckMode::Report), Ok(false));
        assert!(report.check_total_confirmed_cases(49).is_err());
    }

    #[test]
    fn check_fails_against_not_informed_total() {
        let mut report = FullReport::new(day(), State::PR);
        let total = StateTotalBulletin::new(day(), State::PR, "src")
            .with_confirmed_cases(CaseCount::NotInformed);
        report.add_new_bulletin(total.into()).unwrap();
        assert_eq!(
            report.check_total_confirmed_cases_with(0, CheckMode::Report),
            Ok(false)
        );
    }

    #[test]
    fn display_summarizes_report() {
        let mut report = FullReport::new(day(), State::PR);
        report.add_new_bulletin(county("Curitiba", 100u64, 4u64)).unwrap();
        report.add_new_bulletin(imported(7u64, 2u64)).unwrap();
        assert_eq!(
            report.to_string(),
            "FullReport(state=PR, date=01/05/2020, qtd_county_bulletins=1, \
             has_undefined_or_imported_cases=true, total_deaths=6, total_confirmed_cases=107)"
        );
    }

    #[test]
    fn observed_qualities_reflect_content() {
        let mut only_total = FullReport::new(day(), State::PB);
        only_total.add_new_bulletin(published_total(1, 0)).unwrap();
        assert_eq!(
            only_total.observed_qualities().into_iter().collect::<Vec<_>>(),
            vec![ReportQuality::OnlyTotal]
        );

        let mut detailed = FullReport::new(day(), State::PR);
        detailed.add_new_bulletin(county("Curitiba", 1u64, 0u64)).unwrap();
        detailed.add_new_bulletin(imported(1u64, 0u64)).unwrap();
        assert_eq!(
            detailed.observed_qualities().into_iter().collect::<Vec<_>>(),
            vec![
                ReportQuality::CountyBulletins,
                ReportQuality::UndefinedOrImportedCases
            ]
        );
    }
}
