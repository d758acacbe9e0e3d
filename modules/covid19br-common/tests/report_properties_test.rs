//! Property tests for report consolidation.
//!
//! - Sum invariant: an auto-computed total equals the per-field sum of every
//!   known count admitted, whatever the order.
//! - Override precedence: a published total is final, whatever comes after.
//! - Output ordering: counties sorted by name, then imported/undefined, then total.

use chrono::NaiveDate;
use proptest::prelude::*;

use covid19br_common::{
    Bulletin, CaseCount, CountyBulletin, FullReport, ImportedUndefinedBulletin, PlaceType, State,
    StateTotalBulletin, TotalMode,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()
}

fn count_strategy() -> impl Strategy<Value = Option<CaseCount>> {
    prop_oneof![
        Just(None),
        Just(Some(CaseCount::NotInformed)),
        (0u64..10_000).prop_map(|n| Some(CaseCount::Count(n))),
    ]
}

fn county(index: usize, cases: Option<CaseCount>, deaths: Option<CaseCount>) -> Bulletin {
    let mut bulletin =
        CountyBulletin::new(day(), State::SP, format!("Cidade {index:03}"), "https://saude.sp.gov.br")
            .unwrap();
    bulletin.meta.confirmed_cases = cases;
    bulletin.meta.deaths = deaths;
    bulletin.into()
}

fn known_sum(counts: impl Iterator<Item = Option<CaseCount>>) -> u64 {
    counts.filter_map(|c| c.and_then(|c| c.known())).sum()
}

proptest! {
    #[test]
    fn prop_auto_total_is_sum_of_known_counts(
        counts in prop::collection::vec((count_strategy(), count_strategy()), 0..40),
        imported in prop::option::of((count_strategy(), count_strategy())),
    ) {
        let mut report = FullReport::new(day(), State::SP);
        for (i, (cases, deaths)) in counts.iter().enumerate() {
            report.add_new_bulletin(county(i, *cases, *deaths)).unwrap();
        }
        if let Some((cases, deaths)) = imported {
            let mut b = ImportedUndefinedBulletin::new(day(), State::SP, "https://saude.sp.gov.br");
            b.meta.confirmed_cases = cases;
            b.meta.deaths = deaths;
            report.add_new_bulletin(b.into()).unwrap();
        }

        let all: Vec<(Option<CaseCount>, Option<CaseCount>)> =
            counts.iter().copied().chain(imported).collect();
        let expected_cases = known_sum(all.iter().map(|(c, _)| *c));
        let expected_deaths = known_sum(all.iter().map(|(_, d)| *d));

        prop_assert_eq!(report.total_mode(), TotalMode::AutoComputed);
        prop_assert_eq!(report.total_confirmed_cases(), Some(CaseCount::Count(expected_cases)));
        prop_assert_eq!(report.total_deaths(), Some(CaseCount::Count(expected_deaths)));
        prop_assert_eq!(report.check_total_confirmed_cases(expected_cases), Ok(true));
        prop_assert_eq!(report.check_total_deaths(expected_deaths), Ok(true));
    }
}

proptest! {
    #[test]
    fn prop_total_is_order_independent(
        counts in prop::collection::vec((0u64..1_000, 0u64..100), 1..20),
    ) {
        let mut forward = FullReport::new(day(), State::SP);
        let mut backward = FullReport::new(day(), State::SP);
        for (i, (cases, deaths)) in counts.iter().enumerate() {
            forward
                .add_new_bulletin(county(i, Some((*cases).into()), Some((*deaths).into())))
                .unwrap();
        }
        for (i, (cases, deaths)) in counts.iter().enumerate().rev() {
            backward
                .add_new_bulletin(county(i, Some((*cases).into()), Some((*deaths).into())))
                .unwrap();
        }
        prop_assert_eq!(forward.total_confirmed_cases(), backward.total_confirmed_cases());
        prop_assert_eq!(forward.total_deaths(), backward.total_deaths());
        prop_assert_eq!(forward.to_csv_rows(), backward.to_csv_rows());
    }
}

proptest! {
    #[test]
    fn prop_published_total_is_never_mutated(
        before in prop::collection::vec((0u64..1_000, 0u64..100), 0..10),
        after in prop::collection::vec((0u64..1_000, 0u64..100), 0..10),
        published in (0u64..100_000, 0u64..10_000),
    ) {
        let mut report = FullReport::new(day(), State::SP);
        for (i, (cases, deaths)) in before.iter().enumerate() {
            report
                .add_new_bulletin(county(i, Some((*cases).into()), Some((*deaths).into())))
                .unwrap();
        }

        let total = StateTotalBulletin::new(day(), State::SP, "https://saude.sp.gov.br/boletim")
            .with_confirmed_cases(published.0)
            .with_deaths(published.1);
        report.add_new_bulletin(total.clone().into()).unwrap();

        for (i, (cases, deaths)) in after.iter().enumerate() {
            report
                .add_new_bulletin(county(100 + i, Some((*cases).into()), Some((*deaths).into())))
                .unwrap();
        }

        prop_assert_eq!(report.total_mode(), TotalMode::Overridden);
        prop_assert_eq!(report.total_bulletin(), &total);
        prop_assert_eq!(report.county_bulletins().len(), before.len() + after.len());
    }
}

proptest! {
    #[test]
    fn prop_rows_are_sorted_and_total_is_last(
        names in prop::collection::hash_set("[A-Z][a-z]{1,8}", 0..15),
    ) {
        let mut report = FullReport::new(day(), State::SP);
        for name in &names {
            let b = CountyBulletin::new(day(), State::SP, name.clone(), "src")
                .unwrap()
                .with_confirmed_cases(1u64);
            report.add_new_bulletin(b.into()).unwrap();
        }

        let rows = report.to_csv_rows();
        prop_assert_eq!(rows.len(), names.len() + 1);

        let cities: Vec<&String> = rows[..names.len()].iter().map(|r| &r.city).collect();
        let mut sorted = cities.clone();
        sorted.sort();
        prop_assert_eq!(cities, sorted);

        let last = rows.last().unwrap();
        prop_assert_eq!(last.place_type, PlaceType::State);
    }
}
