// tests/engine_invariants.rs
//
// Library-level checks of the documented engine properties, driven through
// the same path the dashboard uses: ingest -> filter -> engine.

use chrono::NaiveDate;

use subscription_analytics::engine::{self, GroupBy};
use subscription_analytics::{ingest, Granularity, Period, RecordFilter};

const CSV: &str = "\
CustomerID,PlanType,Segment,StartDate,EndDate,MonthlyRevenue
c1,basic,smb,2023-11-05,2024-02-10,10
c2,basic,enterprise,2023-12-01,,25
c3,premium,smb,2024-01-10,,40
c4,premium,enterprise,2024-01-15,2024-02-01,40
c5,basic,smb,2024-02-20,2024-03-30,10
c3,basic,smb,2022-03-01,2023-01-31,5
";

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn active_plus_inactive_equals_selection_size() {
    let ds = ingest::load_records(CSV).unwrap();
    for filter in [
        RecordFilter::all(),
        RecordFilter {
            plan_types: vec!["basic".into()],
            ..Default::default()
        },
        RecordFilter {
            period: Some(Period::new(d("2024-01-01"), d("2024-12-31")).unwrap()),
            segments: vec!["smb".into()],
            ..Default::default()
        },
    ] {
        let kept = filter.apply(&ds);
        let (a, i) = engine::active_vs_inactive(&kept, d("2024-03-01"));
        assert_eq!(a + i, kept.len());
    }
}

#[test]
fn churn_rate_is_a_fraction_of_active_customers() {
    let ds = ingest::load_records(CSV).unwrap();
    let all = RecordFilter::all().apply(&ds);

    // Feb 2024: active at Feb 1 = {c1, c2, c3, c4}; ended in Feb = {c1, c4}.
    let feb = Period::new(d("2024-02-01"), d("2024-02-29")).unwrap();
    let rate = engine::churn_rate(&all, feb);
    assert!((rate - 0.5).abs() < 1e-9, "got {rate}");

    // A window before anyone subscribed has no active customers: 0.0.
    let empty = Period::new(d("2020-01-01"), d("2020-12-31")).unwrap();
    assert_eq!(engine::churn_rate(&all, empty), 0.0);
}

#[test]
fn empty_sets_mean_no_restriction() {
    let ds = ingest::load_records(CSV).unwrap();
    let period_only = RecordFilter {
        period: Some(Period::new(d("2024-01-01"), d("2024-01-31")).unwrap()),
        plan_types: vec![],
        segments: vec![],
    };
    let kept = period_only.apply(&ds);
    assert_eq!(kept.len(), 2); // c3 and c4 started in January
}

#[test]
fn revenue_groupings_are_conservative() {
    let ds = ingest::load_records(CSV).unwrap();
    let all = RecordFilter::all().apply(&ds);

    let total: f64 = engine::revenue_summary(&all, GroupBy::None)
        .values()
        .sum();
    for group_by in [
        GroupBy::PlanType,
        GroupBy::Segment,
        GroupBy::PeriodBucket(Granularity::Month),
        GroupBy::PeriodBucket(Granularity::Week),
    ] {
        let grouped: f64 = engine::revenue_summary(&all, group_by).values().sum();
        assert!(
            (grouped - total).abs() < 1e-9,
            "{group_by:?} sums to {grouped}, total {total}"
        );
    }
}

#[test]
fn trend_is_chronological_and_event_conservative() {
    let ds = ingest::load_records(CSV).unwrap();
    let all = RecordFilter::all().apply(&ds);

    for granularity in [Granularity::Day, Granularity::Week, Granularity::Month] {
        let t = engine::trend(&all, granularity, false);
        assert!(t.windows(2).all(|w| w[0].bucket < w[1].bucket));

        let starts: usize = t.iter().map(|b| b.starts).sum();
        let ends: usize = t.iter().map(|b| b.ends).sum();
        assert_eq!(starts, all.len());
        let with_end = all.iter().filter(|r| r.end_date.is_some()).count();
        assert_eq!(ends, with_end);

        // Every reported bucket carries at least one event.
        assert!(t.iter().all(|b| b.starts + b.ends > 0));
    }
}
