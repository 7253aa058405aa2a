//! # Metrics Engine
//! Pure, stateless aggregation over an immutable slice of subscription
//! records. No I/O, no caching, no shared state; every call recomputes from
//! the records handed to it, so the dashboard can re-invoke it on every
//! filter change.
//!
//! Input is assumed validated (the ingest step rejects malformed rows), so
//! nothing here returns an error. Rate computations with an empty
//! denominator are defined as `0.0` to keep the dashboard renderable.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::period::{Granularity, Period};
use crate::record::{Status, SubscriptionRecord};

/// One chronological bucket of subscription starts and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    /// Bucket start date (the day itself, ISO Monday, or first of month).
    pub bucket: NaiveDate,
    pub starts: usize,
    pub ends: usize,
}

/// Grouping key for the revenue view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// Single aggregate under the `"total"` key.
    None,
    PlanType,
    Segment,
    /// Bucket of `start_date`, keyed by the bucket's ISO start date.
    PeriodBucket(Granularity),
}

/// The headline numbers of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Distinct customers in the selection.
    pub total_customers: usize,
    /// Distinct customers with no subscription still active at the
    /// reference date.
    pub churned_customers: usize,
    /// `churned_customers / total_customers`, `0.0` on an empty selection.
    pub churned_share: f64,
    pub total_revenue: f64,
}

/// Partition the selection by derived status. The two counts always sum to
/// `records.len()`.
pub fn active_vs_inactive(records: &[&SubscriptionRecord], reference: NaiveDate) -> (usize, usize) {
    let active = records
        .iter()
        .filter(|r| r.status(reference) == Status::Active)
        .count();
    (active, records.len() - active)
}

/// Fraction of the customers active at `period.start()` whose subscription
/// ended within the period.
///
/// Both sides count distinct customers, and the numerator is restricted to
/// the denominator population, so the result is always in `[0.0, 1.0]`.
/// An empty denominator yields `0.0`, not an error.
pub fn churn_rate(records: &[&SubscriptionRecord], period: Period) -> f64 {
    let mut active_at_start: BTreeSet<&str> = BTreeSet::new();
    for r in records {
        if r.active_at(period.start()) {
            active_at_start.insert(r.customer_id.as_str());
        }
    }
    if active_at_start.is_empty() {
        return 0.0;
    }

    let mut churned: BTreeSet<&str> = BTreeSet::new();
    for r in records {
        if !active_at_start.contains(r.customer_id.as_str()) {
            continue;
        }
        if let Some(end) = r.end_date {
            if period.contains(end) {
                churned.insert(r.customer_id.as_str());
            }
        }
    }

    churned.len() as f64 / active_at_start.len() as f64
}

/// Bucket start/end events by date truncated to `granularity`, ordered
/// chronologically. Only buckets with at least one event appear unless
/// `fill_gaps` asks for explicit zero buckets between the first and last.
pub fn trend(
    records: &[&SubscriptionRecord],
    granularity: Granularity,
    fill_gaps: bool,
) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for r in records {
        buckets.entry(granularity.bucket(r.start_date)).or_default().0 += 1;
        if let Some(end) = r.end_date {
            buckets.entry(granularity.bucket(end)).or_default().1 += 1;
        }
    }

    if fill_gaps {
        if let (Some(&first), Some(&last)) =
            (buckets.keys().next(), buckets.keys().next_back())
        {
            let mut cursor = first;
            while cursor < last {
                buckets.entry(cursor).or_default();
                cursor = granularity.next_bucket(cursor);
            }
        }
    }

    buckets
        .into_iter()
        .map(|(bucket, (starts, ends))| TrendBucket {
            bucket,
            starts,
            ends,
        })
        .collect()
}

/// Total revenue per group. `GroupBy::None` yields a single `"total"` entry;
/// the grouped variants sum to the same overall total.
pub fn revenue_summary(
    records: &[&SubscriptionRecord],
    group_by: GroupBy,
) -> BTreeMap<String, f64> {
    let mut out: BTreeMap<String, f64> = BTreeMap::new();
    for r in records {
        let key = match group_by {
            GroupBy::None => "total".to_string(),
            GroupBy::PlanType => r.plan_type.clone(),
            GroupBy::Segment => r.segment.clone(),
            GroupBy::PeriodBucket(g) => g.bucket(r.start_date).to_string(),
        };
        *out.entry(key).or_insert(0.0) += r.revenue;
    }
    if matches!(group_by, GroupBy::None) && out.is_empty() {
        out.insert("total".to_string(), 0.0);
    }
    out
}

/// Headline KPI block: distinct customers, churned customers, churned share
/// and total revenue. A customer counts as churned when none of their
/// records is still active at `reference`.
pub fn kpi_summary(records: &[&SubscriptionRecord], reference: NaiveDate) -> KpiSummary {
    let mut customers: BTreeSet<&str> = BTreeSet::new();
    let mut with_active: BTreeSet<&str> = BTreeSet::new();
    let mut total_revenue = 0.0;

    for r in records {
        customers.insert(r.customer_id.as_str());
        if r.status(reference) == Status::Active {
            with_active.insert(r.customer_id.as_str());
        }
        total_revenue += r.revenue;
    }

    let total_customers = customers.len();
    let churned_customers = total_customers - with_active.len();
    let churned_share = if total_customers > 0 {
        churned_customers as f64 / total_customers as f64
    } else {
        0.0
    };

    KpiSummary {
        total_customers,
        churned_customers,
        churned_share,
        total_revenue,
    }
}
