//! record.rs — the immutable input row plus the derived activity status.
//!
//! Records are created once per ingestion pass and held read-only for the
//! session; every metric is a fresh view derived from them. `status` is not
//! stored: it depends on the analysis reference date, so it is computed on
//! demand.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One customer subscription period. A customer may appear in several rows
/// (one per subscription period); `customer_id` is unique per customer, not
/// per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub customer_id: String,
    /// Categorical plan label, e.g. "basic" / "premium".
    pub plan_type: String,
    /// Business-defined customer grouping label.
    pub segment: String,
    pub start_date: NaiveDate,
    /// `None` while the subscription is still open.
    pub end_date: Option<NaiveDate>,
    /// Monthly revenue attributed to this record, never negative.
    pub revenue: f64,
}

/// Activity status relative to an analysis reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

impl SubscriptionRecord {
    /// Derive the status against `reference`: active while the subscription
    /// has no end date or ends strictly after the reference date. An end date
    /// equal to the reference counts as already ended.
    pub fn status(&self, reference: NaiveDate) -> Status {
        match self.end_date {
            None => Status::Active,
            Some(end) if end > reference => Status::Active,
            Some(_) => Status::Inactive,
        }
    }

    /// True iff the customer was active at the given day (subscribed on or
    /// before it, not yet ended). Used by the churn denominator.
    pub fn active_at(&self, day: NaiveDate) -> bool {
        self.start_date <= day && self.end_date.map_or(true, |end| end >= day)
    }
}
