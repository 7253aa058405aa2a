//! filter.rs — dashboard filter selection applied before any aggregation.
//!
//! Mirrors the sidebar controls: a time period plus plan-type and segment
//! multiselects. Empty sets mean "no restriction", never "exclude all"; an
//! invalid period cannot be represented because `Period` validates on
//! construction.

use crate::period::Period;
use crate::record::SubscriptionRecord;

/// Filter over the raw dataset. All fields optional; the default filter
/// keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Keep records whose `start_date` falls within this range (inclusive).
    pub period: Option<Period>,
    /// Keep records whose `plan_type` is in the set; empty = all plans.
    pub plan_types: Vec<String>,
    /// Keep records whose `segment` is in the set; empty = all segments.
    pub segments: Vec<String>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    fn keeps(&self, r: &SubscriptionRecord) -> bool {
        let in_period = self
            .period
            .map_or(true, |p| p.contains(r.start_date));
        let plan_ok = self.plan_types.is_empty() || self.plan_types.contains(&r.plan_type);
        let segment_ok = self.segments.is_empty() || self.segments.contains(&r.segment);
        in_period && plan_ok && segment_ok
    }

    /// Borrowing selection over the session dataset; the input is never
    /// mutated or copied.
    pub fn apply<'a>(&self, records: &'a [SubscriptionRecord]) -> Vec<&'a SubscriptionRecord> {
        records.iter().filter(|r| self.keeps(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn rec(id: &str, plan: &str, segment: &str, start: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            customer_id: id.into(),
            plan_type: plan.into(),
            segment: segment.into(),
            start_date: d(start),
            end_date: None,
            revenue: 5.0,
        }
    }

    fn dataset() -> Vec<SubscriptionRecord> {
        vec![
            rec("c1", "basic", "smb", "2024-01-10"),
            rec("c2", "premium", "enterprise", "2024-01-15"),
            rec("c3", "basic", "enterprise", "2024-02-20"),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let ds = dataset();
        assert_eq!(RecordFilter::all().apply(&ds).len(), 3);
    }

    #[test]
    fn empty_sets_restrict_by_period_only() {
        let ds = dataset();
        let f = RecordFilter {
            period: Some(Period::new(d("2024-01-01"), d("2024-01-31")).unwrap()),
            ..Default::default()
        };
        let kept = f.apply(&ds);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.start_date < d("2024-02-01")));
    }

    #[test]
    fn plan_and_segment_sets_intersect() {
        let ds = dataset();
        let f = RecordFilter {
            period: None,
            plan_types: vec!["basic".into()],
            segments: vec!["enterprise".into()],
        };
        let kept = f.apply(&ds);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].customer_id, "c3");
    }

    #[test]
    fn period_bounds_are_inclusive() {
        let ds = dataset();
        let f = RecordFilter {
            period: Some(Period::new(d("2024-01-10"), d("2024-01-15")).unwrap()),
            ..Default::default()
        };
        assert_eq!(f.apply(&ds).len(), 2);
    }
}
