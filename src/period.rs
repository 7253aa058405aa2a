//! # Periods & Buckets
//! Inclusive calendar-date ranges and the day/week/month truncation used by
//! the trend and revenue views.
//!
//! Bucket boundaries: weeks start on the ISO Monday, months on the first of
//! the month. Buckets are identified by their start date.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Inclusive date range. Construction validates `start <= end`, so a `Period`
/// that exists is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Time-bucket size for trend computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
}

impl Granularity {
    /// Truncate `day` to the start of its bucket.
    pub fn bucket(&self, day: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => day,
            Granularity::Week => day.week(Weekday::Mon).first_day(),
            Granularity::Month => day.with_day(1).expect("day 1 exists in every month"),
        }
    }

    /// Start of the bucket after the one containing `day`. Used when a trend
    /// is asked to fill gaps with explicit zero buckets.
    pub fn next_bucket(&self, day: NaiveDate) -> NaiveDate {
        let b = self.bucket(day);
        match self {
            Granularity::Day => b + Days::new(1),
            Granularity::Week => b + Days::new(7),
            Granularity::Month => {
                let (y, m) = if b.month() == 12 {
                    (b.year() + 1, 1)
                } else {
                    (b.year(), b.month() + 1)
                };
                NaiveDate::from_ymd_opt(y, m, 1).expect("first of month is valid")
            }
        }
    }

    /// Parse the lowercase wire form used in query strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            _ => None,
        }
    }
}
