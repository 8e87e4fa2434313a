//! Quota policy: decides how many records one run may publish.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Daily publish quota.
///
/// v1: weekday/rest-day split, plus per-date overrides for anything the
/// weekday rule can't express (holidays, catch-up days).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaPolicy {
    /// Quota on ordinary days.
    pub daily: usize,

    /// Quota on rest days.
    pub rest_day: usize,

    /// Days of the week that get `rest_day`.
    pub rest_days: Vec<Weekday>,

    /// Exact quota for specific dates. Wins over the weekday rule.
    pub overrides: BTreeMap<NaiveDate, usize>,
}

impl QuotaPolicy {
    /// Default policy: 4 a day, 8 on Saturday and Sunday.
    pub fn default_v1() -> Self {
        Self {
            daily: 4,
            rest_day: 8,
            rest_days: vec![Weekday::Sat, Weekday::Sun],
            overrides: BTreeMap::new(),
        }
    }

    /// Same quota every day.
    pub fn fixed(n: usize) -> Self {
        Self {
            daily: n,
            rest_day: n,
            rest_days: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn is_rest_day(&self, date: NaiveDate) -> bool {
        self.rest_days.contains(&date.weekday())
    }

    /// Quota for `date`. Deterministic: same date, same answer.
    pub fn quota_for(&self, date: NaiveDate) -> usize {
        if let Some(n) = self.overrides.get(&date) {
            return *n;
        }
        if self.is_rest_day(date) {
            self.rest_day
        } else {
            self.daily
        }
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::default_v1()
    }
}
