//! Status - record store の集計
//!
//! 何も生成せずに「残りいくつ・今日いくつ出すか」を説明する。

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::RecordSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub total: usize,
    pub pending: usize,
    pub published: usize,
    /// Rows without a question; never picked up.
    pub blank: usize,
}

impl StoreCounts {
    pub fn from_records(records: &RecordSet) -> Self {
        let mut counts = StoreCounts {
            total: records.len(),
            ..StoreCounts::default()
        };
        for record in &records.records {
            if record.is_published() {
                counts.published += 1;
            } else if record.is_eligible() {
                counts.pending += 1;
            } else {
                counts.blank += 1;
            }
        }
        counts
    }
}

/// Snapshot of the store as seen today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub store: PathBuf,
    pub date: NaiveDate,
    pub quota: usize,
    pub counts: StoreCounts,
}

impl StatusReport {
    /// Whole days of work left at today's quota.
    pub fn days_remaining(&self) -> Option<usize> {
        (self.quota > 0).then(|| self.counts.pending.div_ceil(self.quota))
    }
}
