//! Question records and the record set loaded from the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PublishStatus, StatusFill};

/// Names of the fields this system owns inside a store row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLayout {
    pub question_field: String,
    pub status_field: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            question_field: "Question".to_string(),
            status_field: "Status".to_string(),
        }
    }
}

/// One unit of work: a question plus its publish status.
///
/// Design:
/// - `question` and `status` are the only fields the runner understands.
/// - Everything else in the row lives in `extra` and is written back untouched.
/// - The raw question and status values are kept as read, so rows the run
///   never touched are written back exactly (absent stays absent, `null`
///   stays `null`, `true` stays `true`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub question: String,
    pub status: PublishStatus,
    question_raw: Option<Value>,
    status_raw: Option<Value>,
    /// Key order of this row as read. Empty for tabular stores.
    row_fields: Vec<String>,
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            question_raw: Some(Value::String(question.clone())),
            question,
            status: PublishStatus::Pending,
            status_raw: None,
            row_fields: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Build a record from raw question and status values as found in the store.
    ///
    /// Only a string status is interpreted; any other value reads as `Pending`.
    pub fn from_store(
        question: Option<Value>,
        status: Option<Value>,
        extra: Map<String, Value>,
    ) -> Self {
        Self {
            question: question
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            status: PublishStatus::parse(status.as_ref().and_then(Value::as_str)),
            question_raw: question,
            status_raw: status,
            row_fields: Vec::new(),
            extra,
        }
    }

    /// Remember the row's own key order.
    pub fn with_row_fields(mut self, fields: Vec<String>) -> Self {
        self.row_fields = fields;
        self
    }

    pub fn row_fields(&self) -> &[String] {
        &self.row_fields
    }

    pub fn with_status(mut self, status: PublishStatus) -> Self {
        self.status = status;
        self.status_raw = Some(Value::String(status.as_str().to_string()));
        self
    }

    pub fn is_published(&self) -> bool {
        self.status.is_terminal()
    }

    /// Unpublished and has a question to write about.
    pub fn is_eligible(&self) -> bool {
        !self.is_published() && !self.question.trim().is_empty()
    }

    /// Mark as published (article written).
    pub fn mark_published(&mut self) {
        self.status = PublishStatus::Published;
        self.status_raw = Some(Value::String(PublishStatus::Published.as_str().to_string()));
    }

    /// Question value to write back, or `None` when the row had none.
    pub fn question_cell(&self) -> Option<Value> {
        if self.question.is_empty() {
            self.question_raw.clone()
        } else {
            Some(Value::String(self.question.clone()))
        }
    }

    /// Status value to write back, or `None` when the row had none.
    pub fn status_cell(&self, fill: StatusFill) -> Option<Value> {
        match fill {
            StatusFill::Preserve => self.status_raw.clone(),
            StatusFill::Explicit => Some(Value::String(self.status.as_str().to_string())),
        }
    }
}

/// All records of a store, in store order, plus the field layout.
///
/// `fields` is the column order seen when loading (the CSV header, or the
/// first-seen key order of JSON objects). Saving reuses it so unknown
/// columns keep their position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub fields: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Field order to use on rewrite.
    ///
    /// The question field is guaranteed present; the status field is
    /// appended when the store never had one.
    pub fn output_fields(&self, layout: &StoreLayout) -> Vec<String> {
        let mut fields = self.fields.clone();
        if !fields.contains(&layout.question_field) {
            fields.insert(0, layout.question_field.clone());
        }
        if !fields.contains(&layout.status_field) {
            fields.push(layout.status_field.clone());
        }
        fields
    }

    /// Indices of the first `limit` eligible records, in store order.
    pub fn pending_indices(&self, limit: usize) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_eligible())
            .map(|(i, _)| i)
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set_of(records: Vec<Record>) -> RecordSet {
        let mut set = RecordSet::new(vec!["Question".into(), "Status".into()]);
        for r in records {
            set.push(r);
        }
        set
    }

    #[test]
    fn new_record_starts_pending() {
        let record = Record::new("What is DNS?");
        assert_eq!(record.status, PublishStatus::Pending);
        assert!(!record.is_published());
        assert_eq!(record.status_cell(StatusFill::Preserve), None);
        assert_eq!(
            record.status_cell(StatusFill::Explicit),
            Some(json!("Pending"))
        );
    }

    #[test]
    fn mark_published_updates_status_cell() {
        let mut record = Record::from_store(Some(json!("What is DNS?")), Some(json!("")), Map::new());
        record.mark_published();
        assert!(record.is_published());
        assert_eq!(
            record.status_cell(StatusFill::Preserve),
            Some(json!("Published"))
        );
    }

    #[test]
    fn untouched_record_preserves_raw_status() {
        let record = Record::from_store(Some(json!("q")), Some(json!("Draft")), Map::new());
        assert_eq!(record.status, PublishStatus::Pending);
        assert_eq!(record.status_cell(StatusFill::Preserve), Some(json!("Draft")));
        assert_eq!(
            record.status_cell(StatusFill::Explicit),
            Some(json!("Pending"))
        );
    }

    #[test]
    fn non_string_status_reads_pending_and_is_kept() {
        let record = Record::from_store(Some(json!("q")), Some(json!(true)), Map::new());
        assert_eq!(record.status, PublishStatus::Pending);
        assert_eq!(record.status_cell(StatusFill::Preserve), Some(json!(true)));

        let record = Record::from_store(Some(json!("q")), Some(Value::Null), Map::new());
        assert_eq!(record.status_cell(StatusFill::Preserve), Some(Value::Null));
    }

    #[test]
    fn absent_question_stays_absent() {
        let record = Record::from_store(None, Some(json!("Published")), Map::new());
        assert_eq!(record.question, "");
        assert_eq!(record.question_cell(), None);

        let record = Record::from_store(Some(Value::Null), None, Map::new());
        assert_eq!(record.question_cell(), Some(Value::Null));

        assert_eq!(Record::new("q").question_cell(), Some(json!("q")));
    }

    #[test]
    fn extra_fields_are_kept() {
        let mut extra = Map::new();
        extra.insert("Level".into(), json!("Senior"));
        let record = Record::from_store(Some(json!("q")), None, extra.clone());
        assert_eq!(record.extra, extra);
    }

    #[test]
    fn output_fields_append_missing_status() {
        let set = RecordSet::new(vec!["Id".into(), "Question".into()]);
        let fields = set.output_fields(&StoreLayout::default());
        assert_eq!(fields, vec!["Id", "Question", "Status"]);
    }

    #[test]
    fn output_fields_keep_existing_order() {
        let set = RecordSet::new(vec!["Status".into(), "Question".into(), "Level".into()]);
        let fields = set.output_fields(&StoreLayout::default());
        assert_eq!(fields, vec!["Status", "Question", "Level"]);
    }

    #[test]
    fn pending_indices_skip_published_and_respect_limit() {
        let set = set_of(vec![
            Record::new("a").with_status(PublishStatus::Published),
            Record::new("b"),
            Record::new("c").with_status(PublishStatus::Published),
            Record::new("d"),
            Record::new("  "),
            Record::new("e"),
        ]);
        assert_eq!(set.pending_indices(2), vec![1, 3]);
        assert_eq!(set.pending_indices(10), vec![1, 3, 5]);
        assert!(set.pending_indices(0).is_empty());
    }
}
