//! JsonRecordStore - 階層形式の record store
//!
//! ファイルはオブジェクトの配列。question / status 以外のキーは
//! 値の型ごとそのまま書き戻す。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::fs::{read_store, write_store};
use crate::domain::{Record, RecordSet, StatusFill, StoreError, StoreLayout};
use crate::ports::RecordStore;

pub struct JsonRecordStore {
    path: PathBuf,
    layout: StoreLayout,
    fill: StatusFill,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>, layout: StoreLayout, fill: StatusFill) -> Self {
        Self {
            path: path.into(),
            layout,
            fill,
        }
    }

    fn malformed(&self, row: usize, reason: impl Into<String>) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            row,
            reason: reason.into(),
        }
    }

    fn parse(&self, bytes: &[u8]) -> Result<RecordSet, StoreError> {
        let rows: Vec<Value> = serde_json::from_slice(bytes).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let mut fields: Vec<String> = Vec::new();
        let mut records = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            let Value::Object(mut object) = row else {
                return Err(self.malformed(idx + 1, "expected an object"));
            };

            let row_fields: Vec<String> = object.keys().cloned().collect();
            for key in &row_fields {
                if !fields.contains(key) {
                    fields.push(key.clone());
                }
            }

            let question = object.shift_remove(&self.layout.question_field);
            if let Some(other) = question.as_ref().filter(|v| !v.is_string() && !v.is_null()) {
                return Err(self.malformed(
                    idx + 1,
                    format!("{} must be a string, got {other}", self.layout.question_field),
                ));
            }
            let status = object.shift_remove(&self.layout.status_field);
            records.push(Record::from_store(question, status, object).with_row_fields(row_fields));
        }

        let mut set = RecordSet::new(fields);
        for record in records {
            set.push(record);
        }
        Ok(set)
    }

    fn render(&self, records: &RecordSet) -> Result<Vec<u8>, StoreError> {
        let fields = records.output_fields(&self.layout);
        let rows: Vec<Value> = records
            .records
            .iter()
            .map(|record| {
                // the row's own key order first, then keys it never had
                let order = record
                    .row_fields()
                    .iter()
                    .chain(fields.iter().filter(|f| !record.row_fields().contains(f)));

                let mut object = Map::new();
                for field in order {
                    let value = if *field == self.layout.question_field {
                        record.question_cell()
                    } else if *field == self.layout.status_field {
                        record.status_cell(self.fill)
                    } else {
                        record.extra.get(field).cloned()
                    };
                    if let Some(value) = value {
                        object.insert(field.clone(), value);
                    }
                }
                Value::Object(object)
            })
            .collect();

        let mut bytes = serde_json::to_vec_pretty(&rows).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn load(&self) -> Result<RecordSet, StoreError> {
        let bytes = read_store(&self.path).await?;
        self.parse(&bytes)
    }

    async fn save(&self, records: &RecordSet) -> Result<(), StoreError> {
        let bytes = self.render(records)?;
        write_store(&self.path, bytes).await
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
