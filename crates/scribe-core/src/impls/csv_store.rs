//! CsvRecordStore - 表形式の record store
//!
//! # 実装詳細
//! - 1 行目はヘッダ。question / status 列の名前は StoreLayout で決める
//! - ヘッダより短い行は欠けたセルを「無い」として扱う（flexible）
//! - ヘッダより長い行の余分なセルは書き戻さない
//! - 改行コードは読んだファイルに合わせる（CRLF のまま読めば CRLF で書く）

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::fs::{read_store, write_store};
use crate::domain::{Record, RecordSet, StatusFill, StoreError, StoreLayout};
use crate::ports::RecordStore;

pub struct CsvRecordStore {
    path: PathBuf,
    layout: StoreLayout,
    fill: StatusFill,
    /// Line ending of the last loaded file.
    crlf: AtomicBool,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>, layout: StoreLayout, fill: StatusFill) -> Self {
        Self {
            path: path.into(),
            layout,
            fill,
            crlf: AtomicBool::new(false),
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn parse(&self, bytes: &[u8]) -> Result<RecordSet, StoreError> {
        self.crlf.store(uses_crlf(bytes), Ordering::Relaxed);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .map(str::to_string)
            .collect();

        if !headers.contains(&self.layout.question_field) {
            return Err(StoreError::MissingField {
                path: self.path.clone(),
                field: self.layout.question_field.clone(),
            });
        }

        let mut set = RecordSet::new(headers.clone());
        for row in reader.records() {
            let row = row.map_err(|e| self.csv_error(e))?;

            let mut question = None;
            let mut status = None;
            let mut extra = Map::new();
            for (name, value) in headers.iter().zip(row.iter()) {
                if *name == self.layout.question_field {
                    question = Some(Value::String(value.to_string()));
                } else if *name == self.layout.status_field {
                    status = Some(Value::String(value.to_string()));
                } else {
                    extra.insert(name.clone(), Value::String(value.to_string()));
                }
            }
            set.push(Record::from_store(question, status, extra));
        }
        Ok(set)
    }

    fn render(&self, records: &RecordSet) -> Result<Vec<u8>, StoreError> {
        let fields = records.output_fields(&self.layout);
        let terminator = if self.crlf.load(Ordering::Relaxed) {
            csv::Terminator::CRLF
        } else {
            csv::Terminator::Any(b'\n')
        };
        let mut writer = csv::WriterBuilder::new()
            .terminator(terminator)
            .from_writer(Vec::new());
        writer
            .write_record(&fields)
            .map_err(|e| self.csv_error(e))?;

        for record in &records.records {
            let row: Vec<String> = fields
                .iter()
                .map(|field| {
                    if *field == self.layout.question_field {
                        record.question_cell().as_ref().map(cell_text).unwrap_or_default()
                    } else if *field == self.layout.status_field {
                        record
                            .status_cell(self.fill)
                            .as_ref()
                            .map(cell_text)
                            .unwrap_or_default()
                    } else {
                        record.extra.get(field).map(cell_text).unwrap_or_default()
                    }
                })
                .collect();
            writer.write_record(&row).map_err(|e| self.csv_error(e))?;
        }

        writer.into_inner().map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e.into_error(),
        })
    }
}

/// Does the first line end in `\r\n`?
fn uses_crlf(bytes: &[u8]) -> bool {
    match bytes.iter().position(|&b| b == b'\n') {
        Some(pos) => pos > 0 && bytes[pos - 1] == b'\r',
        None => false,
    }
}

/// Flatten a JSON value into a CSV cell.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
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
