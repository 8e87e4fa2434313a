//! Whole-file reads and writes shared by the file-backed stores.

use std::io::ErrorKind;
use std::path::Path;

use crate::domain::StoreError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read the whole store. A missing file is `StoreError::NotFound`.
pub(crate) async fn read_store(path: &Path) -> Result<Vec<u8>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(mut bytes) => {
            if bytes.starts_with(UTF8_BOM) {
                bytes.drain(..UTF8_BOM.len());
            }
            Ok(bytes)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(path.to_path_buf())),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replace the store content in one write.
pub(crate) async fn write_store(path: &Path, bytes: Vec<u8>) -> Result<(), StoreError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}
