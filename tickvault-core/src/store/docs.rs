//! Whole-document JSON persistence.
//!
//! Every logical unit is one file, always replaced in full — there are no
//! partial or append writes. Writes go to a `.tmp` sibling first and are
//! renamed into place; parent directories are created on demand. Reading
//! a document that does not exist yields `Ok(None)`: "nothing stored yet"
//! is not a failure.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| StoreError::io("creating", parent, err))?;
    }

    let bytes = serde_json::to_vec(value).map_err(|err| StoreError::Document {
        path: path.to_path_buf(),
        source: err,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|err| StoreError::io("writing", &tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| {
        let _ = fs::remove_file(&tmp);
        StoreError::io("replacing", path, err)
    })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::io("reading", path, err)),
    };

    let value = serde_json::from_slice(&bytes).map_err(|err| StoreError::Document {
        path: path.to_path_buf(),
        source: err,
    })?;
    Ok(Some(value))
}
