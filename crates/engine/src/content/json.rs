use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::atomic_io::write_text_atomic;

#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode json for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl JsonFileError {
    pub fn path(&self) -> &Path {
        match self {
            JsonFileError::Read { path, .. }
            | JsonFileError::Parse { path, .. }
            | JsonFileError::Encode { path, .. }
            | JsonFileError::Write { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, JsonFileError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Reads and deserializes `path`. Parse failures carry the JSON path of the
/// offending value (`.` for the document root).
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, JsonFileError> {
    let raw = fs::read_to_string(path).map_err(|source| JsonFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json_str(path, &raw)
}

pub(crate) fn parse_json_str<T: DeserializeOwned>(
    path: &Path,
    raw: &str,
) -> Result<T, JsonFileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        JsonFileError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

pub fn write_json_file_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), JsonFileError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| JsonFileError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    write_text_atomic(path, &json).map_err(|source| JsonFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Slot {
        name: String,
        scores: Vec<u32>,
    }

    #[test]
    fn write_then_read_preserves_value() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("slot.json");
        let slot = Slot {
            name: "rex".to_string(),
            scores: vec![1, 2],
        };

        write_json_file_atomic(&path, &slot).expect("write");
        let decoded: Slot = read_json_file(&path).expect("read");

        assert_eq!(decoded, slot);
        let raw = fs::read_to_string(&path).expect("raw");
        assert!(raw.contains('\n'), "expected pretty output");
    }

    #[test]
    fn parse_error_reports_json_path() {
        let error = parse_json_str::<Slot>(
            Path::new("slot.json"),
            r#"{"name":"rex","scores":[1,"two"]}"#,
        )
        .expect_err("should fail");

        match error {
            JsonFileError::Parse { json_path, .. } => assert_eq!(json_path, "scores[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let error = read_json_file::<Slot>(&temp.path().join("missing.json"))
            .expect_err("should fail");
        assert!(error.is_not_found());
        assert!(error.path().ends_with("missing.json"));
    }
}
