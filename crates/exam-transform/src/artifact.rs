//! Persistence of the fitted preprocessor.
//!
//! The artifact is the JSON encoding of a [`FittedColumnTransformer`]. Parent
//! directories are created on save. Concurrent writers to the same path are
//! not coordinated.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::column_transformer::FittedColumnTransformer;
use crate::error::{Result, TransformError};

/// Default artifact location, relative to the working directory.
pub const DEFAULT_ARTIFACT_PATH: &str = "artifacts/preprocessor.json";

/// What was written by [`save_preprocessor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReceipt {
    pub path: PathBuf,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

fn io_error(path: &Path, source: std::io::Error) -> TransformError {
    TransformError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    }
}

/// Serialize `preprocessor` to `path`, replacing any existing file.
pub fn save_preprocessor(
    preprocessor: &FittedColumnTransformer,
    path: &Path,
) -> Result<ArtifactReceipt> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let bytes =
        serde_json::to_vec_pretty(preprocessor).map_err(|source| TransformError::ArtifactFormat {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, &bytes).map_err(|e| io_error(path, e))?;

    let receipt = ArtifactReceipt {
        path: path.to_path_buf(),
        bytes: bytes.len() as u64,
        sha256: hex::encode(Sha256::digest(&bytes)),
    };
    debug!(path = %path.display(), bytes = receipt.bytes, "wrote preprocessor artifact");
    Ok(receipt)
}

/// Read a preprocessor written by [`save_preprocessor`].
pub fn load_preprocessor(path: &Path) -> Result<FittedColumnTransformer> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| TransformError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_transformer::{Branch, ColumnTransformer};
    use crate::preprocessor::numeric_pipeline;
    use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

    fn fitted() -> FittedColumnTransformer {
        let df = DataFrame::new(vec![
            Series::new("reading_score".into(), vec![72.0f64, 90.0, 95.0]).into_column(),
        ])
        .unwrap();
        ColumnTransformer::new(vec![Branch::new(
            "num_pipeline",
            numeric_pipeline().unwrap(),
            ["reading_score"],
        )])
        .unwrap()
        .fit(&df)
        .unwrap()
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("artifacts").join("preprocessor.json");

        let receipt = save_preprocessor(&fitted(), &path).unwrap();

        assert!(path.exists());
        assert!(receipt.bytes > 0);
        assert_eq!(receipt.sha256.len(), 64);
        assert_eq!(fs::metadata(&path).unwrap().len(), receipt.bytes);
    }

    #[test]
    fn load_returns_saved_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preprocessor.json");
        let original = fitted();

        save_preprocessor(&original, &path).unwrap();
        let loaded = load_preprocessor(&path).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn same_parameters_give_same_digest() {
        let dir = tempfile::tempdir().unwrap();
        let a = save_preprocessor(&fitted(), &dir.path().join("a.json")).unwrap();
        let b = save_preprocessor(&fitted(), &dir.path().join("b.json")).unwrap();
        assert_eq!(a.sha256, b.sha256);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_preprocessor(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TransformError::ArtifactIo { .. }));
    }

    #[test]
    fn load_garbage_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"not json").unwrap();
        let err = load_preprocessor(&path).unwrap_err();
        assert!(matches!(err, TransformError::ArtifactFormat { .. }));
    }
}
