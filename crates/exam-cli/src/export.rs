//! CSV export of transformed arrays.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::debug;

use crate::pipeline::TransformationOutput;

pub const TRAIN_ARRAY_FILE: &str = "train_array.csv";
pub const TEST_ARRAY_FILE: &str = "test_array.csv";

/// Write the train and test arrays of `output` into `dir`, each with its own
/// header.
///
/// Both header widths are checked before either file is written.
pub fn export_arrays(output: &TransformationOutput, dir: &Path) -> csv::Result<(PathBuf, PathBuf)> {
    let train_header = output.train_header();
    let test_header = output.test_header();
    check_width(TRAIN_ARRAY_FILE, &train_header, &output.train_array)?;
    check_width(TEST_ARRAY_FILE, &test_header, &output.test_array)?;

    let train_path = dir.join(TRAIN_ARRAY_FILE);
    let test_path = dir.join(TEST_ARRAY_FILE);
    write_array_csv(&train_path, &train_header, &output.train_array)?;
    write_array_csv(&test_path, &test_header, &output.test_array)?;
    Ok((train_path, test_path))
}

fn check_width(name: &str, header: &[String], array: &Array2<f64>) -> csv::Result<()> {
    if header.len() == array.ncols() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{name}: header has {} columns but the array has {}",
                header.len(),
                array.ncols()
            ),
        )
        .into())
    }
}

/// Write `array` to `path` as CSV with `header` as the first record.
///
/// Parent directories are created as needed; an existing file is replaced.
pub fn write_array_csv(path: &Path, header: &[String], array: &Array2<f64>) -> csv::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in array.rows() {
        writer.write_record(row.iter().map(f64::to_string))?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = array.nrows(), "exported array");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn writes_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("train_array.csv");
        let header = vec!["num_pipeline__reading_score".to_string(), "math_score".to_string()];

        write_array_csv(&path, &header, &array![[0.5, 72.0], [1.25, 69.0]]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "num_pipeline__reading_score,math_score\n0.5,72\n1.25,69\n"
        );
    }
}
