//! CSV file reading into Polars DataFrames.

use std::path::Path;

use polars::prelude::{CsvParseOptions, CsvReadOptions, DataFrame, NullValues, SerReader};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Number of rows Polars inspects when inferring column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Cell contents read as missing, in addition to empty fields. These are the
/// markers common spreadsheet and dataframe exports write for missing data.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn ensure_readable(path: &Path) -> Result<()> {
    std::fs::metadata(path).map(|_| ()).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Validate DataFrame shape after loading.
///
/// Rejects tables without data rows and tables with blank column names.
pub fn validate_dataframe_shape(df: &DataFrame, path: &Path) -> Result<()> {
    if df.height() == 0 {
        return Err(IngestError::EmptyDataFrame {
            path: path.to_path_buf(),
        });
    }

    for name in df.get_column_names() {
        if name.trim().is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

/// Reads a comma-delimited file with a single header row.
///
/// Empty fields and [`NULL_TOKENS`] are read as nulls, which downstream
/// imputation fills.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    ensure_readable(path)?;

    let null_values = NullValues::AllColumns(NULL_TOKENS.iter().map(|t| (*t).into()).collect());
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    validate_dataframe_shape(&df, path)?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded CSV table"
    );
    Ok(df)
}
