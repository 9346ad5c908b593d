//! Tabular simulation logs: comma-separated, one header row, numeric cells.

use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Log '{path}' has no header row")]
    MissingHeader { path: String },
    #[error("Log '{path}' has no data rows")]
    Empty { path: String },
    #[error("Non-numeric value '{value}' in column '{column}' on data row {row} of '{path}'")]
    NonNumeric {
        path: String,
        row: usize,
        column: String,
        value: String,
    },
    #[error("Log '{path}' has columns {found:?} but the preceding logs have {expected:?}")]
    ColumnMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl RunLogError {
    pub fn path(&self) -> &str {
        match self {
            Self::Io { path, .. }
            | Self::Csv { path, .. }
            | Self::MissingHeader { path }
            | Self::Empty { path }
            | Self::NonNumeric { path, .. }
            | Self::ColumnMismatch { path, .. } => path,
        }
    }
}

/// A scalar time series table stored column by column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunLog {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl RunLog {
    /// Builds a log from named columns. All columns must have the same length.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Self {
        let (columns, values) = columns.into_iter().unzip();
        Self { columns, values }
    }

    pub fn read_path(path: &Path) -> Result<Self, RunLogError> {
        let display = path.to_string_lossy().to_string();
        let file = File::open(path).map_err(|e| RunLogError::Io {
            path: display.clone(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| RunLogError::Csv {
                path: display.clone(),
                source: e,
            })?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(RunLogError::MissingHeader { path: display });
        }

        let mut values = vec![Vec::new(); columns.len()];
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| RunLogError::Csv {
                path: display.clone(),
                source: e,
            })?;
            for ((cell, column), name) in record.iter().zip(values.iter_mut()).zip(&columns) {
                let value = cell.parse::<f64>().map_err(|_| RunLogError::NonNumeric {
                    path: display.clone(),
                    row: row + 1,
                    column: name.clone(),
                    value: cell.to_string(),
                })?;
                column.push(value);
            }
        }
        if values[0].is_empty() {
            return Err(RunLogError::Empty { path: display });
        }
        Ok(Self { columns, values })
    }

    /// Reads the logs in order and concatenates their rows.
    ///
    /// Every part must have exactly the same columns as the first.
    pub fn read_concatenated<P: AsRef<Path>>(paths: &[P]) -> Result<Self, RunLogError> {
        let mut combined: Option<Self> = None;
        for path in paths {
            let path = path.as_ref();
            let part = Self::read_path(path)?;
            match combined.as_mut() {
                None => combined = Some(part),
                Some(log) => log.append(part, path)?,
            }
        }
        Ok(combined.unwrap_or_default())
    }

    fn append(&mut self, other: Self, path: &Path) -> Result<(), RunLogError> {
        if self.columns != other.columns {
            return Err(RunLogError::ColumnMismatch {
                path: path.to_string_lossy().to_string(),
                expected: self.columns.clone(),
                found: other.columns,
            });
        }
        for (mine, theirs) in self.values.iter_mut().zip(other.values) {
            mine.extend(theirs);
        }
        Ok(())
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Columns in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write_path(&self, path: &Path) -> Result<(), RunLogError> {
        let display = path.to_string_lossy().to_string();
        let csv_err = |e: csv::Error| RunLogError::Csv {
            path: display.clone(),
            source: e,
        };
        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        writer.write_record(&self.columns).map_err(csv_err)?;
        for row in 0..self.len() {
            writer
                .write_record(self.values.iter().map(|c| c[row].to_string()))
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|e| RunLogError::Io {
            path: display.clone(),
            source: e,
        })
    }
}
