//! Opaque handle on an observation or training file.
//!
//! A [`DatasetFile`] is what the file picker hands over: a name and the raw bytes. Prediction
//! forwards it untouched (CSV or FITS); retraining additionally peeks at the CSV header with
//! [`DatasetFile::inspect_csv`] to check that the label column exists before uploading.
use std::path::Path;

use crate::exoclass_errors::ExoclassError;

#[derive(Clone, PartialEq)]
pub struct DatasetFile {
    name: String,
    content: Vec<u8>,
}

// content can be megabytes, keep it out of logs
impl std::fmt::Debug for DatasetFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetFile")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Shape of a CSV dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub columns: Vec<String>,
    pub row_count: usize,
}

impl DatasetSummary {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

impl DatasetFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        DatasetFile {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: location of the file; its final component becomes the upload file name.
    ///
    /// Return
    /// ----------
    /// * The loaded handle, or [`ExoclassError::IoError`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ExoclassError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());
        Ok(DatasetFile { name, content })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Read the header and count the data rows of a CSV file.
    ///
    /// Rows are not validated: ragged lines are accepted and counted, since the
    /// server-side loader is the authority on the file contents.
    ///
    /// Return
    /// ----------
    /// * The column names and the number of records.
    /// * [`ExoclassError::CsvError`] if the content is not readable as CSV (e.g. a FITS file).
    pub fn inspect_csv(&self) -> Result<DatasetSummary, ExoclassError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(self.content.as_slice());

        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let row_count = reader.byte_records().filter(|r| r.is_ok()).count();

        Ok(DatasetSummary { columns, row_count })
    }
}
