//! Session table loading
//!
//! Timing exports arrive as CSV with unknown encoding and arbitrary column
//! names. Files are decoded by trying each candidate encoding in turn, parsed
//! with every column read as text, and columns are discovered by name.

use encoding_rs::Encoding;
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{PodiumError, Result};

/// Encodings tried in order when reading a file
pub const DEFAULT_ENCODINGS: [&str; 4] = ["utf-8", "latin1", "cp1252", "ISO-8859-1"];

/// Find the first column (left to right) matching any candidate name.
///
/// A column matches when its header equals a candidate, or contains it,
/// ignoring case. Columns are the outer loop, so an earlier column that only
/// contains a candidate wins over a later exact match.
pub fn find_column<S: AsRef<str>>(headers: &[S], candidates: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.as_ref().to_lowercase();
        candidates.iter().any(|candidate| {
            let candidate = candidate.to_lowercase();
            header == candidate || header.contains(&candidate)
        })
    })
}

/// Decode bytes with the named encoding, None on any malformed sequence
fn decode(bytes: &[u8], label: &str) -> Option<String> {
    let encoding = Encoding::for_label(label.as_bytes())?;
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(decoded.into_owned())
    }
}

/// A session export with every cell held as trimmed text
#[derive(Debug, Clone)]
pub struct SessionTable {
    name: String,
    headers: Vec<String>,
    columns: Vec<Vec<String>>,
    height: usize,
}

impl SessionTable {
    /// Read a CSV file, trying the default encodings
    pub fn read_csv<P: AsRef<Path>>(path: P, name: &str) -> Result<Self> {
        Self::read_csv_with_encodings(path, name, &DEFAULT_ENCODINGS)
    }

    /// Read a CSV file, accepting the first encoding that decodes and parses
    pub fn read_csv_with_encodings<P: AsRef<Path>>(
        path: P,
        name: &str,
        encodings: &[&str],
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| PodiumError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut last_error = String::from("no encodings to try");
        for &label in encodings {
            debug!("Trying encoding {} for {:?}", label, path);

            let Some(text) = decode(&bytes, label) else {
                last_error = format!("invalid {} byte sequence", label);
                debug!("Failed with encoding {}: {}", label, last_error);
                continue;
            };

            match Self::parse_csv(text, name) {
                Ok(table) => {
                    info!(
                        "Read {} data from {:?} ({}, {} rows): {:?}",
                        name,
                        path,
                        label,
                        table.height,
                        table.headers
                    );
                    return Ok(table);
                }
                Err(e) => {
                    warn!("Error with encoding {} for {:?}: {}", label, path, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(PodiumError::EncodingExhausted {
            path: path.to_path_buf(),
            tried: encodings.iter().map(|e| e.to_string()).collect(),
            last_error,
        })
    }

    /// Parse decoded CSV text with all columns as strings
    pub fn parse_csv(text: String, name: &str) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
            .finish()?;

        Self::from_dataframe(&df, name)
    }

    /// Convert a DataFrame, casting every column to text
    pub fn from_dataframe(df: &DataFrame, name: &str) -> Result<Self> {
        let mut headers = Vec::with_capacity(df.width());
        let mut columns = Vec::with_capacity(df.width());

        for series in df.get_columns() {
            headers.push(series.name().to_string());

            let text = series.cast(&DataType::String)?;
            let cells: Vec<String> = text
                .str()?
                .into_iter()
                .map(|cell| cell.map(|s| s.trim().to_string()).unwrap_or_default())
                .collect();
            columns.push(cells);
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            columns,
            height: df.height(),
        })
    }

    /// Build a table from in-memory rows
    pub fn from_rows(name: &str, headers: &[&str], rows: &[Vec<&str>]) -> Self {
        let columns = (0..headers.len())
            .map(|col| {
                rows.iter()
                    .map(|row| row.get(col).map(|s| s.trim().to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            columns,
            height: rows.len(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Column index for the first header matching any candidate
    pub fn find_column(&self, candidates: &[&str]) -> Option<usize> {
        find_column(&self.headers, candidates)
    }

    /// Locate a column the table cannot be used without
    pub fn require_column(&self, candidates: &[&str], role: &'static str) -> Result<usize> {
        self.find_column(candidates)
            .ok_or_else(|| PodiumError::MissingColumn {
                table: self.name.clone(),
                role,
            })
    }

    /// Cell text (empty for missing values)
    pub fn cell(&self, column: usize, row: usize) -> &str {
        self.columns
            .get(column)
            .and_then(|c| c.get(row))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Cell text for an optional column
    pub fn optional_cell(&self, column: Option<usize>, row: usize) -> Option<&str> {
        column.map(|c| self.cell(c, row))
    }
}
