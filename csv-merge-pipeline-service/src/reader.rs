use crate::encoding::{decode_lossy, detect_file_encoding};
use csv::ReaderBuilder;
use csv_merge_service::dto::{Dataset, InputFile, Row};
use csv_merge_service::error::ServiceError;
use csv_merge_service::util::read_file_bytes;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads one delimited text file of unknown encoding into a `Dataset`.
#[derive(Clone, Debug)]
pub struct FileHandler {
    path: PathBuf,
    delimiter: u8,
}

impl FileHandler {
    pub fn new<P: Into<PathBuf>>(path: P, delimiter: u8) -> Self {
        FileHandler {
            path: path.into(),
            delimiter,
        }
    }

    pub fn from_input(input: &InputFile) -> Self {
        Self::new(&input.path, input.delimiter)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    ///
    /// Loads the whole file, decodes it and parses it into rows.
    ///
    /// Undecodable bytes are replaced rather than rejected. Every cell is
    /// trimmed and loses one surrounding double quote on each side.
    ///
    pub fn read_file(&self) -> Result<Dataset, ServiceError> {
        let bytes = read_file_bytes(&self.path)?;
        let detected = detect_file_encoding(&bytes);
        let (text, encoding, malformed) = decode_lossy(&bytes, detected);
        debug!(
            path = %self.path.display(),
            encoding = encoding.name(),
            detected = detected.is_some(),
            "decoded input file"
        );
        if malformed {
            warn!(
                path = %self.path.display(),
                encoding = encoding.name(),
                "file contains bytes that could not be decoded, replaced with U+FFFD"
            );
        }
        parse_rows(&text, self.delimiter).map_err(|err| self.read_error(err.msg))
    }

    fn read_error<T: std::fmt::Display>(&self, err: T) -> ServiceError {
        ServiceError::read(format!(
            "Error reading file {}: {}",
            self.path.display(),
            err
        ))
    }
}

///
/// Parses decoded text into rows. No header row; rows may differ in length.
///
/// A blank line yields an empty row in its place.
///
pub fn parse_rows(text: &str, delimiter: u8) -> Result<Dataset, ServiceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let records = reader
        .records()
        .map(|record| match record {
            Ok(rec) => Ok(rec.iter().map(clean_cell).collect::<Row>()),
            Err(err) => Err(ServiceError::read(err)),
        })
        .collect::<Result<Dataset, ServiceError>>()?;

    // csv skips blank lines, put them back where they were
    let layout = line_layout(text.as_bytes(), delimiter);
    if layout.iter().filter(|&&blank| !blank).count() != records.len() {
        debug!(
            lines = layout.len(),
            records = records.len(),
            "line layout disagrees with parsed records, keeping records only"
        );
        return Ok(records);
    }
    let mut records = records.into_iter();
    Ok(layout
        .into_iter()
        .map(|blank| {
            if blank {
                Row::new()
            } else {
                records.next().unwrap_or_default()
            }
        })
        .collect())
}

/// One entry per logical line, `true` where the line is blank. Line breaks
/// inside a quoted field do not end a line.
fn line_layout(bytes: &[u8], delimiter: u8) -> Vec<bool> {
    let mut layout = Vec::new();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut line_empty = true;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else if b == b'\n' || b == b'\r' {
            if b == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                i += 1;
            }
            layout.push(line_empty);
            line_empty = true;
            field_start = true;
            i += 1;
            continue;
        } else if b == b'"' && field_start {
            in_quotes = true;
        }
        line_empty = false;
        field_start = !in_quotes && b == delimiter;
        i += 1;
    }
    if !line_empty {
        layout.push(false);
    }
    layout
}

/// Trims whitespace, then drops at most one `"` from each end.
pub fn clean_cell(cell: &str) -> String {
    let cell = cell.trim();
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    let cell = cell.strip_suffix('"').unwrap_or(cell);
    cell.to_string()
}
