//! CSV parsing with encoding and delimiter auto-detection.
//!
//! Produces a [`RawTable`]: a polars [`DataFrame`] of string columns, with
//! pandas-style missing-value tokens already mapped to null. Cell text is
//! never trimmed; the genre tag logic downstream depends on the exact bytes.

use polars::prelude::*;
use std::path::Path;

use crate::error::{DataError, DataResult};

/// Cell values read as missing, matching the pandas `read_csv` defaults.
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parsed CSV before any book-specific interpretation.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// One nullable `String` column per header, in file order.
    pub frame: DataFrame,
    /// Detected or used encoding.
    pub encoding: String,
    /// Detected or used delimiter.
    pub delimiter: char,
}

impl RawTable {
    /// Column headers, exactly as written.
    pub fn headers(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Fail with every absent column listed.
    pub fn require_columns(&self, required: &[&str]) -> DataResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataError::MissingColumns(missing))
        }
    }

    /// Cell text, `None` when missing or out of range.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.frame
            .column(column)
            .ok()?
            .as_materialized_series()
            .str()
            .ok()?
            .get(row)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 wins outright; otherwise chardet guesses.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding, dropping any BOM.
pub fn decode_content(bytes: &[u8], encoding: &str) -> DataResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => encoding_rs::Encoding::for_label(other.as_bytes())
            .map(|enc| enc.decode(bytes).0.into_owned())
            .ok_or_else(|| DataError::Encoding(format!("unsupported encoding '{}'", other)))?,
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Pick the most frequent separator in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse a CSV file from disk with auto-detection.
pub fn parse_csv_file<P: AsRef<Path>>(path: P) -> DataResult<RawTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse uploaded CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> DataResult<RawTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_string(&content, delimiter, encoding)
}

/// Parse decoded CSV text with an explicit delimiter.
///
/// Records longer than the header are rejected; shorter ones are padded
/// with missing cells. Blank lines are skipped.
pub fn parse_string(content: &str, delimiter: char, encoding: String) -> DataResult<RawTable> {
    if content.trim().is_empty() {
        return Err(DataError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter)
        .map_err(|_| DataError::Encoding(format!("delimiter '{}' is not a single byte", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(&e))?
        .iter()
        .map(String::from)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(DataError::NoHeaders);
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(&e))?;

        if record.len() > headers.len() {
            return Err(DataError::Parse {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                message: format!("found {} fields, expected {}", record.len(), headers.len()),
            });
        }

        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).and_then(non_missing));
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name.as_str().into(), values))
        .collect();

    Ok(RawTable {
        frame: DataFrame::new(columns)?,
        encoding,
        delimiter,
    })
}

fn non_missing(cell: &str) -> Option<String> {
    if NA_VALUES.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn csv_error(err: &csv::Error) -> DataError {
    DataError::Parse {
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_csv() {
        let table = parse_string("title,author\nDune,Herbert\nEmma,Austen", ',', "utf-8".into()).unwrap();

        assert_eq!(table.headers(), vec!["title", "author"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "title"), Some("Dune"));
        assert_eq!(table.cell(1, "author"), Some("Austen"));
    }

    #[test]
    fn test_quoted_genre_keeps_commas_and_spaces() {
        let csv = "title,genre\nThe Hobbit,\"Fantasy, Adventure\"";
        let table = parse_string(csv, ',', "utf-8".into()).unwrap();
        assert_eq!(table.cell(0, "genre"), Some("Fantasy, Adventure"));
    }

    #[test]
    fn test_na_tokens_become_missing() {
        let csv = "a,b,c,d\n,NA,nan,keep";
        let table = parse_string(csv, ',', "utf-8".into()).unwrap();
        assert_eq!(table.cell(0, "a"), None);
        assert_eq!(table.cell(0, "b"), None);
        assert_eq!(table.cell(0, "c"), None);
        assert_eq!(table.cell(0, "d"), Some("keep"));
        assert_eq!(table.frame.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_short_rows_padded() {
        let table = parse_string("a,b,c\n1,2", ',', "utf-8".into()).unwrap();
        assert_eq!(table.cell(0, "b"), Some("2"));
        assert_eq!(table.cell(0, "c"), None);
    }

    #[test]
    fn test_long_rows_rejected_with_line() {
        let err = parse_string("a,b\n1,2\n1,2,3", ',', "utf-8".into()).unwrap_err();
        match err {
            DataError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("3 fields"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_string("a;b\n1;2\n\n3;4\n", ';', "utf-8".into()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_bytes_auto(b""), Err(DataError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b"  \n"), Err(DataError::EmptyFile)));
    }

    #[test]
    fn test_require_columns_is_case_sensitive() {
        let table = parse_string("Title,author\nx,y", ',', "utf-8".into()).unwrap();
        match table.require_columns(&["title", "author", "genre"]) {
            Err(DataError::MissingColumns(cols)) => assert_eq!(cols, vec!["title", "genre"]),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(table.require_columns(&["author"]).is_ok());
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let err = parse_string("title,title\nA,B", ',', "utf-8".into()).unwrap_err();
        assert!(matches!(err, DataError::Frame(_)));
    }

    #[test]
    fn test_header_only_csv_has_no_rows() {
        let table = parse_string("title,author\n", ',', "utf-8".into()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers(), vec!["title", "author"]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_bom_stripped_from_header() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"title,author\nx,y");
        let table = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(table.headers()[0], "title");
        assert_eq!(table.encoding, "utf-8");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_parse_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "title,rating\nDune,4.3\n").unwrap();

        let table = parse_csv_file(file.path()).unwrap();
        assert_eq!(table.delimiter, ',');
        assert_eq!(table.cell(0, "rating"), Some("4.3"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_csv_file("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }
}
