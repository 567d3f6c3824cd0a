// ============================================================
// Layer 4 — Input Loaders
// ============================================================
// Reads the two pipeline inputs from disk.
//
//   TsvCaptionLoader → CaptionTable
//     A delimited text file with a header row. Only the `ID`
//     and `caption` columns are used; any others are ignored.
//     Fields may be wrapped in double quotes ("" is a quote);
//     a quoted field may contain the delimiter or a line break.
//
//       ID<TAB>caption
//       img_0001<TAB>Chest X-ray showing no acute findings.
//
//   JsonVectorLoader → ImageVectorStore
//     A JSON object mapping each identifier to its vector.
//
//       { "img_0001": [0.12, 0.98, ...], ... }
//
// Malformed input is fatal: the error names the file and
// what was expected.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::caption::{CaptionRecord, CaptionTable};
use crate::domain::image_vectors::ImageVectorStore;
use crate::domain::traits::{CaptionSource, VectorSource};
use crate::error::{PrepError, Result};

pub const ID_COLUMN:      &str = "ID";
pub const CAPTION_COLUMN: &str = "caption";

// ─── TsvCaptionLoader ─────────────────────────────────────────────────────────
pub struct TsvCaptionLoader {
    path:      PathBuf,
    delimiter: char,
}

impl TsvCaptionLoader {
    /// Tab-separated by default
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), delimiter: '\t' }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse caption rows from an in-memory string. `path` is only
    /// used in error messages.
    pub fn parse(&self, content: &str) -> Result<CaptionTable> {
        let mut rows = split_records(content.trim_start_matches('\u{FEFF}'), self.delimiter)
            .into_iter();

        let header = match rows.next() {
            Some(row) => row.fields,
            None => return Err(PrepError::input_format(&self.path, "file is empty")),
        };

        let id_col      = self.column(&header, ID_COLUMN)?;
        let caption_col = self.column(&header, CAPTION_COLUMN)?;
        let needed      = id_col.max(caption_col) + 1;

        let mut table = CaptionTable::default();
        for row in rows {
            if row.fields.len() < needed {
                return Err(PrepError::input_format(
                    &self.path,
                    format!(
                        "line {}: expected at least {} fields, found {}",
                        row.line,
                        needed,
                        row.fields.len()
                    ),
                ));
            }
            let id = row.fields[id_col].trim();
            if id.is_empty() {
                tracing::warn!("{}: skipping line {} with empty ID", self.path.display(), row.line);
                continue;
            }
            table.push(CaptionRecord::new(id, row.fields[caption_col].trim()));
        }

        tracing::info!("Loaded {} caption rows from '{}'", table.len(), self.path.display());
        Ok(table)
    }

    fn column(&self, header: &[String], name: &str) -> Result<usize> {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PrepError::MissingColumn {
                path:   self.path.clone(),
                column: name.to_string(),
            })
    }
}

impl CaptionSource for TsvCaptionLoader {
    fn load_all(&self) -> Result<CaptionTable> {
        let content = fs::read_to_string(&self.path).map_err(|e| PrepError::io(&self.path, e))?;
        self.parse(&content)
    }
}

/// One parsed record and the line it starts on (1-based).
struct Row {
    line:   usize,
    fields: Vec<String>,
}

/// Split `content` into records on `delim`, honouring double-quoted
/// fields. A quoted field may span line breaks. Blank lines are skipped.
fn split_records(content: &str, delim: char) -> Vec<Row> {
    let mut rows      = Vec::new();
    let mut fields    = Vec::new();
    let mut current   = String::new();
    let mut in_quotes = false;
    let mut quoted    = false;
    let mut line      = 1;
    let mut start     = 1;
    let mut chars     = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' if in_quotes => in_quotes = false,
            '"' if current.is_empty() => {
                in_quotes = true;
                quoted    = true;
            }
            '\n' if in_quotes => {
                current.push('\n');
                line += 1;
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut current));
                push_row(&mut rows, start, std::mem::take(&mut fields), quoted);
                quoted = false;
                line  += 1;
                start  = line;
            }
            c if c == delim && !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    push_row(&mut rows, start, fields, quoted);
    rows
}

fn push_row(rows: &mut Vec<Row>, line: usize, fields: Vec<String>, quoted: bool) {
    let blank = !quoted && fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        rows.push(Row { line, fields });
    }
}

// ─── JsonVectorLoader ─────────────────────────────────────────────────────────
pub struct JsonVectorLoader {
    path: PathBuf,
}

impl JsonVectorLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load several stores and merge them; later files win on conflicts.
    pub fn load_merged<P: AsRef<Path>>(paths: &[P]) -> Result<ImageVectorStore> {
        let mut store = ImageVectorStore::new();
        for p in paths {
            store.merge(JsonVectorLoader::new(p.as_ref()).load_all()?)?;
        }
        Ok(store)
    }
}

impl VectorSource for JsonVectorLoader {
    fn load_all(&self) -> Result<ImageVectorStore> {
        let content = fs::read_to_string(&self.path).map_err(|e| PrepError::io(&self.path, e))?;

        let raw: BTreeMap<String, Vec<f32>> = serde_json::from_str(&content).map_err(|e| {
            PrepError::input_format(
                &self.path,
                format!("expected a JSON object of identifier → number array: {e}"),
            )
        })?;

        let store = ImageVectorStore::from_pairs(raw)?;
        tracing::info!(
            "Image vectors loaded from '{}': {} ids, dim {}",
            self.path.display(),
            store.len(),
            store.dim().unwrap_or(0)
        );
        Ok(store)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_loads_tab_separated_captions() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "captions.tsv",
            "ID\tcaption\nimg1\tNo acute findings.\nimg2\tSmall effusion\n\nimg1\tSecond caption\n",
        );

        let table = TsvCaptionLoader::new(&path).load_all().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0], CaptionRecord::new("img1", "No acute findings."));
        assert_eq!(table.unique_ids(), vec!["img1", "img2"]);
    }

    #[test]
    fn test_extra_columns_and_order() {
        let loader = TsvCaptionLoader::new("inline.csv").with_delimiter(',');
        let table  = loader
            .parse("caption,source,ID\n\"mass, left lung\",ct,img9\n\"say \"\"hi\"\"\",xr,img8\n")
            .unwrap();
        assert_eq!(table.records()[0], CaptionRecord::new("img9", "mass, left lung"));
        assert_eq!(table.records()[1].caption, "say \"hi\"");
    }

    #[test]
    fn test_quoted_caption_spans_lines() {
        let table = TsvCaptionLoader::new("multi.tsv")
            .parse("ID\tcaption\nimg1\t\"line one\nline two\"\nimg2\tok\n")
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0], CaptionRecord::new("img1", "line one\nline two"));
        assert_eq!(table.records()[1], CaptionRecord::new("img2", "ok"));
    }

    #[test]
    fn test_crlf_and_line_numbers_after_multiline_field() {
        let err = TsvCaptionLoader::new("crlf.tsv")
            .parse("ID\tcaption\r\nimg1\t\"a\r\nb\"\r\nimg2\r\n")
            .unwrap_err();
        assert!(err.to_string().contains("line 4"), "{err}");
    }

    #[test]
    fn test_missing_caption_column() {
        let err = TsvCaptionLoader::new("bad.tsv")
            .parse("ID\ttext\nimg1\thello\n")
            .unwrap_err();
        match err {
            PrepError::MissingColumn { path, column } => {
                assert_eq!(path, PathBuf::from("bad.tsv"));
                assert_eq!(column, CAPTION_COLUMN);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_fatal() {
        let err = TsvCaptionLoader::new("short.tsv")
            .parse("ID\tcaption\nimg1\n")
            .unwrap_err();
        assert!(matches!(err, PrepError::InputFormat { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_empty_file_is_fatal() {
        assert!(TsvCaptionLoader::new("empty.tsv").parse("").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TsvCaptionLoader::new("/nonexistent/captions.tsv")
            .load_all()
            .unwrap_err();
        assert!(matches!(err, PrepError::Io { .. }));
    }

    #[test]
    fn test_loads_and_merges_vectors() {
        let dir   = tempfile::tempdir().unwrap();
        let train = write_file(dir.path(), "train.json", r#"{"a": [1.0, 2.0], "b": [3.0, 4.0]}"#);
        let valid = write_file(dir.path(), "valid.json", r#"{"c": [5.0, 6.0]}"#);

        let store = JsonVectorLoader::load_merged(&[train, valid]).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.dim(), Some(2));
        assert_eq!(store.get("c"), Some(&[5.0, 6.0][..]));
    }

    #[test]
    fn test_unreadable_vector_json() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.json", "[1, 2, 3]");
        let err  = JsonVectorLoader::new(&path).load_all().unwrap_err();
        assert!(matches!(err, PrepError::InputFormat { .. }));
    }

    #[test]
    fn test_ragged_vectors_rejected() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ragged.json", r#"{"a": [1.0], "b": [1.0, 2.0]}"#);
        let err  = JsonVectorLoader::new(&path).load_all().unwrap_err();
        assert!(matches!(err, PrepError::DimensionMismatch { .. }));
    }
}
