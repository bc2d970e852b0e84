//! Tabular ingestion into raw throughput/latency vectors.
//!
//! Delimited text goes through `csv`, spreadsheets through `calamine`. Both
//! are reduced to rows of [`Cell`] so column selection, header handling and
//! numeric parsing are shared. The knee core validates and orders the
//! samples.

use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Column selector: header name or zero-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl FromStr for ColumnRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("column must not be empty".to_string());
        }
        Ok(match s.parse::<usize>() {
            Ok(i) => ColumnRef::Index(i),
            Err(_) => ColumnRef::Name(s.to_string()),
        })
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Name(name) => write!(f, "'{name}'"),
            ColumnRef::Index(i) => write!(f, "#{i}"),
        }
    }
}

/// Worksheet selector for spreadsheet input: sheet name or zero-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRef {
    Name(String),
    Index(usize),
}

impl FromStr for SheetRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("sheet must not be empty".to_string());
        }
        Ok(match s.parse::<usize>() {
            Ok(i) => SheetRef::Index(i),
            Err(_) => SheetRef::Name(s.to_string()),
        })
    }
}

/// Where the header sits. Rows above the header row are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRow {
    Absent,
    Row(usize),
}

impl Default for HeaderRow {
    fn default() -> Self {
        HeaderRow::Row(0)
    }
}

impl FromStr for HeaderRow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            return Ok(HeaderRow::Absent);
        }
        s.parse::<usize>()
            .map(HeaderRow::Row)
            .map_err(|_| format!("header must be a row index or 'none', got '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestOptions {
    pub throughput_col: ColumnRef,
    pub latency_col: ColumnRef,
    /// Overrides the delimiter implied by the file extension.
    pub delimiter: Option<u8>,
    pub header: HeaderRow,
    /// Spreadsheet only; the first sheet when unset.
    pub sheet: Option<SheetRef>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            throughput_col: ColumnRef::Index(0),
            latency_col: ColumnRef::Index(1),
            delimiter: None,
            header: HeaderRow::default(),
            sheet: None,
        }
    }
}

/// Raw columns as read from a file, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSamples {
    pub source: String,
    pub throughput: Vec<f64>,
    pub latency: Vec<f64>,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Delimited(u8),
    Workbook,
}

pub fn read_samples<P: AsRef<Path>>(path: P, opts: &IngestOptions) -> Result<RawSamples> {
    let path = path.as_ref();
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let raw = match input_format(path, opts.delimiter)? {
        InputFormat::Delimited(delimiter) => {
            let file =
                File::open(path).with_context(|| format!("failed to open: {}", path.display()))?;
            read_samples_from(file, &source, delimiter, opts)
        }
        InputFormat::Workbook => read_workbook(path, &source, opts),
    };
    raw.with_context(|| format!("failed reading samples from {}", path.display()))
}

fn input_format(path: &Path, delimiter: Option<u8>) -> Result<InputFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match (ext.as_str(), delimiter) {
        ("xlsx" | "xlsm" | "xls", d) => {
            if d.is_some() {
                debug!(path = %path.display(), "delimiter ignored for spreadsheet input");
            }
            Ok(InputFormat::Workbook)
        }
        (_, Some(d)) => Ok(InputFormat::Delimited(d)),
        ("csv", None) => Ok(InputFormat::Delimited(b',')),
        ("tsv" | "txt", None) => Ok(InputFormat::Delimited(b'\t')),
        _ => Err(anyhow!(
            "unsupported input extension '{}': {} (expected .csv, .tsv, .txt, .xlsx, .xlsm or .xls)",
            ext,
            path.display()
        )),
    }
}

/// One cell of input, independent of the file format.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn from_text(s: &str) -> Cell {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn from_workbook(d: &Data) -> Cell {
        match d {
            Data::Empty => Cell::Empty,
            Data::Float(v) => Cell::Number(*v),
            Data::Int(v) => Cell::Number(*v as f64),
            Data::String(s) => Cell::from_text(s.trim()),
            other => Cell::Text(other.to_string()),
        }
    }

    fn label(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Read delimited text from any reader; `source` labels the data in reports.
pub fn read_samples_from<R: Read>(
    reader: R,
    source: &str,
    delimiter: u8,
    opts: &IngestOptions,
) -> Result<RawSamples> {
    // Header handling is shared with spreadsheets, so csv sees plain rows.
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let rows = rdr.records().enumerate().map(|(idx, rec)| -> Result<Vec<Cell>> {
        let rec = rec.with_context(|| format!("failed reading row {idx}"))?;
        Ok(rec.iter().map(Cell::from_text).collect())
    });
    collect_samples(rows, source, opts)
}

fn read_workbook(path: &Path, file_label: &str, opts: &IngestOptions) -> Result<RawSamples> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook: {}", path.display()))?;
    let names = workbook.sheet_names();
    let sheet = match &opts.sheet {
        None => names
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("workbook has no sheets"))?,
        Some(SheetRef::Index(i)) => names
            .get(*i)
            .cloned()
            .ok_or_else(|| anyhow!("sheet #{i} out of range ({} sheets)", names.len()))?,
        Some(SheetRef::Name(name)) => {
            if !names.iter().any(|n| n == name) {
                bail!("missing sheet '{name}' (sheets: {})", names.join(", "));
            }
            name.clone()
        }
    };
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("failed reading sheet '{sheet}'"))?;
    debug!(sheet = %sheet, size = ?range.get_size(), "read worksheet");

    // The range starts at the first used cell; pad so indices count from A1.
    let (row0, col0) = range.start().unwrap_or((0, 0));
    let leading = (0..row0).map(|_| Ok::<_, anyhow::Error>(Vec::new()));
    let body = range.rows().map(|r| {
        let mut cells = vec![Cell::Empty; col0 as usize];
        cells.extend(r.iter().map(Cell::from_workbook));
        Ok::<_, anyhow::Error>(cells)
    });
    collect_samples(leading.chain(body), &format!("{file_label}:{sheet}"), opts)
}

/// Pick the selected columns out of `rows`, honouring the header row.
fn collect_samples<I>(mut rows: I, source: &str, opts: &IngestOptions) -> Result<RawSamples>
where
    I: Iterator<Item = Result<Vec<Cell>>>,
{
    let headers: Option<Vec<String>> = match opts.header {
        HeaderRow::Absent => None,
        HeaderRow::Row(n) => {
            let row = rows
                .nth(n)
                .transpose()
                .context("failed reading header row")?
                .ok_or_else(|| anyhow!("header row {n} is past the end of the input"))?;
            Some(row.iter().map(Cell::label).collect())
        }
    };
    let idx_x = resolve_column(&opts.throughput_col, headers.as_deref(), "throughput")?;
    let idx_y = resolve_column(&opts.latency_col, headers.as_deref(), "latency")?;
    let width_known = headers.is_some();
    debug!(source, idx_x, idx_y, "resolved input columns");

    let mut throughput = Vec::new();
    let mut latency = Vec::new();
    let mut skipped_rows = 0usize;
    for (row_idx, row) in rows.enumerate() {
        let record_no = row_idx + 1;
        let row = row?;
        if row.iter().all(|c| *c == Cell::Empty) {
            debug!(record_no, "skipping empty record");
            skipped_rows += 1;
            continue;
        }
        let x = cell_value(&row, idx_x, "throughput", record_no, width_known)?;
        let y = cell_value(&row, idx_y, "latency", record_no, width_known)?;
        match (x, y) {
            (Some(x), Some(y)) => {
                throughput.push(x);
                latency.push(y);
            }
            _ => {
                debug!(record_no, "skipping record with an empty cell");
                skipped_rows += 1;
            }
        }
    }

    if skipped_rows > 0 {
        warn!(source, skipped_rows, "skipped records with missing values");
    }
    debug!(source, samples = throughput.len(), "read samples");

    Ok(RawSamples {
        source: source.to_string(),
        throughput,
        latency,
        skipped_rows,
    })
}

/// Numeric value of `row[idx]`; `None` for a blank cell.
///
/// A short row is blank when the header fixes the width. Without a header an
/// index past the end of the row is an error.
fn cell_value(
    row: &[Cell],
    idx: usize,
    what: &str,
    record_no: usize,
    width_known: bool,
) -> Result<Option<f64>> {
    match row.get(idx) {
        None if width_known => Ok(None),
        None => Err(anyhow!(
            "{what} column #{idx} out of range at record {record_no} ({} columns)",
            row.len()
        )),
        Some(Cell::Empty) => Ok(None),
        Some(Cell::Number(v)) => Ok(Some(*v)),
        Some(Cell::Text(s)) => s
            .parse()
            .map(Some)
            .with_context(|| format!("invalid {what} '{s}' at record {record_no}")),
    }
}

fn resolve_column(col: &ColumnRef, headers: Option<&[String]>, what: &str) -> Result<usize> {
    match (col, headers) {
        (ColumnRef::Index(i), Some(h)) if *i >= h.len() => Err(anyhow!(
            "{what} column #{i} out of range ({} columns)",
            h.len()
        )),
        (ColumnRef::Index(i), _) => Ok(*i),
        (ColumnRef::Name(name), Some(h)) => h
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| anyhow!("missing {what} column '{name}'")),
        (ColumnRef::Name(name), None) => Err(anyhow!(
            "{what} column '{name}' selected by name but the input has no header row"
        )),
    }
}
