// Sparse, column-labelled table used by every dataset stage.
//
// Cells are optional: a missing value is ordinary data, not an error. Rows
// carry an index label that survives filtering, and the csv layout mirrors
// what the analysis notebooks consume (first column = row index).

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("row {row}: invalid index label `{label}`")]
    InvalidIndex { row: usize, label: String },
}

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Parse a raw csv field. Empty fields are missing values.
    pub fn parse(raw: &str) -> Option<Value> {
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Value::Number(n)),
            Ok(_) if raw.eq_ignore_ascii_case("nan") => None,
            _ => Some(Value::Text(raw.to_string())),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Duplicate column diagnostics
// ---------------------------------------------------------------------------

/// Column names that occur more than once. Reported, never auto-resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateColumns {
    pub names: Vec<String>,
}

impl DuplicateColumns {
    pub fn count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: Vec<usize>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            index: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`, in the order the pipeline logs it.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    /// Cell lookup by column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.cell(row, self.column_index(column)?)
    }

    /// Append a column (all cells missing) unless it already exists.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Append a row from `(column, value)` pairs. Unknown columns are added
    /// at the end in the order first seen; the row label is the next
    /// sequential label.
    pub fn push_record<I, S>(&mut self, record: I)
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut row = vec![None; self.columns.len()];
        for (name, value) in record {
            let idx = self.ensure_column(name.as_ref());
            if idx >= row.len() {
                row.resize(idx + 1, None);
            }
            row[idx] = Some(value);
        }
        row.resize(self.columns.len(), None);
        let label = self.index.last().map_or(self.rows.len(), |last| {
            (*last + 1).max(self.rows.len())
        });
        self.index.push(label);
        self.rows.push(row);
    }

    /// Append a row with an explicit label. The row is padded or truncated
    /// to the column count.
    pub fn push_row(&mut self, label: usize, mut cells: Vec<Option<Value>>) {
        cells.resize(self.columns.len(), None);
        self.index.push(label);
        self.rows.push(cells);
    }

    pub fn non_missing_in_column(&self, column: usize) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(column).is_some_and(Option::is_some))
            .count()
    }

    pub fn non_missing_in_row(&self, row: usize) -> usize {
        self.rows
            .get(row)
            .map_or(0, |cells| cells.iter().filter(|c| c.is_some()).count())
    }

    /// Keep only the columns for which `keep(position, name)` holds.
    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize, &str) -> bool,
    {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, name)| keep(*idx, name))
            .map(|(idx, _)| idx)
            .collect();
        self.select_columns(&kept);
    }

    /// Rebuild the column set from positions, in the given order.
    pub fn select_columns(&mut self, order: &[usize]) {
        self.columns = order.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            let mut taken: Vec<Option<Value>> = row.drain(..).collect();
            *row = order.iter().map(|&i| taken[i].take()).collect();
        }
    }

    /// Keep only the rows for which `keep(position, cells)` holds.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize, &[Option<Value>]) -> bool,
    {
        let mut position = 0;
        let mut kept_index = Vec::with_capacity(self.index.len());
        let index = std::mem::take(&mut self.index);
        self.rows.retain(|row| {
            let keep_row = keep(position, row.as_slice());
            if keep_row {
                kept_index.push(index[position]);
            }
            position += 1;
            keep_row
        });
        self.index = kept_index;
    }

    /// Copy of the rows whose text value in `column` satisfies `pred`.
    /// Labels are preserved.
    pub fn filter_by_text<F>(&self, column: &str, pred: F) -> Result<Table, TableError>
    where
        F: Fn(Option<&str>) -> bool,
    {
        let col = self.require_column(column)?;
        let mut out = Table::new(self.columns.iter().cloned());
        for (pos, row) in self.rows.iter().enumerate() {
            let text = row[col].as_ref().and_then(Value::as_text);
            if pred(text) {
                out.push_row(self.index[pos], row.clone());
            }
        }
        Ok(out)
    }

    /// Names that occur more than once in the header, each reported once.
    pub fn duplicate_columns(&self) -> DuplicateColumns {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for name in &self.columns {
            *seen.entry(name.as_str()).or_default() += 1;
        }
        let mut names = Vec::new();
        for name in &self.columns {
            if seen.get(name.as_str()).is_some_and(|&n| n > 1) && !names.contains(name) {
                names.push(name.clone());
            }
        }
        DuplicateColumns { names }
    }

    // -----------------------------------------------------------------------
    // CSV
    // -----------------------------------------------------------------------

    /// Write with an unnamed leading index column.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push("");
        header.extend(self.columns.iter().map(String::as_str));
        wtr.write_record(&header)?;

        for (label, row) in self.index.iter().zip(&self.rows) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(label.to_string());
            record.extend(
                row.iter()
                    .map(|cell| cell.as_ref().map(Value::to_string).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Read a csv. With `index_col`, the first column holds row labels;
    /// otherwise rows are labelled sequentially.
    pub fn read_csv<R: Read>(reader: R, index_col: bool) -> Result<Table, TableError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let csv_err = |source| TableError::Csv {
            path: "<reader>".into(),
            source,
        };
        let headers = rdr.headers().map_err(csv_err)?.clone();
        let skip = usize::from(index_col);
        let mut table = Table::new(headers.iter().skip(skip).map(str::to_string));

        for (pos, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_err)?;
            let label = if index_col {
                let raw = record.get(0).unwrap_or_default();
                raw.trim().parse::<usize>().map_err(|_| TableError::InvalidIndex {
                    row: pos,
                    label: raw.to_string(),
                })?
            } else {
                pos
            };
            let cells = record.iter().skip(skip).map(Value::parse).collect();
            table.push_row(label, cells);
        }
        Ok(table)
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TableError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let file = std::fs::File::create(path).map_err(|e| TableError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.write_csv(std::io::BufWriter::new(file))
            .map_err(|e| TableError::Csv {
                path: path.display().to_string(),
                source: e,
            })
    }

    pub fn load_csv(path: &Path, index_col: bool) -> Result<Table, TableError> {
        let file = std::fs::File::open(path).map_err(|e| TableError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Table::read_csv(file, index_col).map_err(|e| match e {
            TableError::Csv { source, .. } => TableError::Csv {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
