use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column name to column index, built once from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<String, usize>,
    names: Vec<String>,
}

impl ColumnMap {
    /// Builds the map from header cells, rejecting repeated names.
    pub fn from_header<I, S>(header: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = ColumnMap::default();
        for (index, name) in header.into_iter().enumerate() {
            let name = name.into();
            if map.indices.contains_key(&name) {
                return Err(ConfigError::DuplicateColumn { name });
            }
            map.indices.insert(name.clone(), index);
            map.names.push(name);
        }
        Ok(map)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Looks a column up, failing with a startup error when it is absent.
    pub fn require(&self, family: &'static str, name: &str) -> ConfigResult<usize> {
        self.index_of(name).ok_or_else(|| ConfigError::MissingColumn {
            family,
            column: name.to_string(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A rule file loaded into memory: the column map plus every data row.
///
/// Rows are padded to the header width, so any cell addressed through the
/// column map exists. `lines` holds the source line of every row; blank
/// lines in the file yield no row, so the two can drift apart.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: ColumnMap,
    pub rows: Vec<Vec<String>>,
    pub lines: Vec<usize>,
}

impl Table {
    /// The cell at `row`/`column`, or `""` past the end of the table.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// One-based line number in the source file for a data row index.
    pub fn line_of(&self, row: usize) -> usize {
        self.lines.get(row).copied().unwrap_or(row + 2)
    }
}

/// Reads delimited rule files.
///
/// The source is buffered whole so that every row can be mapped back to its
/// line in the file. Headers are handled manually so that duplicate header
/// names can be rejected before any row is interpreted.
pub struct TableReader<R: Read> {
    source: R,
    delimiter: u8,
}

impl TableReader<File> {
    pub fn from_path(path: impl AsRef<Path>, delimiter: u8) -> ConfigResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, delimiter))
    }
}

impl<R: Read> TableReader<R> {
    pub fn new(source: R, delimiter: u8) -> Self {
        Self { source, delimiter }
    }

    /// Consumes the reader, producing the column map and all data rows.
    pub fn load(mut self) -> ConfigResult<Table> {
        let mut data = String::new();
        self.source.read_to_string(&mut data)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data.as_bytes());
        let mut records = reader.records();

        let header = match records.next() {
            Some(record) => record?,
            None => return Err(ConfigError::EmptyFile),
        };
        let columns = ColumnMap::from_header(header.iter())?;
        let width = columns.len();

        let mut counter = LineCounter::new(data.as_bytes());
        let mut rows = Vec::new();
        let mut lines = Vec::new();
        for record in records {
            let record = record?;
            let start = record.position().map_or(0, |position| position.byte() as usize);
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < width {
                row.resize(width, String::new());
            }
            rows.push(row);
            lines.push(counter.line_at(start));
        }

        Ok(Table { columns, rows, lines })
    }
}

/// Maps record start offsets to one-based line numbers.
///
/// A record's offset points just past the previous terminator, before any
/// blank lines the csv reader skipped, so those are stepped over first.
/// Offsets must be requested in increasing order.
struct LineCounter<'a> {
    data: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0, line: 1 }
    }

    fn line_at(&mut self, byte: usize) -> usize {
        let rest = self.data.get(byte..).unwrap_or_default();
        let start = (byte + rest.iter().take_while(|b| matches!(b, b'\r' | b'\n')).count()).min(self.data.len());
        if start > self.offset {
            let skipped = &self.data[self.offset..start];
            self.line += skipped.iter().filter(|b| **b == b'\n').count();
            self.offset = start;
        }
        self.line
    }
}
