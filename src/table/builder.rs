use super::constants;
use super::dimension::Dimension;
use super::grammar::ComponentRule;
use super::parser::{self, ParsedComponent, RowRange};
use crate::error::{ConfigError, ConfigResult};
use crate::interfaces::csv::table_reader::{ColumnMap, Table, TableReader};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// A configuration family: its columns, its grammar, and how its root object
/// is built from the parsed tree.
pub trait RuleFamily: Sized + Send + Sync + 'static {
    const NAME: &'static str;

    /// Column indices the family reads, resolved once per file.
    type Columns;

    fn columns(map: &ColumnMap) -> ConfigResult<Self::Columns>;

    fn grammar(columns: &Self::Columns) -> ComponentRule;

    fn construct(source: &RuleSource<'_, Self::Columns>, root: &ParsedComponent) -> ConfigResult<Self>;
}

/// Loads a rule file from disk and builds the family's rule set.
pub fn load<F: RuleFamily>(path: impl AsRef<Path>, delimiter: u8) -> ConfigResult<F> {
    let path = path.as_ref();
    let table = TableReader::from_path(path, delimiter)?.load()?;
    info!(
        family = F::NAME,
        path = %path.display(),
        rows = table.rows.len(),
        "loaded rule file"
    );
    build(&table)
}

/// Builds a rule set from an in-memory table.
pub fn build<F: RuleFamily>(table: &Table) -> ConfigResult<F> {
    let columns = F::columns(&table.columns)?;
    let grammar = F::grammar(&columns);
    let root = parser::parse(&grammar, &table.rows, RowRange::new(0, table.rows.len()));
    let source = RuleSource {
        table,
        columns: &columns,
        family: F::NAME,
    };
    F::construct(&source, &root)
}

/// Read access to the rows behind a parsed tree, used by the per-family
/// constructors.
pub struct RuleSource<'a, C> {
    pub table: &'a Table,
    pub columns: &'a C,
    pub family: &'static str,
}

/// Implemented by every typed object built from a parsed component.
pub trait FromComponent<C>: Sized {
    fn construct(source: &RuleSource<'_, C>, component: &ParsedComponent) -> ConfigResult<Self>;
}

impl<'a, C> RuleSource<'a, C> {
    pub fn cell(&self, row: usize, column: usize) -> &'a str {
        self.table.cell(row, column)
    }

    /// Source line of the component's anchor row.
    pub fn line(&self, component: &ParsedComponent) -> usize {
        self.table.line_of(component.anchor())
    }

    /// Cell on the component's anchor row.
    pub fn anchor_cell(&self, component: &ParsedComponent, column: usize) -> &'a str {
        self.cell(component.anchor(), column)
    }

    /// Non-empty anchor cell, `None` when blank.
    pub fn optional(&self, component: &ParsedComponent, column: usize) -> Option<&'a str> {
        Some(self.anchor_cell(component, column)).filter(|cell| !cell.is_empty())
    }

    pub fn flag(&self, component: &ParsedComponent, column: usize) -> bool {
        self.anchor_cell(component, column).eq_ignore_ascii_case("TRUE")
    }

    /// Values read down `column` from the top of `range`, ending at the first
    /// blank cell. A value appearing below that blank is a shape error.
    pub fn column_list(&self, range: RowRange, column: usize) -> ConfigResult<Vec<String>> {
        let mut values = Vec::new();
        let mut ended = false;
        for row in range.rows() {
            let cell = self.cell(row, column);
            if cell.is_empty() {
                ended = true;
            } else if ended {
                return Err(ConfigError::Shape {
                    family: self.family,
                    row: self.table.line_of(row),
                    message: format!(
                        "value '{cell}' in column '{}' is separated from its list by a blank cell",
                        self.column_name(column)
                    ),
                });
            } else {
                values.push(constants::resolve(cell, self.table.line_of(row))?);
            }
        }
        Ok(values)
    }

    /// Anchor cell resolved through the named-constant table.
    pub fn constant(&self, component: &ParsedComponent, column: usize) -> ConfigResult<Option<String>> {
        self.optional(component, column)
            .map(|cell| constants::resolve(cell, self.line(component)))
            .transpose()
    }

    /// Anchor cell parsed as a matching dimension.
    pub fn dimension(&self, component: &ParsedComponent, column: usize) -> ConfigResult<Dimension> {
        Dimension::parse(self.anchor_cell(component, column), self.line(component)).map_err(|err| match err {
            ConfigError::InvalidValue { row, value, .. } => ConfigError::InvalidValue {
                column: self.column_name(column),
                row,
                value,
            },
            other => other,
        })
    }

    /// Parses a required anchor cell into a closed enumeration.
    pub fn parse_enum<E: FromStr>(&self, component: &ParsedComponent, column: usize) -> ConfigResult<E> {
        let value = self.anchor_cell(component, column);
        value.parse().map_err(|_| ConfigError::InvalidValue {
            column: self.column_name(column),
            row: self.line(component),
            value: value.to_string(),
        })
    }

    /// Builds one `T` per element parsed under `name`.
    pub fn build_children<T: FromComponent<C>>(
        &self,
        component: &ParsedComponent,
        name: &str,
    ) -> ConfigResult<Vec<T>> {
        component
            .children(name)
            .iter()
            .map(|child| T::construct(self, child))
            .collect()
    }

    pub fn shape(&self, component: &ParsedComponent, message: String) -> ConfigError {
        ConfigError::Shape {
            family: self.family,
            row: self.line(component),
            message,
        }
    }

    fn column_name(&self, column: usize) -> String {
        self.table
            .columns
            .names()
            .get(column)
            .cloned()
            .unwrap_or_else(|| column.to_string())
    }
}
