use crate::error::ConfigResult;
use crate::interfaces::csv::table_reader::ColumnMap;

/// Decides whether the row at `position` (1-based within the current
/// sub-range) extends that sub-range.
pub type RangePredicate = Box<dyn Fn(&[String], usize) -> bool + Send + Sync>;

/// Decides whether a sub-range anchored at this row is a genuine element.
pub type ListPredicate = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

/// Emptiness pattern tested over a set of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    AllEmpty,
    SomeEmpty,
    AllFull,
    SomeFull,
}

/// A set of columns resolved against a column map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    indices: Vec<usize>,
}

impl ColumnSet {
    pub fn resolve(columns: &ColumnMap, family: &'static str, names: &[&str]) -> ConfigResult<Self> {
        let indices = names
            .iter()
            .map(|name| columns.require(family, name))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { indices })
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn matches(&self, row: &[String], operation: SetOperation) -> bool {
        let empty = |index: &usize| row.get(*index).is_none_or(|cell| cell.is_empty());
        match operation {
            SetOperation::AllEmpty => self.indices.iter().all(empty),
            SetOperation::SomeEmpty => self.indices.iter().any(empty),
            SetOperation::AllFull => !self.indices.iter().any(empty),
            SetOperation::SomeFull => !self.indices.iter().all(empty),
        }
    }
}

/// One node of a component grammar.
///
/// A sub-range always opens at the row the parser is standing on and grows
/// while `is_row_in_range` accepts the following rows. Without a range
/// predicate every row is its own element. Without a list predicate every
/// sub-range is kept.
pub struct ComponentRule {
    name: &'static str,
    is_row_in_range: Option<RangePredicate>,
    is_row_in_list: Option<ListPredicate>,
    sub_components: Vec<ComponentRule>,
}

impl ComponentRule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            is_row_in_range: None,
            is_row_in_list: None,
            sub_components: Vec::new(),
        }
    }

    pub fn in_range<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&[String], usize) -> bool + Send + Sync + 'static,
    {
        self.is_row_in_range = Some(Box::new(predicate));
        self
    }

    pub fn in_list<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.is_row_in_list = Some(Box::new(predicate));
        self
    }

    /// Extends sub-ranges while `columns` satisfy `operation`.
    pub fn extend_while(self, columns: ColumnSet, operation: SetOperation) -> Self {
        self.in_range(move |row, _| columns.matches(row, operation))
    }

    /// Keeps only sub-ranges whose anchor row satisfies `operation`.
    pub fn keep_when(self, columns: ColumnSet, operation: SetOperation) -> Self {
        self.in_list(move |row| columns.matches(row, operation))
    }

    pub fn with_sub_component(mut self, component: ComponentRule) -> Self {
        self.sub_components.push(component);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sub_components(&self) -> &[ComponentRule] {
        &self.sub_components
    }

    pub fn is_row_in_range(&self, row: &[String], position: usize) -> bool {
        self.is_row_in_range
            .as_ref()
            .is_some_and(|predicate| predicate(row, position))
    }

    pub fn is_row_in_list(&self, row: &[String]) -> bool {
        self.is_row_in_list
            .as_ref()
            .is_none_or(|predicate| predicate(row))
    }
}

impl std::fmt::Debug for ComponentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRule")
            .field("name", &self.name)
            .field("sub_components", &self.sub_components)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_set_operations() {
        let set = ColumnSet::from_indices(vec![0, 2]);
        let both = row(&["a", "", "c"]);
        let one = row(&["a", "x", ""]);
        let none = row(&["", "x", ""]);

        assert!(set.matches(&both, SetOperation::AllFull));
        assert!(!set.matches(&one, SetOperation::AllFull));
        assert!(set.matches(&one, SetOperation::SomeFull));
        assert!(set.matches(&one, SetOperation::SomeEmpty));
        assert!(set.matches(&none, SetOperation::AllEmpty));
        assert!(!set.matches(&none, SetOperation::SomeFull));
    }

    #[test]
    fn test_default_predicates() {
        let rule = ComponentRule::new("Leaf");
        let r = row(&["a"]);
        assert!(!rule.is_row_in_range(&r, 1));
        assert!(rule.is_row_in_list(&r));
    }

    #[test]
    fn test_resolve_unknown_column() {
        let columns = ColumnMap::from_header(["A"]).unwrap();
        assert!(ColumnSet::resolve(&columns, "Test", &["A", "B"]).is_err());
    }
}
