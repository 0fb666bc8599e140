use super::grammar::ComponentRule;

/// A half-open span of data rows, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_range(&self, other: &RowRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &RowRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for RowRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "[{}, {}]", self.start, self.end - 1)
        }
    }
}

/// A row range plus the elements found for each declared sub-component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComponent {
    pub range: RowRange,
    children: Vec<(&'static str, Vec<ParsedComponent>)>,
}

impl ParsedComponent {
    /// The first row of the range, where scalar fields are read from.
    pub fn anchor(&self) -> usize {
        self.range.start
    }

    /// Elements parsed for `name`, empty when nothing matched.
    pub fn children(&self, name: &str) -> &[ParsedComponent] {
        self.children
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.children.iter().map(|(key, _)| *key)
    }
}

/// Partitions `range` according to `rule`, recursing into every declared
/// sub-component.
///
/// For each sub-component the scan restarts at `range.start`: a sub-range
/// opens at the current row and absorbs following rows while the
/// sub-component's range predicate holds. Sub-ranges anchored on a row the
/// list predicate rejects are consumed but dropped.
pub fn parse(rule: &ComponentRule, rows: &[Vec<String>], range: RowRange) -> ParsedComponent {
    let end = range.end.min(rows.len());
    let mut children = Vec::with_capacity(rule.sub_components().len());

    for sub in rule.sub_components() {
        let mut elements = Vec::new();
        let mut cursor = range.start;

        while cursor < end {
            let start = cursor;
            cursor += 1;
            while cursor < end && sub.is_row_in_range(&rows[cursor], cursor - start) {
                cursor += 1;
            }

            if sub.is_row_in_list(&rows[start]) {
                elements.push(parse(sub, rows, RowRange::new(start, cursor)));
            }
        }

        children.push((sub.name(), elements));
    }

    ParsedComponent {
        range: RowRange::new(range.start, end.max(range.start)),
        children,
    }
}
