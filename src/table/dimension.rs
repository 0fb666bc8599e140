use super::constants;
use crate::error::{ConfigError, ConfigResult};

/// One matching dimension of a filter.
///
/// Values compare ASCII case-insensitively. A context without a value is
/// rejected by a positive set and accepted by a negated one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Dimension {
    #[default]
    Unconstrained,
    In(Vec<String>),
    NotIn(Vec<String>),
}

impl Dimension {
    /// Parses a cell: empty is unconstrained, a leading `!` negates the
    /// comma-separated list that follows. A `!` with nothing after it is
    /// rejected; the caller names the column in the returned error.
    pub fn parse(cell: &str, row: usize) -> ConfigResult<Self> {
        let cell = cell.trim();
        if cell.is_empty() {
            return Ok(Dimension::Unconstrained);
        }

        let (negated, list) = match cell.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, cell),
        };

        let values = list
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| constants::resolve(v, row))
            .collect::<ConfigResult<Vec<_>>>()?;

        if negated && values.is_empty() {
            return Err(ConfigError::InvalidValue {
                column: String::new(),
                row,
                value: cell.to_string(),
            });
        }

        Ok(Self::from_values(values, !negated))
    }

    /// Builds a dimension from an already collected list. An empty list is
    /// unconstrained regardless of `contained_in`.
    pub fn from_values(values: Vec<String>, contained_in: bool) -> Self {
        if values.is_empty() {
            Dimension::Unconstrained
        } else if contained_in {
            Dimension::In(values)
        } else {
            Dimension::NotIn(values)
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Dimension::Unconstrained => true,
            Dimension::In(set) => value.is_some_and(|v| contains(set, v)),
            Dimension::NotIn(set) => value.is_none_or(|v| !contains(set, v)),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Dimension::Unconstrained)
    }

    /// True when every value `other` accepts is also accepted by `self`.
    pub fn covers(&self, other: &Dimension) -> bool {
        match (self, other) {
            (Dimension::Unconstrained, _) => true,
            (_, Dimension::Unconstrained) => false,
            (Dimension::In(mine), Dimension::In(theirs)) => theirs.iter().all(|v| contains(mine, v)),
            (Dimension::In(_), Dimension::NotIn(_)) => false,
            (Dimension::NotIn(mine), Dimension::In(theirs)) => {
                theirs.iter().all(|v| !contains(mine, v))
            }
            (Dimension::NotIn(mine), Dimension::NotIn(theirs)) => {
                mine.iter().all(|v| contains(theirs, v))
            }
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Unconstrained => write!(f, "*"),
            Dimension::In(values) => write!(f, "{}", values.join(",")),
            Dimension::NotIn(values) => write!(f, "!{}", values.join(",")),
        }
    }
}

fn contains(set: &[String], value: &str) -> bool {
    set.iter().any(|candidate| candidate.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Dimension::parse("", 0).unwrap(), Dimension::Unconstrained);
        assert_eq!(
            Dimension::parse("sms, picv", 0).unwrap(),
            Dimension::In(vec!["sms".into(), "picv".into()])
        );
        assert_eq!(
            Dimension::parse("!xbox", 0).unwrap(),
            Dimension::NotIn(vec!["xbox".into()])
        );
        assert_eq!(
            Dimension::parse("PartnerName.Xbox", 0).unwrap(),
            Dimension::In(vec!["xbox".into()])
        );
    }

    #[test]
    fn test_negation() {
        let single = Dimension::parse("!X", 0).unwrap();
        assert!(single.matches(Some("Y")));
        assert!(!single.matches(Some("X")));

        let pair = Dimension::parse("!X,Z", 0).unwrap();
        assert!(pair.matches(Some("Y")));
        assert!(!pair.matches(Some("X")));
        assert!(!pair.matches(Some("Z")));
    }

    #[test]
    fn test_bare_negation_is_rejected() {
        for cell in ["!", " ! ", "!,", "! , ,"] {
            let err = Dimension::parse(cell, 7).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { row: 7, ref value, .. } if value == cell.trim()),
                "{cell:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_context_value() {
        assert!(Dimension::Unconstrained.matches(None));
        assert!(!Dimension::parse("sms", 0).unwrap().matches(None));
        assert!(Dimension::parse("!sms", 0).unwrap().matches(None));
    }

    #[test]
    fn test_case_insensitive() {
        let dim = Dimension::parse("AgreementUpdate", 0).unwrap();
        assert!(dim.matches(Some("agreementupdate")));
    }

    #[test]
    fn test_covers() {
        let any = Dimension::Unconstrained;
        let ab = Dimension::parse("a,b", 0).unwrap();
        let a = Dimension::parse("a", 0).unwrap();
        let not_a = Dimension::parse("!a", 0).unwrap();
        let not_ab = Dimension::parse("!a,b", 0).unwrap();

        assert!(any.covers(&ab));
        assert!(!ab.covers(&any));
        assert!(ab.covers(&a));
        assert!(!a.covers(&ab));
        assert!(not_a.covers(&not_ab));
        assert!(!not_ab.covers(&not_a));
        assert!(not_a.covers(&Dimension::parse("b", 0).unwrap()));
        assert!(!a.covers(&not_a));
    }
}
