use super::dimension::Dimension;
use crate::error::{MatchDimension, ResolveError, ResolveResult};
use tracing::debug;

/// One narrowing pass: the dimension filtered on, the context value, and an
/// optional configured message template (`{0}` stands for the value).
#[derive(Debug, Clone, Copy)]
pub struct NarrowingPass<'v> {
    pub dimension: MatchDimension,
    pub value: Option<&'v str>,
    pub message: Option<&'v str>,
}

impl<'v> NarrowingPass<'v> {
    pub fn new(dimension: MatchDimension, value: Option<&'v str>) -> Self {
        Self {
            dimension,
            value,
            message: None,
        }
    }

    pub fn with_message(mut self, template: Option<&'v str>) -> Self {
        self.message = template.filter(|t| !t.is_empty());
        self
    }

    fn exhausted(&self) -> ResolveError {
        let value = self.value.unwrap_or_default().to_string();
        let message = match self.message {
            Some(template) => template.replace("{0}", &value),
            None => format!("no configured rule matches {} '{}'", self.dimension, value),
        };
        ResolveError::NarrowingExhausted {
            dimension: self.dimension,
            value,
            message,
        }
    }
}

/// Keeps the candidates whose `select`ed dimension accepts the pass value,
/// preserving file order.
///
/// Fails when nothing survives; never returns an empty list.
pub fn narrow<'a, T, F>(
    candidates: Vec<&'a T>,
    pass: &NarrowingPass<'_>,
    select: F,
) -> ResolveResult<Vec<&'a T>>
where
    F: Fn(&T) -> &Dimension,
{
    let before = candidates.len();
    let survivors: Vec<&'a T> = candidates
        .into_iter()
        .filter(|candidate| select(*candidate).matches(pass.value))
        .collect();

    debug!(
        dimension = %pass.dimension,
        value = pass.value.unwrap_or_default(),
        before,
        after = survivors.len(),
        "narrowing pass"
    );

    if survivors.is_empty() {
        return Err(pass.exhausted());
    }
    Ok(survivors)
}
