//! Static checks over loaded rule sets.
//!
//! Nothing here is an error: every finding describes a rule that loads fine
//! but can never be selected, or a declaration a later one silently loses to.

use crate::rules::client_action::{self, ClientActionRules};
use crate::rules::service_error::{self, ServiceErrorRules};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FindingKind {
    ShadowedFilter,
    ShadowedRule,
    DuplicateRequestType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub family: &'static str,
    pub line: usize,
    pub kind: FindingKind,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}: {}", self.family, self.line, self.message)
    }
}

pub fn review(client_actions: &ClientActionRules, service_errors: &ServiceErrorRules) -> Vec<Finding> {
    let mut findings = review_client_actions(client_actions);
    findings.extend(review_service_errors(service_errors));
    findings
}

pub fn review_client_actions(rules: &ClientActionRules) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, rule) in rules.rules.iter().enumerate() {
        if let Some(earlier) = rules.rules[..index]
            .iter()
            .find(|earlier| earlier.payment_method.covers(&rule.payment_method))
        {
            findings.push(Finding {
                family: client_action::FAMILY,
                line: rule.line,
                kind: FindingKind::ShadowedRule,
                message: format!(
                    "rule '{}' is unreachable: rule '{}' at line {} matches every payment method it does",
                    rule.name, earlier.name, earlier.line
                ),
            });
        }

        for (position, filter) in rule.filters.iter().enumerate() {
            if let Some(earlier) = rule.filters[..position].iter().find(|e| filter.is_shadowed_by(e)) {
                findings.push(Finding {
                    family: client_action::FAMILY,
                    line: filter.line,
                    kind: FindingKind::ShadowedFilter,
                    message: format!(
                        "filter in rule '{}' is unreachable behind the filter at line {}",
                        rule.name, earlier.line
                    ),
                });
            }
        }
    }

    findings
}

pub fn review_service_errors(rules: &ServiceErrorRules) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, request_type) in rules.request_types.iter().enumerate() {
        if let Some(earlier) = rules.request_types[..index]
            .iter()
            .find(|e| e.action == request_type.action)
        {
            findings.push(Finding {
                family: service_error::FAMILY,
                line: request_type.line,
                kind: FindingKind::DuplicateRequestType,
                message: format!(
                    "resource action {} is already declared at line {}; this block is never used",
                    request_type.action, earlier.line
                ),
            });
        }

        for (position, filter) in request_type.rules.iter().enumerate() {
            if let Some(earlier) = request_type.rules[..position]
                .iter()
                .find(|e| filter.is_shadowed_by(e))
            {
                findings.push(Finding {
                    family: service_error::FAMILY,
                    line: filter.line,
                    kind: FindingKind::ShadowedRule,
                    message: format!(
                        "{} block ({filter}) is unreachable behind the block at line {}",
                        request_type.action, earlier.line
                    ),
                });
            }
        }
    }

    findings
}
