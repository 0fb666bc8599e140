//! Service-error rules: how a downstream failure is presented to the client.
//!
//! A file is split into resource actions, each holding payment-method blocks
//! that carry their own error entries:
//!
//! ```text
//! ResourceAction  PaymentMethodFamily  ...  Message        ErrorCode
//! PostModernPI    credit_card          ...  Card declined  Declined
//!                                      ...                 Expired
//!                                      ...  Try again
//!                 ewallet              ...  []
//! ```

use crate::domain::request::PAYMENT_TYPE_EMPTY;
use crate::error::{ConfigResult, MatchDimension, ResolveError, ResolveResult};
use crate::interfaces::csv::table_reader::ColumnMap;
use crate::table::{
    ColumnSet, ComponentRule, Dimension, FromComponent, NarrowingPass, ParsedComponent, RuleFamily,
    RuleSource, SetOperation, narrow,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const FAMILY: &str = "ServiceError";

const REQUEST_TYPE: &str = "RequestType";
const PAYMENT_METHOD: &str = "PaymentMethod";
const SERVICE_ERROR: &str = "ServiceError";

pub mod column {
    pub const RESOURCE_ACTION: &str = "ResourceAction";
    pub const PAYMENT_METHOD_FAMILY: &str = "PaymentMethodFamily";
    pub const PAYMENT_METHOD_TYPE: &str = "PaymentMethodType";
    pub const COUNTRY: &str = "Country";
    pub const CONTAINED_IN_PARTNER: &str = "ContainedIn_Partner";
    pub const PARTNER: &str = "Partner";
    pub const MESSAGE: &str = "Message";
    pub const ERROR_CODE: &str = "ErrorCode";
    pub const DETAILS_ERROR_CODE: &str = "DetailsErrorCode";
    pub const DETAILS_MESSAGE: &str = "DetailsMessage";
    pub const DETAILS_TARGET: &str = "DetailsTarget";
    pub const CLIENT_ACTION: &str = "ClientAction";
}

#[derive(Debug, Clone)]
pub struct ServiceErrorColumns {
    pub resource_action: usize,
    pub family: usize,
    pub payment_type: usize,
    pub country: usize,
    pub contained_in_partner: usize,
    pub partner: usize,
    pub message: usize,
    pub error_code: usize,
    pub details_error_code: usize,
    pub details_message: usize,
    pub details_target: usize,
    pub client_action: usize,
}

impl ServiceErrorColumns {
    pub fn resolve(map: &ColumnMap) -> ConfigResult<Self> {
        let col = |name: &str| map.require(FAMILY, name);
        Ok(Self {
            resource_action: col(column::RESOURCE_ACTION)?,
            family: col(column::PAYMENT_METHOD_FAMILY)?,
            payment_type: col(column::PAYMENT_METHOD_TYPE)?,
            country: col(column::COUNTRY)?,
            contained_in_partner: col(column::CONTAINED_IN_PARTNER)?,
            partner: col(column::PARTNER)?,
            message: col(column::MESSAGE)?,
            error_code: col(column::ERROR_CODE)?,
            details_error_code: col(column::DETAILS_ERROR_CODE)?,
            details_message: col(column::DETAILS_MESSAGE)?,
            details_target: col(column::DETAILS_TARGET)?,
            client_action: col(column::CLIENT_ACTION)?,
        })
    }
}

/// The payment-instrument operation a service error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorResourceAction {
    PostModernPI,
    UpdateModernPI,
    ResumePendingOperation,
}

impl ErrorResourceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorResourceAction::PostModernPI => "PostModernPI",
            ErrorResourceAction::UpdateModernPI => "UpdateModernPI",
            ErrorResourceAction::ResumePendingOperation => "ResumePendingOperation",
        }
    }
}

impl FromStr for ErrorResourceAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PostModernPI" => Ok(ErrorResourceAction::PostModernPI),
            "UpdateModernPI" => Ok(ErrorResourceAction::UpdateModernPI),
            "ResumePendingOperation" => Ok(ErrorResourceAction::ResumePendingOperation),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ErrorResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client action attached to a service error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorClientAction {
    #[default]
    None,
    DirectDebitAch,
    DirectDebitSepa,
    Jumpback,
}

impl FromStr for ErrorClientAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "None" => Ok(ErrorClientAction::None),
            "DirectDebitAch" => Ok(ErrorClientAction::DirectDebitAch),
            "DirectDebitSepa" => Ok(ErrorClientAction::DirectDebitSepa),
            "Jumpback" => Ok(ErrorClientAction::Jumpback),
            _ => Err(()),
        }
    }
}

/// One error entry: the codes it answers for and the payload it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub line: usize,
    pub message: String,
    /// Empty for the generic entry of a block.
    pub error_codes: Vec<String>,
    pub details_error_code: Option<String>,
    pub details_message: Option<String>,
    pub details_target: Option<String>,
    pub client_action: ErrorClientAction,
}

impl ErrorDetails {
    pub fn is_generic(&self) -> bool {
        self.error_codes.is_empty()
    }

    pub fn has_detail(&self) -> bool {
        self.details_error_code.is_some() || self.details_message.is_some() || self.details_target.is_some()
    }
}

impl FromComponent<ServiceErrorColumns> for ErrorDetails {
    fn construct(source: &RuleSource<'_, ServiceErrorColumns>, component: &ParsedComponent) -> ConfigResult<Self> {
        let c = source.columns;
        // messages are free text and may contain periods; never constant-resolved
        let message = source
            .optional(component, c.message)
            .ok_or_else(|| source.shape(component, "error entry has no Message".to_string()))?
            .to_string();

        Ok(Self {
            line: source.line(component),
            message,
            error_codes: source.column_list(component.range, c.error_code)?,
            details_error_code: source.constant(component, c.details_error_code)?,
            details_message: source.optional(component, c.details_message).map(str::to_string),
            details_target: source.optional(component, c.details_target).map(str::to_string),
            client_action: source.parse_enum(component, c.client_action)?,
        })
    }
}

/// Error entries of one payment-method block, indexed by error code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorDetailsFilter {
    entries: Vec<ErrorDetails>,
    by_code: HashMap<String, usize>,
    generic: Option<usize>,
}

impl ErrorDetailsFilter {
    fn from_entries(
        source: &RuleSource<'_, ServiceErrorColumns>,
        block: &ParsedComponent,
        entries: Vec<ErrorDetails>,
    ) -> ConfigResult<Self> {
        if entries.is_empty() {
            return Err(source.shape(block, "payment method block declares no error entries".to_string()));
        }

        let mut by_code = HashMap::new();
        let mut generic = None;
        for (index, (entry, component)) in entries.iter().zip(block.children(SERVICE_ERROR)).enumerate() {
            if entry.is_generic() {
                if generic.is_some() {
                    return Err(source.shape(
                        component,
                        "payment method block declares more than one generic error entry".to_string(),
                    ));
                }
                generic = Some(index);
            }
            for code in &entry.error_codes {
                // a later entry listing the same code replaces the earlier one
                by_code.insert(code.clone(), index);
            }
        }

        Ok(Self {
            entries,
            by_code,
            generic,
        })
    }

    /// Exact code first, then the block's generic entry.
    pub fn lookup(&self, error_code: &str) -> Option<&ErrorDetails> {
        self.by_code
            .get(error_code)
            .or(self.generic.as_ref())
            .map(|index| &self.entries[*index])
    }

    pub fn entries(&self) -> &[ErrorDetails] {
        &self.entries
    }

    pub fn generic(&self) -> Option<&ErrorDetails> {
        self.generic.map(|index| &self.entries[index])
    }
}

/// A payment-method block: which instruments and partners it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTypeErrorFilter {
    pub line: usize,
    pub family: Dimension,
    pub types: Dimension,
    pub countries: Dimension,
    pub partners: Dimension,
    pub errors: ErrorDetailsFilter,
}

impl PaymentTypeErrorFilter {
    pub fn matches(&self, query: &ServiceErrorQuery<'_>) -> bool {
        self.family.matches(Some(query.family))
            && self.types.matches(Some(query.payment_type))
            && self.countries.matches(query.country)
            && self.partners.matches(query.partner)
    }

    pub fn is_shadowed_by(&self, earlier: &PaymentTypeErrorFilter) -> bool {
        earlier.family.covers(&self.family)
            && earlier.types.covers(&self.types)
            && earlier.countries.covers(&self.countries)
            && earlier.partners.covers(&self.partners)
    }
}

impl FromComponent<ServiceErrorColumns> for PaymentTypeErrorFilter {
    fn construct(source: &RuleSource<'_, ServiceErrorColumns>, component: &ParsedComponent) -> ConfigResult<Self> {
        let c = source.columns;
        let line = source.line(component);
        let entries = source.build_children(component, SERVICE_ERROR)?;
        let contained_in = !source.anchor_cell(component, c.contained_in_partner).eq_ignore_ascii_case("FALSE");

        Ok(Self {
            line,
            family: source.dimension(component, c.family)?,
            types: Dimension::from_values(source.column_list(component.range, c.payment_type)?, true),
            countries: Dimension::from_values(source.column_list(component.range, c.country)?, true),
            partners: Dimension::from_values(source.column_list(component.range, c.partner)?, contained_in),
            errors: ErrorDetailsFilter::from_entries(source, component, entries)?,
        })
    }
}

impl fmt::Display for PaymentTypeErrorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Family[{}]", self.family)?;
        if !self.types.is_unconstrained() {
            write!(f, ", Types[{}]", self.types)?;
        }
        if !self.countries.is_unconstrained() {
            write!(f, ", Countries[{}]", self.countries)?;
        }
        if !self.partners.is_unconstrained() {
            write!(f, ", Partners[{}]", self.partners)?;
        }
        Ok(())
    }
}

/// All payment-method blocks declared for one resource action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTypeRules {
    pub action: ErrorResourceAction,
    pub line: usize,
    pub rules: Vec<PaymentTypeErrorFilter>,
}

impl FromComponent<ServiceErrorColumns> for RequestTypeRules {
    fn construct(source: &RuleSource<'_, ServiceErrorColumns>, component: &ParsedComponent) -> ConfigResult<Self> {
        let rules: Vec<PaymentTypeErrorFilter> = source.build_children(component, PAYMENT_METHOD)?;
        let action = source.parse_enum(component, source.columns.resource_action)?;
        if rules.is_empty() {
            return Err(source.shape(component, format!("resource action {action} declares no payment methods")));
        }

        Ok(Self {
            action,
            line: source.line(component),
            rules,
        })
    }
}

/// Runtime values a service error is matched against.
#[derive(Debug, Clone, Copy)]
pub struct ServiceErrorQuery<'a> {
    pub family: &'a str,
    /// Already mapped to [`PAYMENT_TYPE_EMPTY`] when the instrument has none.
    pub payment_type: &'a str,
    pub country: Option<&'a str>,
    pub partner: Option<&'a str>,
    pub error_code: &'a str,
}

impl<'a> ServiceErrorQuery<'a> {
    pub fn new(family: &'a str, payment_type: Option<&'a str>, error_code: &'a str) -> Self {
        Self {
            family,
            payment_type: payment_type.filter(|t| !t.is_empty()).unwrap_or(PAYMENT_TYPE_EMPTY),
            country: None,
            partner: None,
            error_code,
        }
    }
}

impl RequestTypeRules {
    /// Family, type, country and partner passes in that order.
    pub fn narrow_filters<'r>(
        &'r self,
        query: &ServiceErrorQuery<'_>,
    ) -> ResolveResult<(Vec<&'r PaymentTypeErrorFilter>, [usize; 5])> {
        let mut counts = [self.rules.len(), 0, 0, 0, 0];
        let candidates: Vec<&PaymentTypeErrorFilter> = self.rules.iter().collect();

        let family = NarrowingPass::new(MatchDimension::PaymentMethodFamily, Some(query.family));
        let candidates = narrow(candidates, &family, |f| &f.family)?;
        counts[1] = candidates.len();

        let payment_type = NarrowingPass::new(MatchDimension::PaymentMethodType, Some(query.payment_type));
        let candidates = narrow(candidates, &payment_type, |f| &f.types)?;
        counts[2] = candidates.len();

        let country = NarrowingPass::new(MatchDimension::Country, query.country);
        let candidates = narrow(candidates, &country, |f| &f.countries)?;
        counts[3] = candidates.len();

        let partner = NarrowingPass::new(MatchDimension::Partner, query.partner);
        let candidates = narrow(candidates, &partner, |f| &f.partners)?;
        counts[4] = candidates.len();

        Ok((candidates, counts))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceErrorMatch<'r> {
    pub request_type: &'r RequestTypeRules,
    pub filter: &'r PaymentTypeErrorFilter,
    pub entry: &'r ErrorDetails,
    pub survivors: usize,
    pub candidate_counts: [usize; 5],
}

impl ServiceErrorMatch<'_> {
    pub fn is_ambiguous(&self) -> bool {
        self.survivors > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceErrorRules {
    pub request_types: Vec<RequestTypeRules>,
}

impl ServiceErrorRules {
    pub fn request_type(&self, action: ErrorResourceAction) -> ResolveResult<&RequestTypeRules> {
        self.request_types
            .iter()
            .find(|r| r.action == action)
            .ok_or_else(|| ResolveError::NoMatchingRequestType {
                action: action.to_string(),
            })
    }

    pub fn resolve(
        &self,
        action: ErrorResourceAction,
        query: &ServiceErrorQuery<'_>,
    ) -> ResolveResult<ServiceErrorMatch<'_>> {
        let request_type = self.request_type(action)?;
        let (survivors, candidate_counts) = request_type.narrow_filters(query)?;
        let filter = survivors[0];
        let entry = filter
            .errors
            .lookup(query.error_code)
            .ok_or_else(|| ResolveError::NoMatchingError {
                error_code: query.error_code.to_string(),
            })?;

        Ok(ServiceErrorMatch {
            request_type,
            filter,
            entry,
            survivors: survivors.len(),
            candidate_counts,
        })
    }

    pub fn filter_count(&self) -> usize {
        self.request_types.iter().map(|r| r.rules.len()).sum()
    }
}

impl RuleFamily for ServiceErrorRules {
    const NAME: &'static str = FAMILY;
    type Columns = ServiceErrorColumns;

    fn columns(map: &ColumnMap) -> ConfigResult<Self::Columns> {
        ServiceErrorColumns::resolve(map)
    }

    fn grammar(c: &Self::Columns) -> ComponentRule {
        let action = ColumnSet::from_indices(vec![c.resource_action]);
        let family = ColumnSet::from_indices(vec![c.family]);
        let message = ColumnSet::from_indices(vec![c.message]);
        let entry = ColumnSet::from_indices(vec![c.message, c.error_code, c.details_target]);

        ComponentRule::new("ServiceErrorRules").with_sub_component(
            ComponentRule::new(REQUEST_TYPE)
                .extend_while(action.clone(), SetOperation::AllEmpty)
                .keep_when(action, SetOperation::AllFull)
                .with_sub_component(
                    ComponentRule::new(PAYMENT_METHOD)
                        .extend_while(family.clone(), SetOperation::AllEmpty)
                        .keep_when(family, SetOperation::AllFull)
                        .with_sub_component(
                            ComponentRule::new(SERVICE_ERROR)
                                .extend_while(message, SetOperation::AllEmpty)
                                .keep_when(entry, SetOperation::SomeFull),
                        ),
                ),
        )
    }

    fn construct(source: &RuleSource<'_, Self::Columns>, root: &ParsedComponent) -> ConfigResult<Self> {
        Ok(Self {
            request_types: source.build_children(root, REQUEST_TYPE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::interfaces::csv::table_reader::TableReader;
    use crate::table::builder;

    const HEADER: &str = "ResourceAction,PaymentMethodFamily,PaymentMethodType,Country,ContainedIn_Partner,Partner,Message,ErrorCode,DetailsErrorCode,DetailsMessage,DetailsTarget,ClientAction";

    fn rules(body: &str) -> ConfigResult<ServiceErrorRules> {
        let data = format!("{HEADER}\n{body}");
        let table = TableReader::new(data.as_bytes(), b',').load()?;
        builder::build(&table)
    }

    fn sample() -> ServiceErrorRules {
        rules(
            "PostModernPI,credit_card,visa,us,FALSE,xbox,Card declined,Declined,,,,\n\
             ,,PaymentMethodType.CreditCardMasterCard,,,,,Expired,,,,\n\
             ,,,,,,Check your card. It isn't valid.,InvalidCvv,,Check the code,cvv,\n\
             ,,,,,,Something went wrong,,,,,\n\
             ,ewallet,,,,,[],,,,,Jumpback\n\
             UpdateModernPI,direct_debit,ach,,,,Verify your account,,,,,DirectDebitAch",
        )
        .unwrap()
    }

    fn query<'a>(family: &'a str, payment_type: Option<&'a str>, partner: &'a str, code: &'a str) -> ServiceErrorQuery<'a> {
        ServiceErrorQuery {
            country: Some("us"),
            partner: Some(partner),
            ..ServiceErrorQuery::new(family, payment_type, code)
        }
    }

    #[test]
    fn test_builds_hierarchy() {
        let rules = sample();
        assert_eq!(rules.request_types.len(), 2);

        let post = &rules.request_types[0];
        assert_eq!(post.action, ErrorResourceAction::PostModernPI);
        assert_eq!(post.rules.len(), 2);

        let cards = &post.rules[0];
        assert_eq!(cards.types, Dimension::In(vec!["visa".into(), "mc".into()]));
        assert_eq!(cards.partners, Dimension::NotIn(vec!["xbox".into()]));
        assert_eq!(cards.errors.entries().len(), 3);
        assert_eq!(cards.errors.entries()[0].error_codes, vec!["Declined", "Expired"]);
        assert_eq!(cards.errors.generic().map(|e| e.line), Some(5));
        assert_eq!(cards.to_string(), "Family[credit_card], Types[visa,mc], Countries[us], Partners[!xbox]");
    }

    #[test]
    fn test_excluded_partner_does_not_match() {
        let rules = sample();
        let err = rules
            .resolve(ErrorResourceAction::PostModernPI, &query("credit_card", Some("visa"), "xbox", "Declined"))
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NarrowingExhausted { dimension: MatchDimension::Partner, ref value, .. } if value == "xbox"
        ));

        let matched = rules
            .resolve(ErrorResourceAction::PostModernPI, &query("credit_card", Some("visa"), "webblends", "Declined"))
            .unwrap();
        assert_eq!(matched.entry.message, "Card declined");
    }

    #[test]
    fn test_code_lookup_falls_back_to_generic() {
        let rules = sample();
        let action = ErrorResourceAction::PostModernPI;

        let matched = rules.resolve(action, &query("credit_card", Some("mc"), "cart", "InvalidCvv")).unwrap();
        assert_eq!(matched.entry.message, "Check your card. It isn't valid.");
        assert_eq!(matched.entry.details_target.as_deref(), Some("cvv"));
        assert!(matched.entry.has_detail());

        let matched = rules.resolve(action, &query("credit_card", Some("mc"), "cart", "Unknown")).unwrap();
        assert_eq!(matched.entry.message, "Something went wrong");
        assert!(matched.entry.is_generic());
    }

    #[test]
    fn test_no_generic_entry_is_no_matching_error() {
        let rules = rules("PostModernPI,credit_card,,,,,Declined,Declined,,,,").unwrap();
        let err = rules
            .resolve(ErrorResourceAction::PostModernPI, &query("credit_card", None, "cart", "Other"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingError { ref error_code } if error_code == "Other"));
    }

    #[test]
    fn test_repeated_code_resolves_to_last_entry() {
        let rules = rules(
            "PostModernPI,credit_card,,,,,Card declined,Declined,,,,\n\
             ,,,,,,Card expired,Expired,,,,\n\
             ,,,,,,Your bank declined the card,Declined,,,,",
        )
        .unwrap();
        let action = ErrorResourceAction::PostModernPI;

        let matched = rules.resolve(action, &query("credit_card", None, "cart", "Declined")).unwrap();
        assert_eq!(matched.entry.message, "Your bank declined the card");
        assert_eq!(matched.entry.line, 4);

        let matched = rules.resolve(action, &query("credit_card", None, "cart", "Expired")).unwrap();
        assert_eq!(matched.entry.message, "Card expired");
    }

    #[test]
    fn test_missing_type_matches_empty_sentinel() {
        let rules = rules(
            "PostModernPI,mobile_billing_non_sim,visa,,,,Wrong type,,,,,\n\
             ,mobile_billing_non_sim,empty,,,,No type,,,,,",
        )
        .unwrap();
        let matched = rules
            .resolve(ErrorResourceAction::PostModernPI, &query("mobile_billing_non_sim", None, "cart", "Any"))
            .unwrap();
        assert_eq!(matched.entry.message, "No type");
    }

    #[test]
    fn test_unconfigured_resource_action() {
        let rules = sample();
        let err = rules
            .resolve(ErrorResourceAction::ResumePendingOperation, &query("credit_card", None, "cart", "X"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingRequestType { .. }));
    }

    #[test]
    fn test_client_action_parsed() {
        let rules = sample();
        let update = &rules.request_types[1];
        let entry = update.rules[0].errors.generic().unwrap();
        assert_eq!(entry.client_action, ErrorClientAction::DirectDebitAch);
        assert_eq!(rules.request_types[0].rules[1].errors.entries()[0].client_action, ErrorClientAction::Jumpback);
    }

    #[test]
    fn test_two_generic_entries_is_startup_error() {
        let err = rules(
            "PostModernPI,credit_card,,,,,First,,,,,\n\
             ,,,,,,Second,,,,,",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Shape { row: 3, .. }));
    }

    #[test]
    fn test_unknown_resource_action_is_startup_error() {
        let err = rules("DeleteModernPI,credit_card,,,,,Message,,,,,").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref column, .. } if column == "ResourceAction"));
    }

    #[test]
    fn test_entry_without_message_is_startup_error() {
        let err = rules("PostModernPI,credit_card,,,,,,Declined,,,,").unwrap_err();
        assert!(matches!(err, ConfigError::Shape { row: 2, .. }));
    }
}
