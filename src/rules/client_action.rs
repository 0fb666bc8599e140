//! Client-action rules: which follow-up action a client receives after a
//! payment-instrument operation leaves the instrument pending.
//!
//! A rule file is a list of rule groups. Each group opens on a row naming it
//! in `PaymentName`, lists the payment methods it covers down the
//! family/type/country columns, and carries one filter per row with a
//! `ClientActionType`.

use crate::error::{ConfigResult, MatchDimension, ResolveError, ResolveResult};
use crate::interfaces::csv::table_reader::ColumnMap;
use crate::table::{
    ColumnSet, ComponentRule, Dimension, FromComponent, NarrowingPass, ParsedComponent, RowRange,
    RuleFamily, RuleSource, SetOperation, narrow,
};
use std::str::FromStr;

pub const FAMILY: &str = "ClientAction";

const RULE: &str = "ClientActionRule";
const PAYMENT_METHOD: &str = "PaymentMethod";
const CLIENT_ACTION: &str = "ClientAction";

pub mod column {
    pub const PAYMENT_NAME: &str = "PaymentName";
    pub const PAYMENT_METHOD_FAMILY: &str = "PaymentMethodFamily";
    pub const PAYMENT_METHOD_TYPE: &str = "PaymentMethodType";
    pub const COUNTRY: &str = "Country";
    pub const UNMATCHED_PENDING_ON: &str = "UnmatchedPendingOn";
    pub const NULL_PENDING_ON: &str = "NullPendingOn";
    pub const UNMATCHED_REQUEST_TYPE: &str = "UnmatchedRequestType";
    pub const PENDING_ON: &str = "PendingOn";
    pub const REQUEST_TYPE: &str = "RequestType";
    pub const PARTNER: &str = "Partner";
    pub const CLIENT_ACTION_TYPE: &str = "ClientActionType";
    pub const CONTEXT: &str = "Context";
    pub const PIDL_RESOURCE_DESCRIPTION_TYPE: &str = "PidlResourceDescriptionType";
    pub const STATIC_REDIRECT: &str = "StaticRedirect";
    pub const CLEAR_MEMBERS: &str = "ClearMembers";
}

/// Resolved column indices for a client-action file.
#[derive(Debug, Clone)]
pub struct ClientActionColumns {
    pub payment_name: usize,
    pub family: usize,
    pub payment_type: usize,
    pub country: usize,
    pub unmatched_pending_on: usize,
    pub null_pending_on: usize,
    pub unmatched_request_type: usize,
    pub pending_on: usize,
    pub request_type: usize,
    pub partner: usize,
    pub action_type: usize,
    pub context: usize,
    pub description_type: usize,
    pub static_redirect: usize,
    pub clear_members: usize,
    width: usize,
}

impl ClientActionColumns {
    pub fn resolve(map: &ColumnMap) -> ConfigResult<Self> {
        let col = |name: &str| map.require(FAMILY, name);
        Ok(Self {
            payment_name: col(column::PAYMENT_NAME)?,
            family: col(column::PAYMENT_METHOD_FAMILY)?,
            payment_type: col(column::PAYMENT_METHOD_TYPE)?,
            country: col(column::COUNTRY)?,
            unmatched_pending_on: col(column::UNMATCHED_PENDING_ON)?,
            null_pending_on: col(column::NULL_PENDING_ON)?,
            unmatched_request_type: col(column::UNMATCHED_REQUEST_TYPE)?,
            pending_on: col(column::PENDING_ON)?,
            request_type: col(column::REQUEST_TYPE)?,
            partner: col(column::PARTNER)?,
            action_type: col(column::CLIENT_ACTION_TYPE)?,
            context: col(column::CONTEXT)?,
            description_type: col(column::PIDL_RESOURCE_DESCRIPTION_TYPE)?,
            static_redirect: col(column::STATIC_REDIRECT)?,
            clear_members: col(column::CLEAR_MEMBERS)?,
            width: map.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterActionType {
    Pidl,
    Redirect,
    Digitization,
}

impl FromStr for FilterActionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pidl" => Ok(FilterActionType::Pidl),
            "Redirect" => Ok(FilterActionType::Redirect),
            "Digitization" => Ok(FilterActionType::Digitization),
            _ => Err(()),
        }
    }
}

/// Which concrete payload a filter builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientActionContext {
    RedirectUrl,
    RedirectServiceLink,
    GetSmsChallengeDescriptionForPI,
    GetUpdateAgreementChallengeDescriptionForPI,
    GetStaticPidlDescriptions,
    GetPicvChallengeDescriptionForPI,
    Digitization,
}

impl FromStr for ClientActionContext {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RedirectUrl" => Ok(ClientActionContext::RedirectUrl),
            "RedirectServiceLink" => Ok(ClientActionContext::RedirectServiceLink),
            "GetSmsChallengeDescriptionForPI" => Ok(ClientActionContext::GetSmsChallengeDescriptionForPI),
            "GetUpdateAgreementChallengeDescriptionForPI" => {
                Ok(ClientActionContext::GetUpdateAgreementChallengeDescriptionForPI)
            }
            "GetStaticPidlDescriptions" => Ok(ClientActionContext::GetStaticPidlDescriptions),
            "GetPicvChallengeDescriptionForPI" => Ok(ClientActionContext::GetPicvChallengeDescriptionForPI),
            "Digitization" => Ok(ClientActionContext::Digitization),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidlDescription {
    SmsChallenge,
    UpdateAgreementChallenge,
    Static,
    PicvChallenge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Url,
    ServiceLink,
}

/// The action a filter applies, with the type/context pair already checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Pidl(PidlDescription),
    Redirect {
        target: RedirectTarget,
        static_redirect: bool,
        clear_members: bool,
    },
    Digitization,
}

impl FilterAction {
    fn from_columns(
        action_type: FilterActionType,
        context: ClientActionContext,
        static_redirect: bool,
        clear_members: bool,
    ) -> Option<Self> {
        use ClientActionContext as Ctx;

        match (action_type, context) {
            (FilterActionType::Pidl, Ctx::GetSmsChallengeDescriptionForPI) => {
                Some(FilterAction::Pidl(PidlDescription::SmsChallenge))
            }
            (FilterActionType::Pidl, Ctx::GetUpdateAgreementChallengeDescriptionForPI) => {
                Some(FilterAction::Pidl(PidlDescription::UpdateAgreementChallenge))
            }
            (FilterActionType::Pidl, Ctx::GetStaticPidlDescriptions) => {
                Some(FilterAction::Pidl(PidlDescription::Static))
            }
            (FilterActionType::Pidl, Ctx::GetPicvChallengeDescriptionForPI) => {
                Some(FilterAction::Pidl(PidlDescription::PicvChallenge))
            }
            (FilterActionType::Redirect, Ctx::RedirectUrl) => Some(FilterAction::Redirect {
                target: RedirectTarget::Url,
                static_redirect,
                clear_members,
            }),
            (FilterActionType::Redirect, Ctx::RedirectServiceLink) => Some(FilterAction::Redirect {
                target: RedirectTarget::ServiceLink,
                static_redirect,
                clear_members,
            }),
            (FilterActionType::Digitization, Ctx::Digitization) => Some(FilterAction::Digitization),
            _ => None,
        }
    }

    pub fn action_type(&self) -> FilterActionType {
        match self {
            FilterAction::Pidl(_) => FilterActionType::Pidl,
            FilterAction::Redirect { .. } => FilterActionType::Redirect,
            FilterAction::Digitization => FilterActionType::Digitization,
        }
    }
}

/// A leaf rule: three matching dimensions plus the action to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientActionFilter {
    pub line: usize,
    pub pending_on: Dimension,
    pub request_type: Dimension,
    pub partner: Dimension,
    pub action: FilterAction,
    pub description_type: Option<String>,
}

impl ClientActionFilter {
    /// True when every context this filter accepts is also accepted by
    /// `earlier`, making this filter unreachable behind it.
    pub fn is_shadowed_by(&self, earlier: &ClientActionFilter) -> bool {
        earlier.pending_on.covers(&self.pending_on)
            && earlier.request_type.covers(&self.request_type)
            && earlier.partner.covers(&self.partner)
    }
}

impl FromComponent<ClientActionColumns> for ClientActionFilter {
    fn construct(source: &RuleSource<'_, ClientActionColumns>, component: &ParsedComponent) -> ConfigResult<Self> {
        let c = source.columns;
        let line = source.line(component);

        let action_type: FilterActionType = source.parse_enum(component, c.action_type)?;
        let context: ClientActionContext = source.parse_enum(component, c.context)?;
        let action = FilterAction::from_columns(
            action_type,
            context,
            source.flag(component, c.static_redirect),
            source.flag(component, c.clear_members),
        )
        .ok_or_else(|| {
            source.shape(
                component,
                format!("client action type {action_type:?} cannot build context {context:?}"),
            )
        })?;

        Ok(Self {
            line,
            pending_on: source.dimension(component, c.pending_on)?,
            request_type: source.dimension(component, c.request_type)?,
            partner: source.dimension(component, c.partner)?,
            action,
            description_type: source.constant(component, c.description_type)?,
        })
    }
}

/// The payment methods a rule group applies to. Empty lists are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentMethodMatcher {
    pub family: Dimension,
    pub payment_type: Dimension,
    pub country: Dimension,
}

impl PaymentMethodMatcher {
    pub fn matches(&self, family: &str, payment_type: Option<&str>, country: Option<&str>) -> bool {
        self.family.matches(Some(family))
            && self.payment_type.matches(payment_type)
            && self.country.matches(country)
    }

    pub fn covers(&self, other: &PaymentMethodMatcher) -> bool {
        self.family.covers(&other.family)
            && self.payment_type.covers(&other.payment_type)
            && self.country.covers(&other.country)
    }

    pub fn is_catch_all(&self) -> bool {
        self.family.is_unconstrained() && self.payment_type.is_unconstrained() && self.country.is_unconstrained()
    }

    fn construct(
        source: &RuleSource<'_, ClientActionColumns>,
        group: &ParsedComponent,
    ) -> ConfigResult<Self> {
        let rows = group.children(PAYMENT_METHOD);
        let (first, last) = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(Self::default()),
        };

        if first.anchor() != group.anchor() {
            return Err(source.shape(
                first,
                "payment methods must start on the rule's PaymentName row".to_string(),
            ));
        }
        if let Some(gap) = rows.windows(2).find(|pair| pair[1].anchor() != pair[0].anchor() + 1) {
            return Err(source.shape(
                &gap[1],
                "payment method rows must be contiguous".to_string(),
            ));
        }

        let block = RowRange::new(first.anchor(), last.range.end);
        let c = source.columns;
        Ok(Self {
            family: Dimension::from_values(source.column_list(block, c.family)?, true),
            payment_type: Dimension::from_values(source.column_list(block, c.payment_type)?, true),
            country: Dimension::from_values(source.column_list(block, c.country)?, true),
        })
    }
}

/// Per-group settings for how narrowing failures are reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterExceptions {
    pub reject_null_pending_on: bool,
    pub unmatched_pending_on: Option<String>,
    pub unmatched_request_type: Option<String>,
}

/// A rule group: a payment-method selector plus filters in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientActionRule {
    pub name: String,
    pub line: usize,
    pub payment_method: PaymentMethodMatcher,
    pub exceptions: FilterExceptions,
    pub filters: Vec<ClientActionFilter>,
}

impl FromComponent<ClientActionColumns> for ClientActionRule {
    fn construct(source: &RuleSource<'_, ClientActionColumns>, component: &ParsedComponent) -> ConfigResult<Self> {
        let c = source.columns;
        let name = source
            .optional(component, c.payment_name)
            .ok_or_else(|| source.shape(component, "rule group does not start with a PaymentName".to_string()))?
            .to_string();

        let filters: Vec<ClientActionFilter> = source.build_children(component, CLIENT_ACTION)?;
        if filters.is_empty() {
            return Err(source.shape(component, format!("rule group '{name}' declares no client actions")));
        }

        Ok(Self {
            line: source.line(component),
            payment_method: PaymentMethodMatcher::construct(source, component)?,
            exceptions: FilterExceptions {
                reject_null_pending_on: source.flag(component, c.null_pending_on),
                unmatched_pending_on: source.optional(component, c.unmatched_pending_on).map(str::to_string),
                unmatched_request_type: source
                    .optional(component, c.unmatched_request_type)
                    .map(str::to_string),
            },
            filters,
            name,
        })
    }
}

/// Runtime values a client-action query is matched against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientActionQuery<'a> {
    pub family: &'a str,
    pub payment_type: Option<&'a str>,
    pub country: Option<&'a str>,
    pub pending_on: Option<&'a str>,
    pub request_type: Option<&'a str>,
    pub partner: Option<&'a str>,
}

impl ClientActionRule {
    pub fn matches_payment_method(&self, query: &ClientActionQuery<'_>) -> bool {
        self.payment_method
            .matches(query.family, query.payment_type, query.country)
    }

    /// Runs the PendingOn, RequestType and Partner passes over this group's
    /// filters. Returns the survivors in file order together with the
    /// candidate count before each pass and after the last one.
    pub fn narrow_filters<'r>(
        &'r self,
        query: &ClientActionQuery<'_>,
    ) -> ResolveResult<(Vec<&'r ClientActionFilter>, [usize; 4])> {
        if self.exceptions.reject_null_pending_on && query.pending_on.is_none_or(str::is_empty) {
            return Err(ResolveError::NullPendingOn);
        }

        let mut counts = [self.filters.len(), 0, 0, 0];
        let candidates: Vec<&ClientActionFilter> = self.filters.iter().collect();

        let pending_on = NarrowingPass::new(MatchDimension::PendingOn, query.pending_on)
            .with_message(self.exceptions.unmatched_pending_on.as_deref());
        let candidates = narrow(candidates, &pending_on, |f| &f.pending_on)?;
        counts[1] = candidates.len();

        let request_type = NarrowingPass::new(MatchDimension::RequestType, query.request_type)
            .with_message(self.exceptions.unmatched_request_type.as_deref());
        let candidates = narrow(candidates, &request_type, |f| &f.request_type)?;
        counts[2] = candidates.len();

        let partner = NarrowingPass::new(MatchDimension::Partner, query.partner);
        let candidates = narrow(candidates, &partner, |f| &f.partner)?;
        counts[3] = candidates.len();

        Ok((candidates, counts))
    }
}

/// The outcome of matching one query.
#[derive(Debug, Clone, Copy)]
pub struct ClientActionMatch<'r> {
    pub rule_index: usize,
    pub rule: &'r ClientActionRule,
    pub filter: &'r ClientActionFilter,
    /// Filters still standing after the last pass; more than one means the
    /// file order decided.
    pub survivors: usize,
    pub candidate_counts: [usize; 4],
}

impl ClientActionMatch<'_> {
    pub fn is_ambiguous(&self) -> bool {
        self.survivors > 1
    }
}

/// Root rule set for the client-action family.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientActionRules {
    pub rules: Vec<ClientActionRule>,
}

impl ClientActionRules {
    /// The first group in file order whose payment-method selector matches.
    pub fn matching_rule(&self, query: &ClientActionQuery<'_>) -> ResolveResult<(usize, &ClientActionRule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches_payment_method(query))
            .ok_or_else(|| ResolveError::NoMatchingGroup {
                family: query.family.to_string(),
                payment_type: query.payment_type.unwrap_or_default().to_string(),
                country: query.country.unwrap_or_default().to_string(),
            })
    }

    pub fn resolve(&self, query: &ClientActionQuery<'_>) -> ResolveResult<ClientActionMatch<'_>> {
        let (rule_index, rule) = self.matching_rule(query)?;
        let (survivors, candidate_counts) = rule.narrow_filters(query)?;

        // narrow() never hands back an empty list
        let filter = survivors[0];
        Ok(ClientActionMatch {
            rule_index,
            rule,
            filter,
            survivors: survivors.len(),
            candidate_counts,
        })
    }

    pub fn filter_count(&self) -> usize {
        self.rules.iter().map(|r| r.filters.len()).sum()
    }
}

impl RuleFamily for ClientActionRules {
    const NAME: &'static str = FAMILY;
    type Columns = ClientActionColumns;

    fn columns(map: &ColumnMap) -> ConfigResult<Self::Columns> {
        ClientActionColumns::resolve(map)
    }

    fn grammar(c: &Self::Columns) -> ComponentRule {
        let name = ColumnSet::from_indices(vec![c.payment_name]);
        let any = ColumnSet::from_indices((0..c.width).collect());
        let method = ColumnSet::from_indices(vec![c.family, c.payment_type, c.country]);
        let action = ColumnSet::from_indices(vec![c.action_type]);

        ComponentRule::new("ClientActionRules").with_sub_component(
            ComponentRule::new(RULE)
                .extend_while(name, SetOperation::AllEmpty)
                .keep_when(any, SetOperation::SomeFull)
                .with_sub_component(ComponentRule::new(PAYMENT_METHOD).keep_when(method, SetOperation::SomeFull))
                .with_sub_component(ComponentRule::new(CLIENT_ACTION).keep_when(action, SetOperation::AllFull)),
        )
    }

    fn construct(source: &RuleSource<'_, Self::Columns>, root: &ParsedComponent) -> ConfigResult<Self> {
        Ok(Self {
            rules: source.build_children(root, RULE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::interfaces::csv::table_reader::TableReader;
    use crate::table::builder;

    const HEADER: &str = "PaymentName,PaymentMethodFamily,PaymentMethodType,Country,UnmatchedPendingOn,NullPendingOn,UnmatchedRequestType,PendingOn,RequestType,Partner,ClientActionType,Context,PidlResourceDescriptionType,StaticRedirect,ClearMembers";

    fn rules(body: &str) -> ConfigResult<ClientActionRules> {
        let data = format!("{HEADER}\n{body}");
        let table = TableReader::new(data.as_bytes(), b',').load()?;
        builder::build(&table)
    }

    fn query<'a>(family: &'a str, payment_type: &'a str, pending_on: Option<&'a str>) -> ClientActionQuery<'a> {
        ClientActionQuery {
            family,
            payment_type: Some(payment_type),
            country: Some("us"),
            pending_on,
            request_type: None,
            partner: Some("webblends"),
        }
    }

    #[test]
    fn test_builds_groups_and_lists() {
        let rules = rules(
            "Cards,credit_card,visa,us,,,,sms,,,Pidl,GetSmsChallengeDescriptionForPI,,,\n\
             ,,PaymentMethodType.CreditCardMasterCard,ca,,,,,,,,,,,\n\
             ,,,,,,,,,,Redirect,RedirectUrl,,,\n\
             Other,,,,,,,,,,Pidl,GetStaticPidlDescriptions,PidlResourceDescriptionType.GenericPollingStaticPidl,,",
        )
        .unwrap();

        assert_eq!(rules.rules.len(), 2);
        let cards = &rules.rules[0];
        assert_eq!(cards.name, "Cards");
        assert_eq!(cards.payment_method.payment_type, Dimension::In(vec!["visa".into(), "mc".into()]));
        assert_eq!(cards.payment_method.country, Dimension::In(vec!["us".into(), "ca".into()]));
        assert_eq!(cards.filters.len(), 2);
        assert_eq!(cards.filters[1].line, 4);

        let other = &rules.rules[1];
        assert!(other.payment_method.is_catch_all());
        assert_eq!(other.filters[0].description_type.as_deref(), Some("genericPollingStatic"));
    }

    #[test]
    fn test_group_selection_is_first_match_in_file_order() {
        let rules = rules(
            "Visa,credit_card,visa,,,,,,,,Pidl,GetStaticPidlDescriptions,,,\n\
             Any,,,,,,,,,,Pidl,GetSmsChallengeDescriptionForPI,,,",
        )
        .unwrap();

        let (index, _) = rules.matching_rule(&query("credit_card", "visa", None)).unwrap();
        assert_eq!(index, 0);
        let (index, _) = rules.matching_rule(&query("ewallet", "paypal", None)).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn test_no_matching_group() {
        let rules = rules("Visa,credit_card,visa,,,,,,,,Pidl,GetStaticPidlDescriptions,,,").unwrap();
        let err = rules.resolve(&query("ewallet", "paypal", None)).unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingGroup { ref family, .. } if family == "ewallet"));
    }

    #[test]
    fn test_pending_on_specific_filter_wins_in_file_order() {
        let rules = rules(
            "Cards,credit_card,visa,,,,,3ds_challenge,,,Redirect,RedirectUrl,,,\n\
             ,,,,,,,,,,Pidl,GetStaticPidlDescriptions,,,",
        )
        .unwrap();

        let matched = rules
            .resolve(&query("credit_card", "visa", Some("3ds_challenge")))
            .unwrap();
        assert_eq!(matched.filter.line, 2);
        assert!(matched.is_ambiguous());

        let matched = rules.resolve(&query("credit_card", "visa", Some("sms"))).unwrap();
        assert_eq!(matched.filter.line, 3);
        assert!(!matched.is_ambiguous());
    }

    #[test]
    fn test_unmatched_pending_on_uses_configured_message() {
        let rules = rules(
            "Cards,credit_card,visa,,PendingOn {0} is not supported,,,sms,,,Pidl,GetSmsChallengeDescriptionForPI,,,\n\
             ,,,,,,,picv,,,Pidl,GetPicvChallengeDescriptionForPI,,,",
        )
        .unwrap();

        let err = rules.resolve(&query("credit_card", "visa", Some("redirect"))).unwrap_err();
        assert_eq!(err.to_string(), "PendingOn redirect is not supported");
        assert!(matches!(
            err,
            ResolveError::NarrowingExhausted { dimension: MatchDimension::PendingOn, .. }
        ));
    }

    #[test]
    fn test_null_pending_on_rejected_when_configured() {
        let rules = rules("Cards,credit_card,visa,,,TRUE,,,,,Pidl,GetStaticPidlDescriptions,,,").unwrap();
        let err = rules.resolve(&query("credit_card", "visa", None)).unwrap_err();
        assert!(matches!(err, ResolveError::NullPendingOn));
    }

    #[test]
    fn test_candidate_counts_never_grow() {
        let rules = rules(
            "Cards,credit_card,visa,,,,,sms,,,Pidl,GetSmsChallengeDescriptionForPI,,,\n\
             ,,,,,,,,addPI,,Pidl,GetStaticPidlDescriptions,,,\n\
             ,,,,,,,,,!xbox,Pidl,GetStaticPidlDescriptions,,,\n\
             ,,,,,,,,,,Pidl,GetStaticPidlDescriptions,,,",
        )
        .unwrap();

        let matched = rules.resolve(&query("credit_card", "visa", Some("sms"))).unwrap();
        let counts = matched.candidate_counts;
        assert_eq!(counts, [4, 4, 3, 3]);
        assert!(counts.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_invalid_type_context_pair_is_startup_error() {
        let err = rules("Cards,credit_card,visa,,,,,,,,Redirect,GetSmsChallengeDescriptionForPI,,,").unwrap_err();
        assert!(matches!(err, ConfigError::Shape { row: 2, .. }));
    }

    #[test]
    fn test_unknown_action_type_is_startup_error() {
        let err = rules("Cards,credit_card,visa,,,,,,,,Popup,RedirectUrl,,,").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref column, .. } if column == "ClientActionType"));
    }

    #[test]
    fn test_bare_negation_is_startup_error() {
        let err = rules(
            "Cards,credit_card,visa,,,,,,,,Pidl,GetStaticPidlDescriptions,,,\n\
             ,,,,,,,,,!,Pidl,GetStaticPidlDescriptions,,,",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref column, row: 3, ref value } if column == "Partner" && value == "!"
        ));
    }

    #[test]
    fn test_lines_after_blank_line_match_the_file() {
        let parsed = rules(
            "Cards,credit_card,visa,,,,,sms,,,Pidl,GetSmsChallengeDescriptionForPI,,,\n\
             \n\
             ,,,,,,,,,,Pidl,GetStaticPidlDescriptions,,,",
        )
        .unwrap();
        assert_eq!(parsed.rules[0].filters[1].line, 4);

        let err = rules(
            "Cards,credit_card,visa,,,,,,,,Pidl,GetStaticPidlDescriptions,,,\n\
             \n\
             ,,,,,,,sms,,,Redirect,GetSmsChallengeDescriptionForPI,,,",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Shape { row: 4, .. }), "{err:?}");
    }

    #[test]
    fn test_missing_column_is_startup_error() {
        let table = TableReader::new("PaymentName,PaymentMethodFamily\nA,b".as_bytes(), b',')
            .load()
            .unwrap();
        let err = builder::build::<ClientActionRules>(&table).unwrap_err();
        assert!(matches!(err, ConfigError::MissingColumn { family: FAMILY, .. }));
    }

    #[test]
    fn test_gap_in_payment_method_rows_is_startup_error() {
        let err = rules(
            "Cards,credit_card,visa,,,,,,,,Pidl,GetStaticPidlDescriptions,,,\n\
             ,,,,,,,sms,,,Pidl,GetSmsChallengeDescriptionForPI,,,\n\
             ,,mc,,,,,,,,,,,,",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Shape { row: 4, .. }));
    }

    #[test]
    fn test_shadowed_filter_detection() {
        let rules = rules(
            "Cards,credit_card,visa,,,,,,,,Pidl,GetStaticPidlDescriptions,,,\n\
             ,,,,,,,sms,,,Pidl,GetSmsChallengeDescriptionForPI,,,",
        )
        .unwrap();
        let filters = &rules.rules[0].filters;
        assert!(filters[1].is_shadowed_by(&filters[0]));
        assert!(!filters[0].is_shadowed_by(&filters[1]));
    }
}
