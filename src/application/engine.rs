use super::client_action::{self, Dispatch};
use super::review::{self, Finding};
use super::service_error::{self, ErrorCollaborators};
use crate::config::Settings;
use crate::domain::instrument::PaymentInstrument;
use crate::domain::ports::{DescriptionFactoryBox, LocalizerBox, PaymentInstrumentAccessorBox};
use crate::domain::request::{ClientActionRequest, ServiceErrorRequest};
use crate::domain::service_error::ServiceErrorResponse;
use crate::error::{ConfigResult, ResolveError, ResolveResult};
use crate::infrastructure::rule_store::RuleStore;
use crate::rules::{ClientActionQuery, ClientActionRules, ErrorResourceAction, ServiceErrorQuery, ServiceErrorRules};
use crate::table::builder;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// External collaborators the engine calls out to.
pub struct Collaborators {
    pub localizer: LocalizerBox,
    pub descriptions: DescriptionFactoryBox,
    pub accessor: PaymentInstrumentAccessorBox,
}

/// Summary of a client-action resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientActionOutcome {
    pub rule: String,
    pub filter_line: usize,
    pub survivors: usize,
    pub dispatch: Dispatch,
}

/// The entry point for payment-instrument lifecycle decisions.
///
/// `LifecycleEngine` owns one published rule set per family and the
/// collaborators the executors need. Resolution reads a snapshot of the
/// current rules; [`LifecycleEngine::reload`] builds replacements off to the
/// side and publishes them with a pointer swap.
pub struct LifecycleEngine {
    settings: Settings,
    client_actions: RuleStore<ClientActionRules>,
    service_errors: RuleStore<ServiceErrorRules>,
    collaborators: Collaborators,
}

impl LifecycleEngine {
    /// Loads both rule files named in `settings`. Any configuration error is
    /// returned and no engine is built.
    pub fn initialize(settings: Settings, collaborators: Collaborators) -> ConfigResult<Self> {
        let (client_actions, service_errors) = load_rule_sets(&settings)?;
        Ok(Self::from_rule_sets(settings, client_actions, service_errors, collaborators))
    }

    pub fn from_rule_sets(
        settings: Settings,
        client_actions: ClientActionRules,
        service_errors: ServiceErrorRules,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            settings,
            client_actions: RuleStore::new(client_actions),
            service_errors: RuleStore::new(service_errors),
            collaborators,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client_action_rules(&self) -> Arc<ClientActionRules> {
        self.client_actions.snapshot()
    }

    pub fn service_error_rules(&self) -> Arc<ServiceErrorRules> {
        self.service_errors.snapshot()
    }

    /// Rebuilds both families from the configured paths. Either both are
    /// published or, on error, neither is.
    pub fn reload(&self) -> ConfigResult<()> {
        let (client_actions, service_errors) = load_rule_sets(&self.settings)?;
        self.client_actions.replace(client_actions);
        self.service_errors.replace(service_errors);
        info!("reloaded rule sets");
        Ok(())
    }

    pub fn reload_client_actions(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let rules: ClientActionRules = builder::load(path, self.settings.delimiter_byte()?)?;
        info!(rules = rules.rules.len(), filters = rules.filter_count(), "reloaded client action rules");
        self.client_actions.replace(rules);
        Ok(())
    }

    pub fn reload_service_errors(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let rules: ServiceErrorRules = builder::load(path, self.settings.delimiter_byte()?)?;
        info!(
            request_types = rules.request_types.len(),
            rules = rules.filter_count(),
            "reloaded service error rules"
        );
        self.service_errors.replace(rules);
        Ok(())
    }

    pub fn review(&self) -> Vec<Finding> {
        review::review(&self.client_actions.snapshot(), &self.service_errors.snapshot())
    }

    /// Selects the client action for `pi` and attaches it in place.
    pub fn resolve_client_action(
        &self,
        request: &ClientActionRequest,
        pi: &mut PaymentInstrument,
    ) -> ResolveResult<ClientActionOutcome> {
        let rules = self.client_actions.snapshot();
        let query = ClientActionQuery {
            family: &pi.payment_method.payment_method_family,
            payment_type: pi.payment_method.payment_method_type.as_deref(),
            country: Some(request.country.as_str()),
            pending_on: pi.pending_on(),
            request_type: request.request_type.as_deref(),
            partner: Some(request.partner.as_str()),
        };

        let matched = rules
            .resolve(&query)
            .inspect_err(|err| log_failure(request.correlation_id, "client action", err))?;

        if matched.is_ambiguous() {
            warn!(
                correlation_id = %request.correlation_id,
                rule = %matched.rule.name,
                line = matched.filter.line,
                survivors = matched.survivors,
                "several client action filters match; using the first"
            );
        }

        let filter = matched.filter;
        let outcome_rule = matched.rule.name.clone();
        let survivors = matched.survivors;
        let dispatch = client_action::apply(
            filter,
            request,
            pi,
            &self.settings,
            self.collaborators.descriptions.as_ref(),
        );

        info!(
            correlation_id = %request.correlation_id,
            rule = %outcome_rule,
            line = filter.line,
            action = ?filter.action.action_type(),
            dispatch = ?dispatch,
            "resolved client action"
        );

        Ok(ClientActionOutcome {
            rule: outcome_rule,
            filter_line: filter.line,
            survivors,
            dispatch,
        })
    }

    /// Rewrites a downstream error into the response the client receives.
    pub async fn resolve_service_error(
        &self,
        action: ErrorResourceAction,
        request: &ServiceErrorRequest,
        error: ServiceErrorResponse,
    ) -> ResolveResult<ServiceErrorResponse> {
        let rules = self.service_errors.snapshot();
        let query = ServiceErrorQuery {
            family: &request.payment_method_family,
            payment_type: request.payment_type_or_empty(),
            country: Some(request.country.as_str()).filter(|c| !c.is_empty()),
            partner: Some(request.partner.as_str()).filter(|p| !p.is_empty()),
            error_code: &error.error_code,
        };

        let matched = rules
            .resolve(action, &query)
            .inspect_err(|err| log_failure(request.correlation_id, "service error", err))?;

        if matched.is_ambiguous() {
            warn!(
                correlation_id = %request.correlation_id,
                %action,
                line = matched.filter.line,
                survivors = matched.survivors,
                "several service error rules match; using the first"
            );
        }
        info!(
            correlation_id = %request.correlation_id,
            %action,
            rule = %matched.filter,
            line = matched.entry.line,
            error_code = %error.error_code,
            "resolved service error"
        );

        let entry = matched.entry;
        let collaborators = ErrorCollaborators {
            localizer: self.collaborators.localizer.as_ref(),
            descriptions: self.collaborators.descriptions.as_ref(),
            accessor: self.collaborators.accessor.as_ref(),
        };
        service_error::apply(entry, request, error, &collaborators)
            .await
            .inspect_err(|err| log_failure(request.correlation_id, "service error", err))
    }
}

fn load_rule_sets(settings: &Settings) -> ConfigResult<(ClientActionRules, ServiceErrorRules)> {
    let delimiter = settings.delimiter_byte()?;
    let client_actions: ClientActionRules = builder::load(&settings.client_action_config, delimiter)?;
    let service_errors: ServiceErrorRules = builder::load(&settings.service_error_config, delimiter)?;
    info!(
        client_action_rules = client_actions.rules.len(),
        client_action_filters = client_actions.filter_count(),
        service_error_request_types = service_errors.request_types.len(),
        service_error_rules = service_errors.filter_count(),
        "built rule sets"
    );
    Ok((client_actions, service_errors))
}

fn log_failure(correlation_id: Uuid, what: &str, err: &ResolveError) {
    error!(%correlation_id, code = err.code(), error = %err, "{what} resolution failed");
}
