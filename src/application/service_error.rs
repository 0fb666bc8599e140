use crate::domain::instrument::{ClientAction, ClientActionPayload, ClientActionType, PaymentInstrument, PaymentMethod};
use crate::domain::ports::{DescriptionFactory, DescriptionKind, DescriptionParams, Localizer, PaymentInstrumentAccessor};
use crate::domain::request::ServiceErrorRequest;
use crate::domain::service_error::{NO_MESSAGE, ServiceErrorDetail, ServiceErrorResponse};
use crate::error::{ResolveError, ResolveResult};
use crate::rules::service_error::{ErrorClientAction, ErrorDetails};
use crate::table::constants;
use tracing::debug;

/// Collaborators the service-error executor talks to.
pub struct ErrorCollaborators<'a> {
    pub localizer: &'a dyn Localizer,
    pub descriptions: &'a dyn DescriptionFactory,
    pub accessor: &'a dyn PaymentInstrumentAccessor,
}

/// Rewrites `error` according to the matched entry.
pub async fn apply(
    entry: &ErrorDetails,
    request: &ServiceErrorRequest,
    mut error: ServiceErrorResponse,
    collaborators: &ErrorCollaborators<'_>,
) -> ResolveResult<ServiceErrorResponse> {
    let language = request.language.as_str();

    error.message = if entry.message == NO_MESSAGE {
        NO_MESSAGE.to_string()
    } else {
        collaborators.localizer.localized_string(&entry.message, language)
    };

    if entry.has_detail() {
        error.add_detail(ServiceErrorDetail {
            error_code: entry
                .details_error_code
                .clone()
                .unwrap_or_else(|| error.error_code.clone()),
            message: entry
                .details_message
                .as_deref()
                .map(|m| collaborators.localizer.localized_string(m, language))
                .unwrap_or_default(),
            target: entry.details_target.clone(),
        });
    }

    // an entry without a client action leaves the downstream one in place
    let action = match entry.client_action {
        ErrorClientAction::None => None,
        ErrorClientAction::Jumpback => Some(jumpback(request, collaborators.descriptions)),
        ErrorClientAction::DirectDebitAch => {
            Some(picv_challenge(request, constants::ACH_PICV_CHALLENGE, collaborators).await?)
        }
        ErrorClientAction::DirectDebitSepa => {
            Some(picv_challenge(request, constants::SEPA_PICV_CHALLENGE, collaborators).await?)
        }
    };
    if action.is_some() {
        error.client_action = action;
    }

    Ok(error)
}

fn params<'a>(request: &'a ServiceErrorRequest) -> DescriptionParams<'a> {
    DescriptionParams {
        classic_product: request.classic_product.as_deref(),
        billable_account_id: request.billable_account_id.as_deref(),
        complete_prerequisites: request.complete_prerequisites,
        ..DescriptionParams::new(&request.language, &request.partner, &request.country)
    }
}

fn jumpback(request: &ServiceErrorRequest, descriptions: &dyn DescriptionFactory) -> ClientAction {
    let payment_method = request
        .payment_instrument
        .as_ref()
        .map(|pi| pi.payment_method.clone())
        .unwrap_or_else(|| PaymentMethod {
            payment_method_family: request.payment_method_family.clone(),
            payment_method_type: request.payment_method_type.clone(),
        });

    let params = DescriptionParams {
        payment_method: Some(&payment_method),
        description_type: Some(constants::PAYMENT_METHOD_DESCRIPTION),
        ..params(request)
    };

    let mut action = ClientAction::new(ClientActionType::Pidl);
    action.context = Some(ClientActionPayload::Descriptions(
        descriptions.describe(DescriptionKind::PaymentMethod, &params),
    ));
    action
}

/// Re-reads the instrument so the challenge reflects its current state.
async fn picv_challenge(
    request: &ServiceErrorRequest,
    description_type: &str,
    collaborators: &ErrorCollaborators<'_>,
) -> ResolveResult<ClientAction> {
    let piid = request
        .piid
        .as_deref()
        .or(request.payment_instrument.as_ref().map(|pi| pi.payment_instrument_id.as_str()))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ResolveError::Accessor("no payment instrument id to re-acquire".to_string()))?;

    debug!(
        correlation_id = %request.correlation_id,
        piid,
        description_type,
        "re-acquiring payment instrument for challenge"
    );
    let pi: PaymentInstrument = collaborators
        .accessor
        .get_payment_instrument(&request.account_id, piid, request.correlation_id)
        .await?;

    let params = DescriptionParams {
        payment_instrument: Some(&pi),
        payment_method: Some(&pi.payment_method),
        description_type: Some(description_type),
        ..params(request)
    };

    let mut action = ClientAction::new(ClientActionType::Pidl);
    action.context = Some(ClientActionPayload::Descriptions(
        collaborators.descriptions.describe(DescriptionKind::PicvChallenge, &params),
    ));
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::descriptions::TemplateDescriptionFactory;
    use crate::infrastructure::in_memory::{InMemoryLocalizer, InMemoryPaymentInstrumentStore};

    fn entry(message: &str, client_action: ErrorClientAction) -> ErrorDetails {
        ErrorDetails {
            line: 2,
            message: message.to_string(),
            error_codes: vec!["Declined".into()],
            details_error_code: None,
            details_message: None,
            details_target: None,
            client_action,
        }
    }

    fn run<'a>(
        localizer: &'a InMemoryLocalizer,
        store: &'a InMemoryPaymentInstrumentStore,
        descriptions: &'a TemplateDescriptionFactory,
    ) -> ErrorCollaborators<'a> {
        ErrorCollaborators {
            localizer,
            descriptions,
            accessor: store,
        }
    }

    #[tokio::test]
    async fn test_message_localized_and_detail_added() {
        let localizer = InMemoryLocalizer::new().with_string("de-DE", "Card declined", "Karte abgelehnt");
        let store = InMemoryPaymentInstrumentStore::new();
        let descriptions = TemplateDescriptionFactory::new();

        let mut entry = entry("Card declined", ErrorClientAction::None);
        entry.details_target = Some("accountToken".into());
        let mut request = ServiceErrorRequest::new("credit_card", Some("visa"));
        request.language = "de-DE".into();

        let response = apply(
            &entry,
            &request,
            ServiceErrorResponse::new("Declined", "raw downstream text"),
            &run(&localizer, &store, &descriptions),
        )
        .await
        .unwrap();

        assert_eq!(response.message, "Karte abgelehnt");
        assert_eq!(response.details.len(), 1);
        assert_eq!(response.details[0].error_code, "Declined");
        assert_eq!(response.details[0].target.as_deref(), Some("accountToken"));
        assert!(response.client_action.is_none());
    }

    #[tokio::test]
    async fn test_no_message_is_sent_literally() {
        let localizer = InMemoryLocalizer::new();
        let store = InMemoryPaymentInstrumentStore::new();
        let descriptions = TemplateDescriptionFactory::new();
        let request = ServiceErrorRequest::new("ewallet", Some("paypal"));

        let response = apply(
            &entry(NO_MESSAGE, ErrorClientAction::Jumpback),
            &request,
            ServiceErrorResponse::new("Declined", "raw downstream text"),
            &run(&localizer, &store, &descriptions),
        )
        .await
        .unwrap();

        assert_eq!(response.message, NO_MESSAGE);
        assert!(response.details.is_empty());
        let Some(ClientActionPayload::Descriptions(resources)) = response.client_action.unwrap().context else {
            panic!("expected descriptions");
        };
        assert_eq!(resources[0].identity["family"], "ewallet");
        assert_eq!(resources[0].identity["type"], "paymentMethod");
    }

    #[tokio::test]
    async fn test_downstream_client_action_survives_entry_without_one() {
        let localizer = InMemoryLocalizer::new();
        let store = InMemoryPaymentInstrumentStore::new();
        let descriptions = TemplateDescriptionFactory::new();
        let request = ServiceErrorRequest::new("credit_card", Some("visa"));

        let mut downstream = ServiceErrorResponse::new("Declined", "raw downstream text");
        let mut existing = ClientAction::new(ClientActionType::Redirect);
        existing.context = Some(ClientActionPayload::Url("https://bank.example/retry".into()));
        downstream.client_action = Some(existing.clone());

        let response = apply(
            &entry("Card declined", ErrorClientAction::None),
            &request,
            downstream,
            &run(&localizer, &store, &descriptions),
        )
        .await
        .unwrap();

        assert_eq!(response.message, "Card declined");
        assert_eq!(response.client_action, Some(existing));
    }

    #[tokio::test]
    async fn test_ach_reacquires_instrument() {
        let localizer = InMemoryLocalizer::new();
        let store = InMemoryPaymentInstrumentStore::new();
        let descriptions = TemplateDescriptionFactory::new();
        let mut pi = PaymentInstrument {
            payment_instrument_id: "pi-ach".into(),
            payment_method: PaymentMethod {
                payment_method_family: "direct_debit".into(),
                payment_method_type: Some("ach".into()),
            },
            ..Default::default()
        };
        pi.payment_instrument_details.picv_required = true;
        store.store("acc-1", pi).await;

        let mut request = ServiceErrorRequest::new("direct_debit", Some("ach"));
        request.account_id = "acc-1".into();
        request.piid = Some("pi-ach".into());

        let response = apply(
            &entry("Verify your account", ErrorClientAction::DirectDebitAch),
            &request,
            ServiceErrorResponse::new("PicvRequired", ""),
            &run(&localizer, &store, &descriptions),
        )
        .await
        .unwrap();

        let Some(ClientActionPayload::Descriptions(resources)) = response.client_action.unwrap().context else {
            panic!("expected descriptions");
        };
        assert_eq!(resources[0].identity["type"], "ach_picv");
        assert_eq!(resources[0].identity["id"], "pi-ach");
    }

    #[tokio::test]
    async fn test_sepa_without_instrument_fails() {
        let localizer = InMemoryLocalizer::new();
        let store = InMemoryPaymentInstrumentStore::new();
        let descriptions = TemplateDescriptionFactory::new();
        let mut request = ServiceErrorRequest::new("direct_debit", Some("sepa"));
        request.piid = Some("missing".into());

        let result = apply(
            &entry("Verify", ErrorClientAction::DirectDebitSepa),
            &request,
            ServiceErrorResponse::new("PicvRequired", ""),
            &run(&localizer, &store, &descriptions),
        )
        .await;

        assert!(matches!(result, Err(ResolveError::Accessor(_))));
    }
}
