use crate::config::{MEMBER_CLEARING_PARTNERS, Settings};
use crate::domain::instrument::{
    ClientAction, ClientActionPayload, ClientActionType, PaymentInstrument, RedirectionServiceLink,
};
use crate::domain::ports::{DescriptionFactory, DescriptionKind, DescriptionParams};
use crate::domain::request::ClientActionRequest;
use crate::rules::client_action::{ClientActionFilter, FilterAction, PidlDescription, RedirectTarget};
use std::collections::BTreeMap;

/// What applying a matched filter did to the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Attached,
    /// Redirect filter on an instrument without a redirect URL, or no
    /// digitization step offered.
    Skipped,
}

/// Builds the matched filter's action and attaches it to `pi`.
pub fn apply(
    filter: &ClientActionFilter,
    request: &ClientActionRequest,
    pi: &mut PaymentInstrument,
    settings: &Settings,
    descriptions: &dyn DescriptionFactory,
) -> Dispatch {
    let action = match filter.action {
        FilterAction::Pidl(description) => Some(pidl_action(filter, description, request, pi, descriptions)),
        FilterAction::Redirect {
            target,
            static_redirect,
            clear_members,
        } => redirect_action(filter, target, static_redirect, clear_members, request, pi, settings, descriptions),
        FilterAction::Digitization => descriptions.digitization_action(
            pi,
            &request.account_id,
            &request.language,
            &request.partner,
            request.pidl_base_url.as_deref(),
        ),
    };

    match action {
        Some(action) => {
            pi.client_action = Some(action);
            Dispatch::Attached
        }
        None => Dispatch::Skipped,
    }
}

fn params<'a>(
    filter: &'a ClientActionFilter,
    request: &'a ClientActionRequest,
    pi: &'a PaymentInstrument,
) -> DescriptionParams<'a> {
    DescriptionParams {
        payment_instrument: Some(pi),
        payment_method: Some(&pi.payment_method),
        description_type: filter.description_type.as_deref(),
        classic_product: request.classic_product.as_deref(),
        billable_account_id: request.billable_account_id.as_deref(),
        email_address: request.email_address.as_deref(),
        complete_prerequisites: request.complete_prerequisites,
        ..DescriptionParams::new(&request.language, &request.partner, &request.country)
    }
}

fn pidl_action(
    filter: &ClientActionFilter,
    description: PidlDescription,
    request: &ClientActionRequest,
    pi: &PaymentInstrument,
    descriptions: &dyn DescriptionFactory,
) -> ClientAction {
    let kind = match description {
        PidlDescription::SmsChallenge => DescriptionKind::SmsChallenge,
        PidlDescription::UpdateAgreementChallenge => DescriptionKind::UpdateAgreementChallenge,
        PidlDescription::Static => DescriptionKind::Static,
        PidlDescription::PicvChallenge => DescriptionKind::PicvChallenge,
    };

    let mut action = ClientAction::new(ClientActionType::Pidl);
    action.context = Some(ClientActionPayload::Descriptions(
        descriptions.describe(kind, &params(filter, request, pi)),
    ));
    action
}

/// The link the client returns through after completing a redirect.
pub fn service_link(pi: &PaymentInstrument, redirect_url: &str) -> RedirectionServiceLink {
    let details = &pi.payment_instrument_details;
    let ru_parameters = BTreeMap::from([
        ("id".to_string(), pi.payment_instrument_id.clone()),
        ("family".to_string(), pi.payment_method.payment_method_family.clone()),
        (
            "type".to_string(),
            pi.payment_method.payment_method_type.clone().unwrap_or_default(),
        ),
        ("pendingOn".to_string(), details.pending_on.clone().unwrap_or_default()),
        ("picvRequired".to_string(), details.picv_required.to_string()),
    ]);

    RedirectionServiceLink {
        base_url: redirect_url.to_string(),
        ru_parameters,
    }
}

#[allow(clippy::too_many_arguments)]
fn redirect_action(
    filter: &ClientActionFilter,
    target: RedirectTarget,
    static_redirect: bool,
    clear_members: bool,
    request: &ClientActionRequest,
    pi: &PaymentInstrument,
    settings: &Settings,
    descriptions: &dyn DescriptionFactory,
) -> Option<ClientAction> {
    let redirect_url = pi.redirect_url()?;
    let link = service_link(pi, redirect_url);

    let mut action = ClientAction::new(ClientActionType::Redirect);
    action.context = Some(match target {
        RedirectTarget::Url => ClientActionPayload::Url(redirect_url.to_string()),
        RedirectTarget::ServiceLink => ClientActionPayload::ServiceLink(link.clone()),
    });

    let kind = if static_redirect {
        DescriptionKind::StaticRedirect
    } else {
        DescriptionKind::Redirect
    };
    let redirect_params = DescriptionParams {
        redirect_link: static_redirect.then_some(&link),
        ..params(filter, request, pi)
    };

    let partner = request.partner.as_str();
    if !settings.is_inline_partner(partner) {
        action.redirect_pidl = Some(descriptions.describe(kind, &redirect_params));
    } else if clear_members && MEMBER_CLEARING_PARTNERS.iter().any(|p| p.eq_ignore_ascii_case(partner)) {
        let mut redirect_pidl = descriptions.describe(kind, &redirect_params);
        if let Some(page) = redirect_pidl.first_mut().and_then(|r| r.display_pages.first_mut()) {
            page.members.clear();
        }
        action.redirect_pidl = Some(redirect_pidl);
    }

    Some(action)
}
