use crate::domain::instrument::{
    ClientAction, ClientActionPayload, ClientActionType, DisplayPage, PaymentInstrument, PidlResource,
};
use crate::domain::ports::{DescriptionFactory, DescriptionKind, DescriptionParams};
use serde_json::json;
use std::collections::BTreeMap;

/// Builds small, self-describing UI descriptions.
///
/// Each description carries its kind and inputs in `identity` and a single
/// display page, which is enough for the CLI and for asserting on what a
/// rule produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateDescriptionFactory;

impl TemplateDescriptionFactory {
    pub fn new() -> Self {
        Self
    }
}

fn kind_name(kind: DescriptionKind) -> &'static str {
    match kind {
        DescriptionKind::SmsChallenge => "smsChallenge",
        DescriptionKind::UpdateAgreementChallenge => "updateAgreementChallenge",
        DescriptionKind::Static => "static",
        DescriptionKind::PicvChallenge => "picvChallenge",
        DescriptionKind::Redirect => "redirect",
        DescriptionKind::StaticRedirect => "staticRedirect",
        DescriptionKind::PaymentMethod => "paymentMethod",
    }
}

impl DescriptionFactory for TemplateDescriptionFactory {
    fn describe(&self, kind: DescriptionKind, params: &DescriptionParams<'_>) -> Vec<PidlResource> {
        let mut identity = BTreeMap::new();
        identity.insert("description".to_string(), kind_name(kind).to_string());
        identity.insert("language".to_string(), params.language.to_string());
        identity.insert("partner".to_string(), params.partner.to_string());
        identity.insert("country".to_string(), params.country.to_string());
        if let Some(description_type) = params.description_type {
            identity.insert("type".to_string(), description_type.to_string());
        }

        let method = params
            .payment_method
            .or(params.payment_instrument.map(|pi| &pi.payment_method));
        if let Some(method) = method {
            identity.insert("family".to_string(), method.payment_method_family.clone());
            if let Some(payment_type) = &method.payment_method_type {
                identity.insert("paymentMethodType".to_string(), payment_type.clone());
            }
        }
        if let Some(pi) = params.payment_instrument {
            identity.insert("id".to_string(), pi.payment_instrument_id.clone());
        }

        let mut members = vec![json!({ "type": "heading", "text": kind_name(kind) })];
        if let Some(link) = params.redirect_link {
            members.push(json!({ "type": "hyperlink", "href": link.base_url, "ru": link.ru_parameters }));
        }
        if let Some(email) = params.email_address {
            members.push(json!({ "type": "text", "text": email }));
        }
        members.push(json!({ "type": "button", "action": "submit" }));

        vec![PidlResource {
            identity,
            display_pages: vec![DisplayPage {
                display_name: format!("{}Page", kind_name(kind)),
                members,
            }],
        }]
    }

    fn digitization_action(
        &self,
        payment_instrument: &PaymentInstrument,
        account_id: &str,
        language: &str,
        partner: &str,
        pidl_base_url: Option<&str>,
    ) -> Option<ClientAction> {
        if !payment_instrument
            .payment_method
            .payment_method_family
            .eq_ignore_ascii_case("credit_card")
        {
            return None;
        }

        let mut identity = BTreeMap::new();
        identity.insert("description".to_string(), "digitization".to_string());
        identity.insert("accountId".to_string(), account_id.to_string());
        identity.insert("id".to_string(), payment_instrument.payment_instrument_id.clone());
        identity.insert("language".to_string(), language.to_string());
        identity.insert("partner".to_string(), partner.to_string());
        if let Some(base_url) = pidl_base_url {
            identity.insert("pidlBaseUrl".to_string(), base_url.to_string());
        }

        let mut action = ClientAction::new(ClientActionType::Pidl);
        action.context = Some(ClientActionPayload::Descriptions(vec![PidlResource {
            identity,
            display_pages: vec![DisplayPage {
                display_name: "digitizationPage".to_string(),
                members: vec![json!({ "type": "button", "action": "digitize" })],
            }],
        }]));
        Some(action)
    }
}
