use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub payment_method_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstrumentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub picv_required: bool,
}

/// The caller's payment instrument. A resolved client action is attached to
/// it in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstrument {
    #[serde(rename = "id")]
    pub payment_instrument_id: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_instrument_details: PaymentInstrumentDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_action: Option<ClientAction>,
}

impl PaymentInstrument {
    pub fn pending_on(&self) -> Option<&str> {
        self.payment_instrument_details
            .pending_on
            .as_deref()
            .filter(|p| !p.is_empty())
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.payment_instrument_details
            .redirect_url
            .as_deref()
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientActionType {
    Pidl,
    Redirect,
}

/// A directive telling the client what to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAction {
    #[serde(rename = "type")]
    pub action_type: ClientActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ClientActionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_pidl: Option<Vec<PidlResource>>,
}

impl ClientAction {
    pub fn new(action_type: ClientActionType) -> Self {
        Self {
            action_type,
            context: None,
            redirect_pidl: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientActionPayload {
    Url(String),
    ServiceLink(RedirectionServiceLink),
    Descriptions(Vec<PidlResource>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectionServiceLink {
    pub base_url: String,
    pub ru_parameters: BTreeMap<String, String>,
}

/// A UI description as produced by the description factory. Only the parts
/// this crate touches are modelled; the rest travels as opaque JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PidlResource {
    pub identity: BTreeMap<String, String>,
    #[serde(default)]
    pub display_pages: Vec<DisplayPage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPage {
    pub display_name: String,
    #[serde(default)]
    pub members: Vec<serde_json::Value>,
}
