//! Per-request inputs to rule resolution.
//!
//! Both request types are assembled by the caller for a single query and
//! never stored. Every request carries a correlation id that is attached to
//! all log lines and errors it produces.

use super::instrument::PaymentInstrument;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment-method type value used when a request carries none, so rules can
/// target instruments without a type explicitly.
pub const PAYMENT_TYPE_EMPTY: &str = "empty";

fn new_correlation_id() -> Uuid {
    Uuid::new_v4()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientActionRequest {
    #[serde(default = "new_correlation_id")]
    pub correlation_id: Uuid,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub billable_account_id: Option<String>,
    pub country: String,
    pub partner: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub classic_product: Option<String>,
    #[serde(default)]
    pub complete_prerequisites: bool,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub pidl_base_url: Option<String>,
    #[serde(default)]
    pub request_type: Option<String>,
}

impl ClientActionRequest {
    pub fn new(country: impl Into<String>, partner: impl Into<String>) -> Self {
        Self {
            correlation_id: new_correlation_id(),
            account_id: String::new(),
            billable_account_id: None,
            country: country.into(),
            partner: partner.into(),
            language: default_language(),
            classic_product: None,
            complete_prerequisites: false,
            email_address: None,
            pidl_base_url: None,
            request_type: None,
        }
    }

    pub fn with_request_type(mut self, request_type: impl Into<String>) -> Self {
        self.request_type = Some(request_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceErrorRequest {
    #[serde(default = "new_correlation_id")]
    pub correlation_id: Uuid,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub billable_account_id: Option<String>,
    pub payment_method_family: String,
    #[serde(default)]
    pub payment_method_type: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub partner: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub classic_product: Option<String>,
    #[serde(default)]
    pub complete_prerequisites: bool,
    #[serde(default)]
    pub payment_instrument: Option<PaymentInstrument>,
    #[serde(default)]
    pub piid: Option<String>,
}

impl ServiceErrorRequest {
    pub fn new(family: impl Into<String>, payment_type: Option<&str>) -> Self {
        Self {
            correlation_id: new_correlation_id(),
            account_id: String::new(),
            billable_account_id: None,
            payment_method_family: family.into(),
            payment_method_type: payment_type.map(str::to_string),
            country: String::new(),
            partner: String::new(),
            language: default_language(),
            classic_product: None,
            complete_prerequisites: false,
            payment_instrument: None,
            piid: None,
        }
    }

    /// Payment-method type with a missing value mapped to
    /// [`PAYMENT_TYPE_EMPTY`].
    pub fn payment_type_or_empty(&self) -> &str {
        self.payment_method_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(PAYMENT_TYPE_EMPTY)
    }
}

fn default_language() -> String {
    "en-US".to_string()
}
