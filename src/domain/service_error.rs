use super::instrument::ClientAction;
use serde::{Deserialize, Serialize};

/// Message value that is surfaced verbatim instead of being localized.
pub const NO_MESSAGE: &str = "[]";

/// A downstream service error as returned to the client.
///
/// Arrives carrying the downstream error code; service-error resolution
/// replaces the message, appends details, and may attach a client action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceErrorResponse {
    pub error_code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ServiceErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_action: Option<ClientAction>,
}

impl ServiceErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Vec::new(),
            client_action: None,
        }
    }

    pub fn add_detail(&mut self, detail: ServiceErrorDetail) {
        self.details.push(detail);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceErrorDetail {
    pub error_code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}
