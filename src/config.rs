use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Partners that render redirects inside their own page instead of opening a
/// redirect description.
pub const DEFAULT_INLINE_PARTNERS: &[&str] = &[
    "amcweb",
    "appsource",
    "azure",
    "azuresignup",
    "azureibiza",
    "bing",
    "cart",
    "commercialstores",
    "onedrive",
    "payin",
    "setupoffice",
    "oxowebdirect",
    "webblends_inline",
    "webpay",
    "northstarweb",
];

/// Inline partners whose redirect description keeps its frame but drops the
/// first page's members when a filter asks for it.
pub const MEMBER_CLEARING_PARTNERS: &[&str] = &["webblends_inline", "webpay", "oxowebdirect"];

/// Runtime settings for the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub client_action_config: PathBuf,
    pub service_error_config: PathBuf,
    pub delimiter: char,
    pub inline_partners: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_action_config: PathBuf::from("config/ClientActionConfig.csv"),
            service_error_config: PathBuf::from("config/PIServiceErrorConfig.csv"),
            delimiter: ',',
            inline_partners: DEFAULT_INLINE_PARTNERS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn delimiter_byte(&self) -> ConfigResult<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::Delimiter { value: self.delimiter })
    }

    pub fn is_inline_partner(&self, partner: &str) -> bool {
        self.inline_partners.iter().any(|p| p.eq_ignore_ascii_case(partner))
    }
}
