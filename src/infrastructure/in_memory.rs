use crate::domain::instrument::PaymentInstrument;
use crate::domain::ports::{Localizer, PaymentInstrumentAccessor};
use crate::error::{ResolveError, ResolveResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// A string table keyed by `(language, key)`.
///
/// Unknown keys resolve to the key itself, so untranslated messages still
/// reach the client readable.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLocalizer {
    strings: HashMap<(String, String), String>,
}

impl InMemoryLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, language: &str, key: &str, value: &str) -> Self {
        self.strings
            .insert((language.to_ascii_lowercase(), key.to_string()), value.to_string());
        self
    }
}

impl Localizer for InMemoryLocalizer {
    fn localized_string(&self, key: &str, language: &str) -> String {
        self.strings
            .get(&(language.to_ascii_lowercase(), key.to_string()))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// A thread-safe in-memory stand-in for the instrument management service.
///
/// Instruments are keyed by `(account_id, piid)`.
#[derive(Default, Clone)]
pub struct InMemoryPaymentInstrumentStore {
    instruments: Arc<RwLock<HashMap<(String, String), PaymentInstrument>>>,
}

impl InMemoryPaymentInstrumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, account_id: &str, instrument: PaymentInstrument) {
        let mut instruments = self.instruments.write().await;
        instruments.insert(
            (account_id.to_string(), instrument.payment_instrument_id.clone()),
            instrument,
        );
    }
}

#[async_trait]
impl PaymentInstrumentAccessor for InMemoryPaymentInstrumentStore {
    async fn get_payment_instrument(
        &self,
        account_id: &str,
        piid: &str,
        correlation_id: Uuid,
    ) -> ResolveResult<PaymentInstrument> {
        debug!(%correlation_id, account_id, piid, "fetching payment instrument");
        let instruments = self.instruments.read().await;
        instruments
            .get(&(account_id.to_string(), piid.to_string()))
            .cloned()
            .ok_or_else(|| ResolveError::Accessor(format!("payment instrument '{piid}' not found for account '{account_id}'")))
    }
}
