use super::instrument::{ClientAction, PaymentInstrument, PaymentMethod, PidlResource, RedirectionServiceLink};
use crate::error::ResolveResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Resolves user-facing strings for a locale.
pub trait Localizer: Send + Sync {
    fn localized_string(&self, key: &str, language: &str) -> String;
}

/// The UI descriptions a client action can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    SmsChallenge,
    UpdateAgreementChallenge,
    Static,
    PicvChallenge,
    Redirect,
    StaticRedirect,
    PaymentMethod,
}

/// Inputs for building a UI description.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionParams<'a> {
    pub payment_instrument: Option<&'a PaymentInstrument>,
    pub payment_method: Option<&'a PaymentMethod>,
    pub description_type: Option<&'a str>,
    pub language: &'a str,
    pub partner: &'a str,
    pub country: &'a str,
    pub classic_product: Option<&'a str>,
    pub billable_account_id: Option<&'a str>,
    pub email_address: Option<&'a str>,
    pub complete_prerequisites: bool,
    pub redirect_link: Option<&'a RedirectionServiceLink>,
}

impl<'a> DescriptionParams<'a> {
    pub fn new(language: &'a str, partner: &'a str, country: &'a str) -> Self {
        Self {
            payment_instrument: None,
            payment_method: None,
            description_type: None,
            language,
            partner,
            country,
            classic_product: None,
            billable_account_id: None,
            email_address: None,
            complete_prerequisites: false,
            redirect_link: None,
        }
    }
}

/// Builds UI descriptions. Implementations must be synchronous and free of
/// I/O: they run inline while a request is being resolved.
pub trait DescriptionFactory: Send + Sync {
    fn describe(&self, kind: DescriptionKind, params: &DescriptionParams<'_>) -> Vec<PidlResource>;

    /// Client action for instruments that need a digitization step, if any.
    fn digitization_action(
        &self,
        payment_instrument: &PaymentInstrument,
        account_id: &str,
        language: &str,
        partner: &str,
        pidl_base_url: Option<&str>,
    ) -> Option<ClientAction>;
}

/// Fetches payment instruments from the instrument management service.
#[async_trait]
pub trait PaymentInstrumentAccessor: Send + Sync {
    async fn get_payment_instrument(
        &self,
        account_id: &str,
        piid: &str,
        correlation_id: Uuid,
    ) -> ResolveResult<PaymentInstrument>;
}

pub type LocalizerBox = Box<dyn Localizer>;
pub type DescriptionFactoryBox = Box<dyn DescriptionFactory>;
pub type PaymentInstrumentAccessorBox = Box<dyn PaymentInstrumentAccessor>;
