//! Named constants that rule files may reference as `Class.Field`.

use crate::error::{ConfigError, ConfigResult};

pub const ACH_PICV_CHALLENGE: &str = "ach_picv";
pub const SEPA_PICV_CHALLENGE: &str = "sepa_picv";
pub const PAYMENT_METHOD_DESCRIPTION: &str = "paymentMethod";

static NAMED_CONSTANTS: &[(&str, &[(&str, &str)])] = &[
    (
        "PaymentMethodType",
        &[
            ("AlipayBillingAgreement", "alipay_billing_agreement"),
            ("CreditCardVisa", "visa"),
            ("CreditCardMasterCard", "mc"),
            ("CreditCardAmericanExpress", "amex"),
            ("CreditCardDiscover", "discover"),
            ("UnionPay", "unionpay"),
            ("UnionPayCreditCard", "unionpay_creditcard"),
            ("UnionPayDebitCard", "unionpay_debitcard"),
            ("IdealBillingAgreement", "ideal_billing_agreement"),
            ("Kakaopay", "kakaopay"),
            ("PayPal", "paypal"),
            ("Ach", "ach"),
            ("Sepa", "sepa"),
            ("Klarna", "klarna"),
            ("LegacyInvoice", "legacy_invoice"),
            ("Check", "check"),
            ("InvoiceBasicVirtual", "invoice_basic"),
            ("InvoiceCheckVirtual", "invoice_check"),
            ("AlipayVirtual", "alipay"),
            ("Venmo", "venmo"),
            ("Upi", "upi"),
            ("UpiCommercial", "upi_commercial"),
        ],
    ),
    (
        "PaymentInstrumentPendingOnTypes",
        &[
            ("Sms", "sms"),
            ("Redirect", "redirect"),
            ("Notification", "notification"),
            ("Picv", "picv"),
            ("AgreementUpdate", "agreementUpdate"),
            ("ThreeDSChallenge", "3ds_challenge"),
        ],
    ),
    (
        "PartnerName",
        &[
            ("Xbox", "xbox"),
            ("Wallet", "wallet"),
            ("Cart", "cart"),
            ("Bing", "bing"),
            ("OXODIME", "oxodime"),
            ("OXOWebDirect", "oxowebdirect"),
            ("Webblends", "webblends"),
            ("WebblendsInline", "webblends_inline"),
            ("CommercialStores", "commercialstores"),
            ("WebPay", "webpay"),
            ("AmcWeb", "amcweb"),
            ("Azure", "azure"),
            ("AzureIbiza", "azureibiza"),
            ("AzureSignup", "azuresignup"),
            ("OneDrive", "onedrive"),
            ("AppSource", "appsource"),
            ("Payin", "payin"),
            ("SetupOffice", "setupoffice"),
            ("NorthStarWeb", "northstarweb"),
            ("OfficeOobe", "officeoobe"),
            ("OXOOobe", "oxooobe"),
            ("DefaultPartnerName", "default"),
        ],
    ),
    ("RequestType", &[("AddPI", "addPI"), ("GetPI", "getPI")]),
    (
        "PidlResourceDescriptionType",
        &[
            ("Cc3DSRedirectStaticPidl", "cc3DSRedirectPidl"),
            ("PaypalRedirectStaticPidl", "paypalredirectpidl"),
            ("PaypalRetryStaticPidl", "paypalRetryStatic"),
            ("IdealBillingAgreementRedirectStaticPidl", "idealredirectpidl"),
            ("GenericRedirectStaticPidl", "genericredirectpidl"),
            ("GenericPollingStaticPidl", "genericPollingStatic"),
            ("Sms", "sms"),
            ("AchPicVStatic", "achPicvStatic"),
            ("AchPicVChallenge", ACH_PICV_CHALLENGE),
            ("SepaPicVStatic", "sepaPicvStatic"),
            ("SepaPicVChallenge", SEPA_PICV_CHALLENGE),
            ("PaypalUpdateAgreementChallenge", "paypalUpdateAgreementChallenge"),
            ("PaymentMethod", PAYMENT_METHOD_DESCRIPTION),
            ("VenmoRedirectStaticPidl", "venmoredirectpidl"),
            ("VenmoRetryStaticPidl", "venmoRetryStatic"),
        ],
    ),
    (
        "PXServiceErrorCodes",
        &[
            ("ValidationFailed", "ValidationFailed"),
            ("InvalidPhoneValue", "InvalidPhoneValue"),
            ("InvalidPaymentInstrumentInfo", "InvalidPaymentInstrumentInfo"),
            ("InvalidCvv", "InvalidCvv"),
            ("InvalidExpiryDate", "InvalidExpiryDate"),
            ("ExpiredCard", "ExpiredCard"),
            ("TooManyOperations", "TooManyOperations"),
            ("AccountNotFound", "AccountNotFound"),
        ],
    ),
];

pub fn lookup(class: &str, field: &str) -> Option<&'static str> {
    NAMED_CONSTANTS
        .iter()
        .find(|(name, _)| *name == class)
        .and_then(|(_, fields)| fields.iter().find(|(name, _)| *name == field))
        .map(|(_, value)| *value)
}

/// Resolves a cell that may name a constant.
///
/// Only cells with exactly one `.` are treated as references; anything else
/// is returned verbatim.
pub fn resolve(cell: &str, row: usize) -> ConfigResult<String> {
    let mut parts = cell.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(class), Some(field), None) => lookup(class, field)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::UnknownConstant {
                name: cell.to_string(),
                row,
            }),
        _ => Ok(cell.to_string()),
    }
}
