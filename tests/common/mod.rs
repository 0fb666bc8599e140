#![allow(dead_code)]

use pi_lifecycle::application::engine::{Collaborators, LifecycleEngine};
use pi_lifecycle::config::Settings;
use pi_lifecycle::domain::instrument::{PaymentInstrument, PaymentMethod};
use pi_lifecycle::infrastructure::descriptions::TemplateDescriptionFactory;
use pi_lifecycle::infrastructure::in_memory::{InMemoryLocalizer, InMemoryPaymentInstrumentStore};
use std::io::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CLIENT_ACTION_HEADER: [&str; 15] = [
    "PaymentName",
    "PaymentMethodFamily",
    "PaymentMethodType",
    "Country",
    "UnmatchedPendingOn",
    "NullPendingOn",
    "UnmatchedRequestType",
    "PendingOn",
    "RequestType",
    "Partner",
    "ClientActionType",
    "Context",
    "PidlResourceDescriptionType",
    "StaticRedirect",
    "ClearMembers",
];

pub const SERVICE_ERROR_HEADER: [&str; 12] = [
    "ResourceAction",
    "PaymentMethodFamily",
    "PaymentMethodType",
    "Country",
    "ContainedIn_Partner",
    "Partner",
    "Message",
    "ErrorCode",
    "DetailsErrorCode",
    "DetailsMessage",
    "DetailsTarget",
    "ClientAction",
];

/// Writes a rule file with `header` followed by `rows`. Short rows are
/// written as-is; the loader pads them.
pub fn write_rules(path: &Path, header: &[&str], rows: &[Vec<&str>]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// A client-action row with only the commonly varied columns set.
pub fn filter_row<'a>(
    name: &'a str,
    family: &'a str,
    payment_type: &'a str,
    pending_on: &'a str,
    partner: &'a str,
    action_type: &'a str,
    context: &'a str,
) -> Vec<&'a str> {
    vec![
        name, family, payment_type, "", "", "", "", pending_on, "", partner, action_type, context, "", "", "",
    ]
}

/// A service-error row with only the commonly varied columns set.
pub fn error_row<'a>(
    action: &'a str,
    family: &'a str,
    contained_in: &'a str,
    partner: &'a str,
    message: &'a str,
    error_code: &'a str,
    client_action: &'a str,
) -> Vec<&'a str> {
    vec![
        action,
        family,
        "",
        "",
        contained_in,
        partner,
        message,
        error_code,
        "",
        "",
        "",
        client_action,
    ]
}

/// Both rule files in a scratch directory, removed on drop.
pub struct Fixture {
    pub dir: TempDir,
    pub client_actions: PathBuf,
    pub service_errors: PathBuf,
}

impl Fixture {
    pub fn new(client_rows: &[Vec<&str>], error_rows: &[Vec<&str>]) -> Result<Self, Error> {
        let dir = tempfile::tempdir()?;
        let client_actions = dir.path().join("ClientActionConfig.csv");
        let service_errors = dir.path().join("PIServiceErrorConfig.csv");
        write_rules(&client_actions, &CLIENT_ACTION_HEADER, client_rows)?;
        write_rules(&service_errors, &SERVICE_ERROR_HEADER, error_rows)?;
        Ok(Self {
            dir,
            client_actions,
            service_errors,
        })
    }

    pub fn settings(&self) -> Settings {
        Settings {
            client_action_config: self.client_actions.clone(),
            service_error_config: self.service_errors.clone(),
            ..Settings::default()
        }
    }
}

pub fn collaborators(store: &InMemoryPaymentInstrumentStore) -> Collaborators {
    Collaborators {
        localizer: Box::new(InMemoryLocalizer::new()),
        descriptions: Box::new(TemplateDescriptionFactory::new()),
        accessor: Box::new(store.clone()),
    }
}

pub fn engine(fixture: &Fixture) -> LifecycleEngine {
    LifecycleEngine::initialize(fixture.settings(), collaborators(&InMemoryPaymentInstrumentStore::new()))
        .expect("fixture rule files load")
}

pub fn instrument(family: &str, payment_type: Option<&str>, pending_on: Option<&str>) -> PaymentInstrument {
    let mut pi = PaymentInstrument {
        payment_instrument_id: "pi-1".to_string(),
        payment_method: PaymentMethod {
            payment_method_family: family.to_string(),
            payment_method_type: payment_type.map(str::to_string),
        },
        ..Default::default()
    };
    pi.payment_instrument_details.pending_on = pending_on.map(str::to_string);
    pi
}
