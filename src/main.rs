use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use pi_lifecycle::application::engine::{Collaborators, LifecycleEngine};
use pi_lifecycle::application::review::Finding;
use pi_lifecycle::config::Settings;
use pi_lifecycle::domain::instrument::PaymentInstrument;
use pi_lifecycle::domain::request::{ClientActionRequest, ServiceErrorRequest};
use pi_lifecycle::domain::service_error::ServiceErrorResponse;
use pi_lifecycle::infrastructure::descriptions::TemplateDescriptionFactory;
use pi_lifecycle::infrastructure::in_memory::{InMemoryLocalizer, InMemoryPaymentInstrumentStore};
use pi_lifecycle::rules::ErrorResourceAction;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file; flags and environment override its values
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Client action rule file
    #[arg(long, env = "PI_CLIENT_ACTION_CONFIG", global = true)]
    client_action_config: Option<PathBuf>,

    /// Service error rule file
    #[arg(long, env = "PI_SERVICE_ERROR_CONFIG", global = true)]
    service_error_config: Option<PathBuf>,

    /// Column delimiter used by both rule files
    #[arg(long, global = true)]
    delimiter: Option<char>,

    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load both rule files and report rule counts and review findings
    Validate,
    /// Resolve the client action for a payment instrument
    ClientAction {
        /// JSON object with `request` and `paymentInstrument`
        #[arg(long)]
        context: String,
    },
    /// Resolve the response for a downstream service error
    ServiceError {
        /// JSON object with `action`, `request` and `error`
        #[arg(long)]
        context: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientActionContext {
    request: ClientActionRequest,
    payment_instrument: PaymentInstrument,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceErrorContext {
    action: String,
    request: ServiceErrorRequest,
    error: ServiceErrorResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    client_action_rules: usize,
    client_action_filters: usize,
    service_error_request_types: usize,
    service_error_rules: usize,
    findings: Vec<Finding>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::from_json_file(path)?,
        None => Settings::default(),
    };
    if let Some(path) = &cli.client_action_config {
        settings.client_action_config = path.clone();
    }
    if let Some(path) = &cli.service_error_config {
        settings.service_error_config = path.clone();
    }
    if let Some(delimiter) = cli.delimiter {
        settings.delimiter = delimiter;
    }
    Ok(settings)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).into_diagnostic()?;
    writeln!(out).into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = settings(&cli)?;
    let instruments = InMemoryPaymentInstrumentStore::new();
    let collaborators = Collaborators {
        localizer: Box::new(InMemoryLocalizer::new()),
        descriptions: Box::new(TemplateDescriptionFactory::new()),
        accessor: Box::new(instruments.clone()),
    };
    let engine = LifecycleEngine::initialize(settings, collaborators)?;

    match cli.command {
        Command::Validate => {
            let client_actions = engine.client_action_rules();
            let service_errors = engine.service_error_rules();
            print_json(&ValidationReport {
                client_action_rules: client_actions.rules.len(),
                client_action_filters: client_actions.filter_count(),
                service_error_request_types: service_errors.request_types.len(),
                service_error_rules: service_errors.filter_count(),
                findings: engine.review(),
            })
        }
        Command::ClientAction { context } => {
            let ClientActionContext {
                request,
                mut payment_instrument,
            } = serde_json::from_str(&context).into_diagnostic()?;
            engine.resolve_client_action(&request, &mut payment_instrument)?;
            print_json(&payment_instrument)
        }
        Command::ServiceError { context } => {
            let context: ServiceErrorContext = serde_json::from_str(&context).into_diagnostic()?;
            let action: ErrorResourceAction = context
                .action
                .parse()
                .map_err(|_| miette!("unknown resource action '{}'", context.action))?;
            if let Some(pi) = &context.request.payment_instrument {
                instruments.store(&context.request.account_id, pi.clone()).await;
            }
            let response = engine
                .resolve_service_error(action, &context.request, context.error)
                .await?;
            print_json(&response)
        }
    }
}
