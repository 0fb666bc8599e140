use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while turning a rule file into a rule set.
///
/// Every variant is startup-fatal: a service must refuse to start (or a
/// reload must be abandoned) when one of these surfaces.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    #[diagnostic(code(pi_lifecycle::config::io))]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    #[diagnostic(code(pi_lifecycle::config::csv))]
    Csv(#[from] csv::Error),

    #[error("rule file is empty")]
    #[diagnostic(code(pi_lifecycle::config::empty_file))]
    EmptyFile,

    #[error("duplicate column '{name}' in header")]
    #[diagnostic(code(pi_lifecycle::config::duplicate_column))]
    DuplicateColumn { name: String },

    #[error("{family} configuration is missing required column '{column}'")]
    #[diagnostic(code(pi_lifecycle::config::missing_column))]
    MissingColumn {
        family: &'static str,
        column: String,
    },

    #[error("{family} configuration is malformed at row {row}: {message}")]
    #[diagnostic(code(pi_lifecycle::config::shape))]
    Shape {
        family: &'static str,
        row: usize,
        message: String,
    },

    #[error("invalid value '{value}' in column '{column}' at row {row}")]
    #[diagnostic(code(pi_lifecycle::config::invalid_value))]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unknown named constant '{name}' at row {row}")]
    #[diagnostic(code(pi_lifecycle::config::unknown_constant))]
    UnknownConstant { name: String, row: usize },

    #[error("invalid settings file: {0}")]
    #[diagnostic(code(pi_lifecycle::config::settings))]
    Settings(#[from] serde_json::Error),

    #[error("delimiter '{value}' is not a single ASCII character")]
    #[diagnostic(code(pi_lifecycle::config::delimiter), help("use ',', ';', '\\t' or '|'"))]
    Delimiter { value: char },
}

/// Errors raised while resolving a single request against a rule set.
///
/// These abort only the request in flight; the shared rule set is never
/// touched.
#[derive(Error, Diagnostic, Debug)]
pub enum ResolveError {
    #[error(
        "no client action rule covers payment method family '{family}', type '{payment_type}', country '{country}'"
    )]
    #[diagnostic(code(pi_lifecycle::no_matching_group))]
    NoMatchingGroup {
        family: String,
        payment_type: String,
        country: String,
    },

    #[error("{message}")]
    #[diagnostic(code(pi_lifecycle::narrowing_exhausted))]
    NarrowingExhausted {
        dimension: MatchDimension,
        value: String,
        message: String,
    },

    #[error("The state of the PI is set to pending but the pendingOn is null")]
    #[diagnostic(code(pi_lifecycle::null_pending_on))]
    NullPendingOn,

    #[error("no service error rules are configured for resource action '{action}'")]
    #[diagnostic(code(pi_lifecycle::no_matching_request_type))]
    NoMatchingRequestType { action: String },

    #[error("no service error entry matches error code '{error_code}'")]
    #[diagnostic(code(pi_lifecycle::no_matching_error))]
    NoMatchingError { error_code: String },

    #[error("payment instrument accessor failed: {0}")]
    #[diagnostic(code(pi_lifecycle::accessor))]
    Accessor(String),
}

impl ResolveError {
    /// Machine-readable code carried on the wire alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::NoMatchingGroup { .. } => "NoMatchingClientActionRule",
            ResolveError::NarrowingExhausted { .. } | ResolveError::NullPendingOn => {
                "InvalidPendingOnType"
            }
            ResolveError::NoMatchingRequestType { .. } => "NoMatchingServiceErrorRule",
            ResolveError::NoMatchingError { .. } => "NoMatchingServiceError",
            ResolveError::Accessor(_) => "PaymentInstrumentAccessorFailure",
        }
    }
}

/// The dimension a narrowing pass filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchDimension {
    PendingOn,
    RequestType,
    Partner,
    PaymentMethodFamily,
    PaymentMethodType,
    Country,
}

impl MatchDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchDimension::PendingOn => "PendingOn",
            MatchDimension::RequestType => "RequestType",
            MatchDimension::Partner => "Partner",
            MatchDimension::PaymentMethodFamily => "PaymentMethodFamily",
            MatchDimension::PaymentMethodType => "PaymentMethodType",
            MatchDimension::Country => "Country",
        }
    }
}

impl std::fmt::Display for MatchDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
