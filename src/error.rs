//! Error taxonomy
//!
//! Every failure that leaves a component is one of the typed errors below.
//! Only `RemoteFault` ever holds raw text from a remote service, and it never
//! prints that text.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Fixed failure categories shared by every layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    QuotaExceeded,
    PermissionDenied,
    Timeout,
    SafetyBlocked,
    NotFound,
    NetworkFailure,
    EmptyOutput,
    UnknownSystemFailure,
}

impl ErrorCategory {
    /// Short machine-friendly label, used in structured log fields
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::QuotaExceeded => "quota_exceeded",
            ErrorCategory::PermissionDenied => "permission_denied",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::SafetyBlocked => "safety_blocked",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::NetworkFailure => "network_failure",
            ErrorCategory::EmptyOutput => "empty_output",
            ErrorCategory::UnknownSystemFailure => "unknown_system_failure",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two retryable steps of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Generate,
    Append,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Generate => f.write_str("Generate Image Prompt"),
            Step::Append => f.write_str("Append to Spreadsheet"),
        }
    }
}

// ========== Step errors ==========

/// A sanitized step failure. Display output is a fixed message per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// The model answered, but with nothing usable
    #[error("⚠️ Error: Prompt generation failed, the model returned an empty output.")]
    EmptyGenerationResult,

    /// The appender was handed an absent or blank prompt
    #[error("⚠️ Error: Spreadsheet append skipped, the input data is empty.")]
    EmptyAppendInput,

    #[error("{}", generation_message(.0))]
    Generation(ErrorCategory),

    #[error("{}", spreadsheet_message(.0))]
    Spreadsheet(ErrorCategory),
}

impl StepError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StepError::EmptyGenerationResult | StepError::EmptyAppendInput => {
                ErrorCategory::EmptyOutput
            }
            StepError::Generation(category) | StepError::Spreadsheet(category) => *category,
        }
    }

    pub fn step(&self) -> Step {
        match self {
            StepError::EmptyGenerationResult | StepError::Generation(_) => Step::Generate,
            StepError::EmptyAppendInput | StepError::Spreadsheet(_) => Step::Append,
        }
    }
}

fn generation_message(category: &ErrorCategory) -> &'static str {
    match *category {
        ErrorCategory::QuotaExceeded => "⏳ Error: Google AI API Quota Exceeded.",
        ErrorCategory::PermissionDenied => "🔑 Error: Google API Key is invalid or restricted.",
        ErrorCategory::Timeout => "⏱️ Error: Request to Gemini timed out.",
        ErrorCategory::SafetyBlocked => "🛡️ Error: AI response was blocked by safety filters.",
        ErrorCategory::EmptyOutput => {
            "⚠️ Error: Prompt generation failed, the model returned an empty output."
        }
        _ => "❌ Error: Prompt generation failed due to a system issue.",
    }
}

fn spreadsheet_message(category: &ErrorCategory) -> &'static str {
    match *category {
        ErrorCategory::QuotaExceeded => "⏳ Error: Google Sheets API Quota Exceeded.",
        ErrorCategory::PermissionDenied => {
            "🔑 Error: Google Sheets Permission Denied or Invalid Credentials."
        }
        ErrorCategory::NotFound => "❌ Error: Target Worksheet or Spreadsheet not found.",
        ErrorCategory::NetworkFailure => "🌐 Error: Network connection to Google API failed.",
        ErrorCategory::EmptyOutput => {
            "⚠️ Error: Spreadsheet append skipped, the input data is empty."
        }
        _ => "❌ Error: Spreadsheet update failed due to a system issue.",
    }
}

// ========== Flow errors ==========

/// Failures raised inside the flow before flow-level classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Step(#[from] StepError),

    #[error("⚠️ Flow Error: Generator returned empty data.")]
    InvalidGeneratorOutput,
}

/// Flow-level summary that terminates a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowHalt {
    #[error("⏳ Flow Halted: API Quota Exceeded in sub-task.")]
    Quota,

    #[error("🔑 Flow Halted: Authentication or Permission error.")]
    Permission,

    #[error("⏱️ Flow Halted: Sub-task timed out.")]
    Timeout,

    #[error("📊 Flow Halted: Spreadsheet operation failed.")]
    Spreadsheet,

    #[error("❌ Flow Failed: An unexpected system error occurred.")]
    Unexpected,
}

// ========== Remote faults ==========

/// How the transport failed, when the client could tell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The request left and a status code came back
    Http,
    /// The client gave up waiting
    Timeout,
    /// No connection could be established
    Connect,
    /// The model refused to answer
    Blocked,
    Other,
}

/// A raw failure from a remote client, consumed only by the classifier.
///
/// `description` may contain response bodies or transport details, so neither
/// `Debug` nor `Display` prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteFault {
    pub status: Option<u16>,
    pub kind: FaultKind,
    pub description: String,
}

impl RemoteFault {
    pub fn new(kind: FaultKind, description: impl Into<String>) -> Self {
        Self {
            status: None,
            kind,
            description: description.into(),
        }
    }

    /// A non-success HTTP response
    pub fn http(status: u16, description: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            kind: FaultKind::Http,
            description: description.into(),
        }
    }

    /// A fault known only by its text
    pub fn from_description(description: impl Into<String>) -> Self {
        Self::new(FaultKind::Other, description)
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FaultKind::Timeout
        } else if err.is_connect() {
            FaultKind::Connect
        } else if err.status().is_some() {
            FaultKind::Http
        } else {
            FaultKind::Other
        };
        Self {
            status: err.status().map(|s| s.as_u16()),
            kind,
            description: err.to_string(),
        }
    }
}

impl fmt::Debug for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteFault")
            .field("status", &self.status)
            .field("kind", &self.kind)
            .field("description", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "remote fault ({:?}, status {})", self.kind, status),
            None => write!(f, "remote fault ({:?})", self.kind),
        }
    }
}

// ========== Setup errors ==========

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var_name} is not set")]
    EnvVarNotFound { var_name: String },

    #[error("environment variable {var_name}: value '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    #[error("failed to read config file {path}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("{field} must be {requirement}")]
    InvalidValue {
        field: &'static str,
        requirement: &'static str,
    },
}

/// Errors building the remote clients at startup.
///
/// Key file errors never carry the file's contents.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("service account key file {path} could not be read")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("service account key file {path} is not a valid key document")]
    ParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("service account key file {path} has an unusable private key")]
    InvalidPrivateKey { path: String },

    #[error("HTTP client could not be built for {service} (timeout {timeout:?})")]
    HttpClient {
        service: &'static str,
        timeout: Duration,
        #[source]
        source: reqwest::Error,
    },
}
