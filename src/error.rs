use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    PaymentProcessing,
    Authentication,
    Authorization,
    Concurrency,
    Network,
    Database,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::PaymentProcessing => "PAYMENT_ERROR",
            ErrorKind::Authentication => "AUTH_ERROR",
            ErrorKind::Authorization => "ACCESS_DENIED",
            ErrorKind::Concurrency => "CONCURRENCY_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Database => "DATABASE_ERROR",
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 422,
            ErrorKind::PaymentProcessing => 400,
            ErrorKind::Authentication => 401,
            ErrorKind::Authorization => 403,
            ErrorKind::Concurrency => 409,
            ErrorKind::Network => 503,
            ErrorKind::Database => 500,
        }
    }

    pub fn default_message(self) -> Option<&'static str> {
        match self {
            ErrorKind::Validation | ErrorKind::PaymentProcessing => None,
            ErrorKind::Authentication => Some("Authentication failed"),
            ErrorKind::Authorization => Some("Access denied"),
            ErrorKind::Concurrency => Some("Concurrent operation detected"),
            ErrorKind::Network => Some("Network error occurred"),
            ErrorKind::Database => Some("Database operation failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeeError {
    pub kind: ErrorKind,
    pub message: String,
    pub field: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl FeeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        FeeError {
            kind,
            message: message.into(),
            field: None,
            timestamp: Utc::now(),
        }
    }

    fn with_default(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message().unwrap_or("Operation failed"))
    }

    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Validation, message);
        err.field = Some(field.into());
        err
    }

    pub fn payment_processing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PaymentProcessing, message)
    }

    pub fn authentication() -> Self {
        Self::with_default(ErrorKind::Authentication)
    }

    pub fn authorization() -> Self {
        Self::with_default(ErrorKind::Authorization)
    }

    pub fn concurrency() -> Self {
        Self::with_default(ErrorKind::Concurrency)
    }

    pub fn network() -> Self {
        Self::with_default(ErrorKind::Network)
    }

    pub fn database() -> Self {
        Self::with_default(ErrorKind::Database)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl fmt::Display for FeeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{} ({}): {}", self.code(), field, self.message),
            None => write!(f, "{}: {}", self.code(), self.message),
        }
    }
}

impl std::error::Error for FeeError {}

pub type Result<T> = std::result::Result<T, FeeError>;

#[derive(Debug)]
pub enum Thrown {
    Fee(FeeError),
    Error(Box<dyn std::error::Error + Send + Sync>),
    Panic(String),
    Value(String),
}

impl Thrown {
    pub fn value(value: impl Into<String>) -> Self {
        Thrown::Value(value.into())
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thrown::Fee(e) => write!(f, "{}", e),
            Thrown::Error(e) => write!(f, "{}", e),
            Thrown::Panic(msg) => write!(f, "panic: {}", msg),
            Thrown::Value(v) => write!(f, "thrown value: {}", v),
        }
    }
}

impl From<FeeError> for Thrown {
    fn from(err: FeeError) -> Self {
        Thrown::Fee(err)
    }
}

impl From<serde_json::Error> for Thrown {
    fn from(err: serde_json::Error) -> Self {
        Thrown::Error(Box::new(err))
    }
}

impl From<std::io::Error> for Thrown {
    fn from(err: std::io::Error) -> Self {
        Thrown::Error(Box::new(err))
    }
}

impl From<csv::Error> for Thrown {
    fn from(err: csv::Error) -> Self {
        Thrown::Error(Box::new(err))
    }
}

impl From<tokio::task::JoinError> for Thrown {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Thrown::Panic(msg)
        } else {
            Thrown::Error(Box::new(err))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandledError {
    pub message: String,
    pub code: String,
    pub status_code: u16,
}

pub struct ExceptionHandler;

impl ExceptionHandler {
    pub fn handle(thrown: &Thrown) -> HandledError {
        match thrown {
            Thrown::Fee(err) => HandledError {
                message: err.message.clone(),
                code: err.code().to_string(),
                status_code: err.status_code(),
            },
            Thrown::Error(err) => HandledError {
                message: err.to_string(),
                code: "UNKNOWN_ERROR".to_string(),
                status_code: 500,
            },
            Thrown::Panic(_) | Thrown::Value(_) => HandledError {
                message: "An unexpected error occurred".to_string(),
                code: "UNEXPECTED_ERROR".to_string(),
                status_code: 500,
            },
        }
    }

    pub fn log(thrown: &Thrown) -> HandledError {
        let handled = Self::handle(thrown);
        log::error!("{}", Self::log_line(&handled, Utc::now()));
        log::debug!("Handled error source: {:?}", thrown);
        handled
    }

    pub fn log_line(handled: &HandledError, at: DateTime<Utc>) -> String {
        format!(
            "[{}] {}: {}",
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
            handled.code,
            handled.message
        )
    }
}
