pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use config::ServiceConfig;
pub use domain::payment::{PaymentMethod, PaymentRecord, PaymentRequest, SubmissionOutcome};
pub use error::{ErrorKind, ExceptionHandler, FeeError, HandledError, Thrown};
pub use services::payment_service::PaymentService;
