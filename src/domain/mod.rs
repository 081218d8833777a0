pub mod payment;
pub mod report;
pub mod validation;
