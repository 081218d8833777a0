use crate::domain::validation;
use crate::error::{FeeError, HandledError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub(crate) fn serialize_amount<S>(value: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.round_dp(2).to_f64().unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Credit,
    Bank,
    Other,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Credit => "credit",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(PaymentMethod::Credit),
            "bank" => Ok(PaymentMethod::Bank),
            "other" => Ok(PaymentMethod::Other),
            "" => Err(FeeError::validation("Payment method is required", "method")),
            _ => Err(FeeError::validation(
                format!("Unsupported payment method: {}", s.trim()),
                "method",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub student_id: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub student_id: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub method: Option<Value>,
    #[serde(default)]
    pub card_number: Option<Value>,
    #[serde(default)]
    pub cvv: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

impl PaymentRequest {
    pub fn new(student_id: impl Into<String>, amount: Decimal, method: impl Into<String>) -> Self {
        PaymentRequest {
            student_id: Some(Value::String(student_id.into())),
            amount: Some(Value::String(amount.to_string())),
            method: Some(Value::String(method.into())),
            ..Default::default()
        }
    }

    pub fn with_card(mut self, card_number: impl Into<String>, cvv: impl Into<String>) -> Self {
        self.card_number = Some(Value::String(card_number.into()));
        self.cvv = Some(Value::String(cvv.into()));
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(Value::String(email.into()));
        self
    }

    pub fn validate(self, max_amount: Decimal) -> Result<Submission> {
        let student_id = text_field(
            self.student_id,
            "studentId",
            "Invalid student ID format. Expected format: STU001",
        )?
        .unwrap_or_default();
        validation::validate_student_id(&student_id)?;

        let amount = match self.amount {
            None | Some(Value::Null) => {
                return Err(FeeError::validation("Payment amount is required", "amount"))
            }
            Some(value) => parse_amount(&value)?,
        };
        validation::validate_amount(amount, max_amount)?;

        let method: PaymentMethod = text_field(self.method, "method", "Unsupported payment method")?
            .unwrap_or_default()
            .parse()?;

        if let Some(card_number) = text_field(self.card_number, "cardNumber", "Card number must be 16 digits")? {
            validation::validate_card_number(&card_number)?;
        }
        if let Some(cvv) = text_field(self.cvv, "cvv", "CVV must be 3 or 4 digits")? {
            validation::validate_cvv(&cvv)?;
        }
        if let Some(email) = text_field(self.email, "email", "Invalid email format")? {
            validation::validate_email(&email)?;
        }

        Ok(Submission {
            student_id,
            amount,
            method,
        })
    }
}

// Text inputs must arrive as JSON strings; anything else is rejected with the
// field's own validation message.
fn text_field(value: Option<Value>, field: &str, message: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(FeeError::validation(message, field)),
    }
}

fn parse_amount(value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(FeeError::validation("Payment amount must be a number", "amount")),
    };

    if let Ok(amount) = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        return Ok(amount);
    }

    // Finite numbers beyond the decimal range still fail on the bound they cross.
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 1.0 => {
            Err(FeeError::validation("Payment amount exceeds maximum limit", "amount"))
        }
        Ok(f) if f.is_finite() => Err(FeeError::validation("Payment amount must be greater than zero", "amount")),
        _ => Err(FeeError::validation("Payment amount must be a number", "amount")),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub student_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_success_status")]
    pub status_code: u16,
}

fn is_success_status(status_code: &u16) -> bool {
    *status_code == 200
}

impl SubmissionOutcome {
    pub fn accepted(record: &PaymentRecord) -> Self {
        SubmissionOutcome {
            success: true,
            payment_id: Some(record.id.clone()),
            message: "Payment processed successfully".to_string(),
            code: None,
            error: None,
            status_code: 200,
        }
    }

    pub fn rejected(handled: HandledError) -> Self {
        SubmissionOutcome {
            success: false,
            payment_id: None,
            error: Some(handled.message.clone()),
            message: handled.message,
            code: Some(handled.code),
            status_code: handled.status_code,
        }
    }
}
