use crate::error::{FeeError, Result};
use rust_decimal::Decimal;

pub const STUDENT_ID_PREFIX: &str = "STU";
const STUDENT_ID_DIGITS: usize = 3;

pub fn validate_amount(amount: Decimal, max_amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(FeeError::validation(
            "Payment amount must be greater than zero",
            "amount",
        ));
    }
    if amount > max_amount {
        return Err(FeeError::validation(
            "Payment amount exceeds maximum limit",
            "amount",
        ));
    }
    Ok(())
}

/// Student ids are `STU` followed by exactly three digits, e.g. `STU001`.
pub fn validate_student_id(student_id: &str) -> Result<()> {
    if student_id.trim().is_empty() {
        return Err(FeeError::validation("Student ID is required", "studentId"));
    }

    let valid = student_id
        .strip_prefix(STUDENT_ID_PREFIX)
        .map(|digits| digits.len() == STUDENT_ID_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false);

    if !valid {
        return Err(FeeError::validation(
            "Invalid student ID format. Expected format: STU001",
            "studentId",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || FeeError::validation("Invalid email format", "email");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let allowed = |s: &str| !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '@');
    if !allowed(local) || !allowed(domain) {
        return Err(invalid());
    }

    // Some dot in the domain must have a non-empty label on both sides.
    let has_dotted_label = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_dotted_label {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_card_number(card_number: &str) -> Result<()> {
    let digits: String = card_number.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 16 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FeeError::validation(
            "Card number must be 16 digits",
            "cardNumber",
        ));
    }
    Ok(())
}

pub fn validate_cvv(cvv: &str) -> Result<()> {
    if !(3..=4).contains(&cvv.len()) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FeeError::validation("CVV must be 3 or 4 digits", "cvv"));
    }
    Ok(())
}
