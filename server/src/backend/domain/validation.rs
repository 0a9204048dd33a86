//! Input rules shared by youth registration, editing and attendance lookup.
use chrono::NaiveDate;

use shared::format::digits_only;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Cédula is required")]
    MissingCedula,
    #[error("Cédula must have 8 or 9 digits")]
    InvalidCedula,
    #[error("Full name is required")]
    MissingName,
    #[error("Phone is required")]
    MissingPhone,
    #[error("Phone must have exactly 8 digits")]
    InvalidPhone,
    #[error("Birth date is required")]
    MissingBirthDate,
    #[error("Birth date must use the YYYY-MM-DD format")]
    InvalidBirthDate,
    #[error("Birth date cannot be in the future")]
    FutureBirthDate,
}

/// Strip everything but digits and check the length: 8 or 9 digits.
pub fn normalize_cedula(raw: &str) -> Result<String, ValidationError> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return Err(ValidationError::MissingCedula);
    }
    if !(8..=9).contains(&digits.len()) {
        return Err(ValidationError::InvalidCedula);
    }
    Ok(digits)
}

pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    if digits.len() != 8 {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(digits)
}

pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(name.to_string())
}

/// Birth dates are required on every create and edit and may not lie in the future.
pub fn parse_birth_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingBirthDate);
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidBirthDate)?;
    if date > today {
        return Err(ValidationError::FutureBirthDate);
    }
    Ok(date)
}
