//! Validation rules for roast input
//!
//! Field rules are attached to [`RoastForm`](crate::form::RoastForm) with the
//! `validator` derive; this module holds the custom rules and turns a failed
//! validation into the user-facing [`AssemblyError`].

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::error::AssemblyError;

/// Maximum length of free-text note fields
pub const MAX_NOTE_LENGTH: u64 = 2000;

/// Fields reported in this order when several fail at once
const FIELD_PRIORITY: &[&str] = &["bean_name", "green_weight", "notes", "cupping_notes", "memo"];

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Bean name must contain something other than whitespace
pub fn validate_bean_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error_with_message("bean_name_required", "Bean name is required"));
    }
    Ok(())
}

/// Green weight must be entered and greater than zero
pub fn validate_green_weight(weight: &Decimal) -> Result<(), ValidationError> {
    if *weight <= Decimal::ZERO {
        return Err(error_with_message(
            "green_weight_required",
            "Green weight must be greater than 0",
        ));
    }
    Ok(())
}

/// Korean wording for a validation code
pub fn korean_message(code: &str) -> &'static str {
    match code {
        "bean_name_required" => "원두명을 입력해주세요.",
        "green_weight_required" => "투입량을 입력해주세요.",
        "length" => "입력 내용이 너무 깁니다.",
        _ => "입력값이 올바르지 않습니다.",
    }
}

/// Convert validator output into the first failing field's error
pub fn to_assembly_error(errors: &ValidationErrors) -> AssemblyError {
    let field_errors = errors.field_errors();

    let first = FIELD_PRIORITY
        .iter()
        .find_map(|field| field_errors.get(field).map(|errs| (*field, *errs)))
        .or_else(|| field_errors.iter().next().map(|(field, errs)| (*field, *errs)));

    let Some((field, error)) = first.and_then(|(field, errs)| errs.first().map(|e| (field, e)))
    else {
        return AssemblyError::Validation {
            field: String::new(),
            message: "Invalid input".to_string(),
            message_ko: korean_message("").to_string(),
        };
    };

    let message = error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("Invalid value for {}", field));

    AssemblyError::Validation {
        field: field.to_string(),
        message,
        message_ko: korean_message(&error.code).to_string(),
    }
}
