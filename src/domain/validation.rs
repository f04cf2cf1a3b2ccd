//! Field validation shared by every add and edit flow.
//!
//! Each function checks one field and returns the normalised value. Add and
//! edit forms call the same functions, so a rule only ever lives here.
//! Validation always runs before any network call.

use std::{num::NonZeroU32, sync::LazyLock};

use regex::Regex;

/// The blood groups the backend accepts.
pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// The gender codes the backend accepts.
pub const GENDERS: [&str; 3] = ["M", "F", "O"];

/// The blood components a donation may be recorded as.
pub const COMPONENTS: [&str; 4] = ["Whole Blood", "RBC", "Plasma", "Platelets"];

/// Youngest permitted donor age.
pub const DONOR_MIN_AGE: i64 = 18;
/// Oldest permitted donor age.
pub const DONOR_MAX_AGE: i64 = 65;
/// Oldest permitted patient age.
pub const PATIENT_MAX_AGE: i64 = 120;
/// Smallest capacity a new blood bank may be registered with.
pub const BANK_MIN_CAPACITY: i64 = 100;

const PHONE_DIGITS: usize = 10;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// A malformed or out-of-range form field.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// The name of the offending field.
    pub field: &'static str,
    /// A message suitable for showing to the user.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Parses a whole number typed into a form field.
///
/// # Errors
///
/// Returns an error if the text is empty or not an integer.
pub fn integer(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    raw.trim().parse().map_err(|_| {
        ValidationError::new(field, format!("{} must be a whole number", label(field)))
    })
}

/// Checks a donor's age.
///
/// # Errors
///
/// Returns an error unless the age lies in `18..=65`.
pub fn donor_age(age: i64) -> Result<u8, ValidationError> {
    if (DONOR_MIN_AGE..=DONOR_MAX_AGE).contains(&age) {
        u8::try_from(age).map_err(|_| donor_age_error())
    } else {
        Err(donor_age_error())
    }
}

fn donor_age_error() -> ValidationError {
    ValidationError::new(
        "age",
        format!("Age must be between {DONOR_MIN_AGE} and {DONOR_MAX_AGE} for donors"),
    )
}

/// Checks a patient's age.
///
/// # Errors
///
/// Returns an error unless the age lies in `0..=120`.
pub fn patient_age(age: i64) -> Result<u8, ValidationError> {
    if (0..=PATIENT_MAX_AGE).contains(&age) {
        u8::try_from(age).map_err(|_| patient_age_error())
    } else {
        Err(patient_age_error())
    }
}

fn patient_age_error() -> ValidationError {
    ValidationError::new(
        "age",
        format!("Age must be between 0 and {PATIENT_MAX_AGE} for patients"),
    )
}

/// Checks a contact phone number.
///
/// # Errors
///
/// Returns an error unless the trimmed number is exactly ten digits.
pub fn phone(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.len() == PHONE_DIGITS && trimmed.chars().all(|c| c.is_ascii_digit()) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::new(
            "contact",
            format!("Phone number must be exactly {PHONE_DIGITS} digits"),
        ))
    }
}

/// Checks the shape of an email address.
///
/// # Errors
///
/// Returns an error unless the address looks like `local@domain.tld`.
pub fn email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if EMAIL.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::new("email", "Please enter a valid email address"))
    }
}

/// Checks an optional email address. Blank input counts as absent.
///
/// # Errors
///
/// Returns an error if a non-blank address is malformed.
pub fn optional_email(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(address) => email(address).map(Some),
    }
}

/// Checks that a quantity is strictly positive.
///
/// # Errors
///
/// Returns an error for zero, negative, or oversized values.
pub fn positive_quantity(field: &'static str, value: i64) -> Result<NonZeroU32, ValidationError> {
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            ValidationError::new(field, format!("{} must be a positive number", label(field)))
        })
}

/// Checks a blood bank's storage capacity.
///
/// # Errors
///
/// Returns an error for capacities below [`BANK_MIN_CAPACITY`] or too large
/// to store.
pub fn capacity(value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value)
        .ok()
        .filter(|_| value >= BANK_MIN_CAPACITY)
        .ok_or_else(|| {
            ValidationError::new(
                "capacity",
                format!("Capacity must be at least {BANK_MIN_CAPACITY} units"),
            )
        })
}

/// Checks that a reference to another entity is a positive identifier.
///
/// # Errors
///
/// Returns an error for zero or negative values.
pub fn positive_id(field: &'static str, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            let what = label(field).to_lowercase();
            ValidationError::new(field, format!("Please select a valid {what}"))
        })
}

/// Checks a blood group against [`BLOOD_GROUPS`].
///
/// # Errors
///
/// Returns an error for anything else.
pub fn blood_group(raw: &str) -> Result<String, ValidationError> {
    let normalised = raw.trim().to_uppercase();
    if BLOOD_GROUPS.contains(&normalised.as_str()) {
        Ok(normalised)
    } else {
        Err(ValidationError::new(
            "blood_group",
            format!("Blood group must be one of {}", BLOOD_GROUPS.join(", ")),
        ))
    }
}

/// Checks a gender code against [`GENDERS`].
///
/// # Errors
///
/// Returns an error for anything else.
pub fn gender(raw: &str) -> Result<String, ValidationError> {
    let normalised = raw.trim().to_uppercase();
    if GENDERS.contains(&normalised.as_str()) {
        Ok(normalised)
    } else {
        Err(ValidationError::new("gender", "Gender must be M, F or O"))
    }
}

/// Checks a blood component against [`COMPONENTS`].
///
/// # Errors
///
/// Returns an error for anything else.
pub fn component(raw: &str) -> Result<String, ValidationError> {
    COMPONENTS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(raw.trim()))
        .map(|known| (*known).to_string())
        .ok_or_else(|| {
            ValidationError::new(
                "component",
                format!("Component must be one of {}", COMPONENTS.join(", ")),
            )
        })
}

/// Checks that a free-text field is present and not too long.
///
/// # Errors
///
/// Returns an error if the trimmed text is empty or exceeds `max` characters.
pub fn required_text(field: &'static str, raw: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, format!("{} is required", label(field))));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("{} must be at most {max} characters", label(field)),
        ));
    }
    Ok(trimmed.to_string())
}

/// Turns `blood_bank_id` into `Blood bank` for messages.
fn label(field: &str) -> String {
    let words = field.trim_end_matches("_id").replace('_', " ");
    let mut chars = words.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
