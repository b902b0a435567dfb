//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes. Field-level rules live on the
//! request structs as `validator` attributes; the helpers below cover the catalog
//! identifiers (SKU, UPC, ISBN, price) that need more than a length check.

use chrono::{Datelike, NaiveDate};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::error::MetronError;

/// Earliest year accepted for cover, store, and FOC dates.
pub const MINIMUM_YEAR: i32 = 1900;

static PRICE_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^\d+(\.\d{1,2})?$").expect("price pattern"));

/// Validate a request body, returning a MetronError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), MetronError> {
    body.validate().map_err(|e| MetronError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Dates before [`MINIMUM_YEAR`] are data-entry mistakes.
pub fn validate_date_year(date: &NaiveDate) -> Result<(), ValidationError> {
    if date.year() < MINIMUM_YEAR {
        return Err(rule("date_year", "Date has a non-valid year."));
    }
    Ok(())
}

pub fn validate_sku(sku: &str) -> Result<(), ValidationError> {
    if !sku.is_empty() && !sku.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(rule(
            "sku",
            "SKU must be alphanumeric. No spaces or hyphens allowed.",
        ));
    }
    Ok(())
}

pub fn validate_upc(upc: &str) -> Result<(), ValidationError> {
    if !upc.is_empty() && !upc.chars().all(|c| c.is_ascii_digit()) {
        return Err(rule(
            "upc",
            "UPC must be numeric. No spaces or hyphens allowed.",
        ));
    }
    Ok(())
}

pub fn validate_price(price: &str) -> Result<(), ValidationError> {
    if !PRICE_REGEX.is_match(price) {
        return Err(rule("price", "Price must be a decimal amount like 3.99."));
    }
    Ok(())
}

pub fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    if isbn.is_empty() {
        return Ok(());
    }
    let canonical = canonical_isbn(isbn);
    if is_isbn10(&canonical) || is_isbn13(&canonical) {
        Ok(())
    } else {
        Err(rule("isbn", "ISBN is not a valid ISBN-10 or ISBN-13."))
    }
}

/// Strip separators and upper-case the ISBN-10 check character.
pub fn canonical_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn is_isbn10(isbn: &str) -> bool {
    let chars: Vec<char> = isbn.chars().collect();
    if chars.len() != 10 {
        return false;
    }
    let mut sum = 0u32;
    for (i, c) in chars.iter().enumerate() {
        let value = match c {
            'X' if i == 9 => 10,
            d => match d.to_digit(10) {
                Some(v) => v,
                None => return false,
            },
        };
        sum += value * (10 - i as u32);
    }
    sum % 11 == 0
}

fn is_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 || !isbn.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = isbn
        .chars()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    sum % 10 == 0
}

/// Validate that a display name is not blank.
pub fn validate_name(name: &str) -> Result<(), MetronError> {
    if name.trim().is_empty() {
        return Err(MetronError::Validation {
            message: "Name cannot be empty or whitespace only".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn_checksums() {
        assert!(validate_isbn("0-306-40615-2").is_ok());
        assert!(validate_isbn("978-0-306-40615-7").is_ok());
        assert!(validate_isbn("080442957X").is_ok());
        assert!(validate_isbn("978-0-306-40615-8").is_err());
        assert!(validate_isbn("12345").is_err());
        assert!(validate_isbn("").is_ok());
    }

    #[test]
    fn sku_and_upc_shapes() {
        assert!(validate_sku("JAN240123").is_ok());
        assert!(validate_sku("JAN-240123").is_err());
        assert!(validate_upc("76194137816500111").is_ok());
        assert!(validate_upc("7619 4137").is_err());
    }

    #[test]
    fn prices_are_plain_decimals() {
        assert!(validate_price("3.99").is_ok());
        assert!(validate_price("25").is_ok());
        assert!(validate_price("4.5").is_ok());
        assert!(validate_price("$3.99").is_err());
        assert!(validate_price("3.999").is_err());
    }

    #[test]
    fn early_dates_are_rejected() {
        let old = NaiveDate::from_ymd_opt(1899, 12, 1).unwrap();
        let ok = NaiveDate::from_ymd_opt(1938, 6, 1).unwrap();
        assert!(validate_date_year(&old).is_err());
        assert!(validate_date_year(&ok).is_ok());
    }

    #[test]
    fn blank_names_fail() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Batman").is_ok());
    }
}
