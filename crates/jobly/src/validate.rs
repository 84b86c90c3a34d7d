//! Field validation for request bodies and filters.
//!
//! Input structs collect every failing field into [`ValidationErrors`] so a
//! caller sees all problems in one response, then convert the collection into
//! [`JoblyError::Invalid`](crate::JoblyError::Invalid).

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A machine-friendly validation code.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCode {
    Len,
    Range,
    Url,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Len => "len",
            Self::Range => "range",
            Self::Url => "url",
        }
    }
}

impl Serialize for ValidationCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub items: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.items.push(err);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.items.iter()
    }

    /// `Ok(())` when nothing failed, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Character length must fall in `min..=max`.
    pub fn check_len(&mut self, field: &str, value: &str, min: usize, max: Option<usize>) {
        let len = value.chars().count();
        if len < min {
            self.push(ValidationError::new(
                field,
                ValidationCode::Len,
                format!("must be at least {min} characters"),
            ));
        } else if let Some(max) = max.filter(|max| len > *max) {
            self.push(ValidationError::new(
                field,
                ValidationCode::Len,
                format!("must be at most {max} characters"),
            ));
        }
    }

    pub fn check_non_negative(&mut self, field: &str, value: i32) {
        if value < 0 {
            self.push(ValidationError::new(
                field,
                ValidationCode::Range,
                "must be >= 0",
            ));
        }
    }

    /// Equity is a fraction of the company: `0 <= value <= 1`.
    pub fn check_fraction(&mut self, field: &str, value: Decimal) {
        if value < Decimal::ZERO || value > Decimal::ONE {
            self.push(ValidationError::new(
                field,
                ValidationCode::Range,
                "must be between 0 and 1",
            ));
        }
    }

    pub fn check_url(&mut self, field: &str, value: &str) {
        if !is_url(value) {
            self.push(ValidationError::new(
                field,
                ValidationCode::Url,
                "must be a valid URL",
            ));
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}
