//! Issuer definitions.
//!
//! An issuer definition names a category of synthesizable numbers: a label,
//! the exact output length and the prefix ranges numbers start with.

use serde::{Deserialize, Serialize};

use super::prefix::{PrefixRange, parse_prefix_ranges};
use crate::error::ValidationError;

/// Shortest supported output length.
pub const MIN_LENGTH: u8 = 2;

/// Longest supported output length.
pub const MAX_LENGTH: u8 = 32;

/// Raw issuer record as supplied by configuration, the catalog or the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRecord {
    /// Display label, unique within a working set.
    pub label: String,

    /// Output length in digits.
    pub length: u32,

    /// Prefix specification, e.g. `"51-55,2221-2720"`.
    pub prefixes: String,
}

impl IssuerRecord {
    /// Create a new record.
    pub fn new(label: impl Into<String>, length: u32, prefixes: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            length,
            prefixes: prefixes.into(),
        }
    }
}

/// A validated issuer definition.
///
/// Fields are private: a value can only be obtained through validation, and
/// edits replace the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerDefinition {
    label: String,
    length: u8,
    prefixes: String,
    ranges: Vec<PrefixRange>,
}

impl IssuerDefinition {
    /// Validate and build a definition.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found in the label, the length or
    /// the prefix specification.
    pub fn new(label: &str, length: u32, prefixes: &str) -> Result<Self, ValidationError> {
        validate_issuer(label)?;
        let length = validate_length(length)?;
        let ranges = parse_prefix_ranges(prefixes, length)?;

        Ok(Self {
            label: label.trim().to_string(),
            length,
            prefixes: prefixes.trim().to_string(),
            ranges,
        })
    }

    /// Validate and build a definition from a raw record.
    ///
    /// # Errors
    ///
    /// See [`IssuerDefinition::new`].
    pub fn from_record(record: &IssuerRecord) -> Result<Self, ValidationError> {
        Self::new(&record.label, record.length, &record.prefixes)
    }

    /// Convert back to the raw record shape.
    #[must_use]
    pub fn to_record(&self) -> IssuerRecord {
        IssuerRecord::new(
            self.label.clone(),
            u32::from(self.length),
            self.prefixes.clone(),
        )
    }

    /// Issuer label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Output length in digits, check digit included.
    #[must_use]
    pub const fn length(&self) -> u8 {
        self.length
    }

    /// Prefix specification as written.
    #[must_use]
    pub fn prefixes(&self) -> &str {
        &self.prefixes
    }

    /// Parsed prefix ranges, in the order written.
    #[must_use]
    pub fn ranges(&self) -> &[PrefixRange] {
        &self.ranges
    }

    /// Check whether `number` could have been produced by this definition:
    /// right length and leading digits inside one of the ranges.
    #[must_use]
    pub fn accepts(&self, number: &str) -> bool {
        number.len() == usize::from(self.length)
            && self.ranges.iter().any(|r| r.matches_leading_digits(number))
    }
}

impl TryFrom<IssuerRecord> for IssuerDefinition {
    type Error = ValidationError;

    fn try_from(record: IssuerRecord) -> Result<Self, Self::Error> {
        Self::from_record(&record)
    }
}

/// Validate an issuer label.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyLabel`] if the label is empty or whitespace.
pub fn validate_issuer(label: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    Ok(())
}

/// Validate an output length, returning it narrowed to `u8`.
///
/// # Errors
///
/// Returns [`ValidationError::LengthOutOfRange`] unless `2 <= length <= 32`.
pub fn validate_length(length: u32) -> Result<u8, ValidationError> {
    u8::try_from(length)
        .ok()
        .filter(|l| (MIN_LENGTH..=MAX_LENGTH).contains(l))
        .ok_or(ValidationError::LengthOutOfRange(length))
}
