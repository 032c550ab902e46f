//! Built-in issuer presets.
//!
//! Well-known card categories used to seed a fresh working set. Prefixes
//! follow the publicly documented IIN ranges; lengths use the most common
//! length of each scheme.

use super::issuer::{IssuerDefinition, IssuerRecord};
use crate::error::ValidationError;

/// `(label, length, prefixes)` for every built-in issuer.
pub const BUILTIN_ISSUERS: &[(&str, u32, &str)] = &[
    ("Visa", 16, "4"),
    ("MasterCard", 16, "51-55,2221-2720"),
    ("American Express", 15, "34,37"),
    ("Visa Electron", 16, "4026,417500,4508,4844,4913,4917"),
    ("China UnionPay", 16, "62"),
    ("Maestro", 16, "5018,5020,5038,5893,6304,6759,6761-6763"),
    ("Maestro UK", 16, "6759,676770,676774"),
    ("Diners Club International", 14, "36"),
    ("Diners Club US & Canada", 16, "54"),
    ("Diners Club Carte Blanche", 14, "300-305"),
    ("Discover", 16, "6011,644-649,65,622126-622925"),
    ("InterPayment", 16, "636"),
    ("InstaPayment", 16, "637-639"),
    ("JCB", 16, "3528-3589"),
    ("Dankort", 16, "5019,4571"),
    ("UATP", 15, "1"),
    ("Laser", 16, "6304,6706,6709,6771"),
    ("Solo", 16, "6334,6767"),
    ("MIR", 16, "2200-2204"),
    ("Troy", 16, "65,9792"),
    ("Verve", 16, "506099-506198,650002-650027"),
    ("LankaPay", 16, "357111"),
];

/// Build the built-in issuer definitions, in table order.
///
/// # Errors
///
/// Returns a [`ValidationError`] if a table entry is malformed.
pub fn builtin_issuers() -> Result<Vec<IssuerDefinition>, ValidationError> {
    BUILTIN_ISSUERS
        .iter()
        .map(|&(label, length, prefixes)| IssuerDefinition::new(label, length, prefixes))
        .collect()
}

/// Built-in issuers as raw records.
#[must_use]
pub fn builtin_records() -> Vec<IssuerRecord> {
    BUILTIN_ISSUERS
        .iter()
        .map(|&(label, length, prefixes)| IssuerRecord::new(label, length, prefixes))
        .collect()
}
