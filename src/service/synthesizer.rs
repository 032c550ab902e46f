//! Number synthesis.
//!
//! Picks an issuer, a prefix range and a prefix, pads with random digits and
//! appends a Luhn check digit. Every random draw goes through the caller's
//! RNG in a fixed order, so a seeded RNG reproduces the output exactly.

use bytes::{BufMut, BytesMut};
use rand::Rng;

use crate::domain::{GenerationRequest, IssuerDefinition};
use crate::error::ExportError;
use crate::service::luhn;

/// Longest decimal rendering of a `u128`.
const MAX_DECIMAL_DIGITS: usize = 39;

/// Synthesizer over a non-empty set of issuer definitions.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    definitions: Vec<IssuerDefinition>,
}

impl Synthesizer {
    /// Create a synthesizer.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptySelection`] if `definitions` is empty.
    pub fn new(definitions: Vec<IssuerDefinition>) -> Result<Self, ExportError> {
        if definitions.is_empty() {
            return Err(ExportError::EmptySelection);
        }
        Ok(Self { definitions })
    }

    /// Candidate definitions.
    #[must_use]
    pub fn definitions(&self) -> &[IssuerDefinition] {
        &self.definitions
    }

    /// Append one number followed by `\n` to `out`.
    pub fn write_next<R: Rng>(&self, rng: &mut R, out: &mut BytesMut) {
        let index = rng.random_range(0..self.definitions.len());
        write_number(&self.definitions[index], rng, out);
        out.put_u8(b'\n');
    }

    /// Produce one number as a string (no newline).
    pub fn next_number<R: Rng>(&self, rng: &mut R) -> String {
        let index = rng.random_range(0..self.definitions.len());
        let def = &self.definitions[index];

        let mut out = BytesMut::with_capacity(usize::from(def.length()));
        write_number(def, rng, &mut out);
        out.iter().map(|&b| char::from(b)).collect()
    }

    /// Mean size of one output line (digits plus newline) in bytes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn expected_line_bytes(&self) -> f64 {
        let total: usize = self
            .definitions
            .iter()
            .map(|d| usize::from(d.length()) + 1)
            .sum();
        total as f64 / self.definitions.len() as f64
    }
}

impl From<GenerationRequest> for Synthesizer {
    fn from(request: GenerationRequest) -> Self {
        Self {
            definitions: request.into_selected(),
        }
    }
}

/// Append exactly `def.length()` digits to `out`.
///
/// A prefix as long as the target length is cut to `length - 1` digits so
/// there is always room for the check digit.
pub fn write_number<R: Rng>(def: &IssuerDefinition, rng: &mut R, out: &mut BytesMut) {
    let body_len = usize::from(def.length()) - 1;
    let ranges = def.ranges();
    let range = ranges[rng.random_range(0..ranges.len())];
    let prefix = rng.random_range(range.start()..=range.end());

    let start = out.len();
    out.reserve(body_len + 2);
    // The parser keeps every prefix shorter than `length`.
    push_decimal(out, prefix);

    while out.len() - start < body_len {
        out.put_u8(b'0' + rng.random_range(0..10u8));
    }

    let check = luhn::check_digit(&out[start..]);
    out.put_u8(b'0' + check);
}

#[allow(clippy::cast_possible_truncation)] // each pushed value is < 10
fn push_decimal(out: &mut BytesMut, mut value: u128) {
    let mut buf = [0u8; MAX_DECIMAL_DIGITS];
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    out.extend_from_slice(&buf[pos..]);
}
