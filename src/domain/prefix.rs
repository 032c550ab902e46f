//! Prefix range specification parsing.
//!
//! A prefix spec is a comma-separated list of tokens, each either a single
//! value (`4`) or an inclusive range (`2221-2720`). Spaces may surround a
//! token but not the `-` inside it. Ranges are kept in the order written;
//! they are never merged or sorted and may overlap.
//!
//! Every value, counted with its leading zeros, must be shorter than the
//! target length so the check digit always fits behind the full prefix.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An inclusive interval of numeric prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefixRange {
    start: u128,
    end: u128,
}

impl PrefixRange {
    /// Create a range. Callers outside the parser are responsible for
    /// `0 < start <= end`.
    #[must_use]
    pub const fn new(start: u128, end: u128) -> Self {
        Self { start, end }
    }

    /// First prefix in the range (inclusive).
    #[must_use]
    pub const fn start(&self) -> u128 {
        self.start
    }

    /// Last prefix in the range (inclusive).
    #[must_use]
    pub const fn end(&self) -> u128 {
        self.end
    }

    /// Check whether a value lies inside the range.
    #[must_use]
    pub const fn contains(&self, value: u128) -> bool {
        value >= self.start && value <= self.end
    }

    /// Check whether some leading-digit slice of `number` falls inside the range.
    ///
    /// Only slices as long as the range bounds are considered, so `4` matches
    /// `4111...` but `40-49` does not match `4111...` through its first digit.
    #[must_use]
    pub fn matches_leading_digits(&self, number: &str) -> bool {
        let min_width = digit_count(self.start);
        let max_width = digit_count(self.end);

        (min_width..=max_width)
            .filter(|&width| width <= number.len())
            .filter_map(|width| number[..width].parse::<u128>().ok())
            .any(|value| self.contains(value))
    }
}

impl From<(u128, u128)> for PrefixRange {
    fn from((start, end): (u128, u128)) -> Self {
        Self::new(start, end)
    }
}

impl std::fmt::Display for PrefixRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Number of decimal digits in `value` (`0` counts as one digit).
#[must_use]
pub const fn digit_count(mut value: u128) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// Parse a prefix specification for a definition of the given target length.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the offending token when the spec is
/// empty, ends with a separator, contains an empty or malformed token, a zero
/// value, a reversed range, or a value with `length` or more digits.
pub fn parse_prefix_ranges(spec: &str, length: u8) -> Result<Vec<PrefixRange>, ValidationError> {
    let trimmed = spec.trim_matches(' ');
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPrefixSpec);
    }
    if trimmed.ends_with(',') {
        return Err(ValidationError::TrailingSeparator);
    }

    trimmed
        .split(',')
        .enumerate()
        .map(|(index, token)| parse_token(token, index + 1, length))
        .collect()
}

fn parse_token(raw: &str, position: usize, length: u8) -> Result<PrefixRange, ValidationError> {
    let token = raw.trim_matches(' ');
    if token.is_empty() {
        return Err(ValidationError::EmptyToken { position });
    }

    let (start, end) = token.split_once('-').unwrap_or((token, token));
    let start = parse_value(start, token, position, length)?;
    let end = parse_value(end, token, position, length)?;

    if end < start {
        return Err(ValidationError::ReversedRange {
            position,
            token: token.to_string(),
        });
    }

    Ok(PrefixRange::new(start, end))
}

fn parse_value(
    digits: &str,
    token: &str,
    position: usize,
    length: u8,
) -> Result<u128, ValidationError> {
    let malformed = || ValidationError::MalformedToken {
        position,
        token: token.to_string(),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    if digits.len() >= usize::from(length) {
        return Err(ValidationError::TooManyDigits {
            position,
            token: token.to_string(),
            length,
        });
    }

    match digits.parse::<u128>() {
        Ok(0) => Err(ValidationError::ZeroValue {
            position,
            token: token.to_string(),
        }),
        Ok(value) => Ok(value),
        Err(_) => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(pairs: &[(u128, u128)]) -> Vec<PrefixRange> {
        pairs.iter().copied().map(PrefixRange::from).collect()
    }

    #[test]
    fn test_parse_mixed_spec() {
        let parsed = parse_prefix_ranges("1,2,4-5,7,89-1000", 16).unwrap();
        assert_eq!(
            parsed,
            ranges(&[(1, 1), (2, 2), (4, 5), (7, 7), (89, 1000)])
        );
    }

    #[test]
    fn test_parse_preserves_order_and_overlap() {
        let parsed = parse_prefix_ranges("60-70,5,65", 16).unwrap();
        assert_eq!(parsed, ranges(&[(60, 70), (5, 5), (65, 65)]));
    }

    #[test]
    fn test_parse_tolerates_spaces_around_tokens() {
        let parsed = parse_prefix_ranges(" 34 , 37", 15).unwrap();
        assert_eq!(parsed, ranges(&[(34, 34), (37, 37)]));

        let parsed = parse_prefix_ranges("  51-55 ,4", 16).unwrap();
        assert_eq!(parsed, ranges(&[(51, 55), (4, 4)]));
    }

    #[test]
    fn test_parse_rejects_spaces_inside_tokens() {
        assert!(matches!(
            parse_prefix_ranges("51 - 55", 16),
            Err(ValidationError::MalformedToken { position: 1, .. })
        ));
        assert!(matches!(
            parse_prefix_ranges("4,\t5", 16),
            Err(ValidationError::MalformedToken { position: 2, .. })
        ));
        assert!(matches!(
            parse_prefix_ranges("4 1", 16),
            Err(ValidationError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_parse_rejections() {
        assert!(matches!(
            parse_prefix_ranges("5-3", 16),
            Err(ValidationError::ReversedRange { position: 1, .. })
        ));
        assert!(matches!(
            parse_prefix_ranges("0", 16),
            Err(ValidationError::ZeroValue { .. })
        ));
        assert_eq!(
            parse_prefix_ranges("", 16),
            Err(ValidationError::EmptyPrefixSpec)
        );
        assert_eq!(
            parse_prefix_ranges("12,", 16),
            Err(ValidationError::TrailingSeparator)
        );
        assert!(matches!(
            parse_prefix_ranges("ab", 16),
            Err(ValidationError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        assert_eq!(
            parse_prefix_ranges("1,,2", 16),
            Err(ValidationError::EmptyToken { position: 2 })
        );
        assert!(matches!(
            parse_prefix_ranges("1-2-3", 16),
            Err(ValidationError::MalformedToken { .. })
        ));
        assert!(matches!(
            parse_prefix_ranges("-5", 16),
            Err(ValidationError::MalformedToken { .. })
        ));
        assert!(matches!(
            parse_prefix_ranges("4,+5", 16),
            Err(ValidationError::MalformedToken { position: 2, .. })
        ));
        assert!(matches!(
            parse_prefix_ranges("0-9", 16),
            Err(ValidationError::ZeroValue { .. })
        ));
    }

    #[test]
    fn test_parse_digit_limit() {
        assert_eq!(parse_prefix_ranges("12", 3).unwrap(), ranges(&[(12, 12)]));
        assert_eq!(
            parse_prefix_ranges("1,123", 3),
            Err(ValidationError::TooManyDigits {
                position: 2,
                token: "123".to_string(),
                length: 3,
            })
        );
        // A range is rejected when either bound reaches the length.
        assert!(matches!(
            parse_prefix_ranges("9-10", 2),
            Err(ValidationError::TooManyDigits { position: 1, .. })
        ));
        // Leading zeros count towards the limit.
        assert!(matches!(
            parse_prefix_ranges("0042", 4),
            Err(ValidationError::TooManyDigits { .. })
        ));
        assert_eq!(parse_prefix_ranges("042", 4).unwrap(), ranges(&[(42, 42)]));
        // 31-digit values fit a 32-digit number.
        let max = "9".repeat(31);
        assert!(parse_prefix_ranges(&max, 32).is_ok());
        assert!(parse_prefix_ranges(&"9".repeat(32), 32).is_err());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let spec = "51-55,2221-2720";
        assert_eq!(
            parse_prefix_ranges(spec, 16).unwrap(),
            parse_prefix_ranges(spec, 16).unwrap()
        );
    }

    #[test]
    fn test_matches_leading_digits() {
        let range = PrefixRange::new(2221, 2720);
        assert!(range.matches_leading_digits("2500123412341234"));
        assert!(!range.matches_leading_digits("2100123412341234"));

        let range = PrefixRange::new(4, 4);
        assert!(range.matches_leading_digits("4111111111111111"));
        assert!(!range.matches_leading_digits("5111111111111111"));

        let range = PrefixRange::new(89, 1000);
        assert!(range.matches_leading_digits("9000"));
        assert!(range.matches_leading_digits("1000"));

        let range = PrefixRange::new(89, 99);
        assert!(!range.matches_leading_digits("8899"));
    }

    #[test]
    fn test_display_and_digit_count() {
        assert_eq!(PrefixRange::new(4, 4).to_string(), "4");
        assert_eq!(PrefixRange::new(51, 55).to_string(), "51-55");
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(u128::from(u64::MAX)), 20);
    }
}
