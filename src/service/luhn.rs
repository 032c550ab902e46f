//! Luhn (mod 10) checksum.
//!
//! Digits are ASCII bytes throughout so the synthesizer can work directly on
//! its output buffer.

/// Compute the check digit to append to `body`.
///
/// `body` must contain only ASCII digits. Once the check digit is appended it
/// becomes the rightmost digit, so the rightmost body digit and every second
/// digit to its left are the doubled ones.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // value is < 10
pub fn check_digit(body: &[u8]) -> u8 {
    let sum = weighted_sum(body, true);
    ((10 - sum % 10) % 10) as u8
}

/// Validate a complete number (check digit included).
///
/// Returns `false` for anything shorter than two digits or containing a
/// non-digit character.
#[must_use]
pub fn is_valid(number: &str) -> bool {
    let bytes = number.as_bytes();
    bytes.len() >= 2
        && bytes.iter().all(u8::is_ascii_digit)
        && weighted_sum(bytes, false) % 10 == 0
}

/// Sum of digits walking right to left, doubling every second digit.
///
/// `double_rightmost` selects whether the doubling starts on the rightmost digit.
fn weighted_sum(digits: &[u8], double_rightmost: bool) -> u32 {
    let mut double = double_rightmost;
    let mut sum = 0;

    for &b in digits.iter().rev() {
        let mut digit = u32::from(b - b'0');
        if double {
            digit *= 2;
            if digit >= 10 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }

    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digit_known_values() {
        // 7992739871 -> 3 is the textbook example.
        assert_eq!(check_digit(b"7992739871"), 3);
        assert_eq!(check_digit(b"411111111111111"), 1);
        assert_eq!(check_digit(b"37828224631000"), 5);
        assert_eq!(check_digit(b"0"), 0);
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("79927398713"));
        assert!(is_valid("4111111111111111"));
        assert!(is_valid("378282246310005"));
        assert!(!is_valid("79927398710"));
        assert!(!is_valid("4111111111111112"));
    }

    #[test]
    fn test_is_valid_rejects_garbage() {
        assert!(!is_valid(""));
        assert!(!is_valid("0"));
        assert!(!is_valid("4111-1111"));
        assert!(!is_valid("abcd"));
    }

    #[test]
    fn test_check_digit_makes_body_valid() {
        for body in ["1", "12", "123456789", "98765432109876543210987654321"] {
            let digit = check_digit(body.as_bytes());
            assert!(is_valid(&format!("{body}{digit}")), "body {body}");
        }
    }
}
