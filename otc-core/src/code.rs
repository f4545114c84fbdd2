//! One-time code generation.

use rand::rngs::OsRng;
use rand::Rng;

/// Number of decimal digits in a generated code.
pub const CODE_LENGTH: usize = 6;

/// Smallest issuable code. The six-digit floor means codes never carry a
/// leading zero, so they survive being handled as numbers along the way.
pub const CODE_MIN: u32 = 100_000;

/// Largest issuable code.
pub const CODE_MAX: u32 = 999_999;

/// Generate a fresh one-time code: six decimal digits, uniform over
/// `CODE_MIN..=CODE_MAX`.
///
/// Codes are bearer secrets, so they come from the operating system's
/// CSPRNG rather than a seeded or thread-local generator. Uniqueness is
/// not guaranteed and not needed; the store binds each code to its key.
pub fn generate_code() -> String {
    OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_six_ascii_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }

    #[test]
    fn test_codes_stay_in_range() {
        for _ in 0..1000 {
            let value: u32 = generate_code().parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value));
        }
    }

    #[test]
    fn test_codes_are_not_constant() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(generate_code());
        }
        assert!(seen.len() > 1, "100 draws produced a single code");
    }
}
