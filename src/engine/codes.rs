//! Join-code generation and normalization.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Characters allowed in a join code. Ambiguous glyphs (0/O, 1/I/L) are
/// excluded so codes survive being read aloud or scribbled on a napkin.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of a join code.
pub const CODE_LENGTH: usize = 4;

/// Draw a fresh join code. Uniqueness among non-finished games is the
/// caller's responsibility (checked against the store on allocation).
pub fn generate(rng: &mut impl Rng) -> String {
    (0..CODE_LENGTH)
        .map(|_| {
            let byte = *CODE_ALPHABET
                .choose(rng)
                .unwrap_or(&CODE_ALPHABET[0]);
            byte as char
        })
        .collect()
}

/// Normalize a user-entered code for lookup: trimmed and uppercased.
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Whether a normalized code has the expected shape.
pub fn is_valid(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|byte| CODE_ALPHABET.contains(&byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let code = generate(&mut rng);
            assert!(is_valid(&code), "generated invalid code {code}");
        }
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize("  ab2c "), "AB2C");
    }

    #[test]
    fn ambiguous_characters_are_rejected() {
        assert!(!is_valid("AB0C"));
        assert!(!is_valid("ABIC"));
        assert!(!is_valid("ABLC"));
        assert!(!is_valid("ABOC"));
        assert!(!is_valid("AB1C"));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(!is_valid("ABC"));
        assert!(!is_valid("ABCDE"));
        assert!(!is_valid(""));
    }
}
