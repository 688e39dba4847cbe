//! Session code generation and normalization

use rand::Rng;

/// Number of characters in a session code
pub const CODE_LENGTH: usize = 6;

/// Characters a session code is drawn from
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a session code using the thread-local RNG
///
/// Codes are not checked against existing sessions; two coaches can draw the
/// same code.
pub fn generate_code() -> String {
    generate_code_with(&mut rand::rng())
}

/// Generate a session code from the given RNG
pub fn generate_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Trim and uppercase user input.
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_code(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}

/// Check that a (normalized) code has the expected shape
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
