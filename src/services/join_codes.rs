//! Join-code generation and allocation.

use std::sync::Arc;

use rand::Rng;

use crate::{dao::party_store::PartyStore, error::ServiceError};

/// Characters eligible for join codes. Visually confusable characters
/// (`I`, `O`, `0`, `1`) are excluded so codes survive being read aloud or
/// scrawled on a napkin.
pub const CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Join codes are always this many characters.
pub const CODE_LENGTH: usize = 4;

/// Generate a random join code. Pure apart from RNG; uniqueness is the
/// caller's job (see [`allocate`]).
pub fn generate() -> String {
    let alphabet = CODE_ALPHABET.as_bytes();
    let mut rng = rand::rng();

    (0..CODE_LENGTH)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// Normalize user input into canonical code form: uppercase, no whitespace.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Generate codes until one is unused. With 32^4 possible codes collisions
/// are rare, so the loop is unbounded like the retry it replaces; each miss
/// costs one indexed lookup.
pub async fn allocate(store: &Arc<dyn PartyStore>) -> Result<String, ServiceError> {
    loop {
        let code = generate();
        if store.find_lobby_by_code(code.clone()).await?.is_none() {
            return Ok(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_the_right_length() {
        for _ in 0..50 {
            assert_eq!(generate().len(), CODE_LENGTH);
        }
    }

    #[test]
    fn codes_only_use_the_unambiguous_alphabet() {
        for _ in 0..50 {
            let code = generate();
            assert!(
                code.chars().all(|c| CODE_ALPHABET.contains(c)),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn repeated_calls_produce_different_codes() {
        // 32^4 codes make ten identical draws effectively impossible.
        let codes: std::collections::HashSet<String> = (0..10).map(|_| generate()).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn normalize_uppercases_and_strips_whitespace() {
        assert_eq!(normalize(" wx yz "), "WXYZ");
        assert_eq!(normalize("WXYZ"), "WXYZ");
    }
}
