//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::services::join_codes::CODE_ALPHABET;

/// Validates that a join code is exactly 4 characters from the unambiguous
/// code alphabet once normalized (uppercased, whitespace stripped).
///
/// # Examples
///
/// ```ignore
/// validate_join_code("WXYZ") // Ok
/// validate_join_code("wx yz") // Ok - normalized before checking
/// validate_join_code("WXY")  // Err - too short
/// validate_join_code("WX1Z") // Err - ambiguous character
/// ```
pub fn validate_join_code(code: &str) -> Result<(), ValidationError> {
    let normalized: String = code
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.len() != 4 {
        let mut err = ValidationError::new("join_code_length");
        err.message = Some(
            format!(
                "Join code must be exactly 4 characters (got {})",
                normalized.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !normalized.chars().all(|c| CODE_ALPHABET.contains(c)) {
        let mut err = ValidationError::new("join_code_alphabet");
        err.message = Some("Join code contains characters outside the code alphabet".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a submitted favorite-movie title list: between 1 and 10 titles,
/// none blank.
pub fn validate_movie_titles(titles: &[String]) -> Result<(), ValidationError> {
    if titles.is_empty() || titles.len() > 10 {
        let mut err = ValidationError::new("titles_count");
        err.message = Some("Submit between 1 and 10 favorite movies".into());
        return Err(err);
    }

    if titles.iter().any(|title| title.trim().is_empty()) {
        let mut err = ValidationError::new("titles_blank");
        err.message = Some("Movie titles must not be blank".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_join_code_valid() {
        assert!(validate_join_code("WXYZ").is_ok());
        assert!(validate_join_code("abcd").is_ok());
        assert!(validate_join_code("wx yz").is_ok());
        assert!(validate_join_code("2345").is_ok());
    }

    #[test]
    fn test_validate_join_code_invalid_length() {
        assert!(validate_join_code("WXY").is_err()); // too short
        assert!(validate_join_code("WXYZA").is_err()); // too long
        assert!(validate_join_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_join_code_invalid_alphabet() {
        assert!(validate_join_code("WX1Z").is_err()); // 1 is ambiguous
        assert!(validate_join_code("WX0Z").is_err()); // 0 is ambiguous
        assert!(validate_join_code("WXIZ").is_err()); // I is ambiguous
        assert!(validate_join_code("WXOZ").is_err()); // O is ambiguous
        assert!(validate_join_code("WX-Z").is_err()); // punctuation
    }

    #[test]
    fn test_validate_movie_titles() {
        assert!(validate_movie_titles(&["Heat".into()]).is_ok());
        assert!(validate_movie_titles(&[]).is_err());
        assert!(validate_movie_titles(&["  ".into()]).is_err());
        let too_many: Vec<String> = (0..11).map(|i| format!("Movie {i}")).collect();
        assert!(validate_movie_titles(&too_many).is_err());
    }
}
