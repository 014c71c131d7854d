/// Input validators
/// 1. Email format and length for registration and profile updates
/// 2. Chirp body length and the profanity filter

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_LOCAL_PART_LENGTH: usize = 64;
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSORED: &str = "****";

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address, returning it trimmed.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    let local_part_too_long = trimmed
        .split_once('@')
        .is_some_and(|(local, _)| local.len() > MAX_LOCAL_PART_LENGTH);

    if local_part_too_long || !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Checks the chirp length limit and censors profane words.
///
/// Length is counted in characters. Only whole space-separated words are
/// censored, case-insensitively; a word with punctuation attached is left
/// alone.
pub fn clean_chirp_body(body: &str) -> Result<String, ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyField("chirp".to_string()));
    }

    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH));
    }

    let cleaned = body
        .split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert_eq!(is_valid_email("a@b.com").unwrap(), "a@b.com");
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
        assert_eq!(is_valid_email("  padded@example.com ").unwrap(), "padded@example.com");
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert_eq!(
            is_valid_email(""),
            Err(ValidationError::EmptyField("email".to_string()))
        );
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(is_valid_email(&too_long), Err(ValidationError::TooLong(_, _))));

        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(is_valid_email(&long_local).is_err());
    }

    #[test]
    fn test_clean_chirp_replaces_profanity() {
        assert_eq!(
            clean_chirp_body("I had something interesting for breakfast").unwrap(),
            "I had something interesting for breakfast"
        );
        assert_eq!(
            clean_chirp_body("I hear Mastodon is better than Chirpy. sharbert I need to migrate").unwrap(),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(
            clean_chirp_body("I really need a kerfuffle to go to bed sooner, Fornax !").unwrap(),
            "I really need a **** to go to bed sooner, **** !"
        );
    }

    #[test]
    fn test_clean_chirp_keeps_punctuated_words() {
        assert_eq!(clean_chirp_body("Sharbert!").unwrap(), "Sharbert!");
    }

    #[test]
    fn test_chirp_length_limit() {
        assert!(clean_chirp_body(&"a".repeat(MAX_CHIRP_LENGTH)).is_ok());
        assert_eq!(
            clean_chirp_body(&"a".repeat(MAX_CHIRP_LENGTH + 1)),
            Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH))
        );
        // counted in characters, not bytes
        assert!(clean_chirp_body(&"é".repeat(MAX_CHIRP_LENGTH)).is_ok());
    }

    #[test]
    fn test_empty_chirp() {
        assert!(clean_chirp_body("   ").is_err());
    }
}
