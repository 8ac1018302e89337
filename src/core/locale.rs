//! Syntactic BCP-47 (RFC 5646) validation of locale codes.

use std::sync::LazyLock;

use regex::Regex;

use super::error::{AuditError, Result};

static LANGTAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:",
        // language, optionally with up to three extlang subtags
        r"(?:[a-z]{2,3}(?:-[a-z]{3}){0,3}|[a-z]{4,8})",
        // script
        r"(?:-[a-z]{4})?",
        // region
        r"(?:-(?:[a-z]{2}|[0-9]{3}))?",
        // variants
        r"(?:-(?:[a-z0-9]{5,8}|[0-9][a-z0-9]{3}))*",
        // extensions
        r"(?:-[0-9a-wy-z](?:-[a-z0-9]{2,8})+)*",
        // private use suffix
        r"(?:-x(?:-[a-z0-9]{1,8})+)?",
        r"|x(?:-[a-z0-9]{1,8})+",
        r")$",
    ))
    .expect("langtag regex is valid")
});

/// Returns true if `code` is a syntactically well-formed BCP-47 tag.
pub fn is_valid_locale(code: &str) -> bool {
    LANGTAG_REGEX.is_match(code)
}

/// Validate a locale code, failing with `AuditError::InvalidLocale`.
pub fn validate_locale(code: &str) -> Result<()> {
    if is_valid_locale(code) {
        Ok(())
    } else {
        Err(AuditError::InvalidLocale(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tags() {
        for tag in [
            "en",
            "ru",
            "es-MX",
            "zh-Hans",
            "zh-Hant-TW",
            "pt-BR",
            "es-419",
            "sr-Latn-RS",
            "de-CH-1996",
            "en-US-x-twain",
            "x-whatever",
            "zh-yue",
            "EN-us",
        ] {
            assert!(is_valid_locale(tag), "{} should be valid", tag);
        }
    }

    #[test]
    fn test_invalid_tags() {
        for tag in [
            "", "xx-??", "e", "en_US", "en-", "-en", "en--US", "123", "en-U",
        ] {
            assert!(!is_valid_locale(tag), "{} should be invalid", tag);
        }
    }

    #[test]
    fn test_validate_locale_error() {
        let err = validate_locale("xx-??").unwrap_err();
        assert!(matches!(err, AuditError::InvalidLocale(ref code) if code == "xx-??"));
    }
}
