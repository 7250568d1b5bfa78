//! Caller-supplied API credential handling.
//!
//! The credential lives in process memory for the duration of the session.
//! It is never logged and never persisted; `Debug` and `Display` are
//! redacted so it cannot leak through error messages or tracing events.

use std::fmt;

use thiserror::Error;

/// Expected credential prefix for the completion service.
pub const CREDENTIAL_PREFIX: &str = "sk-";

/// Expected overall credential length, prefix included.
pub const CREDENTIAL_LEN: usize = 164;

/// A format-validated API credential.
///
/// Construction through [`ApiCredential::parse`] is the only way to obtain
/// one, so holding an `ApiCredential` proves the shape check passed. The
/// service itself still verifies the credential on first use.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Validate the candidate's shape: `sk-` prefix and exact length.
    ///
    /// Surrounding whitespace is trimmed before the check. The check is
    /// local only; a well-formed credential may still be rejected by the
    /// service.
    pub fn parse(candidate: &str) -> Result<Self, CredentialError> {
        let candidate = candidate.trim();

        if !candidate.starts_with(CREDENTIAL_PREFIX) {
            return Err(CredentialError::InvalidFormat {
                reason: "missing 'sk-' prefix",
            });
        }
        if candidate.chars().count() != CREDENTIAL_LEN {
            return Err(CredentialError::InvalidFormat {
                reason: "unexpected length",
            });
        }

        Ok(Self(candidate.to_string()))
    }

    /// The raw secret, for building the authorization header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(redacted)")
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sk-...")
    }
}

/// Errors from local credential validation.
///
/// Non-fatal: the interactive surface warns and re-prompts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("invalid credential format: {reason}")]
    InvalidFormat { reason: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed() -> String {
        format!("sk-{}", "a".repeat(CREDENTIAL_LEN - CREDENTIAL_PREFIX.len()))
    }

    #[test]
    fn accepts_well_formed_credential() {
        let raw = well_formed();
        let credential = ApiCredential::parse(&raw).unwrap();
        assert_eq!(credential.expose(), raw);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let raw = well_formed();
        let credential = ApiCredential::parse(&format!("  {raw}\n")).unwrap();
        assert_eq!(credential.expose(), raw);
    }

    #[test]
    fn rejects_missing_prefix() {
        let raw = format!("pk-{}", "a".repeat(CREDENTIAL_LEN - 3));
        let err = ApiCredential::parse(&raw).unwrap_err();
        assert_eq!(
            err,
            CredentialError::InvalidFormat {
                reason: "missing 'sk-' prefix"
            }
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let err = ApiCredential::parse("sk-short").unwrap_err();
        assert_eq!(
            err,
            CredentialError::InvalidFormat {
                reason: "unexpected length"
            }
        );
    }

    #[test]
    fn rejects_empty_input() {
        assert!(ApiCredential::parse("").is_err());
        assert!(ApiCredential::parse("   ").is_err());
    }

    #[test]
    fn debug_and_display_are_redacted() {
        let credential = ApiCredential::parse(&well_formed()).unwrap();
        let debug = format!("{credential:?}");
        let display = format!("{credential}");
        assert!(!debug.contains(&well_formed()));
        assert!(!display.contains(&well_formed()));
        assert_eq!(debug, "ApiCredential(redacted)");
    }
}
