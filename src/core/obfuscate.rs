// src/core/obfuscate.rs

//! Reversible obfuscation for stored credentials.
//!
//! Persisted connection files must never carry a secret in plaintext, but the
//! secret has to be recoverable to hand it to the child process. Tokens are the
//! [`CREDENTIAL_MARKER`] followed by the lowercase hex encoding of the
//! plaintext bytes, which makes them trivially distinguishable from anything a
//! user would type into a password field.

use crate::constants::CREDENTIAL_MARKER;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ObfuscateError {
    #[error("Credential token carries the obfuscation marker but is not valid hex.")]
    MalformedToken(#[from] hex::FromHexError),
    #[error("Credential token did not decode to valid UTF-8.")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Produces an obfuscated token for `plaintext`.
///
/// An absent value yields the empty string rather than an error, so callers
/// can pipe optional fields straight through.
pub fn encrypt(plaintext: Option<&str>) -> String {
    match plaintext {
        Some(value) => format!("{}{}", CREDENTIAL_MARKER, hex::encode(value)),
        None => String::new(),
    }
}

/// Recovers the plaintext behind a token produced by [`encrypt`].
///
/// A value without the marker is returned unchanged: configuration loaders
/// route every stored secret through here, and legacy files may still hold
/// plaintext.
pub fn decrypt(token: &str) -> Result<String, ObfuscateError> {
    match token.strip_prefix(CREDENTIAL_MARKER) {
        Some(payload) => {
            let bytes = hex::decode(payload)?;
            Ok(String::from_utf8(bytes)?)
        }
        None => Ok(token.to_string()),
    }
}

/// Heuristic check for values loaded from persisted configuration. Callers
/// must consult this before calling [`encrypt`] on a stored value, or an
/// already-obfuscated secret would be wrapped twice.
pub fn looks_encrypted(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    match value.strip_prefix(CREDENTIAL_MARKER) {
        Some(payload) => payload.len() % 2 == 0 && payload.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plaintext() {
        let token = encrypt(Some("hello"));
        assert!(looks_encrypted(Some(&token)));
        assert_eq!(decrypt(&token).unwrap(), "hello");
    }

    #[test]
    fn round_trips_the_empty_string() {
        let token = encrypt(Some(""));
        assert!(looks_encrypted(Some(&token)));
        assert_eq!(decrypt(&token).unwrap(), "");
    }

    #[test]
    fn absent_plaintext_yields_the_empty_token() {
        assert_eq!(encrypt(None), "");
        assert!(!looks_encrypted(None));
    }

    #[test]
    fn plaintext_does_not_look_encrypted() {
        assert!(!looks_encrypted(Some("swordfish")));
        assert!(!looks_encrypted(Some("")));
        // Marker with an odd-length or non-hex payload is not one of ours.
        assert!(!looks_encrypted(Some("enc:abc")));
        assert!(!looks_encrypted(Some("enc:zz")));
    }

    #[test]
    fn decrypt_passes_unmarked_values_through() {
        assert_eq!(decrypt("swordfish").unwrap(), "swordfish");
        assert_eq!(decrypt("").unwrap(), "");
    }

    #[test]
    fn decrypt_rejects_a_marked_but_malformed_token() {
        assert!(matches!(
            decrypt("enc:zz"),
            Err(ObfuscateError::MalformedToken(_))
        ));
    }

    #[test]
    fn tokens_survive_non_ascii_plaintext() {
        let token = encrypt(Some("pässwörd £"));
        assert_eq!(decrypt(&token).unwrap(), "pässwörd £");
    }
}
