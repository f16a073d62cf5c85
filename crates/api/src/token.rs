// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Reversible encoding of identifiers (usernames, emails, team names) into
//! URL-path-safe tokens carried across stage redirects.
//!
//! These tokens are plain data, not credentials: every stage re-validates
//! the decoded values against the database before acting on them. The
//! encoding exists purely so arbitrary text, including multi-byte
//! characters, survives a round trip through a path segment.

use base64::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Token payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Percent-escape `value`, then wrap the result in URL-safe base64.
pub fn encode(value: &str) -> String {
    BASE64_URL_SAFE.encode(urlencoding::encode(value).as_bytes())
}

/// Exact inverse of [`encode`]. Malformed tokens fail loudly; decoding
/// never truncates or substitutes characters.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let escaped = String::from_utf8(BASE64_URL_SAFE.decode(token)?)?;
    Ok(urlencoding::decode(&escaped)?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_ascii() {
        let value = "alice";
        assert_eq!(decode(&encode(value)).unwrap(), value);
    }

    #[test]
    fn test_round_trip_email() {
        let value = "a+test@x.com";
        assert_eq!(decode(&encode(value)).unwrap(), value);
    }

    #[test]
    fn test_round_trip_cyrillic() {
        let value = "Знатоки Казани";
        assert_eq!(decode(&encode(value)).unwrap(), value);
    }

    #[test]
    fn test_round_trip_printable_unicode() {
        for value in ["čaj & sympatia", "团队名称", "a/b?c#d%e", " ", "日本語🚀"] {
            assert_eq!(decode(&encode(value)).unwrap(), value, "value {value:?}");
        }
    }

    #[test]
    fn test_token_is_path_safe() {
        let token = encode("прив ет/мир?+&#");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')),
            "token {token:?} contains characters unsafe for a path segment"
        );
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(matches!(decode("not!base64"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_decode_rejects_non_utf8_payload() {
        let token = BASE64_URL_SAFE.encode([0xff, 0xfe, 0x80]);
        assert!(matches!(decode(&token), Err(DecodeError::Utf8(_))));
    }
}
