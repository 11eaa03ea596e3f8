//! Wire protocol for search requests
//!
//! One request per connection:
//! - Client sends the query as raw UTF-8 bytes (at most `max_payload` bytes)
//! - Server answers with one ASCII verdict and closes the connection
//!
//! Verdicts: `STRING EXISTS`, `STRING NOT EXIST`, `SERVER ERROR`, `ERROR: <detail>`

use std::fmt;

pub const EXISTS: &str = "STRING EXISTS";
pub const NOT_EXIST: &str = "STRING NOT EXIST";
pub const SERVER_ERROR: &str = "SERVER ERROR";
const INVALID_PREFIX: &str = "ERROR: ";

/// Outcome of validating a raw request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Trimmed, non-empty query text
    Valid(String),
    /// Nothing left after stripping padding and whitespace
    Empty,
    /// More bytes arrived than the configured limit
    Oversized { limit: usize },
    /// Bytes are not UTF-8
    Malformed(String),
}

/// Validate a payload received in a buffer of up to `limit + 1` bytes.
///
/// Trailing NUL padding is stripped before decoding, then surrounding
/// whitespace is trimmed.
pub fn validate_payload(bytes: &[u8], limit: usize) -> Payload {
    if bytes.len() > limit {
        return Payload::Oversized { limit };
    }

    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    match std::str::from_utf8(&bytes[..end]) {
        Ok(text) => {
            let query = text.trim();
            if query.is_empty() {
                Payload::Empty
            } else {
                Payload::Valid(query.to_string())
            }
        }
        Err(e) => Payload::Malformed(format!("payload is not valid UTF-8 ({})", e)),
    }
}

/// The single response sent for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Exists,
    NotExist,
    ServerError,
    /// Payload rejected before searching, with a client-safe detail
    InvalidPayload(String),
}

impl Verdict {
    pub fn from_found(found: bool) -> Self {
        if found { Verdict::Exists } else { Verdict::NotExist }
    }

    /// Text written to the socket
    pub fn as_wire(&self) -> String {
        match self {
            Verdict::Exists => EXISTS.to_string(),
            Verdict::NotExist => NOT_EXIST.to_string(),
            Verdict::ServerError => SERVER_ERROR.to_string(),
            Verdict::InvalidPayload(detail) => format!("{}{}", INVALID_PREFIX, detail),
        }
    }

    /// Parse a response received from the server
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            EXISTS => Some(Verdict::Exists),
            NOT_EXIST => Some(Verdict::NotExist),
            SERVER_ERROR => Some(Verdict::ServerError),
            other => other
                .strip_prefix(INVALID_PREFIX)
                .map(|detail| Verdict::InvalidPayload(detail.to_string())),
        }
    }

    /// HTTP-style status tag used in logs
    pub fn status_tag(&self) -> &'static str {
        match self {
            Verdict::Exists => "200:OK",
            Verdict::NotExist => "404:NOT FOUND",
            Verdict::ServerError => "500:SERVER ERROR",
            Verdict::InvalidPayload(_) => "400:BAD REQUEST",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_payload_is_trimmed() {
        assert_eq!(
            validate_payload(b"  20;0;11;21;0;18;3;0;\n", 1024),
            Payload::Valid("20;0;11;21;0;18;3;0;".to_string())
        );
    }

    #[test]
    fn test_empty_and_whitespace_payload() {
        assert_eq!(validate_payload(b"", 1024), Payload::Empty);
        assert_eq!(validate_payload(b" \r\n\t", 1024), Payload::Empty);
        assert_eq!(validate_payload(b"\0\0\0", 1024), Payload::Empty);
    }

    #[test]
    fn test_nul_padding_is_stripped() {
        assert_eq!(
            validate_payload(b"abc\n\0\0\0\0", 1024),
            Payload::Valid("abc".to_string())
        );
    }

    #[test]
    fn test_oversized_payload() {
        assert_eq!(validate_payload(b"abcde", 4), Payload::Oversized { limit: 4 });
        assert_eq!(validate_payload(b"abcd", 4), Payload::Valid("abcd".to_string()));
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            validate_payload(b"ab\xffcd", 1024),
            Payload::Malformed(_)
        ));
    }

    #[test]
    fn test_verdict_wire_text() {
        assert_eq!(Verdict::Exists.as_wire(), "STRING EXISTS");
        assert_eq!(Verdict::NotExist.as_wire(), "STRING NOT EXIST");
        assert_eq!(Verdict::ServerError.as_wire(), "SERVER ERROR");
        assert_eq!(
            Verdict::InvalidPayload("too big".into()).as_wire(),
            "ERROR: too big"
        );
    }

    #[test]
    fn test_verdict_parse() {
        assert_eq!(Verdict::parse("STRING EXISTS"), Some(Verdict::Exists));
        assert_eq!(Verdict::parse("STRING NOT EXIST\n"), Some(Verdict::NotExist));
        assert_eq!(Verdict::parse("SERVER ERROR"), Some(Verdict::ServerError));
        assert_eq!(
            Verdict::parse("ERROR: bad"),
            Some(Verdict::InvalidPayload("bad".into()))
        );
        assert_eq!(Verdict::parse("HELLO"), None);
    }
}
