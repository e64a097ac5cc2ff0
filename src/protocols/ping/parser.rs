//! Ping/pong payload parser.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::PayloadError;

/// Prefix of every ping payload.
pub const PING_PREFIX: &str = "ping=";

/// Prefix of every pong payload.
pub const PONG_PREFIX: &str = "pong=";

/// Extract the token from a `ping=<token>` payload.
pub fn parse_ping(data: &[u8]) -> Result<&[u8], PayloadError> {
    strip(data, PING_PREFIX)
}

/// Extract the token from a `pong=<token>` payload.
pub fn parse_pong(data: &[u8]) -> Result<&[u8], PayloadError> {
    strip(data, PONG_PREFIX)
}

/// Format a `ping=<token>` payload.
pub fn ping(token: &[u8]) -> Bytes {
    format(PING_PREFIX, token)
}

/// Format a `pong=<token>` payload.
pub fn pong(token: &[u8]) -> Bytes {
    format(PONG_PREFIX, token)
}

fn strip<'a>(data: &'a [u8], prefix: &'static str) -> Result<&'a [u8], PayloadError> {
    data.strip_prefix(prefix.as_bytes())
        .ok_or_else(|| PayloadError::missing_prefix(prefix, data))
}

fn format(prefix: &str, token: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(prefix.len() + token.len());
    buf.put_slice(prefix.as_bytes());
    buf.put_slice(token);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ping() {
        assert_eq!(parse_ping(b"ping=42").unwrap(), b"42");
        assert_eq!(parse_ping(b"ping=a=b c").unwrap(), b"a=b c");
    }

    #[test]
    fn test_parse_empty_token() {
        assert_eq!(parse_ping(b"ping=").unwrap(), b"");
    }

    #[test]
    fn test_parse_missing_prefix() {
        match parse_ping(b"PING=42") {
            Err(PayloadError::MissingPrefix { expected, found }) => {
                assert_eq!(expected, PING_PREFIX);
                assert_eq!(found, "PING=42");
            }
            other => panic!("unexpected: {:?}", other),
        }

        assert!(parse_ping(b"").is_err());
        assert!(parse_ping(b"ping").is_err());
    }

    #[test]
    fn test_parse_pong_rejects_ping() {
        assert!(parse_pong(b"ping=1").is_err());
        assert_eq!(parse_pong(b"pong=1").unwrap(), b"1");
    }

    #[test]
    fn test_format() {
        assert_eq!(&ping(b"7")[..], b"ping=7");
        assert_eq!(&pong(b"hello")[..], b"pong=hello");
        assert_eq!(&pong(b"")[..], b"pong=");
    }

    #[test]
    fn test_non_utf8_token_is_preserved() {
        let token = [0xff, 0x00, 0xfe];
        let request = ping(&token);
        let parsed = parse_ping(&request).unwrap();
        assert_eq!(&pong(parsed)[5..], &token);
    }
}
