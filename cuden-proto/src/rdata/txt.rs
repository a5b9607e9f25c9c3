//! `TXT` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Write};

use crate::config::Framing;
use crate::error::{EncodeError, ParseError};

use super::{
    encode_character_string_into, parse_character_string, rdata_len, read_rdata_bytes, RdataTrait,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// The longest chunk a single character string can hold.
const MAX_CHUNK_LEN: usize = 255;

/// A record containing text. [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
///
/// The text is kept as one string. With [`Framing::Rfc1035`] it is split into character strings
/// of at most 255 bytes on the wire, and the character strings of a received record are joined
/// back together.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct TXT {
    pub text: String,
}

impl TXT {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl RdataTrait for TXT {
    fn parse_rdata(
        rdata: &mut Cursor<&[u8]>,
        _rtype: u16,
        rdlength: u16,
        framing: Framing,
    ) -> Result<Self, ParseError> {
        let bytes = match framing {
            Framing::Compact => read_rdata_bytes(rdata, rdlength)?,
            Framing::Rfc1035 => {
                let rdlength = rdlength as usize;
                let mut bytes = Vec::with_capacity(rdlength);
                let mut bytes_read = 0;
                while bytes_read < rdlength {
                    let (chunk, len) = parse_character_string(rdata)?;
                    bytes_read += len; // also count the length byte before the actual string
                    bytes.extend_from_slice(&chunk);
                }
                bytes
            }
        };
        Ok(Self {
            text: String::from_utf8(bytes)?,
        })
    }

    fn encode_rdata_into(&self, buf: &mut impl Write, framing: Framing) -> Result<u16, EncodeError> {
        let text = self.text.as_bytes();
        match framing {
            Framing::Compact => {
                let len = rdata_len(text.len())?;
                buf.write_all(text)?;
                Ok(len)
            }
            // RFC 6763, Section 6.1: an empty TXT record still holds one empty string
            Framing::Rfc1035 if text.is_empty() => encode_character_string_into(text, buf),
            Framing::Rfc1035 => {
                // 256 bytes on the wire per 255 bytes of text
                rdata_len(text.len() + (text.len() + MAX_CHUNK_LEN - 1) / MAX_CHUNK_LEN)?;
                let mut bytes_written = 0;
                for chunk in text.chunks(MAX_CHUNK_LEN) {
                    bytes_written += encode_character_string_into(chunk, buf)?;
                }
                Ok(bytes_written)
            }
        }
    }
}

impl Display for TXT {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // backslashes first, so the quotes' escapes are not doubled
        let escaped = self.text.replace('\\', "\\\\").replace('"', "\\\"");
        write!(f, "\"{}\"", escaped)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::config::Framing;
    use crate::error::ParseError;
    use crate::rdata::RdataTrait;

    use super::TXT;

    fn reparse(payload: &[u8], framing: Framing) -> Result<TXT, ParseError> {
        TXT::parse_rdata(
            &mut Cursor::new(payload),
            16,
            payload.len() as u16,
            framing,
        )
    }

    #[test]
    fn compact_payload_is_unframed() {
        let txt = TXT::new("multiline text string");
        let payload = txt.encode(Framing::Compact).unwrap();
        assert_eq!(payload, b"multiline text string");
        assert_eq!(reparse(&payload, Framing::Compact).unwrap(), txt);
    }

    #[test]
    fn rfc1035_splits_long_text() {
        let txt = TXT::new("é".repeat(200));
        let payload = txt.encode(Framing::Rfc1035).unwrap();
        // 400 bytes of text in chunks of 255 and 145
        assert_eq!(payload.len(), 402);
        assert_eq!(payload[0], 255);
        assert_eq!(payload[256], 145);
        assert_eq!(reparse(&payload, Framing::Rfc1035).unwrap(), txt);
    }

    #[test]
    fn rfc1035_empty_text() {
        let txt = TXT::new("");
        let payload = txt.encode(Framing::Rfc1035).unwrap();
        assert_eq!(payload, [0]);
        assert_eq!(reparse(&payload, Framing::Rfc1035).unwrap(), txt);
    }

    #[test]
    fn display_escapes_backslashes_and_quotes() {
        assert_eq!(TXT::new(r#"say "hi""#).to_string(), r#""say \"hi\"""#);
        assert_eq!(TXT::new(r"a\b").to_string(), r#""a\\b""#);
        // a trailing backslash must not escape the closing quote
        assert_eq!(TXT::new(r"end\").to_string(), r#""end\\""#);
        assert_ne!(TXT::new(r#"\""#).to_string(), TXT::new(r#"""#).to_string());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            reparse(&[0xff, 0xfe], Framing::Compact),
            Err(ParseError::InvalidUtf8(_))
        ));
    }
}
