//! RDATA definition for every type without a dedicated struct.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{Cursor, Write};

use data_encoding::HEXUPPER;

use crate::config::Framing;
use crate::error::{CudenError, EncodeError, ParseError};
use crate::RecordType;

use super::{encode_character_string_into, rdata_len, read_rdata_bytes, RdataTrait};

#[cfg(feature = "serde")]
use serde::Serialize;

/// The key under which [`Opaque::data`] holds RDATA that is not made of `key=value` strings.
///
/// Borrowed from the generic RDATA notation of [RFC 3597](https://www.rfc-editor.org/rfc/rfc3597).
pub const RAW_KEY: &str = "\\#";

/// RDATA of a type cuden has no dedicated struct for.
///
/// The payload is a key-value map. On the wire each entry is one character string `key=value`,
/// the way DNS-SD encodes attributes
/// ([RFC 6763, Section 6](https://www.rfc-editor.org/rfc/rfc6763#section-6)). RDATA that does not
/// have this shape is kept verbatim under [`RAW_KEY`] and written back unchanged, so any record
/// survives a parse/encode cycle.
///
/// Each payload has exactly one representation: bytes that read as `key=value` strings (including
/// no bytes at all) are always held as entries, never under [`RAW_KEY`]. [`Opaque::raw()`]
/// enforces this, as does parsing. A payload assembled by hand with [`RAW_KEY`] next to other
/// keys is rejected when encoding.
///
/// The types that have a dedicated struct (`A`, `AAAA`, `PTR`, `SRV` and `TXT`) cannot be held
/// in an `Opaque`, because they would be decoded into that struct again.
///
/// # Examples
/// ```rust
/// use cuden_proto::config::Framing;
/// use cuden_proto::rdata::{Opaque, RdataTrait};
///
/// let raw = Opaque::raw(47, vec![0xc0, 0x0c, 0x00, 0x01, 0x40]).unwrap();
/// assert_eq!(raw.encode(Framing::Compact).unwrap(), vec![0xc0, 0x0c, 0x00, 0x01, 0x40]);
///
/// let mut kv = Opaque::new(65280).unwrap();
/// kv.data.insert("path".into(), b"/status".to_vec());
/// assert_eq!(kv.encode(Framing::Compact).unwrap(), b"\x0cpath=/status");
///
/// assert!(Opaque::new(16).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Opaque {
    /// The type code exactly as received, even if [`RecordType`] has no entry for it.
    pub rtype: u16,
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Opaque {
    /// Creates an `Opaque` with an empty payload.
    ///
    /// Returns an error if `rtype` is the code of a type with a dedicated struct.
    pub fn new(rtype: u16) -> Result<Self, CudenError> {
        Self::check_rtype(rtype)?;
        Ok(Self {
            rtype,
            data: BTreeMap::new(),
        })
    }

    /// Creates an `Opaque` from encoded RDATA. The bytes are kept verbatim under [`RAW_KEY`],
    /// unless they read as `key=value` strings; then they are split into entries, exactly as
    /// parsing them would.
    ///
    /// Returns an error if `rtype` is the code of a type with a dedicated struct.
    pub fn raw(rtype: u16, rdata: Vec<u8>) -> Result<Self, CudenError> {
        Self::check_rtype(rtype)?;
        Ok(Self::from_rdata(rtype, rdata))
    }

    fn from_rdata(rtype: u16, rdata: Vec<u8>) -> Self {
        let data = match Self::parse_entries(&rdata) {
            Some(data) => data,
            None => {
                let mut data = BTreeMap::new();
                data.insert(RAW_KEY.to_string(), rdata);
                data
            }
        };
        Self { rtype, data }
    }

    fn check_rtype(rtype: u16) -> Result<(), CudenError> {
        match RecordType::lookup(rtype) {
            Some(
                dedicated @ (RecordType::A
                | RecordType::AAAA
                | RecordType::PTR
                | RecordType::SRV
                | RecordType::TXT),
            ) => Err(CudenError::DedicatedRecordType(dedicated)),
            _ => Ok(()),
        }
    }

    /// Returns the verbatim RDATA if this `Opaque` holds it, see [`RAW_KEY`].
    pub fn raw_rdata(&self) -> Option<&[u8]> {
        match self.data.len() {
            1 => self.data.get(RAW_KEY).map(Vec::as_slice),
            _ => None,
        }
    }

    /// The [`RecordType`] for [`Self::rtype`]; [`RecordType::ANY`] if the code is not known.
    pub fn rtype(&self) -> RecordType {
        RecordType::lookup(self.rtype).unwrap_or(RecordType::ANY)
    }

    /// Parses RDATA as a sequence of unique `key=value` character strings. Returns [`None`] if
    /// it is not exactly that.
    fn parse_entries(mut rdata: &[u8]) -> Option<BTreeMap<String, Vec<u8>>> {
        let mut data = BTreeMap::new();
        while let Some((&len, rest)) = rdata.split_first() {
            let len = len as usize;
            if rest.len() < len {
                return None;
            }
            let (entry, rest) = rest.split_at(len);
            let separator = entry.iter().position(|&b| b == b'=')?;
            let key = std::str::from_utf8(&entry[..separator]).ok()?;
            if !Self::is_valid_key(key) || data.contains_key(key) {
                return None;
            }
            data.insert(key.to_string(), entry[separator + 1..].to_vec());
            rdata = rest;
        }
        Some(data)
    }

    fn is_valid_key(key: &str) -> bool {
        !key.is_empty() && key != RAW_KEY && !key.contains('=')
    }
}

impl RdataTrait for Opaque {
    fn parse_rdata(
        rdata: &mut Cursor<&[u8]>,
        rtype: u16,
        rdlength: u16,
        _framing: Framing,
    ) -> Result<Self, ParseError> {
        let bytes = read_rdata_bytes(rdata, rdlength)?;
        Ok(Self::from_rdata(rtype, bytes))
    }

    fn encode_rdata_into(&self, buf: &mut impl Write, _framing: Framing) -> Result<u16, EncodeError> {
        if let Some(raw) = self.raw_rdata() {
            let len = rdata_len(raw.len())?;
            buf.write_all(raw)?;
            return Ok(len);
        }

        let mut bytes_written = 0usize;
        for (key, value) in &self.data {
            if !Self::is_valid_key(key) {
                return Err(EncodeError::InvalidOpaqueKey(key.clone()));
            }
            let mut entry = Vec::with_capacity(key.len() + 1 + value.len());
            entry.extend_from_slice(key.as_bytes());
            entry.push(b'=');
            entry.extend_from_slice(value);
            bytes_written += encode_character_string_into(entry, buf)? as usize;
        }
        rdata_len(bytes_written)
    }
}

impl Display for Opaque {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(raw) = self.raw_rdata() {
            return write!(f, "\\# {} {}", raw.len(), HEXUPPER.encode(raw));
        }
        let entries: Vec<_> = self
            .data
            .iter()
            .map(|(key, value)| format!("\"{}={}\"", key, String::from_utf8_lossy(value)))
            .collect();
        write!(f, "{}", entries.join(" "))
    }
}
