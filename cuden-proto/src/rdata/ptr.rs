//! `PTR` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Write};

use crate::config::Framing;
use crate::error::{EncodeError, ParseError};
use crate::name::Name;

use super::{rdata_len, read_rdata_bytes, RdataTrait};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record containing a domain name pointer.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
///
/// In DNS-based service discovery, `PTR` records map a service type (e.g.
/// `"_cuden._tcp.local"`) to the names of its instances.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct PTR {
    /// The name this record points to.
    pub domain_name: Name,
}

impl PTR {
    pub fn new(domain_name: Name) -> Self {
        Self { domain_name }
    }
}

impl RdataTrait for PTR {
    fn parse_rdata(
        rdata: &mut Cursor<&[u8]>,
        _rtype: u16,
        rdlength: u16,
        framing: Framing,
    ) -> Result<Self, ParseError> {
        let domain_name = match framing {
            Framing::Compact => {
                let bytes = read_rdata_bytes(rdata, rdlength)?;
                Name::from_utf8(String::from_utf8(bytes)?)?
            }
            Framing::Rfc1035 => Name::parse(rdata)?,
        };
        Ok(Self { domain_name })
    }

    fn encode_rdata_into(&self, buf: &mut impl Write, framing: Framing) -> Result<u16, EncodeError> {
        match framing {
            Framing::Compact => {
                let name = self.domain_name.to_string();
                buf.write_all(name.as_bytes())?;
                rdata_len(name.len())
            }
            Framing::Rfc1035 => self.domain_name.encode_into(buf),
        }
    }
}

impl Display for PTR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.domain_name)
    }
}
