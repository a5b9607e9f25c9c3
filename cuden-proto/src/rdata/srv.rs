//! `SRV` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};

use crate::config::Framing;
use crate::error::{EncodeError, ParseError};
use crate::name::Name;

use super::{encode_character_string_into, parse_character_string, RdataTrait};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record which specifies the location of the server(s) for a specific protocol and domain.
/// [\[RFC 2782\]](https://www.rfc-editor.org/rfc/rfc2782)
///
/// The name this record is for is a service instance name such as
/// `"Living Room._cuden._tcp.local"`; the record says which host and port the instance is
/// reachable at.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct SRV {
    /// The priority of this target host. A client MUST attempt to contact the target host with the
    /// lowest-numbered priority it can reach; target hosts with the same priority SHOULD be tried
    /// in an order defined by [`Self::weight`].
    pub priority: u16,
    /// A relative weight for entries with the same priority. Larger weights SHOULD be given a
    /// proportionately higher probability of being selected.
    pub weight: u16,
    /// The port on this target host of this service.
    pub port: u16,
    /// The domain name of the target host.
    pub target: Name,
}

impl SRV {
    pub fn new(target: Name, port: u16, priority: u16, weight: u16) -> Self {
        Self {
            priority,
            weight,
            port,
            target,
        }
    }
}

impl RdataTrait for SRV {
    fn parse_rdata(
        rdata: &mut Cursor<&[u8]>,
        _rtype: u16,
        _rdlength: u16,
        framing: Framing,
    ) -> Result<Self, ParseError> {
        let priority = rdata.read_u16::<NetworkEndian>()?;
        let weight = rdata.read_u16::<NetworkEndian>()?;
        let port = rdata.read_u16::<NetworkEndian>()?;
        let target = match framing {
            Framing::Compact => {
                let (target, _) = parse_character_string(rdata)?;
                Name::from_utf8(String::from_utf8(target)?)?
            }
            // RFC 2782 forbids compressing the target, but mDNS responders do it anyway
            // (RFC 6762, Section 18.14)
            Framing::Rfc1035 => Name::parse(rdata)?,
        };
        Ok(Self {
            priority,
            weight,
            port,
            target,
        })
    }

    fn encode_rdata_into(&self, buf: &mut impl Write, framing: Framing) -> Result<u16, EncodeError> {
        buf.write_u16::<NetworkEndian>(self.priority)?;
        buf.write_u16::<NetworkEndian>(self.weight)?;
        buf.write_u16::<NetworkEndian>(self.port)?;
        let target_len = match framing {
            Framing::Compact => encode_character_string_into(self.target.to_string(), buf)?,
            Framing::Rfc1035 => self.target.encode_into(buf)?,
        };
        Ok(target_len + 2 + 2 + 2)
    }
}

impl Display for SRV {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}
