//! `A` and `AAAA` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::config::Framing;
use crate::error::{CudenError, EncodeError, ParseError};
use crate::RecordType;

use super::RdataTrait;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record containing a host address: `A` for IPv4
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035) and `AAAA` for IPv6
/// [\[RFC 3596\]](https://www.rfc-editor.org/rfc/rfc3596).
///
/// The record type is derived from the address family, so an `Address` can never be an `A` record
/// holding an IPv6 address or vice versa.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub struct Address {
    /// The host's address.
    pub address: IpAddr,
}

impl Address {
    pub fn new(address: impl Into<IpAddr>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Creates an `Address` from raw network-order bytes: 4 bytes give an IPv4 address, 16 bytes
    /// an IPv6 address. Any other length is an error.
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::rdata::Address;
    /// use cuden_proto::RecordType;
    ///
    /// assert_eq!(Address::from_bytes(&[192, 168, 0, 1]).unwrap().rtype(), RecordType::A);
    /// assert_eq!(Address::from_bytes(&[0; 16]).unwrap().rtype(), RecordType::AAAA);
    /// assert!(Address::from_bytes(&[0; 5]).is_err());
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CudenError> {
        if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
            Ok(Self::new(Ipv4Addr::from(octets)))
        } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
            Ok(Self::new(Ipv6Addr::from(octets)))
        } else {
            Err(CudenError::InvalidAddressLength(bytes.len()))
        }
    }

    /// Returns [`RecordType::A`] for IPv4 and [`RecordType::AAAA`] for IPv6 addresses.
    pub fn rtype(&self) -> RecordType {
        match self.address {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::AAAA,
        }
    }

    /// Returns the raw address bytes, as they appear on the wire.
    pub fn octets(&self) -> Vec<u8> {
        match self.address {
            IpAddr::V4(address) => address.octets().to_vec(),
            IpAddr::V6(address) => address.octets().to_vec(),
        }
    }
}

impl RdataTrait for Address {
    fn parse_rdata(
        rdata: &mut Cursor<&[u8]>,
        rtype: u16,
        rdlength: u16,
        _framing: Framing,
    ) -> Result<Self, ParseError> {
        let rtype = RecordType::find(rtype);
        let address = match (rtype, rdlength) {
            (RecordType::A, 4) => {
                let mut octets = [0; 4];
                rdata.read_exact(&mut octets)?;
                IpAddr::from(octets)
            }
            (RecordType::AAAA, 16) => {
                let mut octets = [0; 16];
                rdata.read_exact(&mut octets)?;
                IpAddr::from(octets)
            }
            _ => return Err(ParseError::InvalidAddressLength(rtype, rdlength)),
        };
        Ok(Self { address })
    }

    fn encode_rdata_into(&self, buf: &mut impl Write, _framing: Framing) -> Result<u16, EncodeError> {
        let octets = self.octets();
        buf.write_all(&octets)?;
        // 4 bytes for IPv4, 16 for IPv6
        Ok(octets.len() as u16)
    }
}

impl From<IpAddr> for Address {
    fn from(address: IpAddr) -> Self {
        Self { address }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address)
    }
}
