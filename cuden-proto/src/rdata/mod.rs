//! RDATA type definitions.
//!
//! Every record kind cuden understands has its own struct here; [`Rdata`] is the tagged union of
//! all of them. Types without a dedicated struct end up in [`Opaque`], which keeps the type code
//! as it was received.

use std::fmt::Display;
use std::io::{Cursor, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::config::Framing;
use crate::error::{EncodeError, ParseError};
use crate::RecordType;

#[cfg(feature = "serde")]
use serde::Serialize;

pub mod address;
pub mod opaque;
pub mod ptr;
pub mod srv;
pub mod txt;

pub use address::Address;
pub use opaque::Opaque;
pub use ptr::PTR;
pub use srv::SRV;
pub use txt::TXT;

/// The record data (RDATA) of a [`ResourceRecord`](crate::ResourceRecord).
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Rdata {
    /// `A` or `AAAA`, depending on the address family.
    Address(Address),
    PTR(PTR),
    SRV(SRV),
    TXT(TXT),
    /// Any other type, including ones missing from [`RecordType`].
    Opaque(Opaque),
}

/// A trait for working with the different RDATA variants.
pub trait RdataTrait: Sized + Display {
    /// Parses the RDATA from the encoded bytes, starting at `rdata`'s current position.
    ///
    /// `rdata` is a [`Cursor`] wrapping the complete DNS message that contains the RDATA, as
    /// names may be compressed with pointers into earlier parts of the message.
    ///
    /// `rtype` is the type code of the record and `rdlength` the byte count of the encoded RDATA.
    /// Implementations must consume exactly `rdlength` bytes; the caller checks this.
    fn parse_rdata(
        rdata: &mut Cursor<&[u8]>,
        rtype: u16,
        rdlength: u16,
        framing: Framing,
    ) -> Result<Self, ParseError>;

    /// Encodes the RDATA into the given `buf` and returns the number of written bytes on success.
    ///
    /// If an error is returned, no guarantees for the state of `buf` are given.
    fn encode_rdata_into(&self, buf: &mut impl Write, framing: Framing) -> Result<u16, EncodeError>;

    /// Encodes the RDATA and returns the encoded bytes.
    fn encode(&self, framing: Framing) -> Result<Vec<u8>, EncodeError> {
        let mut rdata = Vec::new();
        self.encode_rdata_into(&mut rdata, framing)?;
        Ok(rdata)
    }
}

#[doc(hidden)]
macro_rules! impl_from_rdata {
    ($variant:ident) => {
        impl From<$variant> for Rdata {
            fn from(rdata: $variant) -> Self {
                Self::$variant(rdata)
            }
        }
    };
}

#[doc(hidden)]
macro_rules! impl_as_rdata {
    ($method:ident, $variant:ident, $doc:expr) => {
        #[doc = "Returns a reference to the inner [`"]
        #[doc = $doc]
        #[doc = "`] when called on the `"]
        #[doc = $doc]
        #[doc = "` variant. For all other variants, returns [`None`]."]
        pub fn $method(&self) -> Option<&$variant> {
            if let Self::$variant(inner) = self {
                Some(inner)
            } else {
                None
            }
        }
    };

    ($method:ident, $variant:ident) => {
        impl_as_rdata!($method, $variant, stringify!($variant));
    };
}

/// Match on every [`Rdata`] variant and evaluate `$arm` with `$inner` bound to the inner value.
macro_rules! match_rdata {
    ($self:ident, $inner:ident, $arm:block) => {
        match $self {
            Rdata::Address($inner) => $arm,
            Rdata::PTR($inner) => $arm,
            Rdata::SRV($inner) => $arm,
            Rdata::TXT($inner) => $arm,
            Rdata::Opaque($inner) => $arm,
        }
    };
}

impl Rdata {
    /// Parses the RDATA of a record with type code `rtype`, choosing the variant via
    /// [`RecordType::find()`]. Types without a dedicated variant become [`Rdata::Opaque`].
    pub fn parse(
        msg: &mut Cursor<&[u8]>,
        rtype: u16,
        rdlength: u16,
        framing: Framing,
    ) -> Result<Self, ParseError> {
        match RecordType::find(rtype) {
            RecordType::A | RecordType::AAAA => {
                Address::parse_rdata(msg, rtype, rdlength, framing).map(Rdata::from)
            }
            RecordType::PTR => PTR::parse_rdata(msg, rtype, rdlength, framing).map(Rdata::from),
            RecordType::SRV => SRV::parse_rdata(msg, rtype, rdlength, framing).map(Rdata::from),
            RecordType::TXT => TXT::parse_rdata(msg, rtype, rdlength, framing).map(Rdata::from),
            _ => Opaque::parse_rdata(msg, rtype, rdlength, framing).map(Rdata::from),
        }
    }

    /// See [`RdataTrait::encode()`].
    pub fn encode(&self, framing: Framing) -> Result<Vec<u8>, EncodeError> {
        match_rdata!(self, rdata, { rdata.encode(framing) })
    }

    /// See [`RdataTrait::encode_rdata_into()`].
    pub fn encode_into(&self, buf: &mut impl Write, framing: Framing) -> Result<u16, EncodeError> {
        match_rdata!(self, rdata, { rdata.encode_rdata_into(buf, framing) })
    }

    /// Returns the [`RecordType`] that matches this RDATA.
    ///
    /// For [`Rdata::Opaque`] with a type code missing from [`RecordType`], this is
    /// [`RecordType::ANY`]; [`Rdata::type_code()`] still has the received code.
    pub fn rtype(&self) -> RecordType {
        match self {
            Rdata::Address(address) => address.rtype(),
            Rdata::PTR(_) => RecordType::PTR,
            Rdata::SRV(_) => RecordType::SRV,
            Rdata::TXT(_) => RecordType::TXT,
            Rdata::Opaque(opaque) => opaque.rtype(),
        }
    }

    /// Returns the numeric type code written to the wire for this RDATA.
    pub fn type_code(&self) -> u16 {
        match self {
            Rdata::Opaque(opaque) => opaque.rtype,
            other => other.rtype().code(),
        }
    }

    impl_as_rdata!(as_address, Address);
    impl_as_rdata!(as_ptr, PTR);
    impl_as_rdata!(as_srv, SRV);
    impl_as_rdata!(as_txt, TXT);
    impl_as_rdata!(as_opaque, Opaque);
}

impl_from_rdata!(Address);
impl_from_rdata!(PTR);
impl_from_rdata!(SRV);
impl_from_rdata!(TXT);
impl_from_rdata!(Opaque);

impl Display for Rdata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match_rdata!(self, rdata, { write!(f, "{}", rdata) })
    }
}

/// Parses a character string as defined in [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035),
/// i.e. reads a length byte and then the number of bytes specified by the length byte.
///
/// Returns the parsed bytes and the number of bytes read.
pub fn parse_character_string(msg: &mut Cursor<&[u8]>) -> Result<(Vec<u8>, usize), ParseError> {
    let length = msg.read_u8()?;
    let mut string = vec![0; length as usize];
    msg.read_exact(&mut string)?;

    // + 1 because we also need to count the length byte
    Ok((string, length as usize + 1))
}

/// Encodes bytes as a character string as defined in
/// [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035), i.e. writes the length as a byte and then
/// the bytes themselves, into the given `buf`.
///
/// Returns the number of bytes written on success, or an error if `string` is longer than 255
/// bytes.
pub fn encode_character_string_into(
    string: impl AsRef<[u8]>,
    buf: &mut impl Write,
) -> Result<u16, EncodeError> {
    let string = string.as_ref();
    let len = u8::try_from(string.len()).map_err(|_| EncodeError::StringTooLong(string.len()))?;
    buf.write_u8(len)?;
    buf.write_all(string)?;
    Ok(1 + len as u16)
}

/// Reads exactly `rdlength` bytes.
pub(crate) fn read_rdata_bytes(
    msg: &mut Cursor<&[u8]>,
    rdlength: u16,
) -> Result<Vec<u8>, ParseError> {
    let mut bytes = vec![0; rdlength as usize];
    msg.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Converts a payload length to the `u16` reported by [`RdataTrait::encode_rdata_into()`].
pub(crate) fn rdata_len(len: usize) -> Result<u16, EncodeError> {
    u16::try_from(len).map_err(|_| EncodeError::RdataTooLong(len))
}
