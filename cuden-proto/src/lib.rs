//! `cuden-proto` provides the resource record data model of cuden's multicast DNS client as well
//! as the means to de-/serialize it from/to the wire format
//! ([RFC 1035](https://www.rfc-editor.org/rfc/rfc1035),
//! [RFC 6762](https://www.rfc-editor.org/rfc/rfc6762)). In simpler terms, you can construct and
//! encode mDNS queries, decode the responses into typed records, and find out which of your
//! outstanding queries a record answers.
//!
//! Sockets, retransmission and caching are not part of this crate; it never reads the clock
//! either. Every operation that deals with record lifetimes takes the current instant as an
//! argument.
//!
//! # Basic usage example
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use cuden_proto::rdata::SRV;
//! use cuden_proto::{decode_packet, encode_query, matches};
//! use cuden_proto::{Message, Name, ResourceRecord, ResourceRecordQuery};
//!
//! let query = ResourceRecordQuery::service(Name::from_utf8("box._cuden._tcp.local").unwrap(), true);
//! let _encoded = encode_query(&query).unwrap();
//!
//! // what a responder might send back
//! let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
//! let record = ResourceRecord::with_ttl(
//!     Name::from_utf8("box._cuden._tcp.local").unwrap(),
//!     now,
//!     120,
//!     SRV::new(Name::from_utf8("box.local").unwrap(), 8080, 0, 0),
//! );
//! let packet = Message::new_response(vec![record.clone()], vec![]).encode(now).unwrap();
//!
//! let records = decode_packet(&packet, now).unwrap();
//! assert_eq!(records, vec![record]);
//! assert!(matches(&query, &records[0]));
//! ```
//!
//! # Usage note
//! Most structs can be constructed directly, without using any `new()` method. This can lead to
//! inconsistencies, e.g. a [`Message`] whose header counts don't match the actual number of
//! records. Prefer the constructors; the library does not force you to use them.

use std::fmt::{self, Display};
use std::io::{Cursor, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::Serialize;
use strum_macros::{EnumIter, EnumString};
use tracing::{debug, trace, warn};

pub mod config;
pub mod error;
pub mod matching;
pub mod message;
pub mod name;
pub mod query;
pub mod rdata;
pub mod record;

use error::{EncodeError, ParseError};

pub use config::{CodecConfig, Framing};
pub use matching::{matches, Matchable};
pub use message::Message;
pub use name::Name;
pub use query::{QuestionMode, ResourceRecordQuery};
pub use rdata::Rdata;
pub use record::ResourceRecord;

/// The top bit of the class field. In questions it requests a unicast response
/// ([RFC 6762, Section 5.4](https://www.rfc-editor.org/rfc/rfc6762#section-5.4)), in answers it is
/// the cache-flush bit ([RFC 6762, Section 10.2](https://www.rfc-editor.org/rfc/rfc6762#section-10.2)).
pub const CLASS_TOP_BIT: u16 = 1 << 15;

/// Declares [`RecordType`] together with its code table, so that the enum and the lookup can never
/// disagree.
macro_rules! record_types {
    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $( $(#[$meta:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$enum_meta])*
        #[repr(u16)]
        pub enum $name {
            $( $(#[$meta])* $variant = $code, )+
        }

        impl $name {
            /// Returns the IANA-assigned type code.
            pub const fn code(self) -> u16 {
                self as u16
            }

            /// Returns the `RecordType` for `code`, or [`None`] if there is none.
            ///
            /// Unlike [`Self::find()`], this does not log anything.
            pub const fn lookup(code: u16) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

record_types! {
    /// Represents a DNS TYPE.
    ///
    /// This is the fixed table of IANA-assigned codes (see
    /// [here](https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4)).
    /// Only `A`, `AAAA`, `PTR`, `SRV` and `TXT` have dedicated RDATA structs in [`rdata`]; records
    /// of all other types are kept as [`rdata::Opaque`].
    ///
    /// [`RecordType::ANY`] doubles as the fallback for codes that are not in the table, see
    /// [`RecordType::find()`].
    #[cfg_attr(feature = "serde", derive(Serialize))]
    #[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, EnumString, EnumIter)]
    #[allow(clippy::upper_case_acronyms)]
    pub enum RecordType {
        A = 1,
        NS = 2,
        MD = 3,
        MF = 4,
        CNAME = 5,
        SOA = 6,
        MB = 7,
        MG = 8,
        MR = 9,
        NULL = 10,
        WKS = 11,
        PTR = 12,
        HINFO = 13,
        MINFO = 14,
        MX = 15,
        TXT = 16,
        RP = 17,
        AFSDB = 18,
        SIG = 24,
        KEY = 25,
        AAAA = 28,
        LOC = 29,
        SRV = 33,
        NAPTR = 35,
        KX = 36,
        CERT = 37,
        DNAME = 39,
        OPT = 41,
        APL = 42,
        DS = 43,
        SSHFP = 44,
        IPSECKEY = 45,
        RRSIG = 46,
        /// Used by mDNS responders to assert that a name has no records of other types
        /// ([RFC 6762, Section 6.1](https://www.rfc-editor.org/rfc/rfc6762#section-6.1)).
        NSEC = 47,
        DNSKEY = 48,
        DHCID = 49,
        NSEC3 = 50,
        NSEC3PARAM = 51,
        TLSA = 52,
        SMIMEA = 53,
        HIP = 55,
        CDS = 59,
        CDNSKEY = 60,
        OPENPGPKEY = 61,
        CSYNC = 62,
        ZONEMD = 63,
        SVCB = 64,
        HTTPS = 65,
        EUI48 = 108,
        EUI64 = 109,
        TKEY = 249,
        TSIG = 250,
        IXFR = 251,
        AXFR = 252,
        /// Matches every type in queries; also stands in for codes missing from this table.
        ANY = 255,
        URI = 256,
        CAA = 257,
        TA = 32768,
        DLV = 32769,
    }
}

impl RecordType {
    /// Returns the `RecordType` for `code`.
    ///
    /// This never fails: codes missing from the table yield [`RecordType::ANY`] and log a warning,
    /// so that unknown data received from the network degrades instead of aborting a decode.
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::RecordType;
    ///
    /// assert_eq!(RecordType::find(33), RecordType::SRV);
    /// assert_eq!(RecordType::find(65000), RecordType::ANY);
    /// ```
    pub fn find(code: u16) -> RecordType {
        Self::lookup(code).unwrap_or_else(|| {
            warn!(code, "Unknown record type code, treating it as ANY.");
            RecordType::ANY
        })
    }
}

impl From<RecordType> for u16 {
    fn from(rtype: RecordType) -> Self {
        rtype.code()
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Represents a DNS CLASS.
///
/// mDNS only ever uses `IN`; the others are included for completeness.
///
/// See [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035) for further information.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Class {
    IN,
    CH,
    HS,
    NONE,
    ANY,
}

impl Class {
    /// Encodes a `Class` as a two-byte value.
    pub fn encode(&self) -> u16 {
        match self {
            Class::IN => 1,
            Class::CH => 3,
            Class::HS => 4,
            Class::NONE => 254,
            Class::ANY => 255,
        }
    }

    /// Parses an encoded `Class` from a two-byte value. The caller has to mask off
    /// [`CLASS_TOP_BIT`] first.
    ///
    /// Returns an error if the given value does not represent a valid DNS CLASS.
    pub fn parse(val: u16) -> Result<Class, ParseError> {
        Ok(match val {
            1 => Class::IN,
            3 => Class::CH,
            4 => Class::HS,
            254 => Class::NONE,
            255 => Class::ANY,
            x => return Err(ParseError::InvalidClass(x)),
        })
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Represents a DNS OpCode.
///
/// mDNS messages always use `QUERY`
/// ([RFC 6762, Section 18.3](https://www.rfc-editor.org/rfc/rfc6762#section-18.3)). Messages with
/// any other opcode, assigned or not, are ignored rather than treated as malformed.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Opcode {
    QUERY,
    IQUERY,
    STATUS,
    NOTIFY,
    UPDATE,
    DSO,
    /// One of the values without an IANA assignment (3, 7 to 15).
    Unassigned(u8),
}

impl Opcode {
    /// Encodes an `Opcode` as a byte.
    pub fn encode(&self) -> u8 {
        match self {
            Opcode::QUERY => 0,
            Opcode::IQUERY => 1,
            Opcode::STATUS => 2,
            Opcode::NOTIFY => 4,
            Opcode::UPDATE => 5,
            Opcode::DSO => 6,
            Opcode::Unassigned(x) => *x & 0b1111,
        }
    }

    /// Parses an encoded `Opcode` from the lower four bits of a byte.
    pub fn parse(val: u8) -> Opcode {
        match val & 0b1111 {
            0 => Opcode::QUERY,
            1 => Opcode::IQUERY,
            2 => Opcode::STATUS,
            4 => Opcode::NOTIFY,
            5 => Opcode::UPDATE,
            6 => Opcode::DSO,
            x => Opcode::Unassigned(x),
        }
    }
}

/// Represents a DNS RCODE, as far as it fits into the header's four bits.
///
/// mDNS responses always carry `NOERROR`
/// ([RFC 6762, Section 18.11](https://www.rfc-editor.org/rfc/rfc6762#section-18.11)).
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum RCode {
    NOERROR,
    FORMERR,
    SERVFAIL,
    NXDOMAIN,
    NOTIMP,
    REFUSED,
    YXDOMAIN,
    YXRRSET,
    NXRRSET,
    NOTAUTH,
    NOTZONE,
    DSOTYPENI,
    /// One of the values without an IANA assignment that fit into four bits (12 to 15).
    Unassigned(u8),
}

impl RCode {
    /// Encodes an `RCode` as a byte (actually only the lower four bits are used).
    pub fn encode(&self) -> u8 {
        match self {
            RCode::NOERROR => 0,
            RCode::FORMERR => 1,
            RCode::SERVFAIL => 2,
            RCode::NXDOMAIN => 3,
            RCode::NOTIMP => 4,
            RCode::REFUSED => 5,
            RCode::YXDOMAIN => 6,
            RCode::YXRRSET => 7,
            RCode::NXRRSET => 8,
            RCode::NOTAUTH => 9,
            RCode::NOTZONE => 10,
            RCode::DSOTYPENI => 11,
            RCode::Unassigned(x) => *x & 0b1111,
        }
    }

    /// Parses an encoded `RCode` from the lower four bits of a byte.
    pub fn parse(val: u8) -> RCode {
        match val & 0b1111 {
            0 => RCode::NOERROR,
            1 => RCode::FORMERR,
            2 => RCode::SERVFAIL,
            3 => RCode::NXDOMAIN,
            4 => RCode::NOTIMP,
            5 => RCode::REFUSED,
            6 => RCode::YXDOMAIN,
            7 => RCode::YXRRSET,
            8 => RCode::NXRRSET,
            9 => RCode::NOTAUTH,
            10 => RCode::NOTZONE,
            11 => RCode::DSOTYPENI,
            x => RCode::Unassigned(x),
        }
    }
}

/// Represents the flags of a [`Header`].
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct HeaderFlags {
    /// Authoritative answer. Set in every mDNS response.
    pub aa: bool,
    /// Truncated. In mDNS queries, this means more known answers follow in another packet
    /// ([RFC 6762, Section 7.2](https://www.rfc-editor.org/rfc/rfc6762#section-7.2)).
    pub tc: bool,
    /// Recursion desired. Zero in mDNS.
    pub rd: bool,
    /// Recursion available. Zero in mDNS.
    pub ra: bool,
}

impl HeaderFlags {
    /// Creates a `HeaderFlags` struct from bitflags as they would appear in the second 16-octet
    /// line of a [`Header`].
    pub fn from_flags(flags: u16) -> Self {
        Self {
            aa: (flags & (1 << 10)) != 0,
            tc: (flags & (1 << 9)) != 0,
            rd: (flags & (1 << 8)) != 0,
            ra: (flags & (1 << 7)) != 0,
        }
    }

    /// Returns a u16 representing bitflags as they would appear in the second 16-octet line of a
    /// [`Header`].
    pub fn as_flags(&self) -> u16 {
        ((self.aa as u16) << 10)
            + ((self.tc as u16) << 9)
            + ((self.rd as u16) << 8)
            + ((self.ra as u16) << 7)
    }
}

/// Represents a DNS header.
///
/// The general format of a header is defined in [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035),
/// the mDNS-specific rules in [RFC 6762, Section 18](https://www.rfc-editor.org/rfc/rfc6762#section-18).
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Header {
    /// Zero for multicast messages, random for legacy unicast queries.
    pub msg_id: u16,
    /// False for queries, true for responses.
    pub qr: bool,
    pub opcode: Opcode,
    pub flags: HeaderFlags,
    /// For queries: [`None`]. For responses: the status code of the responder.
    pub rcode: Option<RCode>,
    /// The number of questions.
    pub qdcount: u16,
    /// The number of answer records (known answers, in queries).
    pub ancount: u16,
    /// The number of authority records.
    pub nscount: u16,
    /// The number of additional records.
    pub arcount: u16,
}

impl Header {
    /// Creates a header for an mDNS query with `qdcount` questions and `ancount` known answers.
    pub fn new_query_header(msg_id: u16, qdcount: u16, ancount: u16) -> Self {
        Header {
            msg_id,
            qr: false,
            opcode: Opcode::QUERY,
            flags: HeaderFlags::default(),
            rcode: None,
            qdcount,
            ancount,
            nscount: 0,
            arcount: 0,
        }
    }

    /// Creates a header for an mDNS response.
    ///
    /// `qdcount`, `ancount`, `nscount` and `arcount` are grouped in that order in the `counts`
    /// parameter.
    pub fn new_response_header(counts: [u16; 4]) -> Self {
        Header {
            msg_id: 0,
            qr: true,
            opcode: Opcode::QUERY,
            flags: HeaderFlags {
                aa: true,
                ..HeaderFlags::default()
            },
            rcode: Some(RCode::NOERROR),
            qdcount: counts[0],
            ancount: counts[1],
            nscount: counts[2],
            arcount: counts[3],
        }
    }

    /// Encodes a `Header` into the given writer.
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<(), EncodeError> {
        let qr = self.qr as u16;
        let opcode = self.opcode.encode() as u16;
        let rcode = self.rcode.map_or(0, |rcode| rcode.encode() as u16);

        let line_two = (qr << 15) + (opcode << 11) + self.flags.as_flags() + rcode;
        buf.write_u16::<NetworkEndian>(self.msg_id)?;
        buf.write_u16::<NetworkEndian>(line_two)?;
        buf.write_u16::<NetworkEndian>(self.qdcount)?;
        buf.write_u16::<NetworkEndian>(self.ancount)?;
        buf.write_u16::<NetworkEndian>(self.nscount)?;
        buf.write_u16::<NetworkEndian>(self.arcount)?;

        Ok(())
    }

    /// Parses an encoded `Header` from a series of bytes.
    pub fn parse(header: &mut Cursor<&[u8]>) -> Result<Self, ParseError> {
        let msg_id = header.read_u16::<NetworkEndian>()?;
        let line_two = header.read_u16::<NetworkEndian>()?;
        let qr = (line_two & (1 << 15)) != 0;
        let opcode = Opcode::parse(((line_two >> 11) & 0b1111) as u8);
        let flags = HeaderFlags::from_flags(line_two & 0b0000_0111_1000_0000);
        let rcode = RCode::parse((line_two & 0b1111) as u8);

        Ok(Header {
            msg_id,
            qr,
            opcode,
            flags,
            rcode: if qr { Some(rcode) } else { None },
            qdcount: header.read_u16::<NetworkEndian>()?,
            ancount: header.read_u16::<NetworkEndian>()?,
            nscount: header.read_u16::<NetworkEndian>()?,
            arcount: header.read_u16::<NetworkEndian>()?,
        })
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.qr { "mDNS Response" } else { "mDNS Query" };
        write!(
            f,
            "{} (id: {}, opcode: {:?}, questions: {}, answers: {}, authority: {}, additional: {})",
            kind,
            self.msg_id,
            self.opcode,
            self.qdcount,
            self.ancount,
            self.nscount,
            self.arcount
        )
    }
}

/// Encodes a complete query packet with `query` as its only question, using the default
/// [`CodecConfig`].
pub fn encode_query(query: &ResourceRecordQuery) -> Result<Vec<u8>, EncodeError> {
    query.encode()
}

/// Encodes a complete query packet with `query` as its only question.
pub fn encode_query_with(
    query: &ResourceRecordQuery,
    config: &CodecConfig,
) -> Result<Vec<u8>, EncodeError> {
    query.encode_with(config)
}

/// Encodes a query packet that also carries the records the sender already knows, so responders
/// can skip them ([RFC 6762, Section 7.1](https://www.rfc-editor.org/rfc/rfc6762#section-7.1)).
///
/// `now` determines the TTLs written for the known answers.
pub fn encode_query_with_known_answers(
    query: &ResourceRecordQuery,
    known_answers: &[ResourceRecord],
    now: DateTime<Utc>,
    config: &CodecConfig,
) -> Result<Vec<u8>, EncodeError> {
    Message::new_query(vec![query.clone()], known_answers.to_vec(), config)
        .encode_with(now, config.framing)
}

/// Decodes a received packet into its records, using the default [`CodecConfig`].
///
/// See [`decode_packet_with()`].
pub fn decode_packet(
    bytes: &[u8],
    received_at: DateTime<Utc>,
) -> Result<Vec<ResourceRecord>, ParseError> {
    decode_packet_with(bytes, received_at, &CodecConfig::default())
}

/// Decodes a received packet into its records.
///
/// The records of the answer, authority and additional sections are returned in the order they
/// appear in the packet, without deduplication. Their [`ResourceRecord::valid_until`] is
/// `received_at` plus their TTL.
///
/// Messages with an opcode other than `QUERY` or a non-zero rcode yield no records, as required
/// by [RFC 6762, Section 18](https://www.rfc-editor.org/rfc/rfc6762#section-18). This includes
/// values without an IANA assignment.
///
/// Returns an error if the packet is malformed. Record types missing from [`RecordType`] are not
/// an error; such records are returned as [`rdata::Opaque`].
pub fn decode_packet_with(
    bytes: &[u8],
    received_at: DateTime<Utc>,
    config: &CodecConfig,
) -> Result<Vec<ResourceRecord>, ParseError> {
    let msg = Message::parse(&mut Cursor::new(bytes), received_at, config.framing)?;

    if msg.header.opcode != Opcode::QUERY {
        debug!(opcode = ?msg.header.opcode, "Ignoring message with non-zero opcode.");
        return Ok(Vec::new());
    }
    if let Some(rcode) = msg.header.rcode.filter(|rcode| *rcode != RCode::NOERROR) {
        debug!(?rcode, "Ignoring message with non-zero rcode.");
        return Ok(Vec::new());
    }

    let records = msg.into_records();
    for record in &records {
        trace!(%record, "Decoded record.");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{TimeZone, Utc};
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn find_is_total() {
        for code in 0..=u16::MAX {
            let rtype = RecordType::find(code);
            if rtype != RecordType::ANY {
                assert_eq!(rtype.code(), code);
            }
        }
    }

    #[test]
    fn every_known_type_maps_back_to_its_code() {
        for rtype in RecordType::iter() {
            assert_eq!(RecordType::find(rtype.code()), rtype);
            assert_eq!(u16::from(rtype), rtype.code());
        }
        assert_eq!(RecordType::DLV.code(), 32769);
    }

    #[test]
    fn unknown_codes_fall_back_to_any() {
        assert_eq!(RecordType::find(65000), RecordType::ANY);
        assert_eq!(RecordType::lookup(65000), None);
        assert_eq!(RecordType::find(0), RecordType::ANY);
    }

    #[test]
    fn record_type_from_str() {
        assert_eq!(RecordType::from_str("PTR").unwrap(), RecordType::PTR);
        assert!(RecordType::from_str("BOGUS").is_err());
    }

    #[test]
    fn header_round_trip_keeps_flags() {
        let mut header = Header::new_response_header([0, 3, 0, 2]);
        header.flags.tc = true;
        let mut buf = Vec::new();
        header.encode_into(&mut buf).unwrap();
        assert_eq!(buf[2], 0b1000_0110);

        let parsed = Header::parse(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn non_zero_rcode_is_ignored() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let record = ResourceRecord::with_ttl(
            Name::from_utf8("foo.local").unwrap(),
            now,
            60,
            rdata::TXT::new("x"),
        );
        let mut msg = Message::new_response(vec![record], vec![]);
        msg.header.rcode = Some(RCode::REFUSED);
        let packet = msg.encode(now).unwrap();

        assert_eq!(decode_packet(&packet, now).unwrap(), vec![]);
    }

    #[test]
    fn unassigned_opcode_and_rcode_are_ignored() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let record = ResourceRecord::with_ttl(
            Name::from_utf8("foo.local").unwrap(),
            now,
            60,
            rdata::TXT::new("x"),
        );
        let packet = Message::new_response(vec![record], vec![])
            .encode(now)
            .unwrap();

        // opcode sits in bits 3 to 6 of the third byte
        let mut opcode_3 = packet.clone();
        opcode_3[2] = (opcode_3[2] & 0b1000_0111) | (3 << 3);
        assert_eq!(decode_packet(&opcode_3, now).unwrap(), vec![]);
        let header = Header::parse(&mut Cursor::new(&opcode_3[..])).unwrap();
        assert_eq!(header.opcode, Opcode::Unassigned(3));

        // rcode sits in the low four bits of the fourth byte
        let mut rcode_12 = packet;
        rcode_12[3] = (rcode_12[3] & 0xf0) | 12;
        assert_eq!(decode_packet(&rcode_12, now).unwrap(), vec![]);
        let header = Header::parse(&mut Cursor::new(&rcode_12[..])).unwrap();
        assert_eq!(header.rcode, Some(RCode::Unassigned(12)));
    }

    #[test]
    fn rcode_bits_of_queries_are_discarded() {
        let query = ResourceRecordQuery::any(Name::from_utf8("foo.local").unwrap(), true);
        let mut packet = encode_query(&query).unwrap();
        packet[3] |= 15;

        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let msg = Message::parse(&mut Cursor::new(&packet[..]), now, Framing::Compact).unwrap();
        assert_eq!(msg.header.rcode, None);
        assert_eq!(msg.questions, vec![query]);
    }

    #[test]
    fn unassigned_values_encode_in_four_bits() {
        let mut header = Header::new_response_header([0, 0, 0, 0]);
        header.opcode = Opcode::Unassigned(7);
        header.rcode = Some(RCode::Unassigned(14));
        let mut buf = Vec::new();
        header.encode_into(&mut buf).unwrap();

        let parsed = Header::parse(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn truncated_packet_is_malformed() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let record = ResourceRecord::with_ttl(
            Name::from_utf8("foo.local").unwrap(),
            now,
            60,
            rdata::TXT::new("some text that gets cut off"),
        );
        let packet = Message::new_response(vec![record], vec![])
            .encode(now)
            .unwrap();

        for len in 0..packet.len() {
            assert!(decode_packet(&packet[..len], now).is_err(), "length {}", len);
        }
    }

    #[test]
    fn answer_count_past_the_end_is_malformed() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let mut header = Header::new_response_header([0, 5, 0, 0]);
        header.ancount = 5;
        let mut packet = Vec::new();
        header.encode_into(&mut packet).unwrap();

        assert!(matches!(
            decode_packet(&packet, now),
            Err(ParseError::IoError(_))
        ));
    }

    #[test]
    fn value_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResourceRecord>();
        assert_send_sync::<ResourceRecordQuery>();
        assert_send_sync::<Message>();
    }
}
