//! The [`ResourceRecord`] type.

use std::fmt::{self, Display};
use std::io::{Cursor, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Duration, Utc};

use crate::config::Framing;
use crate::error::{EncodeError, ParseError};
use crate::rdata::{rdata_len, Address, Opaque, Rdata, PTR, SRV, TXT};
use crate::{Class, Name, RecordType, CLASS_TOP_BIT};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A resource record, i.e. an entry in the answer, authority or additional section of an mDNS
/// message.
///
/// Instead of a TTL, a record carries the instant it stops being valid. A cache may use a record
/// as long as [`Self::is_valid_at()`] holds; this crate never checks that itself.
///
/// Equality and hashing cover the name, the expiry and the RDATA (which includes the type), so two
/// equal records are interchangeable for caching and deduplication.
///
/// On the wire, the expiry is a TTL in whole seconds. A record only comes back from an
/// encode/decode cycle with an equal `valid_until` if that lies a whole number of seconds after
/// the instant it was encoded at; otherwise the decoded expiry is earlier by the fraction of a
/// second that was cut off.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct ResourceRecord {
    /// The [`Name`] that this record is for.
    pub name: Name,
    /// The instant after which this record must no longer be used.
    pub valid_until: DateTime<Utc>,
    pub rdata: Rdata,
}

impl ResourceRecord {
    pub fn new(name: Name, valid_until: DateTime<Utc>, rdata: impl Into<Rdata>) -> Self {
        Self {
            name,
            valid_until,
            rdata: rdata.into(),
        }
    }

    /// Creates a record that is valid for `ttl` seconds after `received_at`.
    pub fn with_ttl(
        name: Name,
        received_at: DateTime<Utc>,
        ttl: u32,
        rdata: impl Into<Rdata>,
    ) -> Self {
        let valid_until = received_at
            .checked_add_signed(Duration::seconds(ttl as i64))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(name, valid_until, rdata)
    }

    /// Creates an `A` or `AAAA` record from raw address bytes, see [`Address::from_bytes()`].
    pub fn address(
        name: Name,
        valid_until: DateTime<Utc>,
        address: &[u8],
    ) -> Result<Self, crate::error::CudenError> {
        Ok(Self::new(name, valid_until, Address::from_bytes(address)?))
    }

    /// Creates a `PTR` record.
    pub fn pointer(name: Name, valid_until: DateTime<Utc>, domain_name: Name) -> Self {
        Self::new(name, valid_until, PTR::new(domain_name))
    }

    /// Creates an `SRV` record.
    pub fn service(
        name: Name,
        valid_until: DateTime<Utc>,
        target: Name,
        port: u16,
        priority: u16,
        weight: u16,
    ) -> Self {
        Self::new(name, valid_until, SRV::new(target, port, priority, weight))
    }

    /// Creates a `TXT` record.
    pub fn text(name: Name, valid_until: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self::new(name, valid_until, TXT::new(text))
    }

    /// Creates a record of any other type, see [`Opaque`].
    pub fn opaque(name: Name, valid_until: DateTime<Utc>, opaque: Opaque) -> Self {
        Self::new(name, valid_until, opaque)
    }

    /// The type of this record, derived from its RDATA.
    pub fn record_type(&self) -> RecordType {
        self.rdata.rtype()
    }

    /// [`Self::valid_until`] as milliseconds since the Unix epoch.
    pub fn valid_until_millis(&self) -> i64 {
        self.valid_until.timestamp_millis()
    }

    /// Returns true iff the record may still be used at `now`, i.e. `valid_until` lies strictly
    /// after `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until > now
    }

    /// The negation of [`Self::is_valid_at()`].
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_valid_at(now)
    }

    /// The whole seconds left until the record expires, as written to the TTL field. Zero for
    /// expired records, which makes them goodbye records
    /// ([RFC 6762, Section 10.1](https://www.rfc-editor.org/rfc/rfc6762#section-10.1)).
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> u32 {
        let seconds = (self.valid_until - now).num_seconds().max(0);
        u32::try_from(seconds).unwrap_or(u32::MAX)
    }

    /// Encodes the type-specific payload (RDATA) of this record with [`Framing::Compact`].
    pub fn encode_response_payload(&self) -> Result<Vec<u8>, EncodeError> {
        self.encode_response_payload_with(Framing::default())
    }

    /// Encodes the type-specific payload (RDATA) of this record.
    pub fn encode_response_payload_with(&self, framing: Framing) -> Result<Vec<u8>, EncodeError> {
        self.rdata.encode(framing)
    }

    /// Encodes the complete record into the given writer, with the TTL counted from `now`.
    pub fn encode_into(
        &self,
        buf: &mut impl Write,
        now: DateTime<Utc>,
        framing: Framing,
    ) -> Result<(), EncodeError> {
        let rdata = self.rdata.encode(framing)?;
        self.name.encode_into(buf)?;
        buf.write_u16::<NetworkEndian>(self.rdata.type_code())?;
        buf.write_u16::<NetworkEndian>(Class::IN.encode())?;
        buf.write_u32::<NetworkEndian>(self.remaining_ttl(now))?;
        buf.write_u16::<NetworkEndian>(rdata_len(rdata.len())?)?;
        buf.write_all(&rdata)?;
        Ok(())
    }

    /// Parses an encoded record from a series of bytes.
    ///
    /// `msg` must wrap the complete message, because of name compression. The record is valid
    /// for its TTL counted from `received_at`.
    ///
    /// The mDNS cache-flush bit is masked off the class. `OPT` pseudo-records carry a payload size
    /// in place of the class, so theirs is not checked.
    pub fn parse(
        msg: &mut Cursor<&[u8]>,
        received_at: DateTime<Utc>,
        framing: Framing,
    ) -> Result<Self, ParseError> {
        let name = Name::parse(msg)?;
        let rtype = msg.read_u16::<NetworkEndian>()?;
        let class = msg.read_u16::<NetworkEndian>()?;
        if rtype != RecordType::OPT.code() {
            Class::parse(class & !CLASS_TOP_BIT)?;
        }
        let ttl = msg.read_u32::<NetworkEndian>()?;
        let rdlength = msg.read_u16::<NetworkEndian>()?;

        let position = msg.position();
        let remaining = (msg.get_ref().len() as u64).saturating_sub(position);
        if rdlength as u64 > remaining {
            return Err(ParseError::RdataOutOfBounds { position, rdlength });
        }

        let rdata = Rdata::parse(msg, rtype, rdlength, framing)?;
        let consumed = msg.position() - position;
        if consumed != rdlength as u64 {
            return Err(ParseError::RdataLengthMismatch {
                rtype: RecordType::lookup(rtype).unwrap_or(RecordType::ANY),
                rdlength,
                consumed,
            });
        }

        Ok(Self::with_ttl(name, received_at, ttl, rdata))
    }
}

impl Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.rdata.type_code();
        let rtype = match RecordType::lookup(code) {
            Some(rtype) => rtype.to_string(),
            None => format!("TYPE{}", code),
        };
        write!(
            f,
            "{} {} {} (valid until {})",
            self.name,
            rtype,
            self.rdata,
            self.valid_until.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::Ipv6Addr;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::config::Framing;
    use crate::error::ParseError;
    use crate::rdata::{Opaque, Rdata};
    use crate::{Name, RecordType};

    use super::ResourceRecord;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn name(s: &str) -> Name {
        Name::from_utf8(s).unwrap()
    }

    fn reparse(record: &ResourceRecord, now: DateTime<Utc>, framing: Framing) -> ResourceRecord {
        let mut buf = Vec::new();
        record.encode_into(&mut buf, now, framing).unwrap();
        let mut cursor = Cursor::new(&buf[..]);
        let parsed = ResourceRecord::parse(&mut cursor, now, framing).unwrap();
        assert_eq!(cursor.position(), buf.len() as u64);
        parsed
    }

    #[test]
    fn expiry_is_strict() {
        let record = ResourceRecord::text(name("foo.local"), at(1_000), "x");
        assert!(record.is_valid_at(at(999)));
        assert!(record.is_expired_at(at(1_000)));
        assert!(record.is_expired_at(at(5_000)));
        assert_eq!(record.valid_until_millis(), 1_000);
    }

    #[test]
    fn past_expiry_wins_over_contents() {
        let now = at(1_700_000_000_000);
        let record = ResourceRecord::service(
            name("box._cuden._tcp.local"),
            now - Duration::seconds(1),
            name("box.local"),
            u16::MAX,
            u16::MAX,
            u16::MAX,
        );
        assert!(record.is_expired_at(now));
        assert_eq!(record.remaining_ttl(now), 0);
    }

    #[test]
    fn remaining_ttl_rounds_down() {
        let now = at(1_700_000_000_000);
        let record = ResourceRecord::text(name("foo.local"), now + Duration::milliseconds(4_999), "");
        assert_eq!(record.remaining_ttl(now), 4);
    }

    #[test]
    fn sub_second_expiry_is_cut_off_on_the_wire() {
        let now = at(1_700_000_000_000);
        let until = now + Duration::milliseconds(1_500);
        let record = ResourceRecord::text(name("foo.local"), until, "x");

        let parsed = reparse(&record, now, Framing::Compact);
        assert_ne!(parsed, record);
        assert_eq!(parsed.valid_until, now + Duration::seconds(1));
        assert_eq!(parsed.rdata, record.rdata);
    }

    #[test]
    fn address_type_follows_byte_length() {
        let now = at(0);
        let v4 = ResourceRecord::address(name("foo.local"), now, &[10, 0, 0, 1]).unwrap();
        assert_eq!(v4.record_type(), RecordType::A);

        let v6 = ResourceRecord::address(
            name("foo.local"),
            now,
            &Ipv6Addr::LOCALHOST.octets(),
        )
        .unwrap();
        assert_eq!(v6.record_type(), RecordType::AAAA);

        assert!(ResourceRecord::address(name("foo.local"), now, &[1, 2, 3]).is_err());
    }

    #[test]
    fn records_survive_a_parse_cycle_in_both_framings() {
        let now = at(1_700_000_000_000);
        let until = now + Duration::seconds(4500);
        let records = [
            ResourceRecord::address(name("foo.local"), until, &[192, 168, 7, 9]).unwrap(),
            ResourceRecord::pointer(
                name("_services._dns-sd._udp.local"),
                until,
                name("_cuden._tcp.local"),
            ),
            ResourceRecord::service(
                name("box._cuden._tcp.local"),
                until,
                name("target.test.local"),
                99,
                88,
                77,
            ),
            ResourceRecord::text(name("box._cuden._tcp.local"), until, "multiline text string"),
            ResourceRecord::opaque(
                name("foo.local"),
                until,
                Opaque::raw(65000, vec![1, 2, 3]).unwrap(),
            ),
            ResourceRecord::opaque(
                name("foo.local"),
                until,
                Opaque::raw(65000, b"\x03a=1".to_vec()).unwrap(),
            ),
            ResourceRecord::opaque(name("foo.local"), until, Opaque::raw(65000, vec![]).unwrap()),
        ];
        for framing in [Framing::Compact, Framing::Rfc1035] {
            for record in &records {
                assert_eq!(&reparse(record, now, framing), record);
            }
        }
    }

    #[test]
    fn cache_flush_bit_is_ignored() {
        let now = at(1_700_000_000_000);
        let record = ResourceRecord::text(name("a.local"), now + Duration::seconds(10), "hi");
        let mut buf = Vec::new();
        record.encode_into(&mut buf, now, Framing::Compact).unwrap();
        // class field follows the 9 byte name and the 2 byte type
        buf[11] |= 0x80;

        let parsed = ResourceRecord::parse(&mut Cursor::new(&buf[..]), now, Framing::Compact);
        assert_eq!(parsed.unwrap(), record);
    }

    #[test]
    fn rdlength_past_the_end_is_malformed() {
        let now = at(0);
        let record = ResourceRecord::text(name("a.local"), now, "hello");
        let mut buf = Vec::new();
        record.encode_into(&mut buf, now, Framing::Compact).unwrap();
        buf.truncate(buf.len() - 1);

        assert!(matches!(
            ResourceRecord::parse(&mut Cursor::new(&buf[..]), now, Framing::Compact),
            Err(ParseError::RdataOutOfBounds { rdlength: 5, .. })
        ));
    }

    #[test]
    fn rdlength_shorter_than_payload_is_malformed() {
        let now = at(0);
        let record = ResourceRecord::service(name("a.local"), now, name("b.local"), 1, 2, 3);
        let mut buf = Vec::new();
        record.encode_into(&mut buf, now, Framing::Compact).unwrap();
        // shrink RDLENGTH by one; the SRV target still runs to the end of the buffer
        let rdlength_at = buf.len() - 14 - 2;
        buf[rdlength_at + 1] -= 1;

        assert!(matches!(
            ResourceRecord::parse(&mut Cursor::new(&buf[..]), now, Framing::Compact),
            Err(ParseError::RdataLengthMismatch {
                rtype: RecordType::SRV,
                ..
            })
        ));
    }

    #[test]
    fn opt_class_is_not_validated() {
        // root name, type OPT, UDP payload size 1440 in place of the class, no options
        let buf = b"\0\0\x29\x05\xa0\0\0\0\0\0\0";
        let record =
            ResourceRecord::parse(&mut Cursor::new(&buf[..]), at(0), Framing::Compact).unwrap();
        assert!(record.name.is_root());
        assert_eq!(record.record_type(), RecordType::OPT);
        assert_eq!(record.rdata, Rdata::Opaque(Opaque::new(41).unwrap()));
    }

    #[test]
    fn unknown_type_is_kept_as_opaque() {
        let now = at(0);
        let mut buf = Vec::new();
        buf.extend_from_slice(b"\x01a\x05local\0");
        buf.extend_from_slice(&65000u16.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&30u32.to_be_bytes());
        buf.extend_from_slice(&2u16.to_be_bytes());
        buf.extend_from_slice(&[0xab, 0xcd]);

        let record = ResourceRecord::parse(&mut Cursor::new(&buf[..]), now, Framing::Compact)
            .unwrap();
        assert_eq!(record.record_type(), RecordType::ANY);
        assert_eq!(record.rdata, Rdata::Opaque(Opaque::raw(65000, vec![0xab, 0xcd]).unwrap()));
        assert_eq!(record.to_string().split(' ').nth(1), Some("TYPE65000"));
    }
}
