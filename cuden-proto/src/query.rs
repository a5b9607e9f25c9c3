//! Outbound questions.

use std::fmt::{self, Display};
use std::io::{Cursor, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use rand::Rng;

use crate::config::CodecConfig;
use crate::error::{EncodeError, ParseError};
use crate::{Class, Header, Name, RecordType, CLASS_TOP_BIT};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Whether a question asks for a multicast or a unicast response.
///
/// See [RFC 6762, Section 5.4](https://www.rfc-editor.org/rfc/rfc6762#section-5.4).
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum QuestionMode {
    /// "QM" question: answers are multicast to the whole link.
    Multicast,
    /// "QU" question: answers may be sent directly to the asker.
    Unicast,
}

impl QuestionMode {
    /// Maps the `multicast` flag of the named [`ResourceRecordQuery`] constructors to a mode.
    pub fn from_multicast(multicast: bool) -> Self {
        if multicast {
            QuestionMode::Multicast
        } else {
            QuestionMode::Unicast
        }
    }
}

/// One outbound question, i.e. an entry in the question section of an mDNS message.
///
/// Equality and hashing are structural. Whether a record answers a query is decided by
/// [`crate::matches()`] instead, which treats [`RecordType::ANY`] and the name `"*"` as wildcards.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct ResourceRecordQuery {
    pub record_type: RecordType,
    /// The fully qualified name to ask about.
    pub name: Name,
    pub mode: QuestionMode,
}

impl ResourceRecordQuery {
    pub fn new(record_type: RecordType, name: Name, mode: QuestionMode) -> Self {
        Self {
            record_type,
            name,
            mode,
        }
    }

    fn with_multicast(record_type: RecordType, name: Name, multicast: bool) -> Self {
        Self::new(record_type, name, QuestionMode::from_multicast(multicast))
    }

    /// Asks for the IPv4 addresses (`A`) of a host.
    pub fn address_v4(name: Name, multicast: bool) -> Self {
        Self::with_multicast(RecordType::A, name, multicast)
    }

    /// Asks for the IPv6 addresses (`AAAA`) of a host.
    pub fn address_v6(name: Name, multicast: bool) -> Self {
        Self::with_multicast(RecordType::AAAA, name, multicast)
    }

    /// Asks for the instances (`PTR`) of a service type such as `"_cuden._tcp.local"`.
    pub fn service_pointer(name: Name, multicast: bool) -> Self {
        Self::with_multicast(RecordType::PTR, name, multicast)
    }

    /// Asks for the host and port (`SRV`) of a service instance.
    pub fn service(name: Name, multicast: bool) -> Self {
        Self::with_multicast(RecordType::SRV, name, multicast)
    }

    /// Asks for the `TXT` record of a service instance.
    pub fn text(name: Name, multicast: bool) -> Self {
        Self::with_multicast(RecordType::TXT, name, multicast)
    }

    /// Asks for records of every type.
    pub fn any(name: Name, multicast: bool) -> Self {
        Self::with_multicast(RecordType::ANY, name, multicast)
    }

    /// Encodes a complete query packet containing only this question, using the default
    /// [`CodecConfig`].
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::{Name, ResourceRecordQuery};
    ///
    /// let query = ResourceRecordQuery::address_v4(Name::from_utf8("foo.local").unwrap(), false);
    /// let packet = query.encode().unwrap();
    /// assert_eq!(
    ///     packet,
    ///     b"\0\0\0\0\0\x01\0\0\0\0\0\0\x03foo\x05local\0\0\x01\x80\x01",
    /// );
    /// ```
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.encode_with(&CodecConfig::default())
    }

    /// Encodes a complete query packet containing only this question.
    pub fn encode_with(&self, config: &CodecConfig) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        Header::new_query_header(query_msg_id(config), 1, 0).encode_into(&mut buf)?;
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Encodes this question (without a header) into the given writer.
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<(), EncodeError> {
        let qclass = match self.mode {
            QuestionMode::Multicast => Class::IN.encode(),
            QuestionMode::Unicast => Class::IN.encode() | CLASS_TOP_BIT,
        };
        self.name.encode_into(buf)?;
        buf.write_u16::<NetworkEndian>(self.record_type.code())?;
        buf.write_u16::<NetworkEndian>(qclass)?;
        Ok(())
    }

    /// Parses an encoded question from a series of bytes.
    ///
    /// The type code is looked up with [`RecordType::find()`], so unknown codes become
    /// [`RecordType::ANY`].
    pub fn parse(msg: &mut Cursor<&[u8]>) -> Result<Self, ParseError> {
        let name = Name::parse(msg)?;
        let record_type = RecordType::find(msg.read_u16::<NetworkEndian>()?);
        let qclass = msg.read_u16::<NetworkEndian>()?;
        Class::parse(qclass & !CLASS_TOP_BIT)?;
        let mode = if qclass & CLASS_TOP_BIT != 0 {
            QuestionMode::Unicast
        } else {
            QuestionMode::Multicast
        };

        Ok(Self {
            record_type,
            name,
            mode,
        })
    }
}

/// The message ID to use for a query, see [`CodecConfig::legacy_unicast`].
pub(crate) fn query_msg_id(config: &CodecConfig) -> u16 {
    if config.legacy_unicast {
        rand::thread_rng().gen()
    } else {
        0
    }
}

impl Display for ResourceRecordQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            QuestionMode::Multicast => "QM",
            QuestionMode::Unicast => "QU",
        };
        write!(
            f,
            "mDNS Question for '{}' (type: {}, {})",
            self.name, self.record_type, mode
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::config::CodecConfig;
    use crate::{Header, Name, RecordType};

    use super::{QuestionMode, ResourceRecordQuery};

    fn name(s: &str) -> Name {
        Name::from_utf8(s).unwrap()
    }

    #[test]
    fn named_constructors_fix_type_and_mode() {
        let cases = [
            (ResourceRecordQuery::address_v4(name("a.local"), true), RecordType::A),
            (ResourceRecordQuery::address_v6(name("a.local"), true), RecordType::AAAA),
            (ResourceRecordQuery::service_pointer(name("_cuden._tcp.local"), true), RecordType::PTR),
            (ResourceRecordQuery::service(name("a._cuden._tcp.local"), true), RecordType::SRV),
            (ResourceRecordQuery::text(name("a._cuden._tcp.local"), true), RecordType::TXT),
            (ResourceRecordQuery::any(name("a.local"), true), RecordType::ANY),
        ];
        for (query, rtype) in cases {
            assert_eq!(query.record_type, rtype);
            assert_eq!(query.mode, QuestionMode::Multicast);
        }
        assert_eq!(
            ResourceRecordQuery::text(name("a.local"), false).mode,
            QuestionMode::Unicast
        );
    }

    #[test]
    fn question_round_trip() {
        for multicast in [true, false] {
            let query = ResourceRecordQuery::service_pointer(name("_cuden._tcp.local"), multicast);
            let mut buf = Vec::new();
            query.encode_into(&mut buf).unwrap();
            let parsed = ResourceRecordQuery::parse(&mut Cursor::new(&buf[..])).unwrap();
            assert_eq!(parsed, query);
        }
    }

    #[test]
    fn multicast_query_has_zero_id() {
        let query = ResourceRecordQuery::any(name("foo.local"), true);
        let packet = query.encode().unwrap();
        let header = Header::parse(&mut Cursor::new(&packet[..])).unwrap();
        assert_eq!(header.msg_id, 0);
        assert!(!header.qr);
        assert_eq!(header.qdcount, 1);
    }

    #[test]
    fn legacy_unicast_query_ids_vary() {
        let config = CodecConfig {
            legacy_unicast: true,
            ..Default::default()
        };
        let query = ResourceRecordQuery::any(name("foo.local"), false);
        let ids: Vec<_> = (0..16)
            .map(|_| {
                let packet = query.encode_with(&config).unwrap();
                u16::from_be_bytes([packet[0], packet[1]])
            })
            .collect();
        assert!(ids.iter().any(|id| *id != ids[0]));
    }
}
