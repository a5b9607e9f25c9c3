//! Complete mDNS messages.

use std::fmt::{self, Display};
use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};

use crate::config::{CodecConfig, Framing};
use crate::error::{EncodeError, ParseError};
use crate::query::{query_msg_id, ResourceRecordQuery};
use crate::record::ResourceRecord;
use crate::Header;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Represents an mDNS message.
///
/// The header counts are not kept in sync with the sections automatically; see the usage note in
/// the crate documentation.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<ResourceRecordQuery>,
    /// The answer section. In queries, these are the known answers.
    pub answers: Vec<ResourceRecord>,
    pub authoritative_answers: Vec<ResourceRecord>,
    pub additional_answers: Vec<ResourceRecord>,
}

impl Message {
    /// Creates an mDNS query.
    ///
    /// `known_answers` go into the answer section
    /// ([RFC 6762, Section 7.1](https://www.rfc-editor.org/rfc/rfc6762#section-7.1)). The message
    /// ID is chosen according to [`CodecConfig::legacy_unicast`].
    pub fn new_query(
        questions: Vec<ResourceRecordQuery>,
        known_answers: Vec<ResourceRecord>,
        config: &CodecConfig,
    ) -> Self {
        Message {
            header: Header::new_query_header(
                query_msg_id(config),
                section_count(questions.len()),
                section_count(known_answers.len()),
            ),
            questions,
            answers: known_answers,
            authoritative_answers: Vec::new(),
            additional_answers: Vec::new(),
        }
    }

    /// Creates an mDNS response without questions.
    pub fn new_response(answers: Vec<ResourceRecord>, additional: Vec<ResourceRecord>) -> Self {
        Message {
            header: Header::new_response_header([
                0,
                section_count(answers.len()),
                0,
                section_count(additional.len()),
            ]),
            questions: Vec::new(),
            answers,
            authoritative_answers: Vec::new(),
            additional_answers: additional,
        }
    }

    /// Encodes a `Message` with the default [`Framing`]. The TTLs of all records are counted
    /// from `now`.
    pub fn encode(&self, now: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
        self.encode_with(now, Framing::default())
    }

    /// Encodes a `Message` as a series of bytes.
    pub fn encode_with(&self, now: DateTime<Utc>, framing: Framing) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf, now, framing)?;
        Ok(buf)
    }

    /// The same as [`encode_with()`](Self::encode_with()), but encoded bytes are appended to the
    /// given writer instead of to a newly allocated one.
    ///
    /// Returns an error if a section holds more entries than its 16-bit header count can state.
    pub fn encode_into(
        &self,
        buf: &mut impl Write,
        now: DateTime<Utc>,
        framing: Framing,
    ) -> Result<(), EncodeError> {
        let lens = [
            self.questions.len(),
            self.answers.len(),
            self.authoritative_answers.len(),
            self.additional_answers.len(),
        ];
        if let Some(len) = lens.into_iter().find(|len| u16::try_from(*len).is_err()) {
            return Err(EncodeError::TooManyEntries(len));
        }

        self.header.encode_into(buf)?;
        for question in &self.questions {
            question.encode_into(buf)?;
        }
        for record in self.records() {
            record.encode_into(buf, now, framing)?;
        }

        Ok(())
    }

    /// Parses an encoded `Message` from a series of bytes.
    ///
    /// Sections are read in wire order: questions, answers, authority, additional. A set
    /// truncation flag is not an error; the records that are present are returned.
    pub fn parse(
        msg: &mut Cursor<&[u8]>,
        received_at: DateTime<Utc>,
        framing: Framing,
    ) -> Result<Self, ParseError> {
        let header = Header::parse(msg)?;

        // the counts are untrusted, so nothing is allocated up front
        let questions = (0..header.qdcount)
            .map(|_| ResourceRecordQuery::parse(msg))
            .collect::<Result<Vec<_>, _>>()?;
        let answers = Message::parse_records(msg, header.ancount, received_at, framing)?;
        let authoritative_answers =
            Message::parse_records(msg, header.nscount, received_at, framing)?;
        let additional_answers = Message::parse_records(msg, header.arcount, received_at, framing)?;

        Ok(Message {
            header,
            questions,
            answers,
            authoritative_answers,
            additional_answers,
        })
    }

    fn parse_records(
        msg: &mut Cursor<&[u8]>,
        count: u16,
        received_at: DateTime<Utc>,
        framing: Framing,
    ) -> Result<Vec<ResourceRecord>, ParseError> {
        (0..count)
            .map(|_| ResourceRecord::parse(msg, received_at, framing))
            .collect()
    }

    /// Iterates over the answer, authority and additional records, in that order.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(&self.authoritative_answers)
            .chain(&self.additional_answers)
    }

    /// Consumes the message and returns the records of [`records()`](Self::records()).
    pub fn into_records(self) -> Vec<ResourceRecord> {
        let mut records = self.answers;
        records.extend(self.authoritative_answers);
        records.extend(self.additional_answers);
        records
    }
}

/// Header count for a section; sections too long for it are rejected by
/// [`Message::encode_into()`].
fn section_count(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for question in &self.questions {
            writeln!(f, "  {}", question)?;
        }
        for record in self.records() {
            writeln!(f, "  {}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{DateTime, TimeZone, Utc};

    use crate::config::{CodecConfig, Framing};
    use crate::error::{EncodeError, ParseError};
    use crate::query::ResourceRecordQuery;
    use crate::rdata::Opaque;
    use crate::record::ResourceRecord;
    use crate::{decode_packet, encode_query_with_known_answers, Name};

    use super::Message;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn name(s: &str) -> Name {
        Name::from_utf8(s).unwrap()
    }

    #[test]
    fn known_answers_are_carried_in_queries() {
        let query = ResourceRecordQuery::service_pointer(name("_cuden._tcp.local"), true);
        let known = ResourceRecord::with_ttl(
            name("_cuden._tcp.local"),
            now(),
            4500,
            crate::rdata::PTR::new(name("box._cuden._tcp.local")),
        );
        let packet = encode_query_with_known_answers(
            &query,
            &[known.clone()],
            now(),
            &CodecConfig::default(),
        )
        .unwrap();

        let msg = Message::parse(&mut Cursor::new(&packet[..]), now(), Framing::Compact).unwrap();
        assert!(!msg.header.qr);
        assert_eq!(msg.header.msg_id, 0);
        assert_eq!(msg.questions, vec![query]);
        assert_eq!(msg.answers, vec![known]);
    }

    #[test]
    fn sections_are_returned_in_wire_order() {
        let a = ResourceRecord::address(name("box.local"), now(), &[10, 0, 0, 1]).unwrap();
        let txt = ResourceRecord::text(name("box._cuden._tcp.local"), now(), "path=/");
        let srv = ResourceRecord::service(
            name("box._cuden._tcp.local"),
            now(),
            name("box.local"),
            8080,
            0,
            0,
        );
        let mut msg = Message::new_response(vec![srv.clone()], vec![a.clone()]);
        msg.authoritative_answers.push(txt.clone());
        msg.header.nscount = 1;

        let packet = msg.encode(now()).unwrap();
        let records = decode_packet(&packet, now()).unwrap();
        assert_eq!(records, vec![srv, txt, a]);
    }

    #[test]
    fn duplicate_records_are_kept() {
        let txt = ResourceRecord::text(name("foo.local"), now(), "x");
        let packet = Message::new_response(vec![txt.clone(), txt.clone()], vec![])
            .encode(now())
            .unwrap();
        assert_eq!(decode_packet(&packet, now()).unwrap(), vec![txt.clone(), txt]);
    }

    #[test]
    fn expired_records_are_encoded_with_zero_ttl() {
        let txt = ResourceRecord::text(name("foo.local"), now(), "x");
        let later = now() + chrono::Duration::seconds(10);
        let packet = Message::new_response(vec![txt], vec![]).encode(later).unwrap();

        let records = decode_packet(&packet, later).unwrap();
        assert_eq!(records[0].valid_until, later);
        assert!(!records[0].is_valid_at(later));
    }

    #[test]
    fn opaque_records_survive_decode_packet() {
        let until = now() + chrono::Duration::seconds(120);
        let payloads: [&[u8]; 3] = [b"\x03a=1", b"", b"\xc0\x0c\x00\x01\x40"];
        for payload in payloads {
            let opaque = Opaque::raw(65000, payload.to_vec()).unwrap();
            let record = ResourceRecord::opaque(name("foo.local"), until, opaque);
            let packet = Message::new_response(vec![record.clone()], vec![])
                .encode(now())
                .unwrap();
            assert_eq!(decode_packet(&packet, now()).unwrap(), vec![record]);
        }
    }

    #[test]
    fn oversized_sections_are_not_encoded() {
        let query = ResourceRecordQuery::any(name("foo.local"), true);
        let questions = vec![query; u16::MAX as usize + 1];
        let msg = Message::new_query(questions, vec![], &CodecConfig::default());
        assert_eq!(msg.header.qdcount, u16::MAX);

        let mut buf = Vec::new();
        assert!(matches!(
            msg.encode_into(&mut buf, now(), Framing::Compact),
            Err(EncodeError::TooManyEntries(65536))
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn inflated_question_count_fails_without_panicking() {
        // a bare header claiming 65535 questions
        let packet = [0, 0, 0, 0, 0xff, 0xff, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            Message::parse(&mut Cursor::new(&packet[..]), now(), Framing::Compact),
            Err(ParseError::IoError(_))
        ));
    }

    #[test]
    fn framings_round_trip() {
        let ptr = ResourceRecord::pointer(
            name("_cuden._tcp.local"),
            now(),
            name("box._cuden._tcp.local"),
        );
        let msg = Message::new_response(vec![ptr], vec![]);
        for framing in [Framing::Compact, Framing::Rfc1035] {
            let packet = msg.encode_with(now(), framing).unwrap();
            let parsed = Message::parse(&mut Cursor::new(&packet[..]), now(), framing).unwrap();
            assert_eq!(parsed, msg);
        }
    }

    #[test]
    fn display_lists_every_section() {
        let query = ResourceRecordQuery::text(name("foo.local"), false);
        let txt = ResourceRecord::text(name("foo.local"), now(), "x");
        let msg = Message::new_query(vec![query], vec![txt], &CodecConfig::default());
        let shown = msg.to_string();
        assert_eq!(shown.lines().count(), 3);
        assert!(shown.contains("QU"));
    }
}
