//! Correlating received records with outstanding queries.
//!
//! The relation implemented here treats [`RecordType::ANY`] and the name `"*"` as wildcards. It
//! is reflexive and symmetric but not transitive (`ANY` matches both `A` and `AAAA`, which do not
//! match each other), so it is deliberately not the `Eq` impl of any type: scan the pending queries
//! with [`matches()`] instead of using it as a map key.

use crate::query::{QuestionMode, ResourceRecordQuery};
use crate::record::ResourceRecord;
use crate::{Name, RecordType};

/// Anything that has a type and a name to be matched on: queries and records.
pub trait Matchable {
    fn record_type(&self) -> RecordType;

    fn name(&self) -> &Name;

    /// Only questions have a mode; records return [`None`].
    fn question_mode(&self) -> Option<QuestionMode> {
        None
    }
}

impl Matchable for ResourceRecordQuery {
    fn record_type(&self) -> RecordType {
        self.record_type
    }

    fn name(&self) -> &Name {
        &self.name
    }

    fn question_mode(&self) -> Option<QuestionMode> {
        Some(self.mode)
    }
}

impl Matchable for ResourceRecord {
    fn record_type(&self) -> RecordType {
        self.rdata.rtype()
    }

    fn name(&self) -> &Name {
        &self.name
    }
}

/// Returns true iff `a` and `b` match on both the type and the name axis:
/// - types match if they are equal or either is [`RecordType::ANY`],
/// - names match if they are equal or either is the wildcard name `"*"` (see
///   [`Name::wildcard()`]).
///
/// If both sides are questions, their [`QuestionMode`]s must be equal as well.
///
/// # Examples
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use cuden_proto::{matches, Name, ResourceRecord, ResourceRecordQuery};
///
/// let until = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
/// let foo = Name::from_utf8("foo.local").unwrap();
/// let txt = ResourceRecord::text(foo.clone(), until, "hello");
///
/// assert!(matches(&ResourceRecordQuery::any(Name::wildcard(), true), &txt));
/// assert!(matches(&ResourceRecordQuery::text(foo.clone(), true), &txt));
/// assert!(!matches(&ResourceRecordQuery::address_v4(foo, true), &txt));
/// ```
pub fn matches<A, B>(a: &A, b: &B) -> bool
where
    A: Matchable + ?Sized,
    B: Matchable + ?Sized,
{
    let (a_type, b_type) = (a.record_type(), b.record_type());
    let types_match = a_type == RecordType::ANY || b_type == RecordType::ANY || a_type == b_type;

    let (a_name, b_name) = (a.name(), b.name());
    let names_match = a_name.is_wildcard() || b_name.is_wildcard() || a_name == b_name;

    let modes_match = match (a.question_mode(), b.question_mode()) {
        (Some(a_mode), Some(b_mode)) => a_mode == b_mode,
        _ => true,
    };

    types_match && names_match && modes_match
}

impl ResourceRecordQuery {
    /// Returns true iff `record` answers this query, see [`matches()`].
    pub fn is_answered_by(&self, record: &ResourceRecord) -> bool {
        matches(self, record)
    }
}
