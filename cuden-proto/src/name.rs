//! Definition and implementation of the [`Name`] type.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Read, Write};
use std::str::FromStr;

use byteorder::{ReadBytesExt, WriteBytesExt};
use smartstring::{LazyCompact, SmartString};

use crate::error::{EncodeError, ParseError};

#[cfg(feature = "serde")]
use serde::Serialize;

type Label = SmartString<LazyCompact>;

/// The longest a name may be in its wire form, including length bytes and the root label.
pub const MAX_NAME_LEN: usize = 255;

/// The longest a single label may be.
pub const MAX_LABEL_LEN: usize = 63;

/// A DNS domain name.
///
/// Multicast DNS allows arbitrary UTF-8 in labels (e.g. service instance names such as
/// `"Living Room._ipp._tcp.local"`), so the only restrictions are the ones imposed by the wire
/// format: no empty labels, at most 63 bytes per label and at most 255 bytes overall.
///
/// Comparison, ordering and hashing ignore ASCII case, as they do in DNS. Ordering is the
/// canonical ordering defined in [RFC 4034, Section 6.1](https://www.rfc-editor.org/rfc/rfc4034#section-6.1).
///
/// The string representation omits the trailing dot. The only exception is the DNS root's name,
/// which is represented as `"."`.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Eq, Clone, Debug)]
pub struct Name {
    // does not contain the root label, as that would be the empty string
    labels: VecDeque<Label>,
}

impl Name {
    /// Returns a `Name` representing the DNS root (`"."`).
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::Name;
    ///
    /// assert_eq!(Name::from_utf8(".").ok(), Some(Name::root()));
    /// ```
    pub fn root() -> Self {
        Self {
            labels: VecDeque::new(),
        }
    }

    /// Returns the wildcard name, consisting of the single label `"*"`.
    ///
    /// A query or record with this name matches every other name, see [`crate::matches()`].
    pub fn wildcard() -> Self {
        let mut labels = VecDeque::with_capacity(1);
        labels.push_back("*".into());
        Self { labels }
    }

    /// Parses a `Name` in wire format from the given cursor, following compression pointers.
    ///
    /// `msg` must wrap the complete message, as compression pointers are offsets from its start.
    /// Every pointer must jump to an offset strictly before everything read for this name so far,
    /// so pointer loops are rejected instead of followed forever.
    ///
    /// # Examples
    /// ```rust
    /// use std::io::Cursor;
    /// use cuden_proto::Name;
    ///
    /// // "_ipp._tcp.local" followed by "printer" + a pointer to offset 0
    /// let bytes = b"\x04_ipp\x04_tcp\x05local\0\x07printer\xc0\x00";
    /// let mut cursor = Cursor::new(&bytes[..]);
    /// assert_eq!(Name::parse(&mut cursor).unwrap(), Name::from_utf8("_ipp._tcp.local").unwrap());
    /// assert_eq!(
    ///     Name::parse(&mut cursor).unwrap(),
    ///     Name::from_utf8("printer._ipp._tcp.local").unwrap(),
    /// );
    /// assert_eq!(cursor.position(), bytes.len() as u64);
    ///
    /// // a pointer to itself
    /// let mut cursor = Cursor::new(&b"\x01a\xc0\x00"[..]);
    /// assert!(Name::parse(&mut cursor).is_err());
    /// ```
    pub fn parse(msg: &mut Cursor<&[u8]>) -> Result<Self, ParseError> {
        let mut labels: VecDeque<Label> = VecDeque::new();
        let mut wire_len = 1; // the root label
        let mut floor = msg.position();
        let mut resume_at = None;

        loop {
            let c = msg.read_u8()?; // length of next label
            match c & 0b1100_0000 {
                0b1100_0000 => {
                    let pointer = (((c & 0b0011_1111) as u16) << 8) + msg.read_u8()? as u16;
                    if pointer as u64 >= floor {
                        return Err(ParseError::InvalidPointer {
                            pointer,
                            position: floor,
                        });
                    }
                    // only the first pointer decides where the name ends in the message
                    resume_at.get_or_insert(msg.position());
                    floor = pointer as u64;
                    msg.set_position(floor);
                }
                0 if c == 0 => break,
                0 => {
                    wire_len += 1 + c as usize;
                    if wire_len > MAX_NAME_LEN {
                        return Err(ParseError::NameTooLong(wire_len));
                    }
                    let mut label = vec![0; c as usize];
                    msg.read_exact(&mut label)?;
                    labels.push_back(String::from_utf8(label)?.into());
                }
                _ => return Err(ParseError::InvalidLabelType(c)),
            }
        }

        if let Some(position) = resume_at {
            msg.set_position(position);
        }
        Ok(Name { labels })
    }

    /// Constructs a `Name` from its dotted string form.
    ///
    /// Rules:
    /// - Labels may contain any characters except `.`, but must not be empty.
    /// - Every label must be at most 63 bytes long, and the whole name at most 255 bytes in wire
    ///   format.
    /// - A trailing dot is allowed, but not necessary. `""` and `"."` are the DNS root.
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::Name;
    ///
    /// assert_eq!(Name::from_utf8("").ok(), Some(Name::root()));
    /// assert!(Name::from_utf8("_cuden._tcp.local").is_ok());
    /// assert!(Name::from_utf8("Küche._cuden._tcp.local.").is_ok());
    ///
    /// assert!(Name::from_utf8("a..local").is_err());
    /// assert!(Name::from_utf8(".local").is_err());
    /// assert!(Name::from_utf8("a".repeat(64)).is_err());
    /// ```
    pub fn from_utf8(name: impl AsRef<str>) -> Result<Self, ParseError> {
        let name = name.as_ref();

        // without this special case, we would later return `Err(EmptyLabel)`, because splitting "."
        // on '.' gives two empty labels
        if name.is_empty() || name == "." {
            return Ok(Self::root());
        }

        let name = name.strip_suffix('.').unwrap_or(name);
        let mut labels: VecDeque<Label> = VecDeque::new();
        let mut wire_len = 1;
        for label in name.split('.') {
            if label.is_empty() {
                return Err(ParseError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(ParseError::LabelTooLong(label.len()));
            }
            wire_len += 1 + label.len();
            labels.push_back(label.into());
        }
        if wire_len > MAX_NAME_LEN {
            return Err(ParseError::NameTooLong(wire_len));
        }

        Ok(Name { labels })
    }

    /// Encodes this name in wire format into the given buffer. Does not use message compression.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::Name;
    ///
    /// let mut buf = Vec::new();
    /// let name = Name::from_utf8("foo.local").unwrap();
    /// name.encode_into(&mut buf).ok();
    /// assert_eq!(buf, b"\x03foo\x05local\0");
    /// ```
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<u16, EncodeError> {
        let wire_len = self.wire_len();
        if wire_len > MAX_NAME_LEN {
            return Err(EncodeError::DomainTooLong(wire_len));
        }
        for label in &self.labels {
            buf.write_u8(label.len() as u8)?;
            buf.write_all(label.as_bytes())?;
        }
        buf.write_u8(0)?;
        Ok(wire_len as u16)
    }

    /// Returns the length of this name in wire format.
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::Name;
    ///
    /// assert_eq!(Name::root().wire_len(), 1);
    /// assert_eq!(Name::from_utf8("foo.local").unwrap().wire_len(), 11);
    /// ```
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|label| 1 + label.len()).sum::<usize>() + 1
    }

    /// Returns the number of labels, not counting the root label.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns an iterator over the labels, most specific first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.as_str())
    }

    /// Returns true iff this `Name` represents the DNS root (`"."`).
    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns true iff this `Name` is the wildcard name `"*"`.
    ///
    /// # Examples
    /// ```rust
    /// use cuden_proto::Name;
    ///
    /// assert!(Name::wildcard().is_wildcard());
    /// assert!(Name::from_utf8("*").unwrap().is_wildcard());
    /// assert!(!Name::from_utf8("*.local").unwrap().is_wildcard());
    /// ```
    pub fn is_wildcard(&self) -> bool {
        self.labels.len() == 1 && self.labels[0].as_str() == "*"
    }
}

impl FromStr for Name {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::from_utf8(s)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // must agree with `Eq`, which ignores ASCII case
        state.write_usize(self.labels.len());
        for label in &self.labels {
            for b in label.bytes() {
                state.write_u8(b.to_ascii_lowercase());
            }
            state.write_u8(b'.');
        }
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// This implements canonical ordering, as defined in
/// [RFC 4034, Section 6.1](https://www.rfc-editor.org/rfc/rfc4034#section-6.1): names are sorted
/// by their most significant (rightmost) label first, labels are compared as octet strings with
/// uppercase ASCII letters treated as lowercase.
///
/// # Examples
/// ```rust
/// use cuden_proto::Name;
///
/// let names_sorted: Vec<_> = [
///     "local",
///     "_tcp.local",
///     "_cuden._tcp.local",
///     "a._cuden._TCP.local",
///     "B._cuden._tcp.local",
///     "foo.local",
/// ]
/// .into_iter()
/// .map(|n| Name::from_utf8(n).unwrap())
/// .collect();
///
/// let mut names = names_sorted.clone();
/// names.reverse();
/// names.swap(1, 3);
/// names.sort();
///
/// assert_eq!(names, names_sorted);
/// ```
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        let self_lbls = self.labels.iter().rev();
        let other_lbls = other.labels.iter().rev();

        for (self_lbl, other_lbl) in self_lbls.zip(other_lbls) {
            let self_lbl = self_lbl.bytes().map(|b| b.to_ascii_lowercase());
            let other_lbl = other_lbl.bytes().map(|b| b.to_ascii_lowercase());
            match self_lbl.cmp(other_lbl) {
                Ordering::Equal => (),
                unequal => return unequal,
            }
        }

        // all shared labels are equal, so the shorter name sorts first
        self.labels.len().cmp(&other.labels.len())
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            let last_index = self.labels.len() - 1;
            for (i, label) in self.labels.iter().enumerate() {
                if i != last_index {
                    write!(f, "{}.", label)?;
                } else {
                    write!(f, "{}", label)?;
                }
            }
            Ok(())
        }
    }
}
