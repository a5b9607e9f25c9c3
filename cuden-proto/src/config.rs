//! Codec configuration.

#[cfg(feature = "serde")]
use serde::Serialize;

/// How names and text are framed inside RDATA.
///
/// The address payload and the numeric SRV fields are identical in both framings; they differ for
/// the name in [`PTR`](crate::rdata::PTR) and [`SRV`](crate::rdata::SRV) records and for the text
/// in [`TXT`](crate::rdata::TXT) records.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum Framing {
    /// The framing cuden peers speak to each other:
    /// - `PTR`: the bytes of the dotted name, no length bytes.
    /// - `SRV`: priority, weight and port, then one length byte followed by the dotted target.
    /// - `TXT`: the raw bytes of the text.
    #[default]
    Compact,
    /// Standard framing as in [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035) and
    /// [RFC 6763](https://www.rfc-editor.org/rfc/rfc6763): names as label sequences (compression
    /// is followed when parsing) and text as a sequence of character strings.
    Rfc1035,
}

/// Settings shared by all encode and decode operations.
///
/// # Examples
/// ```rust
/// use cuden_proto::{CodecConfig, Framing};
///
/// let config = CodecConfig {
///     framing: Framing::Rfc1035,
///     ..Default::default()
/// };
/// assert!(!config.legacy_unicast);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct CodecConfig {
    /// RDATA framing, see [`Framing`].
    pub framing: Framing,
    /// Queries are sent as one-shot legacy unicast queries
    /// ([RFC 6762, Section 6.7](https://www.rfc-editor.org/rfc/rfc6762#section-6.7)) and get a
    /// random message ID. Otherwise the message ID is zero, as required for multicast queries
    /// ([RFC 6762, Section 18.1](https://www.rfc-editor.org/rfc/rfc6762#section-18.1)).
    pub legacy_unicast: bool,
}
