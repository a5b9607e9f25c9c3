//! Custom error type definitions.

use thiserror::Error;

use crate::RecordType;

/// High-level errors.
#[derive(Debug, Error)]
pub enum CudenError {
    #[error("Invalid address length: must be 4 (IPv4) or 16 (IPv6) bytes, got {0}.")]
    InvalidAddressLength(usize),

    #[error("Type {0} has a dedicated RDATA struct and cannot be held as opaque data.")]
    DedicatedRecordType(RecordType),

    #[error("Error during parsing.")]
    Parsing(#[from] ParseError),

    #[error("Error during encoding.")]
    Encoding(#[from] EncodeError),
}

/// Errors that may arise during parsing.
///
/// Every variant means the input was malformed; the datagram it came from should be dropped.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid class: valid are 1, 3, 4, 254 or 255, got {0}.")]
    InvalidClass(u16),

    #[error("Invalid name length: must be smaller than 256, is {0}.")]
    NameTooLong(usize),

    #[error("Invalid label length in name: must be smaller than 64, is {0}.")]
    LabelTooLong(usize),

    #[error("Invalid name: contains an empty label.")]
    EmptyLabel,

    #[error("Invalid label type: must be 192 (i.e. pointer) or 0, is {0}.")]
    InvalidLabelType(u8),

    #[error("Compression pointer to offset {pointer} does not point before the label at {position}.")]
    InvalidPointer { pointer: u16, position: u64 },

    #[error("RDATA of {rdlength} bytes at offset {position} runs past the end of the message.")]
    RdataOutOfBounds { position: u64, rdlength: u16 },

    #[error("RDATA length mismatch for {rtype}: RDLENGTH is {rdlength}, but {consumed} bytes were parsed.")]
    RdataLengthMismatch {
        rtype: RecordType,
        rdlength: u16,
        consumed: u64,
    },

    #[error("Invalid address RDATA length for {0}: got {1} bytes.")]
    InvalidAddressLength(RecordType, u16),

    #[error("Invalid UTF-8 in message.")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Unexpected end of message.")]
    IoError(#[from] std::io::Error),
}

/// Errors that may arise during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Domain name too long: allowed are up to 255 bytes, got {0}.")]
    DomainTooLong(usize),

    #[error("String too long for its length prefix: allowed are up to 255 bytes, got {0}.")]
    StringTooLong(usize),

    #[error("RDATA too long: allowed are up to 65535 bytes, got {0}.")]
    RdataTooLong(usize),

    #[error("Too many entries in a message section: allowed are up to 65535, got {0}.")]
    TooManyEntries(usize),

    #[error("Invalid key in opaque record data: {0:?}.")]
    InvalidOpaqueKey(String),

    #[error("IO error.")]
    IoError(#[from] std::io::Error),
}
