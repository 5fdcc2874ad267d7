//! Core error taxonomy (spec §7), shared by every layer above this crate.

use thiserror::Error;

/// Errors surfaced by the byte/BER/UL primitives, and the root variants that
/// every higher-layer crate wraps via `#[from]`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("bad BER length: leading byte 0x{0:02X} outside 0x00-0x88")]
    BadBer(u8),

    #[error("BER length field truncated: need {need} bytes, have {have}")]
    BadBerTruncated { need: usize, have: usize },

    #[error("length {0} does not fit in the requested {1}-byte BER width")]
    BerWidthOverflow(u64, u8),

    #[error("unexpected end of data: need {need} bytes, have {have}")]
    UnexpectedEof { need: usize, have: usize },

    #[error("unknown universal label: {0:02x?}")]
    UnknownUl([u8; 16]),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("caller contract violation: {0}")]
    Param(String),
}

pub type Result<T> = std::result::Result<T, Error>;
