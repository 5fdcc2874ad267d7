//! Errors for the KLV/TLV/Primer layer (wraps `mxf_core::Error`, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("core error: {0}")]
    Core(#[from] mxf_core::Error),

    #[error("truncated packet: need {need} bytes, have {have}")]
    TruncatedPacket { need: usize, have: usize },

    #[error("local tag 0x{0:04X} has no Primer entry")]
    UnknownLocalTag(u16),

    #[error("local tag range exhausted: no dynamic tags left below 0xFFFF")]
    TagRangeExhausted,
}

pub type Result<T> = std::result::Result<T, Error>;
