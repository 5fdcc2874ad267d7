//! Errors surfaced by the writer/reader public API (§4.12, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("core error: {0}")]
    Core(#[from] mxf_core::Error),

    #[error("klv error: {0}")]
    Klv(#[from] mxf_klv::Error),

    #[error("partition error: {0}")]
    Partition(#[from] mxf_partition::Error),

    #[error("metadata error: {0}")]
    Metadata(#[from] mxf_metadata::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] mxf_crypto::Error),

    #[error("illegal operation in state {state}: {attempted}")]
    State { state: &'static str, attempted: &'static str },

    #[error("bad argument: {0}")]
    Param(String),

    #[error("operation not implemented: {0}")]
    NotImpl(&'static str),

    #[error("operational pattern is not OP-1a/OP-Atom")]
    UnsupportedLabel,

    #[error("essence container has no partition with BodySID != 0")]
    Format(String),

    #[error("mandatory header metadata object missing: {0}")]
    As02Format(String),

    #[error("random index pack is malformed or missing")]
    BadRip,
}

pub type Result<T> = std::result::Result<T, Error>;
