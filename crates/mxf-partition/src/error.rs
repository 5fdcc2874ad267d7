//! Errors for the partition/RIP/index layer (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("core error: {0}")]
    Core(#[from] mxf_core::Error),

    #[error("klv error: {0}")]
    Klv(#[from] mxf_klv::Error),

    #[error("not a partition pack key: {0:02x?}")]
    BadPartition(Vec<u8>),

    #[error("random index pack is malformed: {0}")]
    BadRip(String),

    #[error("frame {frame_num} is out of range (container holds {container_len} edit units)")]
    OutOfRange { frame_num: u64, container_len: u64 },

    #[error("index table segment is malformed: {0}")]
    BadIndex(String),
}

pub type Result<T> = std::result::Result<T, Error>;
