//! `WriteOptions` (§6.2): tunables accepted by `open_write`, mirroring the
//! teacher's per-format options-struct pattern rather than a config file
//! (§1 ambient configuration note).

use crate::writer_info::LabelSetType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStrategy {
    Lead,
    Follow,
    FileSpecific,
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub index_strategy: IndexStrategy,
    /// Distance between partition boundaries, in seconds (frame-wrap only).
    pub partition_space_seconds: f64,
    /// Reserved size of the header region; minimum 16384.
    pub header_size: u64,
    pub asset_uuid: Option<mxf_core::ids::InstanceUid>,
    pub encrypt_essence: bool,
    pub encryption_key: Option<[u8; 16]>,
    pub write_hmac: bool,
    pub hmac_key: Option<[u8; 16]>,
    pub label_set: LabelSetType,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            index_strategy: IndexStrategy::Follow,
            partition_space_seconds: 1.0,
            header_size: 16384,
            asset_uuid: None,
            encrypt_essence: false,
            encryption_key: None,
            write_hmac: false,
            hmac_key: None,
            label_set: LabelSetType::MxfSmpte,
        }
    }
}

impl WriteOptions {
    pub fn header_size_or_default(&self) -> u64 {
        self.header_size.max(16384)
    }
}
