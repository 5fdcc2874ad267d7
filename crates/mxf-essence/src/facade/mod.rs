//! Thin per-codec wrappers selecting wrap mode, essence UL, and descriptor
//! type ahead of `Writer::open_write` (§4 Essence-specific façades). Each
//! submodule owns one codec's parameter struct and builds the descriptor +
//! sub-descriptors the way `header::build_header` expects them, the same
//! division of labour `mxf_metadata::builders` uses for the generic sets.

pub mod aces;
pub mod iab;
pub mod isxd;
pub mod jp2k;
pub mod jxs;
pub mod pcm;
pub mod phdr;
pub mod timed_text;

use mxf_core::dictionary::Dictionary;
use mxf_core::ids::InstanceUid;
use mxf_core::Ul;
use mxf_crypto::SecureRng;
use mxf_metadata::Object;

use crate::writer::WrapMode;
use crate::{Error, Result};

/// Everything `Writer::open_write` needs beyond `WriterInfo`/`WriteOptions`/
/// `Crypto`, selected by a codec façade from its codec-specific parameters.
pub struct EssenceProfile {
    pub essence_container: Ul,
    pub essence_element_key: Ul,
    pub data_definition: Ul,
    pub wrap_mode: WrapMode,
    pub cbr_sample_size: Option<u32>,
    pub descriptor: Object,
    pub sub_descriptors: Vec<Object>,
}

pub(super) fn random_uid(rng: &dyn SecureRng) -> Result<InstanceUid> {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes).map_err(mxf_crypto::Error::from)?;
    Ok(InstanceUid::from_bytes(bytes))
}

pub(super) fn dict_ul(name: &str) -> Result<Ul> {
    Dictionary::ul(name).ok_or_else(|| Error::Param(format!("dictionary entry {name} missing")))
}
