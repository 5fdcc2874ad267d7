//! JPEG 2000 picture essence façade (ST 422 J2K, §1 item 14).
//!
//! Frame-wrap only: each edit unit is one J2K codestream. Real codestreams
//! vary in size, so `max_frame_size` feeds a CBR index only when the caller
//! knows every frame is padded to a fixed size; otherwise pass `None` and
//! the writer falls back to a VBR index with per-frame `StreamOffset`s.

use mxf_core::Rational;
use mxf_crypto::SecureRng;
use mxf_metadata::builders;

use super::{dict_ul, random_uid, EssenceProfile};
use crate::writer::WrapMode;
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct Jp2kParams {
    pub edit_rate: Rational,
    pub stored_width: u32,
    pub stored_height: u32,
    pub aspect_ratio: Rational,
    /// ST 377-1 Table 29 FrameLayout code (0 = full frame progressive).
    pub frame_layout: u8,
    pub linked_track_id: u32,
    /// Fixed per-frame byte count, if every codestream is padded to it.
    pub max_frame_size: Option<u32>,
}

pub fn build(params: Jp2kParams, rng: &dyn SecureRng) -> Result<EssenceProfile> {
    let essence_container = dict_ul("JPEG2000EssenceFrame")?;
    let essence_element_key = dict_ul("JPEG2000Essence")?;
    let data_definition = dict_ul("PictureDataDefinition")?;

    let mut descriptor = builders::new_descriptor(
        "RGBAEssenceDescriptor",
        random_uid(rng)?,
        params.edit_rate,
        essence_container,
        essence_element_key,
        0,
        params.linked_track_id,
    )?;
    descriptor.set_u32("StoredWidth", params.stored_width)?;
    descriptor.set_u32("StoredHeight", params.stored_height)?;
    descriptor.set_rational("AspectRatio", params.aspect_ratio)?;
    descriptor.set_by_name("FrameLayout", mxf_klv::tlv::PropertyValue::UInt8(params.frame_layout))?;

    let sub_descriptor_id = random_uid(rng)?;
    let sub_descriptor = builders::new_sub_descriptor("JPEG2000PictureSubDescriptor", sub_descriptor_id)?;
    descriptor.set_batch_uuid("SubDescriptors", vec![sub_descriptor_id])?;

    Ok(EssenceProfile {
        essence_container,
        essence_element_key,
        data_definition,
        wrap_mode: WrapMode::Frame,
        cbr_sample_size: params.max_frame_size,
        descriptor,
        sub_descriptors: vec![sub_descriptor],
    })
}
