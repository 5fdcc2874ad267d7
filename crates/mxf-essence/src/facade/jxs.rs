//! JPEG XS picture essence façade (ST 422 successor profile, §1 item 14).
//! Structurally identical to [`crate::facade::jp2k`]: frame-wrap, CBR when
//! the caller pads every frame to one size, VBR otherwise.

use mxf_core::Rational;
use mxf_crypto::SecureRng;
use mxf_metadata::builders;

use super::{dict_ul, random_uid, EssenceProfile};
use crate::writer::WrapMode;
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct JxsParams {
    pub edit_rate: Rational,
    pub stored_width: u32,
    pub stored_height: u32,
    pub aspect_ratio: Rational,
    pub frame_layout: u8,
    pub linked_track_id: u32,
    pub max_frame_size: Option<u32>,
}

pub fn build(params: JxsParams, rng: &dyn SecureRng) -> Result<EssenceProfile> {
    let essence_container = dict_ul("JPEGXSEssenceFrame")?;
    let essence_element_key = dict_ul("JPEGXSEssence")?;
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
    let sub_descriptor = builders::new_sub_descriptor("JPEGXSPictureSubDescriptor", sub_descriptor_id)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_crypto::OpensslCrypto;

    #[test]
    fn builds_rgba_descriptor_with_jpegxs_sub_descriptor() {
        let rng = OpensslCrypto;
        let profile = build(
            JxsParams {
                edit_rate: Rational::new(25, 1),
                stored_width: 3840,
                stored_height: 2160,
                aspect_ratio: Rational::new(16, 9),
                frame_layout: 0,
                linked_track_id: 1,
                max_frame_size: Some(2_000_000),
            },
            &rng,
        )
        .unwrap();
        assert_eq!(profile.sub_descriptors[0].kind_name, "JPEGXSPictureSubDescriptor");
        assert_eq!(profile.cbr_sample_size, Some(2_000_000));
    }
}
