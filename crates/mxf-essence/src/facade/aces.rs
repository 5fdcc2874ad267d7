//! ACES picture essence façade (academy OpenEXR container, §1 item 14).
//!
//! Stereoscopic EXR layouts (6- or 8-channel, left+right image planes in one
//! frame) are rejected with [`Error::NotImpl`]: whether stereo ACES belongs
//! in this core is an open question spec.md §9 leaves unresolved, and the
//! single-image `ACESPictureSubDescriptor` this façade builds has no field
//! to carry a second eye's transfer/primaries metadata.

use mxf_core::Rational;
use mxf_crypto::SecureRng;
use mxf_metadata::builders;

use super::{dict_ul, random_uid, EssenceProfile};
use crate::writer::WrapMode;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct AcesParams {
    pub edit_rate: Rational,
    pub stored_width: u32,
    pub stored_height: u32,
    pub aspect_ratio: Rational,
    /// EXR channel count (e.g. 3 = RGB, 4 = RGBA). 6/8 = stereo, rejected.
    pub channel_count: u32,
    pub linked_track_id: u32,
    pub max_frame_size: Option<u32>,
}

pub fn build(params: AcesParams, rng: &dyn SecureRng) -> Result<EssenceProfile> {
    if params.channel_count == 6 || params.channel_count == 8 {
        return Err(Error::NotImpl("stereoscopic ACES EXR (6/8-channel) layouts"));
    }

    let essence_container = dict_ul("ACESEssenceFrame")?;
    let essence_element_key = dict_ul("ACESEssence")?;
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

    let sub_descriptor_id = random_uid(rng)?;
    let sub_descriptor = builders::new_sub_descriptor("ACESPictureSubDescriptor", sub_descriptor_id)?;
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

    fn sample_params(channel_count: u32) -> AcesParams {
        AcesParams {
            edit_rate: Rational::new(24, 1),
            stored_width: 2048,
            stored_height: 1080,
            aspect_ratio: Rational::new(17, 9),
            channel_count,
            linked_track_id: 1,
            max_frame_size: None,
        }
    }

    #[test]
    fn builds_mono_descriptor() {
        let rng = OpensslCrypto;
        let profile = build(sample_params(4), &rng).unwrap();
        assert_eq!(profile.sub_descriptors[0].kind_name, "ACESPictureSubDescriptor");
    }

    #[test]
    fn rejects_stereo_channel_counts() {
        let rng = OpensslCrypto;
        assert!(matches!(build(sample_params(6), &rng), Err(Error::NotImpl(_))));
        assert!(matches!(build(sample_params(8), &rng), Err(Error::NotImpl(_))));
    }
}
