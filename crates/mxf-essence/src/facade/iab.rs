//! Immersive Audio Bitstream façade (ST 2067-201, §1 item 14). Always
//! clip-wrap, like PCM: one IAB bitstream per edit unit concatenated into a
//! single essence KLV (§4.9).

use mxf_core::Rational;
use mxf_crypto::SecureRng;
use mxf_metadata::builders;

use super::{dict_ul, random_uid, EssenceProfile};
use crate::writer::WrapMode;
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct IabParams {
    pub audio_sampling_rate: Rational,
    pub channel_count: u32,
    pub linked_track_id: u32,
}

pub fn build(params: IabParams, rng: &dyn SecureRng) -> Result<EssenceProfile> {
    let essence_container = dict_ul("IABEssenceClip")?;
    let essence_element_key = dict_ul("IABEssence")?;
    let data_definition = dict_ul("SoundDataDefinition")?;

    let mut descriptor = builders::new_descriptor(
        "IABEssenceDescriptor",
        random_uid(rng)?,
        params.audio_sampling_rate,
        essence_container,
        essence_element_key,
        0,
        params.linked_track_id,
    )?;
    descriptor.set_rational("AudioSamplingRate", params.audio_sampling_rate)?;
    descriptor.set_u32("ChannelCount", params.channel_count)?;

    let sub_descriptor_id = random_uid(rng)?;
    let sub_descriptor = builders::new_sub_descriptor("IABSoundfieldLabelSubDescriptor", sub_descriptor_id)?;
    descriptor.set_batch_uuid("SubDescriptors", vec![sub_descriptor_id])?;

    Ok(EssenceProfile {
        essence_container,
        essence_element_key,
        data_definition,
        wrap_mode: WrapMode::Clip,
        cbr_sample_size: None,
        descriptor,
        sub_descriptors: vec![sub_descriptor],
    })
}
