//! PCM audio essence façade (ST 382 clip wrapping, §1 item 14). Always
//! clip-wrap: a single reserved-length KLV holds the whole interleaved
//! sample stream, per §4.9.

use mxf_core::Rational;
use mxf_crypto::SecureRng;
use mxf_metadata::builders;

use super::{dict_ul, random_uid, EssenceProfile};
use crate::writer::WrapMode;
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct PcmParams {
    pub audio_sampling_rate: Rational,
    pub channel_count: u32,
    pub quantization_bits: u32,
    pub block_align: u16,
    pub linked_track_id: u32,
}

pub fn build(params: PcmParams, rng: &dyn SecureRng) -> Result<EssenceProfile> {
    let essence_container = dict_ul("WAVEssenceClip")?;
    let essence_element_key = dict_ul("WAVEssence")?;
    let data_definition = dict_ul("SoundDataDefinition")?;

    let mut descriptor = builders::new_descriptor(
        "WaveAudioDescriptor",
        random_uid(rng)?,
        params.audio_sampling_rate,
        essence_container,
        essence_element_key,
        0,
        params.linked_track_id,
    )?;
    descriptor.set_rational("AudioSamplingRate", params.audio_sampling_rate)?;
    descriptor.set_u32("ChannelCount", params.channel_count)?;
    descriptor.set_u32("QuantizationBits", params.quantization_bits)?;
    descriptor.set_u16("BlockAlign", params.block_align)?;

    Ok(EssenceProfile {
        essence_container,
        essence_element_key,
        data_definition,
        wrap_mode: WrapMode::Clip,
        cbr_sample_size: None,
        descriptor,
        sub_descriptors: Vec::new(),
    })
}
