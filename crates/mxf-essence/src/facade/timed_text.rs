//! Timed Text essence façade (SMPTE ST 2052-1, §1 item 14). Clip-wrap: the
//! whole subtitle/caption XML document plus referenced resources are
//! carried as one essence KLV, matching the dictionary's
//! `TimedTextEssenceClip` naming.

use mxf_core::Rational;
use mxf_crypto::SecureRng;
use mxf_metadata::builders;

use super::{dict_ul, random_uid, EssenceProfile};
use crate::writer::WrapMode;
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct TimedTextParams {
    pub edit_rate: Rational,
    pub linked_track_id: u32,
}

pub fn build(params: TimedTextParams, rng: &dyn SecureRng) -> Result<EssenceProfile> {
    let essence_container = dict_ul("TimedTextEssenceClip")?;
    let essence_element_key = dict_ul("TimedTextEssence")?;
    let data_definition = dict_ul("DataDataDefinition")?;

    let mut descriptor = builders::new_descriptor(
        "TimedTextDescriptor",
        random_uid(rng)?,
        params.edit_rate,
        essence_container,
        essence_element_key,
        0,
        params.linked_track_id,
    )?;

    let sub_descriptor_id = random_uid(rng)?;
    let sub_descriptor = builders::new_sub_descriptor("TimedTextResourceSubDescriptor", sub_descriptor_id)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_crypto::OpensslCrypto;

    #[test]
    fn builds_timed_text_descriptor_clip_wrapped() {
        let rng = OpensslCrypto;
        let profile = build(TimedTextParams { edit_rate: Rational::new(24, 1), linked_track_id: 3 }, &rng).unwrap();
        assert_eq!(profile.descriptor.kind_name, "TimedTextDescriptor");
        assert_eq!(profile.sub_descriptors[0].kind_name, "TimedTextResourceSubDescriptor");
        assert_eq!(profile.wrap_mode, WrapMode::Clip);
    }
}
