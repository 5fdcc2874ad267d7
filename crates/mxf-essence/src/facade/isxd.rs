//! Isochronous Stream of XML Documents façade (RDD 47, §1 item 14).
//! Frame-wrap: one XML document per edit unit. Document sizes vary, so this
//! façade always builds a VBR profile (`cbr_sample_size: None`).

use mxf_core::Rational;
use mxf_crypto::SecureRng;
use mxf_metadata::builders;

use super::{dict_ul, random_uid, EssenceProfile};
use crate::writer::WrapMode;
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct IsxdParams {
    pub edit_rate: Rational,
    pub linked_track_id: u32,
}

pub fn build(params: IsxdParams, rng: &dyn SecureRng) -> Result<EssenceProfile> {
    let essence_container = dict_ul("FrameWrappedISXDContainer")?;
    let essence_element_key = dict_ul("ISXDEssence")?;
    let data_definition = dict_ul("DataDataDefinition")?;

    let descriptor = builders::new_descriptor(
        "ISXDDataEssenceDescriptor",
        random_uid(rng)?,
        params.edit_rate,
        essence_container,
        essence_element_key,
        0,
        params.linked_track_id,
    )?;

    Ok(EssenceProfile {
        essence_container,
        essence_element_key,
        data_definition,
        wrap_mode: WrapMode::Frame,
        cbr_sample_size: None,
        descriptor,
        sub_descriptors: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_crypto::OpensslCrypto;

    #[test]
    fn builds_isxd_descriptor_frame_wrapped_vbr() {
        let rng = OpensslCrypto;
        let profile = build(IsxdParams { edit_rate: Rational::new(24, 1), linked_track_id: 2 }, &rng).unwrap();
        assert_eq!(profile.descriptor.kind_name, "ISXDDataEssenceDescriptor");
        assert_eq!(profile.wrap_mode, WrapMode::Frame);
        assert!(profile.cbr_sample_size.is_none());
    }
}
