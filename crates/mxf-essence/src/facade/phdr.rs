//! PHDR (Pro-HDR, ST 2094) dynamic metadata façade (§1 item 14, SPEC_FULL
//! §1 PHDR supplement).
//!
//! PHDR metadata rides as a second, auxiliary frame-wrapped essence track
//! alongside the picture track it describes (its own BodySID/TrackID), not
//! as the file's single essence stream. `Writer` only drives one essence
//! track per file (§1 "single essence stream" scope), so this façade does
//! not return an [`EssenceProfile`]; instead it appends a
//! `PHDRMetadataTrackSubDescriptor` to the sibling picture descriptor and
//! hands back the Generic Container identifiers a caller would need to
//! drive a second track manually. Full multi-track auto-wiring inside
//! `Writer` is out of scope for this core.

use mxf_core::ids::InstanceUid;
use mxf_core::Ul;
use mxf_crypto::SecureRng;
use mxf_metadata::{builders, Object};

use super::{dict_ul, random_uid};
use crate::Result;

pub struct PhdrIdentifiers {
    pub essence_container: Ul,
    pub essence_element_key: Ul,
    pub data_definition: Ul,
}

/// Append a `PHDRMetadataTrackSubDescriptor` to `picture_descriptor`'s
/// `SubDescriptors` batch and return the identifiers for the auxiliary
/// track's own frame-wrap essence.
pub fn attach(picture_descriptor: &mut Object, rng: &dyn SecureRng) -> Result<(Object, PhdrIdentifiers)> {
    let sub_descriptor_id = random_uid(rng)?;
    let sub_descriptor = builders::new_sub_descriptor("PHDRMetadataTrackSubDescriptor", sub_descriptor_id)?;

    let mut existing = picture_descriptor.get_batch_uuid("SubDescriptors")?.unwrap_or_default();
    existing.push(sub_descriptor_id);
    picture_descriptor.set_batch_uuid("SubDescriptors", existing)?;

    Ok((
        sub_descriptor,
        PhdrIdentifiers {
            essence_container: dict_ul("PHDRMetadataFrame")?,
            essence_element_key: dict_ul("PHDRImageMetadataItem")?,
            data_definition: dict_ul("DataDataDefinition")?,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_core::Rational;
    use mxf_crypto::OpensslCrypto;

    #[test]
    fn attaches_sub_descriptor_and_returns_identifiers() {
        let rng = OpensslCrypto;
        let mut picture = builders::new_descriptor(
            "RGBAEssenceDescriptor",
            InstanceUid::from_bytes([7; 16]),
            Rational::new(24, 1),
            dict_ul("JPEG2000EssenceFrame").unwrap(),
            dict_ul("JPEG2000Essence").unwrap(),
            0,
            1,
        )
        .unwrap();

        let (sub_descriptor, ids) = attach(&mut picture, &rng).unwrap();
        assert_eq!(sub_descriptor.kind_name, "PHDRMetadataTrackSubDescriptor");
        let refs = picture.get_batch_uuid("SubDescriptors").unwrap().unwrap();
        assert_eq!(refs, vec![sub_descriptor.instance_uid]);
        assert_eq!(ids.essence_element_key, dict_ul("PHDRImageMetadataItem").unwrap());
    }
}
