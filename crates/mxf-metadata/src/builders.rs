//! Constructors for the concrete node types named in §3 (Preface,
//! ContentStorage, Packages, Tracks, Sequences, Components, Descriptors,
//! SubDescriptors, DM/crypto sets). Each is a thin, typed wrapper around
//! [`Object::new`] plus [`Object::set_*`] calls — the generic store does the
//! serialization work; these functions only know field names and defaults.

use mxf_core::dictionary::Dictionary;
use mxf_core::ids::InstanceUid;
use mxf_core::{Rational, Ul, Umid};

use crate::set::Object;
use crate::{Error, Result};

fn new_object(kind_name: &str, instance_uid: InstanceUid) -> Result<Object> {
    let ul = Dictionary::ul(kind_name).ok_or_else(|| Error::UnknownPropertyName(kind_name.to_string()))?;
    Ok(Object::new(ul, Dictionary::find_by_ul(&ul).map(|e| e.name).unwrap_or("Unknown"), instance_uid))
}

pub fn new_preface(
    instance_uid: InstanceUid,
    operational_pattern: Ul,
    essence_containers: Vec<Ul>,
    content_storage: InstanceUid,
    identifications: Vec<InstanceUid>,
) -> Result<Object> {
    let mut obj = new_object("Preface", instance_uid)?;
    obj.set_ul_prop("OperationalPattern", operational_pattern)?;
    obj.set_batch_ul("EssenceContainers", essence_containers)?;
    obj.set_uuid("ContentStorageRef", content_storage)?;
    obj.set_batch_uuid("IdentificationsRef", identifications)?;
    obj.set_u16("Version", 0x0103)?;
    Ok(obj)
}

pub fn new_identification(
    instance_uid: InstanceUid,
    company_name: &str,
    product_name: &str,
    product_uid: InstanceUid,
) -> Result<Object> {
    let mut obj = new_object("Identification", instance_uid)?;
    obj.set_string("CompanyName", company_name)?;
    obj.set_string("ProductName", product_name)?;
    obj.set_uuid("ProductUID", product_uid)?;
    Ok(obj)
}

pub fn new_content_storage(
    instance_uid: InstanceUid,
    packages: Vec<InstanceUid>,
    essence_container_data: Vec<InstanceUid>,
) -> Result<Object> {
    let mut obj = new_object("ContentStorage", instance_uid)?;
    obj.set_batch_uuid("PackagesRef", packages)?;
    obj.set_batch_uuid("EssenceContainerDataRef", essence_container_data)?;
    Ok(obj)
}

pub fn new_material_package(instance_uid: InstanceUid, package_uid: Umid, tracks: Vec<InstanceUid>) -> Result<Object> {
    let mut obj = new_object("MaterialPackage", instance_uid)?;
    obj.set_umid("PackageUID", package_uid)?;
    obj.set_batch_uuid("TracksRef", tracks)?;
    Ok(obj)
}

pub fn new_source_package(
    instance_uid: InstanceUid,
    package_uid: Umid,
    tracks: Vec<InstanceUid>,
    descriptor: InstanceUid,
) -> Result<Object> {
    let mut obj = new_object("SourcePackage", instance_uid)?;
    obj.set_umid("PackageUID", package_uid)?;
    obj.set_batch_uuid("TracksRef", tracks)?;
    obj.set_uuid("DescriptorRef", descriptor)?;
    Ok(obj)
}

#[allow(clippy::too_many_arguments)]
pub fn new_track(
    instance_uid: InstanceUid,
    track_id: u32,
    track_number: u32,
    track_name: &str,
    edit_rate: Rational,
    sequence: InstanceUid,
    static_track: bool,
) -> Result<Object> {
    let mut obj = new_object(if static_track { "StaticTrack" } else { "Track" }, instance_uid)?;
    obj.set_u32("TrackID", track_id)?;
    obj.set_u32("TrackNumber", track_number)?;
    obj.set_string("TrackName", track_name)?;
    if !static_track {
        obj.set_rational("EditRate", edit_rate)?;
    }
    obj.set_uuid("SequenceRef", sequence)?;
    Ok(obj)
}

pub fn new_sequence(
    instance_uid: InstanceUid,
    data_definition: Ul,
    duration: i64,
    structural_components: Vec<InstanceUid>,
) -> Result<Object> {
    let mut obj = new_object("Sequence", instance_uid)?;
    obj.set_ul_prop("DataDefinition", data_definition)?;
    obj.set_i64("Duration", duration)?;
    obj.set_batch_uuid("StructuralComponentsRef", structural_components)?;
    Ok(obj)
}

pub fn new_source_clip(
    instance_uid: InstanceUid,
    data_definition: Ul,
    duration: i64,
    start_position: i64,
) -> Result<Object> {
    let mut obj = new_object("SourceClip", instance_uid)?;
    obj.set_ul_prop("DataDefinition", data_definition)?;
    obj.set_i64("Duration", duration)?;
    obj.set_i64("Origin", start_position)?;
    Ok(obj)
}

pub fn new_timecode_component(instance_uid: InstanceUid, duration: i64, data_definition: Ul) -> Result<Object> {
    let mut obj = new_object("TimecodeComponent", instance_uid)?;
    obj.set_ul_prop("DataDefinition", data_definition)?;
    obj.set_i64("Duration", duration)?;
    Ok(obj)
}

pub fn new_dm_segment(instance_uid: InstanceUid, duration: i64, data_definition: Ul) -> Result<Object> {
    let mut obj = new_object("DMSegment", instance_uid)?;
    obj.set_ul_prop("DataDefinition", data_definition)?;
    obj.set_i64("Duration", duration)?;
    Ok(obj)
}

/// Build any of the `*EssenceDescriptor` kinds with their common
/// `FileDescriptor` fields populated (§3 FileDescriptor).
#[allow(clippy::too_many_arguments)]
pub fn new_descriptor(
    kind_name: &str,
    instance_uid: InstanceUid,
    sample_rate: Rational,
    essence_container: Ul,
    codec: Ul,
    container_duration: i64,
    linked_track_id: u32,
) -> Result<Object> {
    let mut obj = new_object(kind_name, instance_uid)?;
    obj.set_rational("SampleRate", sample_rate)?;
    obj.set_ul_prop("EssenceContainerUl", essence_container)?;
    obj.set_ul_prop("Codec", codec)?;
    obj.set_i64("ContainerDuration", container_duration)?;
    obj.set_u32("LinkedTrackID", linked_track_id)?;
    Ok(obj)
}

pub fn new_sub_descriptor(kind_name: &str, instance_uid: InstanceUid) -> Result<Object> {
    new_object(kind_name, instance_uid)
}

pub fn new_cryptographic_context(
    instance_uid: InstanceUid,
    source_essence_container: Ul,
    cipher_algorithm: Ul,
    mic_algorithm: Ul,
    cryptographic_key_id: InstanceUid,
) -> Result<Object> {
    let mut obj = new_object("CryptographicContext", instance_uid)?;
    obj.set_ul_prop("SourceEssenceContainer", source_essence_container)?;
    obj.set_ul_prop("CipherAlgorithm", cipher_algorithm)?;
    obj.set_ul_prop("MICAlgorithm", mic_algorithm)?;
    obj.set_uuid("CryptographicKeyID", cryptographic_key_id)?;
    Ok(obj)
}

pub fn new_cryptographic_framework(instance_uid: InstanceUid) -> Result<Object> {
    new_object("CryptographicFramework", instance_uid)
}

pub fn new_text_based_dm_framework(instance_uid: InstanceUid) -> Result<Object> {
    new_object("TextBasedDMFramework", instance_uid)
}

/// RP 2057 text carriage (§6.2 `add_generic_stream_utf8_text`).
pub fn new_generic_stream_text_based_set(instance_uid: InstanceUid) -> Result<Object> {
    new_object("GenericStreamTextBasedSet", instance_uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_preface_with_expected_fields() {
        let preface = new_preface(
            InstanceUid::from_bytes([1; 16]),
            Dictionary::ul("OPAtom").unwrap(),
            vec![Dictionary::ul("WAVEssenceClip").unwrap()],
            InstanceUid::from_bytes([2; 16]),
            vec![InstanceUid::from_bytes([3; 16])],
        )
        .unwrap();
        assert_eq!(preface.get_ul("OperationalPattern").unwrap(), Dictionary::ul("OPAtom"));
        assert_eq!(preface.get_batch_uuid("IdentificationsRef").unwrap().unwrap().len(), 1);
    }

    #[test]
    fn track_and_static_track_share_the_constructor() {
        let sequence = InstanceUid::from_bytes([9; 16]);
        let edit_rate = Rational::new(24, 1);
        let track = new_track(InstanceUid::from_bytes([4; 16]), 1, 0x15020100, "V1", edit_rate, sequence, false).unwrap();
        assert_eq!(track.kind_name, "Track");
        assert_eq!(track.get_rational("EditRate").unwrap(), Some(edit_rate));

        let static_track = new_track(InstanceUid::from_bytes([5; 16]), 2, 0, "TC1", edit_rate, sequence, true).unwrap();
        assert_eq!(static_track.kind_name, "StaticTrack");
        assert_eq!(static_track.get_rational("EditRate").unwrap(), None);
    }
}
