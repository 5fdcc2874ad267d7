//! Header metadata graph construction and (de)serialization (§4.4, §6.1).

use std::io::Seek;

use mxf_core::byteio::{ReadSeek, WriteSeek};
use mxf_core::dictionary::{Dictionary, KLV_FILL};
use mxf_core::ids::InstanceUid;
use mxf_core::{Rational, Ul, Umid};
use mxf_klv::klv::{write_klv, KlvHeader};
use mxf_klv::primer::Primer;
use mxf_metadata::{builders, Graph, Object};

use crate::writer_info::WriterInfo;
use crate::{Error, Result};

fn random_uuid(rng: &dyn mxf_crypto::SecureRng) -> Result<InstanceUid> {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes).map_err(mxf_crypto::Error::from)?;
    Ok(InstanceUid::from_bytes(bytes))
}

/// Everything the header metadata parse needs to hand back to the reader.
pub struct HeaderMetadata {
    pub graph: Graph,
    pub preface_id: InstanceUid,
    pub descriptor_id: InstanceUid,
}

/// Build the standard OP-Atom single-essence-track metadata graph: Preface,
/// Identification, ContentStorage, one MaterialPackage, one SourcePackage
/// (owning `descriptor` plus `sub_descriptors`), their Tracks/Sequences, and
/// (if `writer_info.encrypted_essence`) the CryptographicFramework/Context
/// pair (§3 Metadata graph, §6.1 item 3).
#[allow(clippy::too_many_arguments)]
pub fn build_header(
    writer_info: &WriterInfo,
    edit_rate: Rational,
    operational_pattern: Ul,
    essence_container: Ul,
    data_definition: Ul,
    duration: i64,
    mut descriptor: Object,
    sub_descriptors: Vec<Object>,
    rng: &dyn mxf_crypto::SecureRng,
) -> Result<HeaderMetadata> {
    let mut graph = Graph::new();

    let sub_descriptor_ids: Vec<InstanceUid> =
        sub_descriptors.iter().map(|sd| sd.instance_uid).collect();
    if !sub_descriptor_ids.is_empty() {
        descriptor.set_batch_uuid("SubDescriptors", sub_descriptor_ids.clone()).ok();
    }
    let descriptor_id = descriptor.instance_uid;
    graph.insert(descriptor);
    for sd in sub_descriptors {
        graph.insert(sd);
    }

    let sequence_id = random_uuid(rng)?;
    let source_clip_id = random_uuid(rng)?;
    let source_clip = builders::new_source_clip(source_clip_id, data_definition, duration, 0)?;
    graph.insert(source_clip);
    let sequence = builders::new_sequence(sequence_id, data_definition, duration, vec![source_clip_id])?;
    graph.insert(sequence);

    let track_id = random_uuid(rng)?;
    let track = builders::new_track(track_id, 1, 0x0101_0000, "Track 1", edit_rate, sequence_id, false)?;
    graph.insert(track);

    let package_uid = Umid::from_uuid(random_uuid(rng)?, [0, 0, 1]);
    let source_package_id = random_uuid(rng)?;
    let source_package = builders::new_source_package(source_package_id, package_uid, vec![track_id], descriptor_id)?;
    graph.insert(source_package);

    let material_sequence_id = random_uuid(rng)?;
    let material_source_clip_id = random_uuid(rng)?;
    let material_source_clip = builders::new_source_clip(material_source_clip_id, data_definition, duration, 0)?;
    graph.insert(material_source_clip);
    let material_sequence =
        builders::new_sequence(material_sequence_id, data_definition, duration, vec![material_source_clip_id])?;
    graph.insert(material_sequence);
    let material_track_id = random_uuid(rng)?;
    let material_track =
        builders::new_track(material_track_id, 1, 0, "Track 1", edit_rate, material_sequence_id, false)?;
    graph.insert(material_track);

    let material_package_uid = Umid::from_uuid(random_uuid(rng)?, [0, 0, 1]);
    let material_package_id = random_uuid(rng)?;
    let material_package =
        builders::new_material_package(material_package_id, material_package_uid, vec![material_track_id])?;
    graph.insert(material_package);

    let content_storage_id = random_uuid(rng)?;
    let content_storage =
        builders::new_content_storage(content_storage_id, vec![material_package_id, source_package_id], Vec::new())?;
    graph.insert(content_storage);

    let identification_id = random_uuid(rng)?;
    let identification = builders::new_identification(
        identification_id,
        &writer_info.company_name,
        &writer_info.product_name,
        writer_info.product_uuid,
    )?;
    graph.insert(identification);

    if writer_info.encrypted_essence {
        let context_id = if writer_info.context_id.is_nil() { random_uuid(rng)? } else { writer_info.context_id };
        let context = builders::new_cryptographic_context(
            context_id,
            essence_container,
            mxf_core::dictionary::AES_CBC_128,
            mxf_core::dictionary::HMAC_SHA1_MIC,
            writer_info.cryptographic_key_id,
        )?;
        graph.insert(context);
        let framework_id = random_uuid(rng)?;
        let mut framework = builders::new_cryptographic_framework(framework_id)?;
        framework.set_uuid("ContextRef", context_id).ok();
        graph.insert(framework);
    }

    let preface_id = random_uuid(rng)?;
    let preface = builders::new_preface(preface_id, operational_pattern, vec![essence_container], content_storage_id, vec![
        identification_id,
    ])?;
    graph.insert(preface);

    Ok(HeaderMetadata { graph, preface_id, descriptor_id })
}

/// Write the Primer pack followed by every object's set-KLV, in insertion
/// order (Preface first would be ideal for human readability, but §4.4
/// doesn't mandate an order beyond "Primer, then a stream of set-KLVs").
/// Returns total bytes written.
pub fn write_header_metadata(graph: &Graph, w: &mut dyn WriteSeek) -> Result<u64> {
    let start = w.stream_position().map_err(mxf_core::Error::from)?;
    let mut primer = Primer::new();

    // Pre-allocate tags by pre-serializing into a scratch buffer so the
    // Primer is complete before it is written (the Primer precedes the
    // metadata it describes).
    let mut scratch_primer = primer.clone();
    let mut bodies = Vec::with_capacity(64);
    for object in graph.objects_in_order() {
        let body = object.write_to_tlv_set(&mut scratch_primer)?;
        bodies.push((object.set_ul, body));
    }
    primer = scratch_primer;

    primer.write(w)?;
    for (set_ul, body) in bodies {
        write_klv(w, &set_ul, &body)?;
    }
    let end = w.stream_position().map_err(mxf_core::Error::from)?;
    Ok(end - start)
}

/// Stamp the final edit-unit count into every `Duration`/`ContainerDuration`
/// property in the graph (§4.11 Finalize: these are unknown at `open_write`
/// time and only become known once the caller stops writing frames).
pub fn set_durations(graph: &mut Graph, duration: i64) -> Result<()> {
    let ids: Vec<_> = graph.objects_in_order().map(|o| o.instance_uid).collect();
    for id in ids {
        let Some(object) = graph.get_object_by_id_mut(id) else { continue };
        if object.get_i64("Duration")?.is_some() {
            object.set_i64("Duration", duration)?;
        }
        if object.get_i64("ContainerDuration")?.is_some() {
            object.set_i64("ContainerDuration", duration)?;
        }
    }
    Ok(())
}

/// Pad the header region out to `target_end` with a single KLV-fill packet,
/// so the header region is exactly `HeaderByteCount` bytes (§6.1 item 3).
pub fn pad_header(w: &mut dyn WriteSeek, target_end: u64) -> Result<()> {
    let pos = w.stream_position().map_err(mxf_core::Error::from)?;
    if pos > target_end {
        return Err(Error::Param(format!("header metadata ({pos} bytes) exceeds reserved header_size ({target_end})")));
    }
    let fill_value_len = target_end - pos;
    // KLV key + BER length needs to be accounted for; use the 4-byte BER
    // form and solve for the payload length that lands exactly on target.
    // write_klv's BER policy is deterministic (4 bytes unless > 2^24-1), so
    // subtract 16 (key) + 4 (length) once as a first approximation and
    // correct if the length field width would change.
    let overhead = 16 + 4;
    let payload_len = fill_value_len.saturating_sub(overhead);
    write_klv(w, &KLV_FILL, &vec![0u8; payload_len as usize])?;
    Ok(())
}

/// Parse the header metadata region starting at the reader's current
/// position and ending at `region_end` (absolute offset).
pub fn read_header_metadata(r: &mut dyn ReadSeek, region_end: u64) -> Result<HeaderMetadata> {
    let primer = Primer::read(r)?;
    let mut graph = Graph::new();
    while r.stream_position().map_err(mxf_core::Error::from)? < region_end {
        let hdr = KlvHeader::read(r)?;
        if hdr.key == KLV_FILL {
            hdr.skip(r)?;
            continue;
        }
        let body = hdr.read_value(r)?;
        let entry = Dictionary::find_by_ul(&hdr.key);
        let kind_name = entry.map(|e| e.name).unwrap_or("Unknown");
        let object = Object::init_from_tlv_set(hdr.key, kind_name, &primer, &body)?;
        graph.insert(object);
    }

    let preface_id = graph.preface().map(|p| p.instance_uid).ok_or_else(|| Error::As02Format("Preface".into()))?;
    let source_package_ul = Dictionary::ul("SourcePackage").ok_or_else(|| Error::Param("missing dictionary entry".into()))?;
    let source_package = graph.get_object_by_type(source_package_ul).ok_or_else(|| Error::As02Format("SourcePackage".into()))?;
    let descriptor_id = source_package
        .get_uuid("DescriptorRef")?
        .ok_or_else(|| Error::As02Format("SourcePackage.DescriptorRef".into()))?;

    Ok(HeaderMetadata { graph, preface_id, descriptor_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_crypto::OpensslCrypto;
    use std::io::Cursor;

    fn sample_descriptor() -> Object {
        mxf_metadata::builders::new_descriptor(
            "WaveAudioDescriptor",
            InstanceUid::from_bytes([0x10; 16]),
            Rational::new(48000, 1),
            Dictionary::ul("WAVEssenceClip").unwrap(),
            Dictionary::ul("WAVEssence").unwrap(),
            48,
            1,
        )
        .unwrap()
    }

    #[test]
    fn build_and_roundtrip_header_metadata() {
        let rng = OpensslCrypto;
        let writer_info = WriterInfo::new(InstanceUid::from_bytes([1; 16]), "Acme", "mxfwrap");
        let header = build_header(
            &writer_info,
            Rational::new(24, 1),
            Dictionary::ul("OPAtom").unwrap(),
            Dictionary::ul("WAVEssenceClip").unwrap(),
            Dictionary::ul("SoundDataDefinition").unwrap(),
            48,
            sample_descriptor(),
            Vec::new(),
            &rng,
        )
        .unwrap();
        assert!(header.graph.preface().is_some());
        header.graph.validate_references().unwrap();

        let mut buf = Cursor::new(Vec::new());
        let written = write_header_metadata(&header.graph, &mut buf).unwrap();
        assert!(written > 0);

        let mut cur = Cursor::new(buf.into_inner());
        let region_end = cur.get_ref().len() as u64;
        let read_back = read_header_metadata(&mut cur, region_end).unwrap();
        assert!(read_back.graph.preface().is_some());
        assert_eq!(read_back.descriptor_id, header.descriptor_id);
    }
}
