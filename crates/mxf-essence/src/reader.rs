//! The `Reader` lifecycle (§4.11 BEGIN→OPEN→CLOSED, §4.12 failure model,
//! §6.2 reader API surface).

use std::io::{Read, Seek, SeekFrom};

use mxf_core::byteio::ReadSeek;
use mxf_core::dictionary::{Dictionary, INDEX_TABLE_SEGMENT, PARTITION_PACK_PREFIX};
use mxf_core::ids::InstanceUid;
use mxf_core::Ul;
use mxf_crypto::{AesCipher, HmacMic, Triplet};
use mxf_klv::klv::KlvHeader;
use mxf_metadata::{Graph, Object};
use mxf_partition::{IndexReader, PartitionPack, RandomIndexPack};

use crate::frame_buffer::FrameBuffer;
use crate::header::read_header_metadata;
use crate::state::ReaderState;
use crate::writer::WrapMode;
use crate::writer_info::{LabelSetType, WriterInfo};
use crate::{Error, Result};

/// Reads one AS-02 essence component track file back out (§4.8, §4.9, §6.2).
pub struct Reader<R: ReadSeek> {
    state: ReaderState,
    stream: R,
    graph: Graph,
    descriptor_id: InstanceUid,
    operational_pattern: Ul,
    essence_element_key: Ul,
    wrap_mode: WrapMode,
    encrypted: bool,
    has_mic: bool,
    index: IndexReader,
    frame_count: u64,
    // clip-wrap only
    clip_essence_start: u64,
    clip_total_bytes: u64,
}

impl<R: ReadSeek> Reader<R> {
    /// `OpenRead` (§4.11 BEGIN→OPEN): locates the RIP, parses the header
    /// metadata, then walks every partition to build the unified index.
    pub fn open_read(mut stream: R) -> Result<Self> {
        let rip = RandomIndexPack::read_from_end(&mut stream)?;
        let header_offset = rip.entries[0].byte_offset;
        stream.seek(SeekFrom::Start(header_offset)).map_err(mxf_core::Error::from)?;
        let header_pack = PartitionPack::read(&mut stream)?;

        let op_name = Dictionary::find_by_ul(&header_pack.operational_pattern).map(|e| e.name);
        if !matches!(op_name, Some("OPAtom") | Some("OP1a")) {
            return Err(Error::UnsupportedLabel);
        }

        let metadata_start = stream.stream_position().map_err(mxf_core::Error::from)?;
        let region_end = metadata_start + header_pack.header_byte_count;
        let header = read_header_metadata(&mut stream, region_end)?;

        let descriptor = header
            .graph
            .get_object_by_id(header.descriptor_id)
            .ok_or_else(|| Error::As02Format("descriptor referenced by SourcePackage is missing".into()))?;
        let (essence_element_key, wrap_mode) = resolve_essence_key(descriptor)?;

        let crypto_context_ul = Dictionary::ul("CryptographicContext");
        let crypto_context = crypto_context_ul.and_then(|ul| header.graph.get_object_by_type(ul));
        let encrypted = crypto_context.is_some();
        let has_mic = crypto_context.map(|c| c.get_ul("MICAlgorithm").ok().flatten().is_some()).unwrap_or(false);

        let footer_offset = rip
            .entries
            .iter()
            .rev()
            .find(|e| e.body_sid == 0 && e.byte_offset != header_offset)
            .map(|e| e.byte_offset)
            .ok_or_else(|| Error::BadRip)?;
        let first_body_offset = rip.entries.get(1).map(|e| e.byte_offset).unwrap_or(footer_offset);

        let mut index = IndexReader::new();
        let mut clip_essence_start = 0u64;
        let mut clip_total_bytes = 0u64;
        let mut pos = first_body_offset;
        let mut current_essence_start = first_body_offset;
        while pos < footer_offset {
            stream.seek(SeekFrom::Start(pos)).map_err(mxf_core::Error::from)?;
            let mut key_bytes = [0u8; 16];
            stream.read_exact(&mut key_bytes).map_err(mxf_core::Error::from)?;
            stream.seek(SeekFrom::Start(pos)).map_err(mxf_core::Error::from)?;
            let key = Ul::new(key_bytes);

            if key_bytes[..13] == PARTITION_PACK_PREFIX {
                PartitionPack::read(&mut stream)?;
                current_essence_start = stream.stream_position().map_err(mxf_core::Error::from)?;
                pos = current_essence_start;
                continue;
            }
            if key == INDEX_TABLE_SEGMENT {
                let mut segment = mxf_partition::IndexTableSegment::read(&mut stream)?;
                segment.essence_start_offset = current_essence_start;
                pos = stream.stream_position().map_err(mxf_core::Error::from)?;
                index.add_segment(segment);
                continue;
            }

            let hdr = KlvHeader::read(&mut stream)?;
            if wrap_mode == WrapMode::Clip && key == essence_element_key && clip_essence_start == 0 {
                clip_essence_start = hdr.value_offset;
                clip_total_bytes = hdr.length;
            }
            pos = hdr.end_offset();
        }

        let frame_count =
            index.segments.iter().map(|s| (s.index_start_position.max(0) as u64) + s.index_duration.max(0) as u64).max().unwrap_or(0);

        Ok(Self {
            state: ReaderState::Open,
            stream,
            graph: header.graph,
            descriptor_id: header.descriptor_id,
            operational_pattern: header_pack.operational_pattern,
            essence_element_key,
            wrap_mode,
            encrypted,
            has_mic,
            index,
            frame_count,
            clip_essence_start,
            clip_total_bytes,
        })
    }

    /// `ReadFrame` (§4.11 OPEN→OPEN, §6.2). `key`/`hmac_key` decrypt an
    /// encrypted track; passing `None` for `key` on an encrypted track
    /// returns the raw ciphertext triplet bytes unchanged (§4.10 reader
    /// contract).
    pub fn read_frame(
        &mut self,
        frame_num: u64,
        key: Option<&[u8; 16]>,
        hmac_key: Option<&[u8; 16]>,
        cipher: &dyn AesCipher,
        hmac: &dyn HmacMic,
    ) -> Result<FrameBuffer> {
        self.state.require(&[ReaderState::Open], "read_frame")?;
        let offset = self.index.lookup(frame_num)?;
        self.stream.seek(SeekFrom::Start(offset)).map_err(mxf_core::Error::from)?;

        let data = match self.wrap_mode {
            WrapMode::Frame if self.encrypted => {
                let triplet = Triplet::read(&mut self.stream, self.has_mic)?;
                match key {
                    Some(key) => triplet.decrypt(key, hmac_key, cipher, hmac)?,
                    None => triplet.ciphertext.clone(),
                }
            }
            WrapMode::Frame => {
                let hdr = KlvHeader::read(&mut self.stream)?;
                hdr.read_value(&mut self.stream)?
            }
            WrapMode::Clip => {
                let len = if frame_num + 1 < self.frame_count {
                    self.index.lookup(frame_num + 1)? - offset
                } else {
                    (self.clip_essence_start + self.clip_total_bytes).saturating_sub(offset)
                };
                let mut buf = vec![0u8; len as usize];
                self.stream.read_exact(&mut buf).map_err(mxf_core::Error::from)?;
                buf
            }
        };

        let mut fb = FrameBuffer::from_bytes(data);
        fb.frame_number = frame_num;
        Ok(fb)
    }

    /// `FillDescriptor` (§6.2): the codec-specific essence descriptor this
    /// track file carries.
    pub fn fill_descriptor(&self) -> Result<Object> {
        self.graph
            .get_object_by_id(self.descriptor_id)
            .cloned()
            .ok_or_else(|| Error::As02Format("descriptor missing from parsed graph".into()))
    }

    /// `FillWriterInfo` (§6.2): reconstructed best-effort from the
    /// Identification and CryptographicContext sets. `label_set_type` isn't
    /// carried on the wire by this profile, so it's always reported as
    /// `MxfSmpte`.
    pub fn fill_writer_info(&self) -> Result<WriterInfo> {
        let identification_ul =
            Dictionary::ul("Identification").ok_or_else(|| Error::Param("missing dictionary entry".into()))?;
        let identification = self
            .graph
            .get_object_by_type(identification_ul)
            .ok_or_else(|| Error::As02Format("Identification".into()))?;

        let mut info = WriterInfo::new(
            identification.get_uuid("ProductUID")?.unwrap_or(InstanceUid::nil()),
            identification.get_string("CompanyName")?.unwrap_or_default(),
            identification.get_string("ProductName")?.unwrap_or_default(),
        );
        info.label_set_type = LabelSetType::MxfSmpte;
        info.encrypted_essence = self.encrypted;
        info.uses_hmac = self.has_mic;

        if let Some(context_ul) = Dictionary::ul("CryptographicContext") {
            if let Some(context) = self.graph.get_object_by_type(context_ul) {
                info.context_id = context.instance_uid;
                info.cryptographic_key_id = context.get_uuid("CryptographicKeyID")?.unwrap_or(InstanceUid::nil());
            }
        }
        Ok(info)
    }

    /// Total edit units recoverable from the index (§6.2 `frame_count`).
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn operational_pattern(&self) -> Ul {
        self.operational_pattern
    }

    /// `Close` (§4.11 OPEN→CLOSED).
    pub fn close(&mut self) -> Result<()> {
        self.state.require(&[ReaderState::Open], "close")?;
        self.state = ReaderState::Closed;
        Ok(())
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_inner(self) -> R {
        self.stream
    }
}

/// Derive the Generic Container essence-element key and wrap mode from a
/// descriptor's `EssenceContainerUl` (§4.2 naming convention: every
/// container label is named `<Codec>Essence{Frame,Clip}`, and the matching
/// per-frame item key drops the wrap suffix, e.g. `WAVEssenceClip` ->
/// `WAVEssence`).
fn resolve_essence_key(descriptor: &Object) -> Result<(Ul, WrapMode)> {
    let ec_ul = descriptor
        .get_ul("EssenceContainerUl")?
        .ok_or_else(|| Error::As02Format("Descriptor.EssenceContainerUl".into()))?;
    let entry = Dictionary::find_by_ul(&ec_ul).ok_or_else(|| Error::Format("unregistered EssenceContainer UL".into()))?;

    let (base, wrap_mode) = if let Some(base) = entry.name.strip_suffix("Frame") {
        (base, WrapMode::Frame)
    } else if let Some(base) = entry.name.strip_suffix("Clip") {
        (base, WrapMode::Clip)
    } else {
        return Err(Error::Format(format!("essence container label {} has no Frame/Clip suffix", entry.name)));
    };

    let essence_name = format!("{base}Essence");
    let essence_key = Dictionary::ul(&essence_name)
        .ok_or_else(|| Error::Format(format!("no essence element key registered for {essence_name}")))?;
    Ok((essence_key, wrap_mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_buffer::FrameBuffer;
    use crate::options::WriteOptions;
    use crate::writer::{Crypto, Writer};
    use mxf_core::dictionary::Dictionary;
    use mxf_core::Rational;
    use mxf_crypto::OpensslCrypto;
    use std::io::Cursor;

    fn crypto() -> Crypto {
        Crypto { cipher: Box::new(OpensslCrypto), hmac: Box::new(OpensslCrypto), rng: Box::new(OpensslCrypto) }
    }

    fn wav_descriptor() -> Object {
        mxf_metadata::builders::new_descriptor(
            "WaveAudioDescriptor",
            InstanceUid::from_bytes([0x10; 16]),
            Rational::new(48000, 1),
            Dictionary::ul("WAVEssenceClip").unwrap(),
            Dictionary::ul("WAVEssence").unwrap(),
            0,
            1,
        )
        .unwrap()
    }

    #[test]
    fn clip_wrap_roundtrip_unencrypted() {
        let writer_info = WriterInfo::new(InstanceUid::from_bytes([1; 16]), "Acme", "mxfwrap");
        let mut writer = Writer::open_write(
            Cursor::new(Vec::new()),
            writer_info,
            WriteOptions::default(),
            Rational::new(48000, 1),
            Dictionary::ul("WAVEssenceClip").unwrap(),
            Dictionary::ul("WAVEssence").unwrap(),
            Dictionary::ul("SoundDataDefinition").unwrap(),
            Dictionary::ul("OPAtom").unwrap(),
            WrapMode::Clip,
            None,
            wav_descriptor(),
            Vec::new(),
            crypto(),
        )
        .unwrap();

        let frames: Vec<Vec<u8>> = (0..5u8).map(|i| vec![i; 192]).collect();
        for f in &frames {
            writer.write_frame(&FrameBuffer::from_bytes(f.clone())).unwrap();
        }
        writer.finalize().unwrap();

        let mut reader = Reader::open_read(writer.into_inner()).unwrap();
        assert_eq!(reader.frame_count(), 5);
        for (i, expected) in frames.iter().enumerate() {
            let fb = reader.read_frame(i as u64, None, None, &OpensslCrypto, &OpensslCrypto).unwrap();
            assert_eq!(fb.data(), expected.as_slice());
        }
        assert!(reader.read_frame(5, None, None, &OpensslCrypto, &OpensslCrypto).is_err());
        reader.close().unwrap();
    }

    #[test]
    fn frame_wrap_roundtrip_encrypted() {
        let mut writer_info = WriterInfo::new(InstanceUid::from_bytes([2; 16]), "Acme", "mxfwrap");
        writer_info.encrypted_essence = true;
        writer_info.uses_hmac = true;
        writer_info.context_id = InstanceUid::from_bytes([9; 16]);

        let mut options = WriteOptions::default();
        options.encryption_key = Some([0x42u8; 16]);
        options.hmac_key = Some([0x24u8; 16]);

        let mut writer = Writer::open_write(
            Cursor::new(Vec::new()),
            writer_info,
            options,
            Rational::new(24, 1),
            Dictionary::ul("JPEG2000EssenceFrame").unwrap(),
            Dictionary::ul("JPEG2000Essence").unwrap(),
            Dictionary::ul("PictureDataDefinition").unwrap(),
            Dictionary::ul("OPAtom").unwrap(),
            WrapMode::Frame,
            Some(4096),
            mxf_metadata::builders::new_descriptor(
                "GenericPictureEssenceDescriptor",
                InstanceUid::from_bytes([0x11; 16]),
                Rational::new(24, 1),
                Dictionary::ul("JPEG2000EssenceFrame").unwrap(),
                Dictionary::ul("JPEG2000Essence").unwrap(),
                0,
                1,
            )
            .unwrap(),
            Vec::new(),
            crypto(),
        )
        .unwrap();

        let frames: Vec<Vec<u8>> = (0..3u8).map(|i| vec![i + 1; 4096]).collect();
        for f in &frames {
            writer.write_frame(&FrameBuffer::from_bytes(f.clone())).unwrap();
        }
        writer.finalize().unwrap();

        let mut reader = Reader::open_read(writer.into_inner()).unwrap();
        assert_eq!(reader.frame_count(), 3);
        let key = [0x42u8; 16];
        let hmac_key = [0x24u8; 16];
        for (i, expected) in frames.iter().enumerate() {
            let fb = reader.read_frame(i as u64, Some(&key), Some(&hmac_key), &OpensslCrypto, &OpensslCrypto).unwrap();
            assert_eq!(fb.data(), expected.as_slice());
        }
    }
}
