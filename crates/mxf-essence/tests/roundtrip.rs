//! End-to-end write/read scenarios through the per-codec façades (§8
//! testable properties and concrete scenarios), exercised against an
//! in-memory `Cursor` rather than real codestream fixtures.

use std::io::Cursor;

use mxf_core::dictionary::Dictionary;
use mxf_core::ids::InstanceUid;
use mxf_core::Rational;
use mxf_crypto::OpensslCrypto;
use mxf_essence::facade::{iab, isxd, jp2k, pcm};
use mxf_essence::{Crypto, Error, FrameBuffer, Reader, WrapMode, WriteOptions, Writer, WriterInfo};

fn crypto() -> Crypto {
    Crypto { cipher: Box::new(OpensslCrypto), hmac: Box::new(OpensslCrypto), rng: Box::new(OpensslCrypto) }
}

fn writer_info(seed: u8) -> WriterInfo {
    WriterInfo::new(InstanceUid::from_bytes([seed; 16]), "Acme", "mxfwrap")
}

/// Scenario 1 (§8): 48 kHz/24-bit stereo PCM at 24 fps, CBR clip-wrap.
#[test]
fn pcm_cbr_clip_wrap_roundtrip() {
    let rng = OpensslCrypto;
    let profile = pcm::build(
        pcm::PcmParams {
            audio_sampling_rate: Rational::new(48000, 1),
            channel_count: 2,
            quantization_bits: 24,
            block_align: 6,
            linked_track_id: 1,
        },
        &rng,
    )
    .unwrap();

    let mut writer = Writer::open_write(
        Cursor::new(Vec::new()),
        writer_info(1),
        WriteOptions::default(),
        Rational::new(24, 1),
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        Dictionary::ul("OPAtom").unwrap(),
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto(),
    )
    .unwrap();

    // 24 fps / 48 kHz => 2000 samples/frame, 6 bytes/sample => 12000 bytes/frame.
    let frames: Vec<Vec<u8>> = (0..10u8).map(|i| vec![i; 12000]).collect();
    for f in &frames {
        writer.write_frame(&FrameBuffer::from_bytes(f.clone())).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = Reader::open_read(writer.into_inner()).unwrap();
    assert_eq!(reader.frame_count(), 10);
    for (i, expected) in frames.iter().enumerate() {
        let fb = reader.read_frame(i as u64, None, None, &OpensslCrypto, &OpensslCrypto).unwrap();
        assert_eq!(fb.data(), expected.as_slice());
    }
}

/// Scenario: JPEG2000 frame-wrap, CBR index, with a partition break every
/// two frames (tight `partition_space_seconds` forces multiple Body
/// partitions, exercising the RIP and the per-partition index segments).
#[test]
fn jp2k_cbr_frame_wrap_multi_partition_roundtrip() {
    let rng = OpensslCrypto;
    let profile = jp2k::build(
        jp2k::Jp2kParams {
            edit_rate: Rational::new(24, 1),
            stored_width: 1920,
            stored_height: 1080,
            aspect_ratio: Rational::new(16, 9),
            frame_layout: 0,
            linked_track_id: 1,
            max_frame_size: Some(4096),
        },
        &rng,
    )
    .unwrap();

    let mut options = WriteOptions::default();
    options.partition_space_seconds = 2.0 / 24.0;

    let mut writer = Writer::open_write(
        Cursor::new(Vec::new()),
        writer_info(2),
        options,
        Rational::new(24, 1),
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        Dictionary::ul("OPAtom").unwrap(),
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto(),
    )
    .unwrap();

    let frames: Vec<Vec<u8>> = (0..7u8).map(|i| vec![i; 4096]).collect();
    for f in &frames {
        writer.write_frame(&FrameBuffer::from_bytes(f.clone())).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = Reader::open_read(writer.into_inner()).unwrap();
    assert_eq!(reader.frame_count(), 7);
    for (i, expected) in frames.iter().enumerate() {
        let fb = reader.read_frame(i as u64, None, None, &OpensslCrypto, &OpensslCrypto).unwrap();
        assert_eq!(fb.data(), expected.as_slice());
    }
}

/// Scenario: encrypted JPEG2000 frame-wrap with an HMAC MIC on every
/// triplet; an absent key returns raw ciphertext instead of decrypting it.
#[test]
fn jp2k_encrypted_frame_wrap_roundtrip() {
    let rng = OpensslCrypto;
    let profile = jp2k::build(
        jp2k::Jp2kParams {
            edit_rate: Rational::new(24, 1),
            stored_width: 1280,
            stored_height: 720,
            aspect_ratio: Rational::new(16, 9),
            frame_layout: 0,
            linked_track_id: 1,
            max_frame_size: Some(2048),
        },
        &rng,
    )
    .unwrap();

    let mut info = writer_info(3);
    info.encrypted_essence = true;
    info.uses_hmac = true;
    info.context_id = InstanceUid::from_bytes([7; 16]);

    let mut options = WriteOptions::default();
    options.encryption_key = Some([0xAA; 16]);
    options.hmac_key = Some([0xBB; 16]);

    let mut writer = Writer::open_write(
        Cursor::new(Vec::new()),
        info,
        options,
        Rational::new(24, 1),
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        Dictionary::ul("OPAtom").unwrap(),
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto(),
    )
    .unwrap();

    let frames: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i + 1; 2048]).collect();
    for f in &frames {
        writer.write_frame(&FrameBuffer::from_bytes(f.clone())).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = Reader::open_read(writer.into_inner()).unwrap();
    let key = [0xAA; 16];
    let hmac_key = [0xBB; 16];
    for (i, expected) in frames.iter().enumerate() {
        let fb = reader.read_frame(i as u64, Some(&key), Some(&hmac_key), &OpensslCrypto, &OpensslCrypto).unwrap();
        assert_eq!(fb.data(), expected.as_slice());
    }

    // No key supplied: the reader must hand back ciphertext, not decrypt.
    let raw = reader.read_frame(0, None, None, &OpensslCrypto, &OpensslCrypto).unwrap();
    assert_ne!(raw.data(), frames[0].as_slice());
}

/// Scenario: ISXD frame-wrap with variable per-frame XML document sizes
/// (no `max_frame_size`), which must fall back to a VBR index even though
/// the wrap mode is Frame.
#[test]
fn isxd_vbr_frame_wrap_roundtrip() {
    let rng = OpensslCrypto;
    let profile = isxd::build(isxd::IsxdParams { edit_rate: Rational::new(25, 1), linked_track_id: 2 }, &rng).unwrap();
    assert!(profile.cbr_sample_size.is_none());
    assert_eq!(profile.wrap_mode, WrapMode::Frame);

    let mut writer = Writer::open_write(
        Cursor::new(Vec::new()),
        writer_info(4),
        WriteOptions::default(),
        Rational::new(25, 1),
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        Dictionary::ul("OPAtom").unwrap(),
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto(),
    )
    .unwrap();

    let frames: Vec<Vec<u8>> = vec![vec![1; 40], vec![2; 512], vec![3; 17], vec![4; 256]];
    for f in &frames {
        writer.write_frame(&FrameBuffer::from_bytes(f.clone())).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = Reader::open_read(writer.into_inner()).unwrap();
    assert_eq!(reader.frame_count(), 4);
    for (i, expected) in frames.iter().enumerate() {
        let fb = reader.read_frame(i as u64, None, None, &OpensslCrypto, &OpensslCrypto).unwrap();
        assert_eq!(fb.data(), expected.as_slice());
    }
}

/// Scenario: IAB clip-wrap, confirming the sound-essence clip path works
/// through a codec other than PCM.
#[test]
fn iab_clip_wrap_roundtrip() {
    let rng = OpensslCrypto;
    let profile =
        iab::build(iab::IabParams { audio_sampling_rate: Rational::new(48000, 1), channel_count: 10, linked_track_id: 1 }, &rng).unwrap();

    let mut writer = Writer::open_write(
        Cursor::new(Vec::new()),
        writer_info(5),
        WriteOptions::default(),
        Rational::new(24, 1),
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        Dictionary::ul("OPAtom").unwrap(),
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto(),
    )
    .unwrap();

    let frames: Vec<Vec<u8>> = (0..6u8).map(|i| vec![i; 1024]).collect();
    for f in &frames {
        writer.write_frame(&FrameBuffer::from_bytes(f.clone())).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = Reader::open_read(writer.into_inner()).unwrap();
    assert_eq!(reader.frame_count(), 6);
    for (i, expected) in frames.iter().enumerate() {
        let fb = reader.read_frame(i as u64, None, None, &OpensslCrypto, &OpensslCrypto).unwrap();
        assert_eq!(fb.data(), expected.as_slice());
    }
}

/// §4.11 state machine: `write_frame` after `finalize` must fail rather
/// than silently reopening the Running state.
#[test]
fn write_after_finalize_is_rejected() {
    let rng = OpensslCrypto;
    let profile = pcm::build(
        pcm::PcmParams { audio_sampling_rate: Rational::new(48000, 1), channel_count: 2, quantization_bits: 24, block_align: 6, linked_track_id: 1 },
        &rng,
    )
    .unwrap();

    let mut writer = Writer::open_write(
        Cursor::new(Vec::new()),
        writer_info(6),
        WriteOptions::default(),
        Rational::new(24, 1),
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        Dictionary::ul("OPAtom").unwrap(),
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto(),
    )
    .unwrap();

    writer.write_frame(&FrameBuffer::from_bytes(vec![0u8; 12000])).unwrap();
    writer.finalize().unwrap();

    let err = writer.write_frame(&FrameBuffer::from_bytes(vec![0u8; 12000])).unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

/// §4.11 reader state machine: reading past the last frame is an error,
/// and the reader's `frame_count` matches the writer's edit unit count.
#[test]
fn read_past_last_frame_is_rejected() {
    let rng = OpensslCrypto;
    let profile = pcm::build(
        pcm::PcmParams { audio_sampling_rate: Rational::new(48000, 1), channel_count: 2, quantization_bits: 24, block_align: 6, linked_track_id: 1 },
        &rng,
    )
    .unwrap();

    let mut writer = Writer::open_write(
        Cursor::new(Vec::new()),
        writer_info(7),
        WriteOptions::default(),
        Rational::new(24, 1),
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        Dictionary::ul("OPAtom").unwrap(),
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto(),
    )
    .unwrap();

    writer.write_frame(&FrameBuffer::from_bytes(vec![0u8; 12000])).unwrap();
    writer.write_frame(&FrameBuffer::from_bytes(vec![1u8; 12000])).unwrap();
    writer.finalize().unwrap();

    let mut reader = Reader::open_read(writer.into_inner()).unwrap();
    assert_eq!(reader.frame_count(), 2);
    assert!(reader.read_frame(2, None, None, &OpensslCrypto, &OpensslCrypto).is_err());
}
