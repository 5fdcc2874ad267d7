//! Reference CLI: wraps an input file or a directory of per-frame
//! codestreams into an AS-02 MXF track file (§6.3). Thin glue only — all
//! MXF semantics live in `mxf_essence`.

mod args;
mod error;

use std::fs::{self, File};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use mxf_core::dictionary::Dictionary;
use mxf_core::ids::InstanceUid;
use mxf_core::Rational;
use mxf_crypto::OpensslCrypto;
use mxf_essence::facade::{aces, iab, isxd, jp2k, jxs, pcm, timed_text, EssenceProfile};
use mxf_essence::{FrameBuffer, IndexStrategy, LabelSetType, WriteOptions, Writer, WriterInfo};

use args::Args;
use error::{CliError, Result};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(3);
        }
    };

    match run(args) {
        Ok(frames_written) => {
            println!("wrote {frames_written} frames");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("mxfwrap: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn parse_rational(s: &str) -> Result<Rational> {
    let (num, den) = s.split_once('/').ok_or_else(|| CliError::Usage(format!("{s:?} is not num/den")))?;
    let num: i32 = num.parse().map_err(|_| CliError::Usage(format!("bad numerator in {s:?}")))?;
    let den: i32 = den.parse().map_err(|_| CliError::Usage(format!("bad denominator in {s:?}")))?;
    Ok(Rational::new(num, den))
}

fn parse_ratio(s: &str) -> Result<Rational> {
    let (num, den) = s.split_once(':').ok_or_else(|| CliError::Usage(format!("{s:?} is not num:den")))?;
    let num: i32 = num.parse().map_err(|_| CliError::Usage(format!("bad numerator in {s:?}")))?;
    let den: i32 = den.parse().map_err(|_| CliError::Usage(format!("bad denominator in {s:?}")))?;
    Ok(Rational::new(num, den))
}

fn parse_hex16(s: &str) -> Result<[u8; 16]> {
    if s.len() != 32 {
        return Err(CliError::Usage(format!("expected 32 hex characters, got {}", s.len())));
    }
    let mut out = [0u8; 16];
    for (i, chunk) in out.iter_mut().enumerate() {
        *chunk = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| CliError::Usage(format!("{s:?} is not valid hex")))?;
    }
    Ok(out)
}

fn collect_frames(input: &Path) -> std::io::Result<Vec<Vec<u8>>> {
    if input.is_dir() {
        let mut paths: Vec<_> = fs::read_dir(input)?.collect::<std::io::Result<Vec<_>>>()?;
        paths.sort_by_key(|e| e.file_name());
        paths.into_iter().map(|e| fs::read(e.path())).collect()
    } else {
        Ok(vec![fs::read(input)?])
    }
}

fn chunk_pcm_frames(bytes: Vec<u8>, edit_rate: Rational, sampling_rate: Rational, block_align: u16) -> Vec<Vec<u8>> {
    let samples_per_frame = (sampling_rate.numerator as i64 * edit_rate.denominator as i64)
        / (sampling_rate.denominator as i64 * edit_rate.numerator as i64).max(1);
    let bytes_per_frame = (samples_per_frame.max(1) as usize) * block_align as usize;
    bytes.chunks(bytes_per_frame).map(|c| c.to_vec()).collect()
}

fn build_profile(args: &Args, edit_rate: Rational, rng: &OpensslCrypto) -> Result<EssenceProfile> {
    let profile = match args.essence_type.as_str() {
        "jp2k" => jp2k::build(
            jp2k::Jp2kParams {
                edit_rate,
                stored_width: args.width,
                stored_height: args.height,
                aspect_ratio: parse_ratio(&args.aspect_ratio)?,
                frame_layout: args.frame_layout,
                linked_track_id: 1,
                max_frame_size: args.max_frame_size,
            },
            rng,
        )?,
        "jxs" => jxs::build(
            jxs::JxsParams {
                edit_rate,
                stored_width: args.width,
                stored_height: args.height,
                aspect_ratio: parse_ratio(&args.aspect_ratio)?,
                frame_layout: args.frame_layout,
                linked_track_id: 1,
                max_frame_size: args.max_frame_size,
            },
            rng,
        )?,
        "aces" => aces::build(
            aces::AcesParams {
                edit_rate,
                stored_width: args.width,
                stored_height: args.height,
                aspect_ratio: parse_ratio(&args.aspect_ratio)?,
                channel_count: args.channel_count,
                linked_track_id: 1,
                max_frame_size: args.max_frame_size,
            },
            rng,
        )?,
        "pcm" => pcm::build(
            pcm::PcmParams {
                audio_sampling_rate: parse_rational(&args.audio_sampling_rate)?,
                channel_count: args.channel_count,
                quantization_bits: args.quantization_bits,
                block_align: args.block_align,
                linked_track_id: 1,
            },
            rng,
        )?,
        "iab" => iab::build(
            iab::IabParams {
                audio_sampling_rate: parse_rational(&args.audio_sampling_rate)?,
                channel_count: args.channel_count,
                linked_track_id: 1,
            },
            rng,
        )?,
        "isxd" => isxd::build(isxd::IsxdParams { edit_rate, linked_track_id: 2 }, rng)?,
        "timed-text" => timed_text::build(timed_text::TimedTextParams { edit_rate, linked_track_id: 3 }, rng)?,
        other => return Err(CliError::UnknownEssenceType(other.to_string())),
    };
    Ok(profile)
}

fn run(args: Args) -> Result<u64> {
    if let Some(color_system) = &args.color_system {
        tracing::info!(color_system, "color system selector noted (not yet wired into descriptor properties)");
    }
    if let Some(mca_labels) = &args.mca_labels {
        tracing::info!(mca_labels, "MCA label expression noted (not yet wired into descriptor properties)");
    }

    let edit_rate = parse_rational(&args.edit_rate)?;
    let rng = OpensslCrypto;
    let profile = build_profile(&args, edit_rate, &rng)?;

    let mut frames = collect_frames(&args.input)?;
    if args.essence_type == "pcm" && !args.input.is_dir() {
        let sampling_rate = parse_rational(&args.audio_sampling_rate)?;
        frames = frames
            .into_iter()
            .flat_map(|bytes| chunk_pcm_frames(bytes, edit_rate, sampling_rate, args.block_align))
            .collect();
    }

    let mut writer_info = WriterInfo::new(InstanceUid::nil(), "mxf-as02-rs", "mxfwrap");
    if let Some(asset_id) = &args.asset_id {
        writer_info.asset_uuid = InstanceUid::from_bytes(parse_hex16(asset_id)?);
    }
    writer_info.language = args.language.clone();

    let mut options = WriteOptions {
        index_strategy: IndexStrategy::Follow,
        partition_space_seconds: args.partition_space,
        header_size: args.header_size,
        asset_uuid: args.asset_id.is_some().then_some(writer_info.asset_uuid),
        label_set: LabelSetType::MxfSmpte,
        ..WriteOptions::default()
    };

    if let Some(key) = &args.encryption_key {
        let key = parse_hex16(key)?;
        writer_info.encrypted_essence = true;
        options.encrypt_essence = true;
        options.encryption_key = Some(key);
        if let Some(key_id) = &args.key_id {
            writer_info.cryptographic_key_id = InstanceUid::from_bytes(parse_hex16(key_id)?);
        } else {
            let mut id_bytes = [0u8; 16];
            mxf_crypto::SecureRng::fill(&rng, &mut id_bytes).map_err(mxf_essence::Error::from)?;
            writer_info.cryptographic_key_id = InstanceUid::from_bytes(id_bytes);
        }
        if args.write_hmac {
            writer_info.uses_hmac = true;
            options.write_hmac = true;
            options.hmac_key = Some(key);
        }
    }

    let operational_pattern =
        Dictionary::ul("OPAtom").ok_or_else(|| CliError::Usage("dictionary missing OPAtom".into()))?;

    let crypto = mxf_essence::Crypto {
        cipher: Box::new(OpensslCrypto),
        hmac: Box::new(OpensslCrypto),
        rng: Box::new(OpensslCrypto),
    };

    let file = File::create(&args.output)?;
    let mut writer = Writer::open_write(
        file,
        writer_info,
        options,
        edit_rate,
        profile.essence_container,
        profile.essence_element_key,
        profile.data_definition,
        operational_pattern,
        profile.wrap_mode,
        profile.cbr_sample_size,
        profile.descriptor,
        profile.sub_descriptors,
        crypto,
    )?;

    for frame in &frames {
        let fb = FrameBuffer::from_bytes(frame.clone());
        writer.write_frame(&fb)?;
    }
    writer.finalize()?;
    Ok(frames.len() as u64)
}
