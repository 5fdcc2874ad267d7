//! Command-line surface for the reference `mxfwrap` tool (§6.3). Argument
//! parsing and file discovery are explicitly out of the core's scope (§1);
//! this binary is the thin external collaborator that only calls into
//! `mxf_essence`'s reader/writer API.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "mxfwrap", about = "Wrap essence into an AS-02 MXF track file")]
pub struct Args {
    /// Essence type: jp2k, jxs, aces, pcm, iab, isxd, timed-text.
    #[arg(long = "essence-type")]
    pub essence_type: String,

    /// Input: a single media file, or a directory of per-frame codestreams
    /// (sorted by filename, one file per edit unit).
    #[arg(long)]
    pub input: PathBuf,

    /// Output MXF track file path.
    #[arg(long)]
    pub output: PathBuf,

    /// Edit rate as `numerator/denominator`, e.g. `24/1` or `30000/1001`.
    #[arg(long = "edit-rate", default_value = "24/1")]
    pub edit_rate: String,

    /// Picture: stored width in pixels.
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Picture: stored height in pixels.
    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    /// Picture: aspect ratio as `numerator:denominator`.
    #[arg(long = "aspect-ratio", default_value = "16:9")]
    pub aspect_ratio: String,

    /// Picture: ST 377-1 Table 29 FrameLayout code.
    #[arg(long = "frame-layout", default_value_t = 0)]
    pub frame_layout: u8,

    /// Picture: fixed per-frame byte count, if every frame is padded to it
    /// (enables a CBR index; omit for variable-size codestreams).
    #[arg(long = "max-frame-size")]
    pub max_frame_size: Option<u32>,

    /// ACES: EXR channel count. 6/8 (stereo) are rejected.
    #[arg(long = "channel-count", default_value_t = 4)]
    pub channel_count: u32,

    /// Audio: sample rate as `numerator/denominator`, e.g. `48000/1`.
    #[arg(long = "audio-sampling-rate", default_value = "48000/1")]
    pub audio_sampling_rate: String,

    /// Audio: quantization bits per sample.
    #[arg(long = "quantization-bits", default_value_t = 24)]
    pub quantization_bits: u32,

    /// Audio: block align (bytes per sample frame, all channels).
    #[arg(long = "block-align", default_value_t = 6)]
    pub block_align: u16,

    /// RFC 5646 language tag, used by TimedText/IAB descriptors.
    #[arg(long)]
    pub language: Option<String>,

    /// MCA (multichannel audio) label expression, e.g. `L,R,C,LFE`.
    #[arg(long = "mca-labels")]
    pub mca_labels: Option<String>,

    /// Color system selector (informational; not yet threaded into the
    /// descriptor's representative property set).
    #[arg(long = "color-system")]
    pub color_system: Option<String>,

    /// Reserved header region size in bytes (minimum 16384).
    #[arg(long = "header-size", default_value_t = 16384)]
    pub header_size: u64,

    /// Partition spacing, in seconds (frame-wrap only).
    #[arg(long = "partition-space", default_value_t = 1.0)]
    pub partition_space: f64,

    /// Explicit asset UUID override (32 hex characters), otherwise random.
    #[arg(long = "asset-id")]
    pub asset_id: Option<String>,

    /// AES-CBC-128 key, 32 hex characters. Enables encryption.
    #[arg(long = "encryption-key")]
    pub encryption_key: Option<String>,

    /// Cryptographic key ID (32 hex characters), otherwise random.
    #[arg(long = "key-id")]
    pub key_id: Option<String>,

    /// Write an HMAC-SHA1 MIC on every encrypted frame.
    #[arg(long = "write-hmac")]
    pub write_hmac: bool,
}
