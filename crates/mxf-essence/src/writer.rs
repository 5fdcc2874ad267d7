//! The `Writer` lifecycle (§4.8 frame-wrap, §4.9 clip-wrap, §4.11 states).

use std::io::{Seek, SeekFrom, Write};

use mxf_core::byteio::WriteSeek;
use mxf_core::{Rational, Ul};
use mxf_crypto::{AesCipher, HmacMic, SecureRng, Triplet};
use mxf_klv::klv::{backpatch_length, write_klv, write_klv_reserved_length};
use mxf_metadata::{Graph, Object};
use mxf_partition::{CbrIndexWriter, PartitionKind, PartitionPack, PartitionStatus, RandomIndexPack, VbrIndexWriter};

use crate::frame_buffer::FrameBuffer;
use crate::header::{build_header, pad_header, set_durations, write_header_metadata};
use crate::options::WriteOptions;
use crate::state::WriterState;
use crate::writer_info::WriterInfo;
use crate::{Error, Result};

const HEADER_BODY_SID: u32 = 0;
const ESSENCE_BODY_SID: u32 = 1;
const ESSENCE_INDEX_SID: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Frame,
    Clip,
}

enum IndexWriter {
    Cbr(CbrIndexWriter),
    Vbr(VbrIndexWriter),
}

/// Injected cryptographic capabilities; always required (even when not
/// encrypting, `rng` still seeds every fresh `InstanceUID` — §1 "UUIDs are
/// produced through the same capability surface as key material").
pub struct Crypto {
    pub cipher: Box<dyn AesCipher>,
    pub hmac: Box<dyn HmacMic>,
    pub rng: Box<dyn SecureRng>,
}

/// Writes one AS-02 essence component track file (§4.8, §4.9, §6.2).
pub struct Writer<W: WriteSeek> {
    state: WriterState,
    stream: W,
    crypto: Crypto,
    writer_info: WriterInfo,
    options: WriteOptions,
    edit_rate: Rational,
    essence_container: Ul,
    essence_element_key: Ul,
    operational_pattern: Ul,
    wrap_mode: WrapMode,
    cbr_sample_size: Option<u32>,

    graph: Graph,
    metadata_start: u64,
    reserved_header_size: u64,

    previous_partition_offset: u64,
    rip: RandomIndexPack,
    index: IndexWriter,
    partition_space_edit_units: u64,
    frames_in_partition: u64,
    frames_written: u64,
    frame_wrap_bytes_written: u64,

    // clip-wrap only
    clip_length_offset: u64,
    clip_bytes_written: u64,
    clip_essence_start: u64,
}

impl<W: WriteSeek> Writer<W> {
    /// `OpenWrite` (§4.11 BEGIN→INIT→READY): builds and serializes the header
    /// metadata, then opens the first Body partition. `descriptor` is the
    /// codec-specific essence descriptor built by a `facade` module.
    #[allow(clippy::too_many_arguments)]
    pub fn open_write(
        mut stream: W,
        writer_info: WriterInfo,
        options: WriteOptions,
        edit_rate: Rational,
        essence_container: Ul,
        essence_element_key: Ul,
        data_definition: Ul,
        operational_pattern: Ul,
        wrap_mode: WrapMode,
        cbr_sample_size: Option<u32>,
        descriptor: Object,
        sub_descriptors: Vec<Object>,
        crypto: Crypto,
    ) -> Result<Self> {
        let header = build_header(
            &writer_info,
            edit_rate,
            operational_pattern,
            essence_container,
            data_definition,
            0,
            descriptor,
            sub_descriptors,
            crypto.rng.as_ref(),
        )?;

        let header_partition_offset = stream.stream_position().map_err(mxf_core::Error::from)?;
        let reserved_header_size = options.header_size_or_default();
        let mut header_pack = PartitionPack::new(
            PartitionKind::Header,
            PartitionStatus::OpenIncomplete,
            operational_pattern,
            edit_rate,
        );
        header_pack.this_partition = header_partition_offset;
        header_pack.essence_containers.push(essence_container);
        header_pack.header_byte_count = reserved_header_size;
        header_pack.write(&mut stream)?;

        let metadata_start = stream.stream_position().map_err(mxf_core::Error::from)?;
        let metadata_len = write_header_metadata(&header.graph, &mut stream)?;
        if metadata_len > reserved_header_size {
            return Err(Error::Param(format!(
                "header metadata ({metadata_len} bytes) exceeds reserved header_size ({reserved_header_size})"
            )));
        }
        pad_header(&mut stream, metadata_start + reserved_header_size)?;

        let mut rip = RandomIndexPack::new();
        rip.push(HEADER_BODY_SID, header_partition_offset);

        let index = if let Some(sample_size) = cbr_sample_size {
            if wrap_mode == WrapMode::Frame {
                IndexWriter::Cbr(CbrIndexWriter::new(sample_size, edit_rate, ESSENCE_INDEX_SID, ESSENCE_BODY_SID))
            } else {
                IndexWriter::Vbr(VbrIndexWriter::new(edit_rate, ESSENCE_INDEX_SID, ESSENCE_BODY_SID, 0))
            }
        } else {
            IndexWriter::Vbr(VbrIndexWriter::new(edit_rate, ESSENCE_INDEX_SID, ESSENCE_BODY_SID, 0))
        };

        let partition_space_edit_units =
            ((options.partition_space_seconds * edit_rate.numerator as f64) / edit_rate.denominator.max(1) as f64).round().max(1.0) as u64;

        let mut writer = Self {
            state: WriterState::Init,
            stream,
            crypto,
            writer_info,
            options,
            edit_rate,
            essence_container,
            essence_element_key,
            operational_pattern,
            wrap_mode,
            cbr_sample_size,
            graph: header.graph,
            metadata_start,
            reserved_header_size,
            previous_partition_offset: header_partition_offset,
            rip,
            index,
            partition_space_edit_units,
            frames_in_partition: 0,
            frames_written: 0,
            frame_wrap_bytes_written: 0,
            clip_length_offset: 0,
            clip_bytes_written: 0,
            clip_essence_start: 0,
        };
        writer.open_body_partition()?;
        writer.state = WriterState::Ready;
        Ok(writer)
    }

    fn open_body_partition(&mut self) -> Result<()> {
        let offset = self.stream.stream_position().map_err(mxf_core::Error::from)?;
        let mut pack = PartitionPack::new(
            PartitionKind::Body,
            PartitionStatus::OpenIncomplete,
            self.operational_pattern,
            self.edit_rate,
        );
        pack.this_partition = offset;
        pack.previous_partition = self.previous_partition_offset;
        pack.body_sid = ESSENCE_BODY_SID;
        pack.body_offset = self.frame_wrap_bytes_written;
        pack.index_sid = ESSENCE_INDEX_SID;
        pack.essence_containers.push(self.essence_container);
        pack.write(&mut self.stream)?;
        self.rip.push(ESSENCE_BODY_SID, offset);
        self.previous_partition_offset = offset;
        self.frames_in_partition = 0;

        if self.wrap_mode == WrapMode::Clip && self.clip_length_offset == 0 {
            let (_, length_offset) = write_klv_reserved_length(&mut self.stream, &self.essence_element_key)?;
            self.clip_length_offset = length_offset;
            self.clip_essence_start = self.stream.stream_position().map_err(mxf_core::Error::from)?;
            if let IndexWriter::Vbr(vbr) = &mut self.index {
                vbr.current.essence_start_offset = self.clip_essence_start;
            }
            if let IndexWriter::Cbr(cbr) = &mut self.index {
                cbr.segment.essence_start_offset = self.clip_essence_start;
            }
        }
        Ok(())
    }

    /// `WriteFrame` (§4.8/§4.9, §4.11 READY/RUNNING→RUNNING).
    pub fn write_frame(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.state.require(&[WriterState::Ready, WriterState::Running], "write_frame")?;
        self.state = WriterState::Running;

        match self.wrap_mode {
            WrapMode::Frame => self.write_frame_wrapped(frame)?,
            WrapMode::Clip => self.write_clip_chunk(frame)?,
        }

        self.frames_written += 1;
        self.frames_in_partition += 1;
        if self.wrap_mode == WrapMode::Frame && self.frames_in_partition >= self.partition_space_edit_units {
            self.close_and_open_next_partition()?;
        }
        Ok(())
    }

    fn write_frame_wrapped(&mut self, frame: &FrameBuffer) -> Result<()> {
        let stream_offset = self.stream.stream_position().map_err(mxf_core::Error::from)?
            - self.essence_start_offset_for_current_partition();

        if self.writer_info.encrypted_essence {
            let key = self.options.encryption_key.ok_or(Error::Param("encrypt_essence set but no key provided".into()))?;
            let hmac_key = if self.writer_info.uses_hmac { self.options.hmac_key } else { None };
            let triplet = Triplet::encrypt(
                self.writer_info.context_id,
                self.essence_element_key,
                frame.data(),
                frame.plaintext_offset,
                &key,
                hmac_key.as_ref(),
                self.crypto.cipher.as_ref(),
                self.crypto.hmac.as_ref(),
                self.crypto.rng.as_ref(),
            )?;
            triplet.write(&mut self.stream)?;
        } else {
            write_klv(&mut self.stream, &self.essence_element_key, frame.data())?;
        }

        match &mut self.index {
            IndexWriter::Cbr(cbr) => cbr.advance(1),
            IndexWriter::Vbr(vbr) => vbr.push_index_entry(stream_offset),
        }
        self.frame_wrap_bytes_written += frame.data().len() as u64;
        Ok(())
    }

    fn write_clip_chunk(&mut self, frame: &FrameBuffer) -> Result<()> {
        let stream_offset =
            self.stream.stream_position().map_err(mxf_core::Error::from)? - self.clip_essence_start;
        self.stream.write_all(frame.data()).map_err(mxf_core::Error::from)?;
        self.clip_bytes_written += frame.data().len() as u64;

        match &mut self.index {
            IndexWriter::Cbr(cbr) => cbr.advance(1),
            IndexWriter::Vbr(vbr) => vbr.push_index_entry(stream_offset),
        }
        Ok(())
    }

    fn essence_start_offset_for_current_partition(&self) -> u64 {
        match &self.index {
            IndexWriter::Cbr(cbr) => cbr.segment.essence_start_offset,
            IndexWriter::Vbr(vbr) => vbr.current.essence_start_offset,
        }
    }

    fn close_and_open_next_partition(&mut self) -> Result<()> {
        let offset = self.stream.stream_position().map_err(mxf_core::Error::from)?;
        if let IndexWriter::Vbr(vbr) = &mut self.index {
            for segment in vbr.take_all(offset) {
                segment.write(&mut self.stream)?;
            }
        }
        self.open_body_partition()
    }

    /// `Finalize` (§4.11 RUNNING→FINAL): writes the final index segments,
    /// backpatches the clip-wrap length if needed, writes the Footer
    /// partition, and appends the RIP trailer.
    pub fn finalize(&mut self) -> Result<()> {
        self.state.require(&[WriterState::Running, WriterState::Ready], "finalize")?;

        set_durations(&mut self.graph, self.frames_written as i64)?;
        let resume = self.stream.stream_position().map_err(mxf_core::Error::from)?;
        self.stream.seek(SeekFrom::Start(self.metadata_start)).map_err(mxf_core::Error::from)?;
        let rewritten_len = write_header_metadata(&self.graph, &mut self.stream)?;
        if rewritten_len > self.reserved_header_size {
            return Err(Error::Param(format!(
                "header metadata grew from duration backpatch ({rewritten_len} bytes, reserved {})",
                self.reserved_header_size
            )));
        }
        pad_header(&mut self.stream, self.metadata_start + self.reserved_header_size)?;
        self.stream.seek(SeekFrom::Start(resume)).map_err(mxf_core::Error::from)?;

        if self.wrap_mode == WrapMode::Clip && self.clip_length_offset != 0 {
            backpatch_length(&mut self.stream, self.clip_length_offset, self.clip_bytes_written)?;
        }

        let footer_offset = self.stream.stream_position().map_err(mxf_core::Error::from)?;
        if let IndexWriter::Vbr(vbr) = &mut self.index {
            for segment in vbr.take_all(footer_offset) {
                segment.write(&mut self.stream)?;
            }
        } else if let IndexWriter::Cbr(cbr) = &self.index {
            cbr.segment.clone().write(&mut self.stream)?;
        }

        let mut footer = PartitionPack::new(
            PartitionKind::Footer,
            PartitionStatus::ClosedComplete,
            self.operational_pattern,
            self.edit_rate,
        );
        footer.this_partition = footer_offset;
        footer.previous_partition = self.previous_partition_offset;
        footer.footer_partition = footer_offset;
        footer.body_sid = 0;
        footer.index_sid = ESSENCE_INDEX_SID;
        footer.essence_containers.push(self.essence_container);
        footer.write(&mut self.stream)?;
        self.rip.push(0, footer_offset);

        self.rip.write(&mut self.stream)?;
        self.state = WriterState::Final;
        Ok(())
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}
