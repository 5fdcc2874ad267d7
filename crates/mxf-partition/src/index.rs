//! CBR/VBR Index Table Segment codec and lookup (§3 Index Table Segment,
//! §4.7).

use crate::{Error, Result};
use mxf_core::byteio::{read_i64, read_u32, read_u8, write_i64, write_u32, write_u8, ReadSeek, WriteSeek};
use mxf_core::dictionary::INDEX_TABLE_SEGMENT;
use mxf_core::Rational;
use mxf_klv::klv::{write_klv, KlvHeader};
use std::io::Seek;

/// A per-segment hard cap on VBR entries; rolling over to a new segment even
/// within one partition is defensive and rarely hit in practice (§4.7).
pub const MAX_VBR_ENTRIES_PER_SEGMENT: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub temporal_offset: i8,
    pub key_frame_offset: i8,
    pub flags: u8,
    pub stream_offset: u64,
}

#[derive(Debug, Clone)]
pub struct IndexTableSegment {
    pub index_edit_rate: Rational,
    pub index_start_position: i64,
    pub index_duration: i64,
    /// Nonzero => CBR (implicit offsets); zero => VBR (explicit `entries`).
    pub edit_unit_byte_count: u32,
    pub index_sid: u32,
    pub body_sid: u32,
    pub slice_count: u8,
    pub pos_table_count: u8,
    pub entries: Vec<IndexEntry>,
    /// Absolute file offset of the first essence byte this segment's
    /// partition carries. Not part of the wire value; stamped by the writer
    /// and recovered by the reader from the owning partition's BodyOffset.
    pub essence_start_offset: u64,
}

impl IndexTableSegment {
    pub fn is_cbr(&self) -> bool {
        self.edit_unit_byte_count != 0
    }

    pub fn write(&self, w: &mut dyn WriteSeek) -> Result<u64> {
        let mut payload = Vec::with_capacity(40 + self.entries.len() * 11);
        let mut cursor = std::io::Cursor::new(&mut payload);
        write_i32_pair(&mut cursor, self.index_edit_rate)?;
        write_i64(&mut cursor, self.index_start_position)?;
        write_i64(&mut cursor, self.index_duration)?;
        write_u32(&mut cursor, self.edit_unit_byte_count)?;
        write_u32(&mut cursor, self.index_sid)?;
        write_u32(&mut cursor, self.body_sid)?;
        write_u8(&mut cursor, self.slice_count)?;
        write_u8(&mut cursor, self.pos_table_count)?;
        // DeltaEntryArray: one entry {PosTable=0, Slice=0, ElementDelta=0}.
        write_u32(&mut cursor, 1)?;
        write_u32(&mut cursor, 6)?;
        write_u8(&mut cursor, 0)?;
        write_u8(&mut cursor, 0)?;
        write_u32(&mut cursor, 0)?;

        if self.is_cbr() {
            write_u32(&mut cursor, 0)?;
            write_u32(&mut cursor, 11)?;
        } else {
            write_u32(&mut cursor, self.entries.len() as u32)?;
            write_u32(&mut cursor, 11)?;
            for entry in &self.entries {
                write_u8(&mut cursor, entry.temporal_offset as u8)?;
                write_u8(&mut cursor, entry.key_frame_offset as u8)?;
                write_u8(&mut cursor, entry.flags)?;
                mxf_core::byteio::write_u64(&mut cursor, entry.stream_offset)?;
            }
        }
        Ok(write_klv(w, &INDEX_TABLE_SEGMENT, &payload)?)
    }

    pub fn read(r: &mut dyn ReadSeek) -> Result<Self> {
        let hdr = KlvHeader::read(r)?;
        if hdr.key != INDEX_TABLE_SEGMENT {
            return Err(Error::BadIndex("key is not IndexTableSegment".into()));
        }
        let index_edit_rate = read_i32_pair(r)?;
        let index_start_position = read_i64(r)?;
        let index_duration = read_i64(r)?;
        let edit_unit_byte_count = read_u32(r)?;
        let index_sid = read_u32(r)?;
        let body_sid = read_u32(r)?;
        let slice_count = read_u8(r)?;
        let pos_table_count = read_u8(r)?;

        let delta_count = read_u32(r)?;
        let delta_item_len = read_u32(r)?;
        for _ in 0..delta_count {
            let mut skip = vec![0u8; delta_item_len as usize];
            std::io::Read::read_exact(r, &mut skip)?;
        }

        let entry_count = read_u32(r)?;
        let entry_item_len = read_u32(r)?;
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            let temporal_offset = read_u8(r)? as i8;
            let key_frame_offset = read_u8(r)? as i8;
            let flags = read_u8(r)?;
            let stream_offset = mxf_core::byteio::read_u64(r)?;
            entries.push(IndexEntry { temporal_offset, key_frame_offset, flags, stream_offset });
            if entry_item_len > 11 {
                r.seek(std::io::SeekFrom::Current((entry_item_len - 11) as i64))?;
            }
        }
        hdr.skip(r)?;

        if edit_unit_byte_count == 0 && entries.len() as i64 != index_duration {
            return Err(Error::BadIndex(format!(
                "VBR segment entry count {} does not match IndexDuration {}",
                entries.len(),
                index_duration
            )));
        }

        Ok(Self {
            index_edit_rate,
            index_start_position,
            index_duration,
            edit_unit_byte_count,
            index_sid,
            body_sid,
            slice_count,
            pos_table_count,
            entries,
            essence_start_offset: 0,
        })
    }
}

fn write_i32_pair(w: &mut dyn WriteSeek, r: Rational) -> Result<()> {
    r.write(w)
}

fn read_i32_pair(r: &mut dyn ReadSeek) -> Result<Rational> {
    Ok(Rational::read(r)?)
}

/// CBR index writer: a single segment covering the whole container.
#[derive(Debug, Clone)]
pub struct CbrIndexWriter {
    pub segment: IndexTableSegment,
}

impl CbrIndexWriter {
    pub fn new(sample_size_bytes: u32, edit_rate: Rational, index_sid: u32, body_sid: u32) -> Self {
        Self {
            segment: IndexTableSegment {
                index_edit_rate: edit_rate,
                index_start_position: 0,
                index_duration: 0,
                edit_unit_byte_count: sample_size_bytes,
                index_sid,
                body_sid,
                slice_count: 0,
                pos_table_count: 0,
                entries: Vec::new(),
                essence_start_offset: 0,
            },
        }
    }

    pub fn advance(&mut self, edit_units: i64) {
        self.segment.index_duration += edit_units;
    }

    pub fn offset_of(&self, frame_num: u64) -> u64 {
        frame_num * self.segment.edit_unit_byte_count as u64 + self.segment.essence_start_offset
    }
}

/// VBR index writer: maintains a "current" segment, rolling over at
/// [`MAX_VBR_ENTRIES_PER_SEGMENT`] or when the caller closes a partition.
#[derive(Debug, Clone)]
pub struct VbrIndexWriter {
    pub edit_rate: Rational,
    pub index_sid: u32,
    pub body_sid: u32,
    pub current: IndexTableSegment,
    pub finished: Vec<IndexTableSegment>,
}

impl VbrIndexWriter {
    pub fn new(edit_rate: Rational, index_sid: u32, body_sid: u32, essence_start_offset: u64) -> Self {
        Self {
            edit_rate,
            index_sid,
            body_sid,
            current: Self::fresh_segment(edit_rate, index_sid, body_sid, 0, essence_start_offset),
            finished: Vec::new(),
        }
    }

    fn fresh_segment(
        edit_rate: Rational,
        index_sid: u32,
        body_sid: u32,
        start_position: i64,
        essence_start_offset: u64,
    ) -> IndexTableSegment {
        IndexTableSegment {
            index_edit_rate: edit_rate,
            index_start_position: start_position,
            index_duration: 0,
            edit_unit_byte_count: 0,
            index_sid,
            body_sid,
            slice_count: 0,
            pos_table_count: 0,
            entries: Vec::new(),
            essence_start_offset,
        }
    }

    /// Append one index entry for the frame just written, rolling over to a
    /// new segment if the cap is reached.
    pub fn push_index_entry(&mut self, stream_offset: u64) {
        if self.current.entries.len() >= MAX_VBR_ENTRIES_PER_SEGMENT {
            self.roll_over(self.current.essence_start_offset);
        }
        self.current.entries.push(IndexEntry {
            temporal_offset: 0,
            key_frame_offset: 0,
            flags: 0,
            stream_offset,
        });
        self.current.index_duration += 1;
    }

    /// Finalize the current segment and start a fresh one (used both by the
    /// per-partition cap and the explicit body/index partition boundary in
    /// the frame-wrap writer).
    pub fn roll_over(&mut self, next_essence_start_offset: u64) {
        let next_start = self.current.index_start_position + self.current.index_duration;
        let finished = std::mem::replace(
            &mut self.current,
            Self::fresh_segment(self.edit_rate, self.index_sid, self.body_sid, next_start, next_essence_start_offset),
        );
        tracing::debug!(
            index_start_position = finished.index_start_position,
            index_duration = finished.index_duration,
            next_start,
            "rolled over VBR index segment"
        );
        self.finished.push(finished);
    }

    /// Drain all segments (finished + current, if non-empty), leaving the
    /// writer ready for a fresh current segment.
    pub fn take_all(&mut self, next_essence_start_offset: u64) -> Vec<IndexTableSegment> {
        if !self.current.entries.is_empty() {
            self.roll_over(next_essence_start_offset);
        }
        std::mem::take(&mut self.finished)
    }
}

/// Unified reader over every IndexTableSegment gathered from a file's
/// partitions (§4.7 `IndexReader`).
#[derive(Debug, Clone, Default)]
pub struct IndexReader {
    pub segments: Vec<IndexTableSegment>,
}

impl IndexReader {
    pub fn new() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn add_segment(&mut self, segment: IndexTableSegment) {
        self.segments.push(segment);
    }

    /// Resolve `frame_num` to an absolute file offset (§4.7).
    pub fn lookup(&self, frame_num: u64) -> Result<u64> {
        for segment in &self.segments {
            if segment.is_cbr() {
                let container_len = segment.index_duration.max(0) as u64;
                if container_len != 0 && frame_num >= container_len {
                    continue;
                }
                return Ok(frame_num * segment.edit_unit_byte_count as u64 + segment.essence_start_offset);
            }
            let start = segment.index_start_position.max(0) as u64;
            let end = start + segment.index_duration.max(0) as u64;
            if frame_num >= start && frame_num < end {
                let idx = (frame_num - start) as usize;
                let entry = segment
                    .entries
                    .get(idx)
                    .ok_or_else(|| Error::BadIndex("entry index within segment bounds but array too short".into()))?;
                return Ok(segment.essence_start_offset + entry.stream_offset);
            }
        }
        let container_len: u64 = self
            .segments
            .iter()
            .map(|s| s.index_duration.max(0) as u64)
            .max()
            .unwrap_or(0);
        Err(Error::OutOfRange { frame_num, container_len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn cbr_offset_is_linear() {
        let mut w = CbrIndexWriter::new(12000, Rational::new(24, 1), 2, 1);
        w.segment.essence_start_offset = 16384;
        w.advance(48);
        assert_eq!(w.offset_of(0), 16384);
        assert_eq!(w.offset_of(23), 23 * 12000 + 16384);
    }

    #[test]
    fn vbr_rolls_over_at_cap() {
        let mut w = VbrIndexWriter::new(Rational::new(24, 1), 2, 1, 0);
        for i in 0..MAX_VBR_ENTRIES_PER_SEGMENT + 5 {
            w.push_index_entry(i as u64 * 100);
        }
        assert_eq!(w.finished.len(), 1);
        assert_eq!(w.finished[0].entries.len(), MAX_VBR_ENTRIES_PER_SEGMENT);
        assert_eq!(w.current.entries.len(), 5);
    }

    #[test]
    fn roundtrip_vbr_segment() {
        let mut segment = IndexTableSegment {
            index_edit_rate: Rational::new(24, 1),
            index_start_position: 0,
            index_duration: 2,
            edit_unit_byte_count: 0,
            index_sid: 2,
            body_sid: 1,
            slice_count: 0,
            pos_table_count: 0,
            entries: vec![
                IndexEntry { temporal_offset: 0, key_frame_offset: 0, flags: 0, stream_offset: 0 },
                IndexEntry { temporal_offset: 0, key_frame_offset: 0, flags: 0, stream_offset: 1000 },
            ],
            essence_start_offset: 0,
        };
        segment.essence_start_offset = 0;

        let mut buf = Cursor::new(Vec::new());
        segment.write(&mut buf).unwrap();
        let mut cur = Cursor::new(buf.into_inner());
        let read_back = IndexTableSegment::read(&mut cur).unwrap();
        assert_eq!(read_back.entries.len(), 2);
        assert_eq!(read_back.entries[1].stream_offset, 1000);
    }

    #[test]
    fn unified_lookup_cbr_and_out_of_range() {
        let mut reader = IndexReader::new();
        reader.add_segment(IndexTableSegment {
            index_edit_rate: Rational::new(24, 1),
            index_start_position: 0,
            index_duration: 48,
            edit_unit_byte_count: 12000,
            index_sid: 2,
            body_sid: 1,
            slice_count: 0,
            pos_table_count: 0,
            entries: Vec::new(),
            essence_start_offset: 16384,
        });
        assert_eq!(reader.lookup(0).unwrap(), 16384);
        assert_eq!(reader.lookup(23).unwrap(), 23 * 12000 + 16384);
        assert!(reader.lookup(48).is_err());
    }
}
