//! Random Index Pack: trailing (BodySID, ByteOffset) table (§3 RIP, §4.6).

use crate::{Error, Result};
use mxf_core::byteio::{read_u32, read_u64, write_u32, write_u64, ReadSeek, WriteSeek};
use mxf_core::dictionary::RANDOM_INDEX_PACK;
use mxf_klv::klv::{write_klv, KlvHeader};
use std::io::{Seek, SeekFrom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RipEntry {
    pub body_sid: u32,
    pub byte_offset: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RandomIndexPack {
    pub entries: Vec<RipEntry>,
}

impl RandomIndexPack {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, body_sid: u32, byte_offset: u64) {
        self.entries.push(RipEntry { body_sid, byte_offset });
    }

    /// Write the RIP KLV followed by its 4-byte total length (§4.6). Returns
    /// the absolute offset the RIP started at.
    pub fn write(&self, w: &mut dyn WriteSeek) -> Result<u64> {
        if self.entries.len() < 2 {
            return Err(Error::BadRip("RIP must have at least header and footer entries".into()));
        }
        let rip_offset = w.stream_position()?;
        let mut payload = Vec::with_capacity(self.entries.len() * 12);
        let mut cursor = std::io::Cursor::new(&mut payload);
        for entry in &self.entries {
            write_u32(&mut cursor, entry.body_sid)?;
            write_u64(&mut cursor, entry.byte_offset)?;
        }
        write_klv(w, &RANDOM_INDEX_PACK, &payload)?;
        let total_len = (w.stream_position()? - rip_offset) + 4;
        write_u32(w, total_len as u32)?;
        Ok(rip_offset)
    }

    /// Locate and parse the RIP from the end of the stream (§4.6: seek to
    /// `file_size - 4`, read the length, seek back, parse).
    pub fn read_from_end(r: &mut dyn ReadSeek) -> Result<Self> {
        let file_len = r.seek(SeekFrom::End(0))?;
        if file_len < 4 {
            return Err(Error::BadRip("file too short to contain a RIP length field".into()));
        }
        r.seek(SeekFrom::Start(file_len - 4))?;
        let total_len = read_u32(r)? as u64;
        if total_len > file_len {
            return Err(Error::BadRip(format!("RIP length {total_len} exceeds file size {file_len}")));
        }
        r.seek(SeekFrom::Start(file_len - total_len))?;
        let hdr = KlvHeader::read(r)?;
        if hdr.key != RANDOM_INDEX_PACK {
            return Err(Error::BadRip("key at computed RIP offset is not RandomIndexPack".into()));
        }
        if hdr.length % 12 != 0 {
            return Err(Error::BadRip(format!("RIP value length {} not a multiple of 12", hdr.length)));
        }
        let count = hdr.length / 12;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let body_sid = read_u32(r)?;
            let byte_offset = read_u64(r)?;
            entries.push(RipEntry { body_sid, byte_offset });
        }
        if entries.len() < 2 {
            return Err(Error::BadRip("RIP must have at least header and footer entries".into()));
        }
        if entries[0].body_sid != 0 {
            return Err(Error::BadRip("first RIP entry must reference the header partition (BodySID=0)".into()));
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Seek};

    #[test]
    fn roundtrip_rip() {
        let mut rip = RandomIndexPack::new();
        rip.push(0, 0);
        rip.push(1, 16384);
        rip.push(0, 600_000);

        let mut buf = Cursor::new(Vec::new());
        buf.get_mut().extend_from_slice(b"leading file bytes before the RIP starts here");
        buf.seek(SeekFrom::End(0)).unwrap();
        rip.write(&mut buf).unwrap();

        let mut cur = Cursor::new(buf.into_inner());
        let read_back = RandomIndexPack::read_from_end(&mut cur).unwrap();
        assert_eq!(read_back.entries, rip.entries);
    }

    #[test]
    fn rejects_non_rip_trailer() {
        let mut buf = Cursor::new(vec![0u8; 20]);
        assert!(RandomIndexPack::read_from_end(&mut buf).is_err());
    }
}
