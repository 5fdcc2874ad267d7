//! Partition Pack codec (§3 Partition Pack, §4.5).

use crate::{Error, Result};
use mxf_core::byteio::{read_u32, read_u64, write_u32, write_u64, ReadSeek, WriteSeek};
use mxf_core::dictionary::PARTITION_PACK_PREFIX;
use mxf_core::{Rational, Ul};
use mxf_klv::klv::{write_klv, KlvHeader};
use std::io::Seek;

/// Byte 13 of the partition-pack UL: what region of the file this partition
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Header,
    Body,
    Footer,
    GenericStream,
}

impl PartitionKind {
    fn byte(self) -> u8 {
        match self {
            PartitionKind::Header => 0x02,
            PartitionKind::Body => 0x03,
            PartitionKind::Footer => 0x04,
            PartitionKind::GenericStream => 0x11,
        }
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x02 => Ok(PartitionKind::Header),
            0x03 => Ok(PartitionKind::Body),
            0x04 => Ok(PartitionKind::Footer),
            0x11 => Ok(PartitionKind::GenericStream),
            other => Err(Error::BadPartition(vec![other])),
        }
    }
}

/// Byte 14 of the partition-pack UL: openness/completeness (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStatus {
    OpenIncomplete,
    ClosedIncomplete,
    OpenComplete,
    ClosedComplete,
}

impl PartitionStatus {
    fn byte(self) -> u8 {
        match self {
            PartitionStatus::OpenIncomplete => 0x01,
            PartitionStatus::ClosedIncomplete => 0x02,
            PartitionStatus::OpenComplete => 0x03,
            PartitionStatus::ClosedComplete => 0x04,
        }
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x01 => Ok(PartitionStatus::OpenIncomplete),
            0x02 => Ok(PartitionStatus::ClosedIncomplete),
            0x03 => Ok(PartitionStatus::OpenComplete),
            0x04 => Ok(PartitionStatus::ClosedComplete),
            other => Err(Error::BadPartition(vec![other])),
        }
    }
}

pub fn partition_key(kind: PartitionKind, status: PartitionStatus) -> Ul {
    let mut bytes = [0u8; 16];
    bytes[..13].copy_from_slice(&PARTITION_PACK_PREFIX);
    bytes[13] = kind.byte();
    bytes[14] = status.byte();
    bytes[15] = 0x00;
    Ul::new(bytes)
}

/// Fixed-layout partition pack value (§3 Partition Pack).
#[derive(Debug, Clone)]
pub struct PartitionPack {
    pub kind: PartitionKind,
    pub status: PartitionStatus,
    pub major_version: u16,
    pub minor_version: u16,
    pub kag_size: u32,
    pub this_partition: u64,
    pub previous_partition: u64,
    pub footer_partition: u64,
    pub header_byte_count: u64,
    pub index_byte_count: u64,
    pub index_sid: u32,
    pub body_offset: u64,
    pub body_sid: u32,
    pub operational_pattern: Ul,
    pub essence_containers: Vec<Ul>,
    /// Edit rate, used only to derive `IndexEditRate` defaults for sibling
    /// index segments; not part of the wire value.
    pub edit_rate: Rational,
}

impl PartitionPack {
    pub fn new(kind: PartitionKind, status: PartitionStatus, operational_pattern: Ul, edit_rate: Rational) -> Self {
        Self {
            kind,
            status,
            major_version: 1,
            minor_version: 3,
            kag_size: 1,
            this_partition: 0,
            previous_partition: 0,
            footer_partition: 0,
            header_byte_count: 0,
            index_byte_count: 0,
            index_sid: 0,
            body_offset: 0,
            body_sid: 0,
            operational_pattern,
            essence_containers: Vec::new(),
            edit_rate,
        }
    }

    /// Serialize and write this partition pack's KLV, returning the absolute
    /// offset the KLV key began at (callers record this as `ThisPartition`
    /// for the *next* partition's `PreviousPartition` linkage).
    pub fn write(&self, w: &mut dyn WriteSeek) -> Result<u64> {
        let key = partition_key(self.kind, self.status);
        let mut payload = Vec::with_capacity(80 + self.essence_containers.len() * 16);
        let mut cursor = std::io::Cursor::new(&mut payload);
        mxf_core::byteio::write_u16(&mut cursor, self.major_version)?;
        mxf_core::byteio::write_u16(&mut cursor, self.minor_version)?;
        write_u32(&mut cursor, self.kag_size)?;
        write_u64(&mut cursor, self.this_partition)?;
        write_u64(&mut cursor, self.previous_partition)?;
        write_u64(&mut cursor, self.footer_partition)?;
        write_u64(&mut cursor, self.header_byte_count)?;
        write_u64(&mut cursor, self.index_byte_count)?;
        write_u32(&mut cursor, self.index_sid)?;
        write_u64(&mut cursor, self.body_offset)?;
        write_u32(&mut cursor, self.body_sid)?;
        std::io::Write::write_all(&mut cursor, self.operational_pattern.as_bytes())?;
        write_u32(&mut cursor, self.essence_containers.len() as u32)?;
        write_u32(&mut cursor, 16)?;
        for ec in &self.essence_containers {
            std::io::Write::write_all(&mut cursor, ec.as_bytes())?;
        }
        let offset = write_klv(w, &key, &payload)?;
        tracing::debug!(kind = ?self.kind, status = ?self.status, offset, "wrote partition pack");
        Ok(offset)
    }

    pub fn read(r: &mut dyn ReadSeek) -> Result<Self> {
        let hdr = KlvHeader::read(r)?;
        let key_bytes = hdr.key.as_bytes();
        if key_bytes[..13] != PARTITION_PACK_PREFIX {
            return Err(Error::BadPartition(key_bytes.to_vec()));
        }
        let kind = PartitionKind::from_byte(key_bytes[13])?;
        let status = PartitionStatus::from_byte(key_bytes[14])?;

        let major_version = mxf_core::byteio::read_u16(r)?;
        let minor_version = mxf_core::byteio::read_u16(r)?;
        let kag_size = read_u32(r)?;
        let this_partition = read_u64(r)?;
        let previous_partition = read_u64(r)?;
        let footer_partition = read_u64(r)?;
        let header_byte_count = read_u64(r)?;
        let index_byte_count = read_u64(r)?;
        let index_sid = read_u32(r)?;
        let body_offset = read_u64(r)?;
        let body_sid = read_u32(r)?;
        let mut op_bytes = [0u8; 16];
        std::io::Read::read_exact(r, &mut op_bytes)?;
        let operational_pattern = Ul::new(op_bytes);
        let count = read_u32(r)?;
        let item_len = read_u32(r)?;
        let mut essence_containers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut ec_bytes = [0u8; 16];
            std::io::Read::read_exact(r, &mut ec_bytes)?;
            essence_containers.push(Ul::new(ec_bytes));
            if item_len > 16 {
                r.seek(std::io::SeekFrom::Current((item_len - 16) as i64))?;
            }
        }
        hdr.skip(r)?;

        Ok(Self {
            kind,
            status,
            major_version,
            minor_version,
            kag_size,
            this_partition,
            previous_partition,
            footer_partition,
            header_byte_count,
            index_byte_count,
            index_sid,
            body_offset,
            body_sid,
            operational_pattern,
            essence_containers,
            edit_rate: Rational::new(0, 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn op_atom() -> Ul {
        mxf_core::dictionary::Dictionary::ul("OPAtom").unwrap()
    }

    #[test]
    fn roundtrip_header_partition() {
        let mut pp = PartitionPack::new(
            PartitionKind::Header,
            PartitionStatus::ClosedComplete,
            op_atom(),
            Rational::new(24, 1),
        );
        pp.header_byte_count = 16384;
        pp.essence_containers.push(jpeg2000_ec());

        let mut buf = Cursor::new(Vec::new());
        let offset = pp.write(&mut buf).unwrap();
        assert_eq!(offset, 0);

        let mut cur = Cursor::new(buf.into_inner());
        let read_back = PartitionPack::read(&mut cur).unwrap();
        assert_eq!(read_back.kind, PartitionKind::Header);
        assert_eq!(read_back.status, PartitionStatus::ClosedComplete);
        assert_eq!(read_back.header_byte_count, 16384);
        assert_eq!(read_back.essence_containers.len(), 1);
        assert_eq!(read_back.operational_pattern, op_atom());
    }

    fn jpeg2000_ec() -> Ul {
        mxf_core::dictionary::Dictionary::ul("JPEG2000EssenceFrame").unwrap()
    }

    #[test]
    fn rejects_non_partition_key() {
        let mut buf = Cursor::new(Vec::new());
        write_klv(&mut buf, &Ul::new([0xAA; 16]), &[]).unwrap();
        let mut cur = Cursor::new(buf.into_inner());
        assert!(PartitionPack::read(&mut cur).is_err());
    }

    proptest::proptest! {
        #[test]
        fn body_partition_roundtrips_for_any_offsets(
            header_byte_count in proptest::prelude::any::<u64>(),
            body_offset in proptest::prelude::any::<u64>(),
            index_sid in proptest::prelude::any::<u32>(),
        ) {
            let mut pp = PartitionPack::new(PartitionKind::Body, PartitionStatus::OpenIncomplete, op_atom(), Rational::new(24, 1));
            pp.header_byte_count = header_byte_count;
            pp.body_offset = body_offset;
            pp.index_sid = index_sid;
            pp.essence_containers.push(jpeg2000_ec());

            let mut buf = Cursor::new(Vec::new());
            pp.write(&mut buf).unwrap();
            let mut cur = Cursor::new(buf.into_inner());
            let read_back = PartitionPack::read(&mut cur).unwrap();

            proptest::prop_assert_eq!(read_back.header_byte_count, header_byte_count);
            proptest::prop_assert_eq!(read_back.body_offset, body_offset);
            proptest::prop_assert_eq!(read_back.index_sid, index_sid);
        }
    }
}
