//! KLV packet codec (§3 KLV Packet, §4.3).

use crate::Result;
use mxf_core::byteio::{BerLength, ReadSeek, WriteSeek};
use mxf_core::Ul;
use std::io::{Read, Seek, SeekFrom, Write};

/// A parsed `Key(16) · Length(BER) · Value(Length bytes)` header. `Value` is
/// fetched lazily via [`KlvHeader::read_value`] so large essence packets are
/// never double-buffered.
#[derive(Debug, Clone, Copy)]
pub struct KlvHeader {
    pub key: Ul,
    pub length: u64,
    /// Absolute byte offset of the KLV key (this packet's start).
    pub packet_offset: u64,
    /// Absolute byte offset of the first value byte.
    pub value_offset: u64,
}

impl KlvHeader {
    /// Offset of the first byte after this packet's value.
    pub fn end_offset(&self) -> u64 {
        self.value_offset + self.length
    }

    /// Read the Key+BER-Length header at the reader's current position.
    pub fn read(r: &mut dyn ReadSeek) -> Result<Self> {
        let packet_offset = r.stream_position()?;
        let mut key = [0u8; 16];
        r.read_exact(&mut key)?;
        let (length, _) = BerLength::read(r)?;
        let value_offset = r.stream_position()?;
        Ok(Self { key: Ul::new(key), length, packet_offset, value_offset })
    }

    /// Read the full value into an owned buffer. Callers streaming large
    /// essence frames should prefer seeking to `value_offset` and reading in
    /// chunks instead.
    pub fn read_value(&self, r: &mut dyn ReadSeek) -> Result<Vec<u8>> {
        r.seek(SeekFrom::Start(self.value_offset))?;
        let mut buf = vec![0u8; self.length as usize];
        r.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Seek past this packet's value, to the next KLV.
    pub fn skip(&self, r: &mut dyn ReadSeek) -> Result<()> {
        r.seek(SeekFrom::Start(self.end_offset()))?;
        Ok(())
    }
}

/// Write `key · BER(payload.len()) · payload`, returning the absolute offset
/// at which the packet began (callers capture this for `ThisPartition` /
/// index `StreamOffset` bookkeeping).
pub fn write_klv(w: &mut dyn WriteSeek, key: &Ul, payload: &[u8]) -> Result<u64> {
    let packet_offset = w.stream_position()?;
    w.write_all(key.as_bytes())?;
    BerLength::write(w, payload.len() as u64)?;
    w.write_all(payload)?;
    Ok(packet_offset)
}

/// Write `key · <reserved 8-byte BER of zero> ·` with no value yet, returning
/// `(packet_offset, length_field_offset)`. Used by the clip-wrap writer so
/// the BER length can be backpatched once the total payload size is known
/// (§4.9 — the 8-byte BER form is mandatory there because it must be
/// backpatchable).
pub fn write_klv_reserved_length(w: &mut dyn WriteSeek, key: &Ul) -> Result<(u64, u64)> {
    let packet_offset = w.stream_position()?;
    w.write_all(key.as_bytes())?;
    let length_field_offset = w.stream_position()?;
    BerLength::write_fixed(w, 0, 8)?;
    Ok((packet_offset, length_field_offset))
}

/// Backpatch a reserved 8-byte BER length field written by
/// [`write_klv_reserved_length`].
pub fn backpatch_length(w: &mut dyn WriteSeek, length_field_offset: u64, length: u64) -> Result<()> {
    let current = w.stream_position()?;
    w.seek(SeekFrom::Start(length_field_offset))?;
    BerLength::write_fixed(w, length, 8)?;
    w.seek(SeekFrom::Start(current))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_key() -> Ul {
        Ul::new([0x06, 0x0E, 0x2B, 0x34, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12])
    }

    #[test]
    fn roundtrip_plain_klv() {
        let mut buf = Cursor::new(Vec::new());
        let key = test_key();
        let off = write_klv(&mut buf, &key, b"hello world").unwrap();
        assert_eq!(off, 0);

        let mut cur = Cursor::new(buf.into_inner());
        let hdr = KlvHeader::read(&mut cur).unwrap();
        assert_eq!(hdr.key, key);
        assert_eq!(hdr.length, 11);
        assert_eq!(hdr.read_value(&mut cur).unwrap(), b"hello world");
    }

    #[test]
    fn reserved_length_backpatch() {
        let mut buf = Cursor::new(Vec::new());
        let key = test_key();
        let (packet_offset, len_off) = write_klv_reserved_length(&mut buf, &key).unwrap();
        assert_eq!(packet_offset, 0);
        buf.get_mut().extend_from_slice(b"0123456789");
        backpatch_length(&mut buf, len_off, 10).unwrap();

        let mut cur = Cursor::new(buf.into_inner());
        let hdr = KlvHeader::read(&mut cur).unwrap();
        assert_eq!(hdr.length, 10);
        assert_eq!(hdr.read_value(&mut cur).unwrap(), b"0123456789");
    }

    #[test]
    fn skip_advances_to_next_packet() {
        let mut buf = Cursor::new(Vec::new());
        let key = test_key();
        write_klv(&mut buf, &key, b"first").unwrap();
        write_klv(&mut buf, &key, b"second").unwrap();

        let mut cur = Cursor::new(buf.into_inner());
        let first = KlvHeader::read(&mut cur).unwrap();
        first.skip(&mut cur).unwrap();
        let second = KlvHeader::read(&mut cur).unwrap();
        assert_eq!(second.read_value(&mut cur).unwrap(), b"second");
    }

    proptest::proptest! {
        #[test]
        fn klv_roundtrips_for_any_payload(payload in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..4096)) {
            let mut buf = Cursor::new(Vec::new());
            let key = test_key();
            write_klv(&mut buf, &key, &payload).unwrap();

            let mut cur = Cursor::new(buf.into_inner());
            let hdr = KlvHeader::read(&mut cur).unwrap();
            proptest::prop_assert_eq!(hdr.key, key);
            proptest::prop_assert_eq!(hdr.length, payload.len() as u64);
            proptest::prop_assert_eq!(hdr.read_value(&mut cur).unwrap(), payload);
        }
    }
}
