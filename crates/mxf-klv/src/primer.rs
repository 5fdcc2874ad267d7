//! Primer Pack: local-tag <-> UL bindings for one header metadata section
//! (§3 Primer Pack, §4.3).

use crate::klv::{write_klv, KlvHeader};
use crate::Result;
use mxf_core::byteio::{read_u16, read_u32, write_u16, write_u32, ReadSeek, WriteSeek};
use mxf_core::dictionary::PRIMER_PACK;
use mxf_core::Ul;
use std::collections::HashMap;
use std::io::{Read, Write};

/// Dynamic local tags begin here; 0x0001-0x7FFF is reserved for
/// registry-assigned tags (not auto-allocated by this writer).
const FIRST_DYNAMIC_TAG: u16 = 0x8000;

/// Maps 2-byte local tags to full ULs for one partition's worth of metadata
/// sets. A property encoded in TLV within a set uses its local tag; this
/// table resolves it.
#[derive(Debug, Default, Clone)]
pub struct Primer {
    tag_to_ul: HashMap<u16, Ul>,
    ul_to_tag: HashMap<Ul, u16>,
    next_dynamic: u16,
}

impl Primer {
    pub fn new() -> Self {
        Self { tag_to_ul: HashMap::new(), ul_to_tag: HashMap::new(), next_dynamic: FIRST_DYNAMIC_TAG }
    }

    /// Return the local tag for `ul`, allocating a fresh dynamic tag on
    /// first use (§3 invariant: every local tag used inside a set in a
    /// partition must appear in that partition's Primer).
    pub fn tag_for_ul(&mut self, ul: Ul) -> crate::Result<u16> {
        if let Some(&tag) = self.ul_to_tag.get(&ul) {
            return Ok(tag);
        }
        if self.next_dynamic == 0 {
            return Err(crate::Error::TagRangeExhausted);
        }
        let tag = self.next_dynamic;
        self.next_dynamic = self.next_dynamic.checked_add(1).unwrap_or(0);
        self.tag_to_ul.insert(tag, ul);
        self.ul_to_tag.insert(ul, tag);
        Ok(tag)
    }

    pub fn ul_for_tag(&self, tag: u16) -> Option<Ul> {
        self.tag_to_ul.get(&tag).copied()
    }

    pub fn len(&self) -> usize {
        self.tag_to_ul.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_to_ul.is_empty()
    }

    /// Read a Primer Pack KLV at the reader's current position.
    pub fn read(r: &mut dyn ReadSeek) -> Result<Self> {
        let hdr = KlvHeader::read(r)?;
        let count = read_u32(r)?;
        let item_len = read_u32(r)?;
        let mut primer = Self::new();
        for _ in 0..count {
            let tag = read_u16(r)?;
            let mut ul_bytes = [0u8; 16];
            r.read_exact(&mut ul_bytes)?;
            let ul = Ul::new(ul_bytes);
            primer.tag_to_ul.insert(tag, ul);
            primer.ul_to_tag.insert(ul, tag);
            if tag >= primer.next_dynamic && tag != 0 {
                primer.next_dynamic = tag.saturating_add(1);
            }
            let _ = item_len; // always 18 (2-byte tag + 16-byte UL) in this profile
        }
        hdr.skip(r)?;
        Ok(primer)
    }

    /// Write this Primer as a KLV, returning the packet's absolute offset.
    pub fn write(&self, w: &mut dyn WriteSeek) -> Result<u64> {
        let mut payload = Vec::with_capacity(8 + self.tag_to_ul.len() * 18);
        let mut entries: Vec<(&u16, &Ul)> = self.tag_to_ul.iter().collect();
        entries.sort_by_key(|(tag, _)| **tag);

        let mut cursor = std::io::Cursor::new(&mut payload);
        write_u32(&mut cursor, entries.len() as u32)?;
        write_u32(&mut cursor, 18)?;
        for (tag, ul) in entries {
            write_u16(&mut cursor, *tag)?;
            cursor.write_all(ul.as_bytes())?;
        }
        Ok(write_klv(w, &PRIMER_PACK, &payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn allocates_sequential_dynamic_tags() {
        let mut primer = Primer::new();
        let ul1 = Ul::new([1; 16]);
        let ul2 = Ul::new([2; 16]);
        let t1 = primer.tag_for_ul(ul1).unwrap();
        let t2 = primer.tag_for_ul(ul2).unwrap();
        assert_eq!(t1, 0x8000);
        assert_eq!(t2, 0x8001);
        // Re-requesting the same UL returns the same tag.
        assert_eq!(primer.tag_for_ul(ul1).unwrap(), t1);
    }

    #[test]
    fn roundtrip_through_klv() {
        let mut primer = Primer::new();
        let ul = Ul::new([9; 16]);
        let tag = primer.tag_for_ul(ul).unwrap();

        let mut buf = Cursor::new(Vec::new());
        primer.write(&mut buf).unwrap();

        let mut cur = Cursor::new(buf.into_inner());
        let read_back = Primer::read(&mut cur).unwrap();
        assert_eq!(read_back.ul_for_tag(tag), Some(ul));
    }
}
