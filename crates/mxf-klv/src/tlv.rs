//! TLV (local-tag) codec used inside a metadata set's KLV value (§4.3).
//!
//! The set-level KLV framing (`Key(set UL) · Length(BER) · Value`) is
//! performed by the caller (`mxf-metadata`); this module only handles the
//! `(local_tag, length, value)` tuples packed inside that `Value`.

use crate::primer::Primer;
use crate::{Error, Result};
use mxf_core::ids::InstanceUid;
use mxf_core::{Rational, Ul, Umid};

/// An 8-byte MXF timestamp: year, month, day, hour, minute, second, and a
/// quarter-millisecond fraction byte. Layout matches the field order the
/// teacher's own MXF parser already read (`ModificationDate` scan in the
/// pre-transform `mxf.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub qmsec: u8,
}

impl Timestamp {
    pub fn to_bytes(self) -> [u8; 8] {
        let y = self.year.to_be_bytes();
        [y[0], y[1], self.month, self.day, self.hour, self.minute, self.second, self.qmsec]
    }

    pub fn from_bytes(b: [u8; 8]) -> Self {
        Self {
            year: u16::from_be_bytes([b[0], b[1]]),
            month: b[2],
            day: b[3],
            hour: b[4],
            minute: b[5],
            second: b[6],
            qmsec: b[7],
        }
    }
}

/// A decoded property value, tagged by wire type so the caller doesn't need
/// a separate `WireType` match to interpret it.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Int32(i32),
    Int64(i64),
    Rational(Rational),
    Ul(Ul),
    Uuid(InstanceUid),
    Umid(Umid),
    Utf16String(String),
    Timestamp(Timestamp),
    BatchUl(Vec<Ul>),
    BatchUuid(Vec<InstanceUid>),
    /// Opaque bytes, preserved verbatim: used both for `OpaqueBytes`-typed
    /// properties and for unrecognized local tags (§4.3's forward-compat
    /// policy — unknown fields round-trip as blobs).
    Opaque(Vec<u8>),
}

impl PropertyValue {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            PropertyValue::UInt8(v) => vec![*v],
            PropertyValue::UInt16(v) => v.to_be_bytes().to_vec(),
            PropertyValue::UInt32(v) => v.to_be_bytes().to_vec(),
            PropertyValue::UInt64(v) => v.to_be_bytes().to_vec(),
            PropertyValue::Int32(v) => v.to_be_bytes().to_vec(),
            PropertyValue::Int64(v) => v.to_be_bytes().to_vec(),
            PropertyValue::Rational(r) => {
                let mut buf = Vec::with_capacity(8);
                buf.extend_from_slice(&r.numerator.to_be_bytes());
                buf.extend_from_slice(&r.denominator.to_be_bytes());
                buf
            }
            PropertyValue::Ul(ul) => ul.as_bytes().to_vec(),
            PropertyValue::Uuid(u) => u.as_bytes().to_vec(),
            PropertyValue::Umid(u) => u.as_bytes().to_vec(),
            PropertyValue::Utf16String(s) => {
                let mut buf: Vec<u8> = s.encode_utf16().flat_map(|c| c.to_be_bytes()).collect();
                buf.extend_from_slice(&0u16.to_be_bytes());
                buf
            }
            PropertyValue::Timestamp(ts) => ts.to_bytes().to_vec(),
            PropertyValue::BatchUl(items) => {
                let mut buf = Vec::with_capacity(8 + items.len() * 16);
                buf.extend_from_slice(&(items.len() as u32).to_be_bytes());
                buf.extend_from_slice(&16u32.to_be_bytes());
                for ul in items {
                    buf.extend_from_slice(ul.as_bytes());
                }
                buf
            }
            PropertyValue::BatchUuid(items) => {
                let mut buf = Vec::with_capacity(8 + items.len() * 16);
                buf.extend_from_slice(&(items.len() as u32).to_be_bytes());
                buf.extend_from_slice(&16u32.to_be_bytes());
                for u in items {
                    buf.extend_from_slice(u.as_bytes());
                }
                buf
            }
            PropertyValue::Opaque(bytes) => bytes.clone(),
        }
    }
}

/// One decoded `(local_tag, value)` pair plus the original bytes, used while
/// the Primer for the containing partition is not yet fully known (reader
/// side reads raw bytes first, resolves the UL afterward).
#[derive(Debug, Clone)]
pub struct RawTlvItem {
    pub local_tag: u16,
    pub bytes: Vec<u8>,
}

/// Iterate `(local_tag, length, value)` tuples packed in a set's TLV body.
pub fn read_tlv_items(body: &[u8]) -> Result<Vec<RawTlvItem>> {
    let mut items = Vec::new();
    let mut pos = 0usize;
    while pos < body.len() {
        if pos + 4 > body.len() {
            return Err(Error::TruncatedPacket { need: 4, have: body.len() - pos });
        }
        let local_tag = u16::from_be_bytes([body[pos], body[pos + 1]]);
        let length = u16::from_be_bytes([body[pos + 2], body[pos + 3]]) as usize;
        pos += 4;
        if pos + length > body.len() {
            return Err(Error::TruncatedPacket { need: length, have: body.len() - pos });
        }
        items.push(RawTlvItem { local_tag, bytes: body[pos..pos + length].to_vec() });
        pos += length;
    }
    Ok(items)
}

/// Write `local_tag(u16) · length(u16) · value` for one property, allocating
/// its local tag from `primer` if needed.
pub fn write_tlv_item(buf: &mut Vec<u8>, primer: &mut Primer, ul: Ul, value: &PropertyValue) -> Result<()> {
    let tag = primer.tag_for_ul(ul)?;
    let encoded = value.encode();
    if encoded.len() > u16::MAX as usize {
        return Err(Error::TruncatedPacket { need: encoded.len(), have: u16::MAX as usize });
    }
    buf.extend_from_slice(&tag.to_be_bytes());
    buf.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
    buf.extend_from_slice(&encoded);
    Ok(())
}
