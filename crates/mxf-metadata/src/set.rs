//! Generic metadata set model (§4.4, §9 design note: "per-property (UL, wire
//! type) tables drive serialization" instead of per-type C++ structs).
//!
//! Every concrete set type (Preface, Track, CDCIEssenceDescriptor, ...) is
//! represented by one [`Object`]: a set UL plus an ordered property bag.
//! Domain modules (`preface`, `package`, `track`, `descriptor`, ...) add
//! strongly-typed accessor methods on top of this generic store, the same
//! way a typed tag accessor sits on top of a generic tag map.

use mxf_core::dictionary::Dictionary;
use mxf_core::ids::InstanceUid;
use mxf_core::{Rational, Ul, Umid};
use mxf_klv::primer::Primer;
use mxf_klv::tlv::{read_tlv_items, write_tlv_item, PropertyValue, Timestamp};

use crate::{Error, Result};

/// One interchange object: a set UL, an `InstanceUID`, and its properties in
/// write order.
#[derive(Debug, Clone)]
pub struct Object {
    pub set_ul: Ul,
    /// Symbolic name, if the set UL is registered in the Dictionary;
    /// `"Unknown"` for a forward-compatible set this build doesn't
    /// recognize (§4.4, §7 unknown-set tolerance).
    pub kind_name: &'static str,
    pub instance_uid: InstanceUid,
    properties: Vec<(Ul, PropertyValue)>,
}

impl Object {
    pub fn new(set_ul: Ul, kind_name: &'static str, instance_uid: InstanceUid) -> Self {
        Self { set_ul, kind_name, instance_uid, properties: Vec::new() }
    }

    pub fn get(&self, ul: Ul) -> Option<&PropertyValue> {
        self.properties.iter().find(|(u, _)| *u == ul).map(|(_, v)| v)
    }

    pub fn set(&mut self, ul: Ul, value: PropertyValue) {
        if let Some(slot) = self.properties.iter_mut().find(|(u, _)| *u == ul) {
            slot.1 = value;
        } else {
            self.properties.push((ul, value));
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = &(Ul, PropertyValue)> {
        self.properties.iter()
    }

    fn ul_for_name(name: &str) -> Result<Ul> {
        Dictionary::ul(name).ok_or_else(|| Error::UnknownPropertyName(name.to_string()))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<&PropertyValue>> {
        Ok(self.get(Self::ul_for_name(name)?))
    }

    pub fn set_by_name(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        let ul = Self::ul_for_name(name)?;
        self.set(ul, value);
        Ok(())
    }

    // -- typed convenience getters, by name --

    pub fn get_u16(&self, name: &str) -> Result<Option<u16>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::UInt16(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_u32(&self, name: &str) -> Result<Option<u32>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::UInt32(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::Int64(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_ul(&self, name: &str) -> Result<Option<Ul>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::Ul(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_uuid(&self, name: &str) -> Result<Option<InstanceUid>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::Uuid(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_umid(&self, name: &str) -> Result<Option<Umid>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::Umid(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_rational(&self, name: &str) -> Result<Option<Rational>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::Rational(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::Utf16String(v)) => Ok(Some(v.clone())),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_timestamp(&self, name: &str) -> Result<Option<Timestamp>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::Timestamp(v)) => Ok(Some(*v)),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_batch_uuid(&self, name: &str) -> Result<Option<Vec<InstanceUid>>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::BatchUuid(v)) => Ok(Some(v.clone())),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    pub fn get_batch_ul(&self, name: &str) -> Result<Option<Vec<Ul>>> {
        match self.get_by_name(name)? {
            Some(PropertyValue::BatchUl(v)) => Ok(Some(v.clone())),
            Some(_) => Err(Error::WrongWireType(Self::ul_for_name(name)?)),
            None => Ok(None),
        }
    }

    // -- typed convenience setters, by name --

    pub fn set_u16(&mut self, name: &str, v: u16) -> Result<()> {
        self.set_by_name(name, PropertyValue::UInt16(v))
    }

    pub fn set_u32(&mut self, name: &str, v: u32) -> Result<()> {
        self.set_by_name(name, PropertyValue::UInt32(v))
    }

    pub fn set_i64(&mut self, name: &str, v: i64) -> Result<()> {
        self.set_by_name(name, PropertyValue::Int64(v))
    }

    pub fn set_ul_prop(&mut self, name: &str, v: Ul) -> Result<()> {
        self.set_by_name(name, PropertyValue::Ul(v))
    }

    pub fn set_uuid(&mut self, name: &str, v: InstanceUid) -> Result<()> {
        self.set_by_name(name, PropertyValue::Uuid(v))
    }

    pub fn set_umid(&mut self, name: &str, v: Umid) -> Result<()> {
        self.set_by_name(name, PropertyValue::Umid(v))
    }

    pub fn set_rational(&mut self, name: &str, v: Rational) -> Result<()> {
        self.set_by_name(name, PropertyValue::Rational(v))
    }

    pub fn set_string(&mut self, name: &str, v: impl Into<String>) -> Result<()> {
        self.set_by_name(name, PropertyValue::Utf16String(v.into()))
    }

    pub fn set_timestamp(&mut self, name: &str, v: Timestamp) -> Result<()> {
        self.set_by_name(name, PropertyValue::Timestamp(v))
    }

    pub fn set_batch_uuid(&mut self, name: &str, v: Vec<InstanceUid>) -> Result<()> {
        self.set_by_name(name, PropertyValue::BatchUuid(v))
    }

    pub fn set_batch_ul(&mut self, name: &str, v: Vec<Ul>) -> Result<()> {
        self.set_by_name(name, PropertyValue::BatchUl(v))
    }

    /// Parse a set's already-dekeyed TLV body (§4.4 `init_from_buffer`).
    /// Unknown local tags (not present in `primer`) are logged and dropped:
    /// without an associated UL, an unrecognized blob can't be re-keyed for
    /// round-trip, so this implementation cannot preserve it (§4.3, §7).
    pub fn init_from_tlv_set(set_ul: Ul, kind_name: &'static str, primer: &Primer, body: &[u8]) -> Result<Self> {
        let items = read_tlv_items(body)?;
        let mut instance_uid = InstanceUid::from_bytes([0u8; 16]);
        let mut obj = Self::new(set_ul, kind_name, instance_uid);
        for item in items {
            let Some(ul) = primer.ul_for_tag(item.local_tag) else {
                tracing::warn!(local_tag = item.local_tag, "unknown local tag, no Primer entry; dropping");
                continue;
            };
            let wire_type = Dictionary::find_by_ul(&ul).map(|e| e.wire_type);
            let value = decode_property(wire_type, &item.bytes);
            if let PropertyValue::Uuid(uid) = value {
                if Dictionary::find_by_ul(&ul).map(|e| e.name) == Some("InstanceUID") {
                    instance_uid = uid;
                }
            }
            obj.set(ul, value);
        }
        obj.instance_uid = instance_uid;
        Ok(obj)
    }

    /// Serialize this object's properties to a TLV body, allocating Primer
    /// tags as needed (§4.4 `write_to_buffer`). `InstanceUID` is always
    /// emitted first.
    pub fn write_to_tlv_set(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let instance_uid_ul = Dictionary::ul("InstanceUID").ok_or_else(|| Error::UnknownPropertyName("InstanceUID".into()))?;
        write_tlv_item(&mut buf, primer, instance_uid_ul, &PropertyValue::Uuid(self.instance_uid))?;
        for (ul, value) in &self.properties {
            if *ul == instance_uid_ul {
                continue;
            }
            write_tlv_item(&mut buf, primer, *ul, value)?;
        }
        Ok(buf)
    }

    pub fn dump(&self) -> String {
        let mut out = format!("{} (InstanceUID={})\n", self.kind_name, self.instance_uid);
        for (ul, value) in &self.properties {
            let name = Dictionary::find_by_ul(ul).map(|e| e.name).unwrap_or("?");
            out.push_str(&format!("  {name}: {value:?}\n"));
        }
        out
    }
}

fn decode_property(wire_type: Option<mxf_core::dictionary::WireType>, bytes: &[u8]) -> PropertyValue {
    use mxf_core::dictionary::WireType;
    match wire_type {
        Some(WireType::UInt8) if bytes.len() == 1 => PropertyValue::UInt8(bytes[0]),
        Some(WireType::UInt16) if bytes.len() == 2 => PropertyValue::UInt16(u16::from_be_bytes([bytes[0], bytes[1]])),
        Some(WireType::UInt32) if bytes.len() == 4 => PropertyValue::UInt32(u32::from_be_bytes(bytes.try_into().unwrap_or_default())),
        Some(WireType::UInt64) if bytes.len() == 8 => PropertyValue::UInt64(u64::from_be_bytes(bytes.try_into().unwrap_or_default())),
        Some(WireType::Int32) if bytes.len() == 4 => PropertyValue::Int32(i32::from_be_bytes(bytes.try_into().unwrap_or_default())),
        Some(WireType::Int64) if bytes.len() == 8 => PropertyValue::Int64(i64::from_be_bytes(bytes.try_into().unwrap_or_default())),
        Some(WireType::Rational) if bytes.len() == 8 => PropertyValue::Rational(Rational::new(
            i32::from_be_bytes(bytes[0..4].try_into().unwrap_or_default()),
            i32::from_be_bytes(bytes[4..8].try_into().unwrap_or_default()),
        )),
        Some(WireType::Ul) if bytes.len() == 16 => PropertyValue::Ul(Ul::new(bytes.try_into().unwrap_or([0; 16]))),
        Some(WireType::Uuid) if bytes.len() == 16 => PropertyValue::Uuid(InstanceUid::from_bytes(bytes.try_into().unwrap_or([0; 16]))),
        Some(WireType::Umid) if bytes.len() == 32 => PropertyValue::Umid(Umid::from_slice(bytes)),
        Some(WireType::Timestamp) if bytes.len() == 8 => {
            PropertyValue::Timestamp(Timestamp::from_bytes(bytes.try_into().unwrap_or([0; 8])))
        }
        Some(WireType::Utf16String) => {
            let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
            let trimmed: Vec<u16> = units.into_iter().take_while(|&u| u != 0).collect();
            PropertyValue::Utf16String(String::from_utf16_lossy(&trimmed))
        }
        Some(WireType::BatchUl) => decode_batch_ul(bytes),
        Some(WireType::BatchUuid) => decode_batch_uuid(bytes),
        _ => PropertyValue::Opaque(bytes.to_vec()),
    }
}

fn decode_batch_ul(bytes: &[u8]) -> PropertyValue {
    if bytes.len() < 8 {
        return PropertyValue::BatchUl(Vec::new());
    }
    let count = u32::from_be_bytes(bytes[0..4].try_into().unwrap_or_default()) as usize;
    let item_len = u32::from_be_bytes(bytes[4..8].try_into().unwrap_or_default()) as usize;
    let mut items = Vec::with_capacity(count);
    let mut pos = 8;
    for _ in 0..count {
        if pos + 16 > bytes.len() {
            break;
        }
        items.push(Ul::new(bytes[pos..pos + 16].try_into().unwrap_or([0; 16])));
        pos += item_len;
    }
    PropertyValue::BatchUl(items)
}

fn decode_batch_uuid(bytes: &[u8]) -> PropertyValue {
    if bytes.len() < 8 {
        return PropertyValue::BatchUuid(Vec::new());
    }
    let count = u32::from_be_bytes(bytes[0..4].try_into().unwrap_or_default()) as usize;
    let item_len = u32::from_be_bytes(bytes[4..8].try_into().unwrap_or_default()) as usize;
    let mut items = Vec::with_capacity(count);
    let mut pos = 8;
    for _ in 0..count {
        if pos + 16 > bytes.len() {
            break;
        }
        items.push(InstanceUid::from_bytes(bytes[pos..pos + 16].try_into().unwrap_or([0; 16])));
        pos += item_len;
    }
    PropertyValue::BatchUuid(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_roundtrip_by_name() {
        let mut obj = Object::new(Dictionary::ul("Track").unwrap(), "Track", InstanceUid::from_bytes([1; 16]));
        obj.set_u32("TrackID", 7).unwrap();
        obj.set_rational("EditRate", Rational::new(24, 1)).unwrap();
        assert_eq!(obj.get_u32("TrackID").unwrap(), Some(7));
        assert_eq!(obj.get_rational("EditRate").unwrap(), Some(Rational::new(24, 1)));
    }

    #[test]
    fn tlv_roundtrip_through_primer() {
        let mut primer = Primer::new();
        let mut obj = Object::new(Dictionary::ul("Track").unwrap(), "Track", InstanceUid::from_bytes([2; 16]));
        obj.set_u32("TrackID", 42).unwrap();
        obj.set_string("TrackName", "V1").unwrap();

        let body = obj.write_to_tlv_set(&mut primer).unwrap();
        let read_back = Object::init_from_tlv_set(obj.set_ul, "Track", &primer, &body).unwrap();

        assert_eq!(read_back.instance_uid, obj.instance_uid);
        assert_eq!(read_back.get_u32("TrackID").unwrap(), Some(42));
        assert_eq!(read_back.get_string("TrackName").unwrap(), Some("V1".to_string()));
    }

    #[test]
    fn wrong_wire_type_errors() {
        let mut obj = Object::new(Dictionary::ul("Track").unwrap(), "Track", InstanceUid::from_bytes([3; 16]));
        obj.set_u32("TrackID", 1).unwrap();
        assert!(obj.get_string("TrackID").is_err());
    }

    proptest::proptest! {
        #[test]
        fn track_id_and_edit_rate_roundtrip_through_tlv_for_any_value(
            track_id in proptest::prelude::any::<u32>(),
            numerator in 1i32..=10_000,
            denominator in 1i32..=10_000,
        ) {
            let mut primer = Primer::new();
            let mut obj = Object::new(Dictionary::ul("Track").unwrap(), "Track", InstanceUid::from_bytes([4; 16]));
            obj.set_u32("TrackID", track_id).unwrap();
            obj.set_rational("EditRate", Rational::new(numerator, denominator)).unwrap();

            let body = obj.write_to_tlv_set(&mut primer).unwrap();
            let read_back = Object::init_from_tlv_set(obj.set_ul, "Track", &primer, &body).unwrap();

            proptest::prop_assert_eq!(read_back.get_u32("TrackID").unwrap(), Some(track_id));
            proptest::prop_assert_eq!(read_back.get_rational("EditRate").unwrap(), Some(Rational::new(numerator, denominator)));
        }
    }
}
