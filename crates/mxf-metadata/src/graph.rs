//! Arena of interchange objects plus the Set-UL factory registry (§4.4).

use std::collections::HashMap;

use mxf_core::dictionary::Dictionary;
use mxf_core::ids::InstanceUid;
use mxf_core::Ul;

use crate::set::Object;
use crate::{Error, Result};

/// Instantiate an empty [`Object`] for `set_ul`, tagging it with the
/// Dictionary's symbolic name if registered (forward-compatible: an
/// unregistered UL still produces an object, named `"Unknown"`, so
/// unrecognized sets in a third-party file don't abort the parse).
pub fn make_object(set_ul: Ul, instance_uid: InstanceUid) -> Object {
    let kind_name = Dictionary::find_by_ul(&set_ul).map(|e| e.name).unwrap_or_else(|| {
        tracing::warn!(set_ul = %set_ul, "unrecognized Set-UL, treating as opaque Unknown set");
        "Unknown"
    });
    Object::new(set_ul, kind_name, instance_uid)
}

/// Arena of every object parsed from, or built for, one track file's header
/// metadata: keyed by `InstanceUID`, resolved by lookup rather than owned
/// cyclically (§9 design note).
#[derive(Debug, Default)]
pub struct Graph {
    objects: HashMap<InstanceUid, Object>,
    /// Insertion order, so `get_objects_by_type` and re-serialization are
    /// deterministic.
    order: Vec<InstanceUid>,
}

impl Graph {
    pub fn new() -> Self {
        Self { objects: HashMap::new(), order: Vec::new() }
    }

    pub fn insert(&mut self, object: Object) -> InstanceUid {
        let id = object.instance_uid;
        if !self.objects.contains_key(&id) {
            self.order.push(id);
        }
        self.objects.insert(id, object);
        id
    }

    pub fn get_object_by_id(&self, id: InstanceUid) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn get_object_by_id_mut(&mut self, id: InstanceUid) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    pub fn get_object_by_type(&self, set_ul: Ul) -> Option<&Object> {
        self.order.iter().filter_map(|id| self.objects.get(id)).find(|o| o.set_ul == set_ul)
    }

    pub fn get_objects_by_type(&self, set_ul: Ul) -> Vec<&Object> {
        self.order.iter().filter_map(|id| self.objects.get(id)).filter(|o| o.set_ul == set_ul).collect()
    }

    pub fn objects_in_order(&self) -> impl Iterator<Item = &Object> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// The Preface is always the first `Preface`-typed object (§4.4).
    pub fn preface(&self) -> Option<&Object> {
        let preface_ul = Dictionary::ul("Preface")?;
        self.get_object_by_type(preface_ul)
    }

    /// Validate that every reference property (single UUID or batch of
    /// UUIDs) on every object resolves to an object present in the arena
    /// (§4.4 cross-reference validation, §8 testable property).
    pub fn validate_references(&self) -> Result<()> {
        use mxf_klv::tlv::PropertyValue;
        for object in self.objects.values() {
            for (_, value) in object.properties() {
                match value {
                    PropertyValue::Uuid(id) if !self.objects.contains_key(id) => {
                        return Err(Error::DanglingReference(*id));
                    }
                    PropertyValue::BatchUuid(ids) => {
                        for id in ids {
                            if !self.objects.contains_key(id) {
                                return Err(Error::DanglingReference(*id));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_object_tags_known_and_unknown_uls() {
        let preface_ul = Dictionary::ul("Preface").unwrap();
        let obj = make_object(preface_ul, InstanceUid::from_bytes([1; 16]));
        assert_eq!(obj.kind_name, "Preface");

        let obj2 = make_object(Ul::new([0xEE; 16]), InstanceUid::from_bytes([2; 16]));
        assert_eq!(obj2.kind_name, "Unknown");
    }

    #[test]
    fn preface_is_found_by_type() {
        let mut graph = Graph::new();
        let preface_ul = Dictionary::ul("Preface").unwrap();
        let preface = make_object(preface_ul, InstanceUid::from_bytes([3; 16]));
        graph.insert(preface);
        assert!(graph.preface().is_some());
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let mut graph = Graph::new();
        let track_ul = Dictionary::ul("Track").unwrap();
        let mut track = make_object(track_ul, InstanceUid::from_bytes([4; 16]));
        track.set_uuid("SequenceRef", InstanceUid::from_bytes([99; 16])).unwrap();
        graph.insert(track);
        assert!(graph.validate_references().is_err());
    }
}
