//! UUID and UMID identifiers (§3).

use uuid::Uuid;

/// Re-exported so downstream crates don't need a direct `uuid` dependency
/// just to name the type.
pub type InstanceUid = Uuid;

/// SMPTE ST 330 Unique Material Identifier: 32 bytes embedding a type-4 UUID
/// plus a material/instance number component. Used as `PackageUID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Umid(pub [u8; 32]);

impl Umid {
    /// SMPTE-registered UMID universal-label prefix (bytes 0-9) plus the
    /// length/instance-method octets (10-12) used by this profile: basic
    /// UUID-based material number, no group/grade extensions.
    const PREFIX: [u8; 13] = [
        0x06, 0x0A, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x0F, 0x00, 0x13,
    ];

    /// Build a UMID from a freshly generated UUID (material number) and an
    /// instance number (distinguishes copies of the same material).
    pub fn from_uuid(material: Uuid, instance: [u8; 3]) -> Self {
        let mut bytes = [0u8; 32];
        bytes[0..13].copy_from_slice(&Self::PREFIX);
        bytes[13..16].copy_from_slice(&instance);
        bytes[16..32].copy_from_slice(material.as_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Build a UMID from 32 raw bytes read off the wire.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 32];
        let n = bytes.len().min(32);
        buf[..n].copy_from_slice(&bytes[..n]);
        Self(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umid_embeds_material_uuid() {
        let material = Uuid::from_bytes([7u8; 16]);
        let umid = Umid::from_uuid(material, [0, 0, 1]);
        assert_eq!(&umid.0[16..32], material.as_bytes());
        assert_eq!(&umid.0[0..13], &Umid::PREFIX);
    }
}
