//! Canonical UL catalog (§4.2). Every wire-identifying key used by the codec
//! layers above is drawn from here — no UL is synthesized elsewhere.

use crate::ul::Ul;
use phf::phf_map;

/// Wire representation of a dictionary-registered property, used by the TLV
/// (de)serializer in `mxf-klv`/`mxf-metadata` to pick the right codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int32,
    Int64,
    Rational,
    Ul,
    Uuid,
    Umid,
    Utf16String,
    Timestamp,
    RgbaLayout,
    /// Array of 16-byte ULs (e.g. `EssenceContainers`, `DMSchemes`).
    BatchUl,
    /// Array of UUID strong references (e.g. `Packages`, `Identifications`).
    BatchUuid,
    /// Opaque byte string, length-prefixed by the TLV framing.
    OpaqueBytes,
}

/// One catalog entry: symbolic name, canonical UL, and wire type.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub name: &'static str,
    pub ul: Ul,
    pub wire_type: WireType,
}

macro_rules! ul_bytes {
    ($($b:expr),* $(,)?) => { [$($b),*] };
}

const fn e(name: &'static str, bytes: [u8; 16], wire_type: WireType) -> Entry {
    Entry { name, ul: Ul::new(bytes), wire_type }
}

// Metadata-set keys: 06 0e 2b 34 02 53 01 01 0d 01 01 01 01 01 <item> 00
macro_rules! set_key {
    ($item:expr) => {
        ul_bytes!(0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, $item, 0x00)
    };
}

// Essence-container label keys: 06 0e 2b 34 04 01 01 0d 01 03 01 02 <codec> <wrap> 00 00
macro_rules! ec_label {
    ($codec:expr, $wrap:expr) => {
        ul_bytes!(0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x01, 0x02, $codec, $wrap, 0x00, 0x00)
    };
}

// Generic Container essence-element item keys: one per codec/wrap pairing.
macro_rules! essence_key {
    ($codec:expr, $wrap:expr) => {
        ul_bytes!(0x06, 0x0E, 0x2B, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x01, $codec, $wrap, 0x01, 0x00)
    };
}

pub const KLV_FILL: Ul = Ul::new(ul_bytes!(
    0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00, 0x00
));

pub const PRIMER_PACK: Ul = Ul::new(ul_bytes!(
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x05, 0x01, 0x00
));

pub const RANDOM_INDEX_PACK: Ul = Ul::new(ul_bytes!(
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x11, 0x01, 0x00
));

pub const INDEX_TABLE_SEGMENT: Ul = Ul::new(ul_bytes!(
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x10, 0x01, 0x00
));

/// Partition-pack key prefix (bytes 0-12); bytes 13 (kind) and 14
/// (openness/completeness) vary per §4.5.
pub const PARTITION_PACK_PREFIX: [u8; 13] =
    [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01];

/// Triplet (encrypted frame) wrapper key.
pub const ENCRYPTED_TRIPLET: Ul = Ul::new(ul_bytes!(
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x04, 0x01, 0x07, 0x0D, 0x01, 0x03, 0x01, 0x02, 0x7E, 0x01, 0x00
));

/// Cryptographic algorithm labels referenced by `CryptographicContext`'s
/// `CipherAlgorithm`/`MICAlgorithm` fields (§4.10).
pub const AES_CBC_128: Ul = Ul::new(ul_bytes!(
    0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x02, 0x01, 0x02, 0x01, 0x00, 0x00
));

pub const HMAC_SHA1_MIC: Ul = Ul::new(ul_bytes!(
    0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x02, 0x01, 0x02, 0x02, 0x00, 0x00
));

/// Generic Container item UL "kind" bytes used by `essence_key!`/`ec_label!`,
/// one per §1 essence type. Distinct constants so façades never hand-roll a
/// UL.
pub mod codec {
    pub const JPEG2000: u8 = 0x0C;
    pub const JPEG_XS: u8 = 0x1C;
    pub const ACES: u8 = 0x0D;
    pub const PCM: u8 = 0x06;
    pub const IAB: u8 = 0x1A;
    pub const ISXD: u8 = 0x17;
    pub const TIMED_TEXT: u8 = 0x0E;
    pub const PHDR: u8 = 0x1D;
}

pub mod wrap {
    pub const FRAME: u8 = 0x01;
    pub const CLIP: u8 = 0x02;
}

pub static ENTRIES: phf::Map<&'static str, Entry> = phf_map! {
    // -- Operational patterns --
    "OPAtom" => e("OPAtom", ul_bytes!(0x06,0x0E,0x2B,0x34,0x04,0x01,0x01,0x0D,0x01,0x01,0x01,0x01,0x01,0x10,0x00,0x00), WireType::Ul),
    "OP1a" => e("OP1a", ul_bytes!(0x06,0x0E,0x2B,0x34,0x04,0x01,0x01,0x0D,0x01,0x01,0x01,0x01,0x01,0x01,0x00,0x00), WireType::Ul),

    // -- Essence container labels (descriptor EssenceContainer field) --
    "JPEG2000EssenceFrame" => e("JPEG2000EssenceFrame", ec_label!(codec::JPEG2000, wrap::FRAME), WireType::Ul),
    "JPEGXSEssenceFrame" => e("JPEGXSEssenceFrame", ec_label!(codec::JPEG_XS, wrap::FRAME), WireType::Ul),
    "ACESEssenceFrame" => e("ACESEssenceFrame", ec_label!(codec::ACES, wrap::FRAME), WireType::Ul),
    "WAVEssenceClip" => e("WAVEssenceClip", ec_label!(codec::PCM, wrap::CLIP), WireType::Ul),
    "IABEssenceClip" => e("IABEssenceClip", ec_label!(codec::IAB, wrap::CLIP), WireType::Ul),
    "FrameWrappedISXDContainer" => e("FrameWrappedISXDContainer", ec_label!(codec::ISXD, wrap::FRAME), WireType::Ul),
    "TimedTextEssenceClip" => e("TimedTextEssenceClip", ec_label!(codec::TIMED_TEXT, wrap::CLIP), WireType::Ul),
    "PHDRMetadataFrame" => e("PHDRMetadataFrame", ec_label!(codec::PHDR, wrap::FRAME), WireType::Ul),

    // -- Generic Container essence-element keys (EKLV plain-frame Key) --
    "JPEG2000Essence" => e("JPEG2000Essence", essence_key!(codec::JPEG2000, wrap::FRAME), WireType::Ul),
    "JPEGXSEssence" => e("JPEGXSEssence", essence_key!(codec::JPEG_XS, wrap::FRAME), WireType::Ul),
    "ACESEssence" => e("ACESEssence", essence_key!(codec::ACES, wrap::FRAME), WireType::Ul),
    "WAVEssence" => e("WAVEssence", essence_key!(codec::PCM, wrap::CLIP), WireType::Ul),
    "IABEssence" => e("IABEssence", essence_key!(codec::IAB, wrap::CLIP), WireType::Ul),
    "ISXDEssence" => e("ISXDEssence", essence_key!(codec::ISXD, wrap::FRAME), WireType::Ul),
    "TimedTextEssence" => e("TimedTextEssence", essence_key!(codec::TIMED_TEXT, wrap::CLIP), WireType::Ul),
    "PHDRImageMetadataItem" => e("PHDRImageMetadataItem", essence_key!(codec::PHDR, wrap::FRAME), WireType::Ul),

    // -- Data definitions --
    "PictureDataDefinition" => e("PictureDataDefinition", ul_bytes!(0x06,0x0E,0x2B,0x34,0x04,0x01,0x01,0x01,0x01,0x03,0x02,0x02,0x01,0x00,0x00,0x00), WireType::Ul),
    "SoundDataDefinition" => e("SoundDataDefinition", ul_bytes!(0x06,0x0E,0x2B,0x34,0x04,0x01,0x01,0x01,0x01,0x03,0x02,0x02,0x02,0x00,0x00,0x00), WireType::Ul),
    "DataDataDefinition" => e("DataDataDefinition", ul_bytes!(0x06,0x0E,0x2B,0x34,0x04,0x01,0x01,0x01,0x01,0x03,0x02,0x02,0x03,0x00,0x00,0x00), WireType::Ul),

    // -- Interchange object set keys --
    "Preface" => e("Preface", set_key!(0x2F), WireType::Ul),
    "Identification" => e("Identification", set_key!(0x30), WireType::Ul),
    "ContentStorage" => e("ContentStorage", set_key!(0x18), WireType::Ul),
    "MaterialPackage" => e("MaterialPackage", set_key!(0x36), WireType::Ul),
    "SourcePackage" => e("SourcePackage", set_key!(0x37), WireType::Ul),
    "Track" => e("Track", set_key!(0x3B), WireType::Ul),
    "StaticTrack" => e("StaticTrack", set_key!(0x3A), WireType::Ul),
    "Sequence" => e("Sequence", set_key!(0x0F), WireType::Ul),
    "SourceClip" => e("SourceClip", set_key!(0x11), WireType::Ul),
    "TimecodeComponent" => e("TimecodeComponent", set_key!(0x14), WireType::Ul),
    "DMSegment" => e("DMSegment", set_key!(0x41), WireType::Ul),
    "GenericPictureEssenceDescriptor" => e("GenericPictureEssenceDescriptor", set_key!(0x27), WireType::Ul),
    "CDCIEssenceDescriptor" => e("CDCIEssenceDescriptor", set_key!(0x28), WireType::Ul),
    "RGBAEssenceDescriptor" => e("RGBAEssenceDescriptor", set_key!(0x29), WireType::Ul),
    "GenericSoundEssenceDescriptor" => e("GenericSoundEssenceDescriptor", set_key!(0x42), WireType::Ul),
    "WaveAudioDescriptor" => e("WaveAudioDescriptor", set_key!(0x48), WireType::Ul),
    "IABEssenceDescriptor" => e("IABEssenceDescriptor", set_key!(0x5C), WireType::Ul),
    "ISXDDataEssenceDescriptor" => e("ISXDDataEssenceDescriptor", set_key!(0x5D), WireType::Ul),
    "TimedTextDescriptor" => e("TimedTextDescriptor", set_key!(0x5E), WireType::Ul),
    "ACESPictureSubDescriptor" => e("ACESPictureSubDescriptor", set_key!(0x60), WireType::Ul),
    "JPEG2000PictureSubDescriptor" => e("JPEG2000PictureSubDescriptor", set_key!(0x61), WireType::Ul),
    "JPEGXSPictureSubDescriptor" => e("JPEGXSPictureSubDescriptor", set_key!(0x62), WireType::Ul),
    "TargetFrameSubDescriptor" => e("TargetFrameSubDescriptor", set_key!(0x63), WireType::Ul),
    "ContainerConstraintsSubDescriptor" => e("ContainerConstraintsSubDescriptor", set_key!(0x64), WireType::Ul),
    "IABSoundfieldLabelSubDescriptor" => e("IABSoundfieldLabelSubDescriptor", set_key!(0x65), WireType::Ul),
    "AudioChannelLabelSubDescriptor" => e("AudioChannelLabelSubDescriptor", set_key!(0x66), WireType::Ul),
    "SoundfieldGroupLabelSubDescriptor" => e("SoundfieldGroupLabelSubDescriptor", set_key!(0x67), WireType::Ul),
    "GroupOfSoundfieldGroupsLabelSubDescriptor" => e("GroupOfSoundfieldGroupsLabelSubDescriptor", set_key!(0x68), WireType::Ul),
    "TimedTextResourceSubDescriptor" => e("TimedTextResourceSubDescriptor", set_key!(0x69), WireType::Ul),
    "PHDRMetadataTrackSubDescriptor" => e("PHDRMetadataTrackSubDescriptor", set_key!(0x6A), WireType::Ul),
    "CryptographicFramework" => e("CryptographicFramework", set_key!(0x70), WireType::Ul),
    "CryptographicContext" => e("CryptographicContext", set_key!(0x71), WireType::Ul),
    "EssenceContainerData" => e("EssenceContainerData", set_key!(0x72), WireType::Ul),
    "TextBasedDMFramework" => e("TextBasedDMFramework", set_key!(0x73), WireType::Ul),
    "GenericStreamTextBasedSet" => e("GenericStreamTextBasedSet", set_key!(0x74), WireType::Ul),

    // -- Property ULs (a representative, not exhaustive, subset) --
    "InstanceUID" => e("InstanceUID", set_key!(0x01), WireType::Uuid),
    "GenerationUID" => e("GenerationUID", set_key!(0x02), WireType::Uuid),
    "LastModifiedDate" => e("LastModifiedDate", set_key!(0x05), WireType::Timestamp),
    "Version" => e("Version", set_key!(0x06), WireType::UInt16),
    "OperationalPattern" => e("OperationalPattern", set_key!(0x07), WireType::Ul),
    "EssenceContainers" => e("EssenceContainers", set_key!(0x08), WireType::BatchUl),
    "DMSchemes" => e("DMSchemes", set_key!(0x09), WireType::BatchUl),
    "ContentStorageRef" => e("ContentStorageRef", set_key!(0x0A), WireType::Uuid),
    "IdentificationsRef" => e("IdentificationsRef", set_key!(0x0B), WireType::BatchUuid),
    "ConformsToSpecifications" => e("ConformsToSpecifications", set_key!(0x0C), WireType::BatchUl),
    "PackagesRef" => e("PackagesRef", set_key!(0x0D), WireType::BatchUuid),
    "EssenceContainerDataRef" => e("EssenceContainerDataRef", set_key!(0x0E), WireType::BatchUuid),
    "PackageUID" => e("PackageUID", set_key!(0x10), WireType::Umid),
    "TracksRef" => e("TracksRef", set_key!(0x12), WireType::BatchUuid),
    "DescriptorRef" => e("DescriptorRef", set_key!(0x13), WireType::Uuid),
    "TrackID" => e("TrackID", set_key!(0x15), WireType::UInt32),
    "TrackNumber" => e("TrackNumber", set_key!(0x16), WireType::UInt32),
    "TrackName" => e("TrackName", set_key!(0x17), WireType::Utf16String),
    "EditRate" => e("EditRate", set_key!(0x18), WireType::Rational),
    "Origin" => e("Origin", set_key!(0x19), WireType::Int64),
    "SequenceRef" => e("SequenceRef", set_key!(0x1A), WireType::Uuid),
    "DataDefinition" => e("DataDefinition", set_key!(0x1B), WireType::Ul),
    "Duration" => e("Duration", set_key!(0x1C), WireType::Int64),
    "StructuralComponentsRef" => e("StructuralComponentsRef", set_key!(0x1D), WireType::BatchUuid),
    "SampleRate" => e("SampleRate", set_key!(0x1E), WireType::Rational),
    "EssenceContainerUl" => e("EssenceContainerUl", set_key!(0x1F), WireType::Ul),
    "Codec" => e("Codec", set_key!(0x20), WireType::Ul),
    "ContainerDuration" => e("ContainerDuration", set_key!(0x21), WireType::Int64),
    "LinkedTrackID" => e("LinkedTrackID", set_key!(0x22), WireType::UInt32),
    "FrameLayout" => e("FrameLayout", set_key!(0x23), WireType::UInt8),
    "StoredWidth" => e("StoredWidth", set_key!(0x24), WireType::UInt32),
    "StoredHeight" => e("StoredHeight", set_key!(0x25), WireType::UInt32),
    "AspectRatio" => e("AspectRatio", set_key!(0x26), WireType::Rational),
    "PictureEssenceCoding" => e("PictureEssenceCoding", set_key!(0x2A), WireType::Ul),
    "AudioSamplingRate" => e("AudioSamplingRate", set_key!(0x2B), WireType::Rational),
    "ChannelCount" => e("ChannelCount", set_key!(0x2C), WireType::UInt32),
    "QuantizationBits" => e("QuantizationBits", set_key!(0x2D), WireType::UInt32),
    "BlockAlign" => e("BlockAlign", set_key!(0x2E), WireType::UInt16),
    "SourceEssenceContainer" => e("SourceEssenceContainer", set_key!(0x31), WireType::Ul),
    "CipherAlgorithm" => e("CipherAlgorithm", set_key!(0x32), WireType::Ul),
    "MICAlgorithm" => e("MICAlgorithm", set_key!(0x33), WireType::Ul),
    "CryptographicKeyID" => e("CryptographicKeyID", set_key!(0x34), WireType::Uuid),
    "ContextRef" => e("ContextRef", set_key!(0x35), WireType::Uuid),
    "ProductName" => e("ProductName", set_key!(0x3C), WireType::Utf16String),
    "CompanyName" => e("CompanyName", set_key!(0x3D), WireType::Utf16String),
    "ProductVersion" => e("ProductVersion", set_key!(0x3E), WireType::OpaqueBytes),
    "ProductUID" => e("ProductUID", set_key!(0x3F), WireType::Uuid),
    "ModificationDate" => e("ModificationDate", set_key!(0x40), WireType::Timestamp),
};

/// Read-only, process-wide registry (§4.2). Safe to share: `ENTRIES` is a
/// perfect-hash map computed at compile time, no runtime initialization is
/// required (the "global mutable state" design note in spec.md §9 is moot
/// here — there is nothing to initialize).
pub struct Dictionary;

impl Dictionary {
    pub fn ul(name: &str) -> Option<Ul> {
        ENTRIES.get(name).map(|e| e.ul)
    }

    pub fn find_by_ul(ul: &Ul) -> Option<&'static Entry> {
        ENTRIES.values().find(|e| &e.ul == ul)
    }

    pub fn find_any_version(ul: &Ul) -> Option<&'static Entry> {
        ENTRIES.values().find(|e| e.ul.eq_any_version(ul))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_back() {
        let ul = Dictionary::ul("OPAtom").expect("OPAtom registered");
        let entry = Dictionary::find_by_ul(&ul).expect("round-trips");
        assert_eq!(entry.name, "OPAtom");
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(Dictionary::ul("NotARegisteredName").is_none());
    }

    #[test]
    fn partition_pack_prefix_matches_essence_container_scheme() {
        // Every metadata set key and the partition pack share the SMPTE
        // designator prefix (bytes 0-3).
        assert_eq!(&PARTITION_PACK_PREFIX[0..4], &[0x06, 0x0E, 0x2B, 0x34]);
    }
}
