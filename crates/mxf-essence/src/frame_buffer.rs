//! Growable essence byte buffer (§3 FrameBuffer, §9 "manual memory buffers"
//! design note).

/// One edit unit's worth of essence bytes, plus the cryptographic framing
/// fields used when the frame is encrypted.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    data: Vec<u8>,
    pub frame_number: u64,
    /// Plaintext byte count kept unencrypted at the start of the frame
    /// (selective encryption, e.g. leaving a codec header readable).
    pub plaintext_offset: u64,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity), frame_number: 0, plaintext_offset: 0 }
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, frame_number: 0, plaintext_offset: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_size(&mut self, size: usize) {
        self.data.resize(size, 0);
    }

    /// Plaintext byte count, for the cryptographic triplet's `SourceLength`.
    pub fn source_length(&self) -> u64 {
        self.data.len() as u64
    }
}

impl From<Vec<u8>> for FrameBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}
