//! Leaf primitives shared by every MXF layer: byte/BER I/O, the Universal
//! Label dictionary, and the UUID/UMID/Rational identifier types (spec §3,
//! §4.1, §4.2).
//!
//! Nothing in this crate knows about KLV framing, partitions, or essence —
//! those live in `mxf-klv`, `mxf-partition`, and `mxf-essence` respectively.

pub mod byteio;
pub mod dictionary;
pub mod error;
pub mod ids;
pub mod rational;
pub mod ul;

pub use byteio::{BerLength, ReadSeek, WriteSeek};
pub use dictionary::{Dictionary, Entry, WireType};
pub use error::{Error, Result};
pub use ids::{InstanceUid, Umid};
pub use rational::Rational;
pub use ul::Ul;
