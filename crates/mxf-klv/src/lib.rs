//! KLV packet framing, Primer Pack, and local-tag TLV property codec.

pub mod error;
pub mod klv;
pub mod primer;
pub mod tlv;

pub use error::{Error, Result};
pub use klv::{backpatch_length, write_klv, write_klv_reserved_length, KlvHeader};
pub use primer::Primer;
pub use tlv::{read_tlv_items, write_tlv_item, PropertyValue, RawTlvItem, Timestamp};
