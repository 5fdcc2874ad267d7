//! Interchange object graph: the metadata-set model, arena, factory
//! registry, and typed constructors for every concrete node type (§3, §4.4).

pub mod builders;
pub mod error;
pub mod graph;
pub mod set;

pub use error::{Error, Result};
pub use graph::{make_object, Graph};
pub use mxf_klv::tlv::{PropertyValue, Timestamp};
pub use set::Object;
