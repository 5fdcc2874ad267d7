//! Frame-wrap/clip-wrap writer and reader, writer/reader lifecycle state
//! machine, and per-codec essence façades (§4.8-§4.12, §6.2).

pub mod error;
pub mod facade;
pub mod frame_buffer;
pub mod header;
pub mod options;
pub mod reader;
pub mod state;
pub mod writer;
pub mod writer_info;

pub use error::{Error, Result};
pub use facade::EssenceProfile;
pub use frame_buffer::FrameBuffer;
pub use options::{IndexStrategy, WriteOptions};
pub use reader::Reader;
pub use state::{ReaderState, WriterState};
pub use writer::{Crypto, WrapMode, Writer};
pub use writer_info::{LabelSetType, WriterInfo};
