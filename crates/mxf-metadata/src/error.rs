//! Errors for the interchange object graph (§7: AS02Format and friends).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("core error: {0}")]
    Core(#[from] mxf_core::Error),

    #[error("klv error: {0}")]
    Klv(#[from] mxf_klv::Error),

    #[error("property {0:?} has the wrong wire type for this accessor")]
    WrongWireType(mxf_core::Ul),

    #[error("property {0:?} is not set")]
    PropertyMissing(mxf_core::Ul),

    #[error("unknown property name {0:?}")]
    UnknownPropertyName(String),

    #[error("reference to InstanceUID {0} does not resolve to any object in the arena")]
    DanglingReference(uuid::Uuid),

    #[error("mandatory header metadata object missing: {0}")]
    As02Format(String),
}

pub type Result<T> = std::result::Result<T, Error>;
