//! Errors for the cryptographic envelope layer (§7: CryptCtx, LargePTO,
//! HMACCtx, CheckFail, HMACFail, CryptInit).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("core error: {0}")]
    Core(#[from] mxf_core::Error),

    #[error("klv error: {0}")]
    Klv(#[from] mxf_klv::Error),

    #[error("openssl error: {0}")]
    Openssl(#[from] openssl::error::ErrorStack),

    #[error("plaintext offset {0} exceeds payload length {1}")]
    LargePto(u64, u64),

    #[error("check value mismatch: triplet is corrupt or the wrong key was supplied")]
    CheckFail,

    #[error("HMAC verification failed")]
    HmacFail,

    #[error("triplet is malformed: {0}")]
    BadTriplet(String),
}

pub type Result<T> = std::result::Result<T, Error>;
