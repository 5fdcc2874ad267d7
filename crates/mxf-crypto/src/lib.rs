//! Capability traits for AES-CBC-128/HMAC-SHA1/RNG and the EKLV triplet
//! envelope codec built on them (§4.10).

pub mod capability;
pub mod envelope;
pub mod error;

pub use capability::{AesCipher, HmacMic, OpensslCrypto, SecureRng, HMAC_LEN, IV_LEN, KEY_LEN};
pub use envelope::Triplet;
pub use error::{Error, Result};
