//! Capability surface consumed by the envelope codec: concrete cryptographic
//! primitives are injected rather than hard-coded, so callers can swap in a
//! FIPS-validated provider without touching `envelope.rs` (§1 "consumed
//! through a small capability surface").

use crate::Result;

pub const KEY_LEN: usize = 16;
pub const IV_LEN: usize = 16;
pub const HMAC_LEN: usize = 20;

pub trait AesCipher {
    fn encrypt_cbc(&self, key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>>;
    fn decrypt_cbc(&self, key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>>;
}

pub trait HmacMic {
    fn compute(&self, key: &[u8; KEY_LEN], data: &[u8]) -> Result<[u8; HMAC_LEN]>;
}

pub trait SecureRng {
    fn fill(&self, buf: &mut [u8]) -> Result<()>;

    fn random_key(&self) -> Result<[u8; KEY_LEN]> {
        let mut buf = [0u8; KEY_LEN];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn random_iv(&self) -> Result<[u8; IV_LEN]> {
        let mut buf = [0u8; IV_LEN];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}

/// Default `openssl`-backed implementation of all three capabilities.
/// See DESIGN.md for why this crate is `openssl`-backed.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpensslCrypto;

impl AesCipher for OpensslCrypto {
    fn encrypt_cbc(&self, key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        use openssl::symm::{Cipher, Crypter, Mode};
        // The triplet format zero-pads the plaintext to a 16-byte multiple
        // itself (§4.10); padding is disabled here so the ciphertext length
        // matches the padded plaintext length exactly, not plaintext+16.
        let mut crypter = Crypter::new(Cipher::aes_128_cbc(), Mode::Encrypt, key, Some(iv))?;
        crypter.pad(false);
        let mut out = vec![0u8; plaintext.len() + Cipher::aes_128_cbc().block_size()];
        let mut count = crypter.update(plaintext, &mut out)?;
        count += crypter.finalize(&mut out[count..])?;
        out.truncate(count);
        Ok(out)
    }

    fn decrypt_cbc(&self, key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        use openssl::symm::{Cipher, Crypter, Mode};
        let mut crypter = Crypter::new(Cipher::aes_128_cbc(), Mode::Decrypt, key, Some(iv))?;
        crypter.pad(false);
        let mut out = vec![0u8; ciphertext.len() + Cipher::aes_128_cbc().block_size()];
        let mut count = crypter.update(ciphertext, &mut out)?;
        count += crypter.finalize(&mut out[count..])?;
        out.truncate(count);
        Ok(out)
    }
}

impl HmacMic for OpensslCrypto {
    fn compute(&self, key: &[u8; KEY_LEN], data: &[u8]) -> Result<[u8; HMAC_LEN]> {
        use openssl::hash::MessageDigest;
        use openssl::pkey::PKey;
        use openssl::sign::Signer;

        let pkey = PKey::hmac(key)?;
        let mut signer = Signer::new(MessageDigest::sha1(), &pkey)?;
        signer.update(data)?;
        let digest = signer.sign_to_vec()?;
        let mut out = [0u8; HMAC_LEN];
        out.copy_from_slice(&digest[..HMAC_LEN]);
        Ok(out)
    }
}

impl SecureRng for OpensslCrypto {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        openssl::rand::rand_bytes(buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes_cbc_roundtrip() {
        let crypto = OpensslCrypto;
        let key = [0x11u8; KEY_LEN];
        let iv = [0x22u8; IV_LEN];
        let plaintext = b"0123456789ABCDEF0123456789ABCDEF".to_vec(); // 2 blocks
        let ciphertext = crypto.encrypt_cbc(&key, &iv, &plaintext).unwrap();
        let recovered = crypto.decrypt_cbc(&key, &iv, &ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn hmac_is_deterministic() {
        let crypto = OpensslCrypto;
        let key = [0x33u8; KEY_LEN];
        let a = crypto.compute(&key, b"frame payload").unwrap();
        let b = crypto.compute(&key, b"frame payload").unwrap();
        assert_eq!(a, b);
        let c = crypto.compute(&key, b"different payload").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn rng_fills_buffer() {
        let crypto = OpensslCrypto;
        let iv1 = crypto.random_iv().unwrap();
        let iv2 = crypto.random_iv().unwrap();
        assert_ne!(iv1, iv2);
    }
}
