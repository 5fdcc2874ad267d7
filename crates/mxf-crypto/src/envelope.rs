//! Triplet (encrypted frame) envelope packaging (§4.10).

use crate::capability::{AesCipher, HmacMic, SecureRng, HMAC_LEN, IV_LEN, KEY_LEN};
use crate::{Error, Result};
use mxf_core::byteio::{read_u64, write_u64, ReadSeek, WriteSeek};
use mxf_core::dictionary::ENCRYPTED_TRIPLET;
use mxf_core::ids::InstanceUid;
use mxf_core::Ul;
use mxf_klv::klv::{write_klv, KlvHeader};

const CHUK: [u8; 16] = *b"CHUKCHUKCHUKCHUK";

fn check_value(iv: &[u8; IV_LEN]) -> [u8; 16] {
    let mut cv = [0u8; 16];
    for i in 0..16 {
        cv[i] = CHUK[i] ^ iv[i];
    }
    cv
}

/// A decoded or freshly-built encrypted triplet (§4.10).
#[derive(Debug, Clone)]
pub struct Triplet {
    pub context_id: InstanceUid,
    pub plaintext_offset: u64,
    pub source_key: Ul,
    pub source_length: u64,
    pub iv: [u8; IV_LEN],
    pub check_value: [u8; 16],
    pub ciphertext: Vec<u8>,
    pub mic: Option<[u8; HMAC_LEN]>,
}

impl Triplet {
    /// Encrypt `plaintext` under `key`, leaving the first `plaintext_offset`
    /// bytes unencrypted in the header (selective encryption, e.g. codec
    /// headers left readable).
    #[allow(clippy::too_many_arguments)]
    pub fn encrypt(
        context_id: InstanceUid,
        source_key: Ul,
        plaintext: &[u8],
        plaintext_offset: u64,
        key: &[u8; KEY_LEN],
        hmac_key: Option<&[u8; KEY_LEN]>,
        cipher: &dyn AesCipher,
        hmac: &dyn HmacMic,
        rng: &dyn SecureRng,
    ) -> Result<Self> {
        let pto = plaintext_offset as usize;
        if pto > plaintext.len() {
            return Err(Error::LargePto(plaintext_offset, plaintext.len() as u64));
        }
        let (header, body) = plaintext.split_at(pto);
        let mut padded = body.to_vec();
        let rem = padded.len() % 16;
        if rem != 0 {
            padded.resize(padded.len() + (16 - rem), 0);
        }

        let iv = rng.random_iv()?;
        let mut ciphertext = header.to_vec();
        ciphertext.extend(cipher.encrypt_cbc(key, &iv, &padded)?);

        let mut triplet = Self {
            context_id,
            plaintext_offset,
            source_key,
            source_length: plaintext.len() as u64,
            iv,
            check_value: check_value(&iv),
            ciphertext,
            mic: None,
        };

        if let Some(hmac_key) = hmac_key {
            let signed = triplet.mic_input();
            triplet.mic = Some(hmac.compute(hmac_key, &signed)?);
        }
        Ok(triplet)
    }

    /// Decrypt back to the original plaintext, verifying the check value and
    /// (if present) the HMAC.
    pub fn decrypt(
        &self,
        key: &[u8; KEY_LEN],
        hmac_key: Option<&[u8; KEY_LEN]>,
        cipher: &dyn AesCipher,
        hmac: &dyn HmacMic,
    ) -> Result<Vec<u8>> {
        if self.check_value != check_value(&self.iv) {
            return Err(Error::CheckFail);
        }
        if let (Some(mic), Some(hmac_key)) = (self.mic, hmac_key) {
            let expected = hmac.compute(hmac_key, &self.mic_input())?;
            if expected != mic {
                return Err(Error::HmacFail);
            }
        }

        let pto = self.plaintext_offset as usize;
        if pto > self.ciphertext.len() {
            return Err(Error::BadTriplet("PlaintextOffset exceeds ciphertext length".into()));
        }
        let (header, body) = self.ciphertext.split_at(pto);
        let mut plaintext = header.to_vec();
        plaintext.extend(cipher.decrypt_cbc(key, &self.iv, body)?);
        plaintext.truncate(self.source_length as usize);
        Ok(plaintext)
    }

    /// Bytes covered by the HMAC: `ContextID || PlaintextOffset || SourceKey
    /// || SourceLength || ESV` (§4.10).
    fn mic_input(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + 8 + 16 + 8 + 32 + self.ciphertext.len());
        buf.extend_from_slice(self.context_id.as_bytes());
        buf.extend_from_slice(&self.plaintext_offset.to_be_bytes());
        buf.extend_from_slice(self.source_key.as_bytes());
        buf.extend_from_slice(&self.source_length.to_be_bytes());
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&self.check_value);
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    pub fn write(&self, w: &mut dyn WriteSeek) -> Result<u64> {
        let mut payload = Vec::with_capacity(64 + self.ciphertext.len());
        payload.extend_from_slice(self.context_id.as_bytes());
        payload.extend_from_slice(&self.plaintext_offset.to_be_bytes());
        payload.extend_from_slice(self.source_key.as_bytes());
        payload.extend_from_slice(&self.source_length.to_be_bytes());
        payload.extend_from_slice(&(32 + self.ciphertext.len() as u64).to_be_bytes());
        payload.extend_from_slice(&self.iv);
        payload.extend_from_slice(&self.check_value);
        payload.extend_from_slice(&self.ciphertext);
        if let Some(mic) = self.mic {
            payload.extend_from_slice(&mic);
        }
        Ok(write_klv(w, &ENCRYPTED_TRIPLET, &payload)?)
    }

    pub fn read(r: &mut dyn ReadSeek, has_mic: bool) -> Result<Self> {
        let hdr = KlvHeader::read(r)?;
        if hdr.key != ENCRYPTED_TRIPLET {
            return Err(Error::BadTriplet("key is not the encrypted triplet UL".into()));
        }
        let mut context_id_bytes = [0u8; 16];
        std::io::Read::read_exact(r, &mut context_id_bytes)?;
        let context_id = InstanceUid::from_bytes(context_id_bytes);
        let plaintext_offset = read_u64(r)?;
        let mut source_key_bytes = [0u8; 16];
        std::io::Read::read_exact(r, &mut source_key_bytes)?;
        let source_key = Ul::new(source_key_bytes);
        let source_length = read_u64(r)?;
        let esv_len = read_u64(r)? as usize;
        if esv_len < 32 {
            return Err(Error::BadTriplet("ESV shorter than IV+CheckValue".into()));
        }
        let mut iv = [0u8; IV_LEN];
        std::io::Read::read_exact(r, &mut iv)?;
        let mut cv = [0u8; 16];
        std::io::Read::read_exact(r, &mut cv)?;
        let mut ciphertext = vec![0u8; esv_len - 32];
        std::io::Read::read_exact(r, &mut ciphertext)?;
        let mic = if has_mic {
            let mut m = [0u8; HMAC_LEN];
            std::io::Read::read_exact(r, &mut m)?;
            Some(m)
        } else {
            None
        };
        hdr.skip(r)?;

        Ok(Self {
            context_id,
            plaintext_offset,
            source_key,
            source_length,
            iv,
            check_value: cv,
            ciphertext,
            mic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::OpensslCrypto;
    use std::io::Cursor;

    #[test]
    fn encrypt_decrypt_roundtrip_with_hmac() {
        let crypto = OpensslCrypto;
        let key = [0u8; KEY_LEN];
        let plaintext = vec![0xABu8; 200_000];
        let context_id = InstanceUid::from_bytes([7u8; 16]);
        let source_key = Ul::new([9u8; 16]);

        let triplet = Triplet::encrypt(
            context_id,
            source_key,
            &plaintext,
            0,
            &key,
            Some(&key),
            &crypto,
            &crypto,
            &crypto,
        )
        .unwrap();
        assert_eq!(triplet.ciphertext.len() % 16, 0);

        let recovered = triplet.decrypt(&key, Some(&key), &crypto, &crypto).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn wrong_hmac_key_fails() {
        let crypto = OpensslCrypto;
        let key = [0u8; KEY_LEN];
        let wrong_key = [1u8; KEY_LEN];
        let plaintext = vec![1u8; 1000];
        let triplet = Triplet::encrypt(
            InstanceUid::from_bytes([1; 16]),
            Ul::new([2; 16]),
            &plaintext,
            0,
            &key,
            Some(&key),
            &crypto,
            &crypto,
            &crypto,
        )
        .unwrap();
        let err = triplet.decrypt(&key, Some(&wrong_key), &crypto, &crypto).unwrap_err();
        assert!(matches!(err, Error::HmacFail));
    }

    #[test]
    fn roundtrip_through_klv() {
        let crypto = OpensslCrypto;
        let key = [0u8; KEY_LEN];
        let plaintext = vec![0x42u8; 500];
        let triplet = Triplet::encrypt(
            InstanceUid::from_bytes([3; 16]),
            Ul::new([4; 16]),
            &plaintext,
            0,
            &key,
            None,
            &crypto,
            &crypto,
            &crypto,
        )
        .unwrap();

        let mut buf = Cursor::new(Vec::new());
        triplet.write(&mut buf).unwrap();
        let mut cur = Cursor::new(buf.into_inner());
        let read_back = Triplet::read(&mut cur, false).unwrap();
        assert_eq!(read_back.ciphertext, triplet.ciphertext);
        let recovered = read_back.decrypt(&key, None, &crypto, &crypto).unwrap();
        assert_eq!(recovered, plaintext);
    }

    proptest::proptest! {
        #[test]
        fn encrypt_decrypt_roundtrips_for_any_plaintext_and_offset(
            plaintext in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..2048),
            offset_fraction in 0u8..=100,
        ) {
            let crypto = OpensslCrypto;
            let key = [0x5Au8; KEY_LEN];
            let plaintext_offset = (plaintext.len() as u64 * offset_fraction as u64) / 100;

            let triplet = Triplet::encrypt(
                InstanceUid::from_bytes([2; 16]),
                Ul::new([3; 16]),
                &plaintext,
                plaintext_offset,
                &key,
                None,
                &crypto,
                &crypto,
                &crypto,
            )
            .unwrap();

            let recovered = triplet.decrypt(&key, None, &crypto, &crypto).unwrap();
            proptest::prop_assert_eq!(recovered, plaintext);
        }
    }
}
