//! Content encryption for JWE.
//!
//! Only A256GCM is implemented. Keys and IVs come straight from the
//! operating system's CSPRNG; if it cannot deliver, encryption fails.

#[cfg(any(feature = "pure-rust", target_arch = "wasm32", target_arch = "wasm64"))]
use superboring as boring;

use boring::symm::{Cipher, Crypter, Mode};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::*;

/// Content encryption algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncryption {
    /// AES-256-GCM
    #[default]
    A256GCM,
}

impl ContentEncryption {
    /// Get the JWE "enc" header value for this algorithm.
    pub fn alg_name(&self) -> &'static str {
        match self {
            ContentEncryption::A256GCM => "A256GCM",
        }
    }

    /// Parse a content encryption algorithm from its JWE name.
    pub fn from_alg_name(name: &str) -> Result<Self, Error> {
        match name {
            "A256GCM" => Ok(ContentEncryption::A256GCM),
            _ => bail!(JWEError::Validation(format!(
                "unsupported content encryption `{}`",
                name
            ))),
        }
    }

    /// Key size in bytes.
    pub fn key_size(&self) -> usize {
        32
    }

    /// IV size in bytes.
    pub fn iv_size(&self) -> usize {
        12 // GCM uses 96-bit IV
    }

    /// Authentication tag size in bytes.
    pub fn tag_size(&self) -> usize {
        16
    }

    /// Generate a random Content Encryption Key (CEK) for this algorithm.
    pub fn generate_cek(&self) -> Result<CEK, Error> {
        let mut cek = CEK::new(vec![0u8; self.key_size()]);
        fill_random(&mut cek.key)?;
        Ok(cek)
    }

    /// Generate a random IV for this algorithm.
    pub fn generate_iv(&self) -> Result<Vec<u8>, Error> {
        let mut iv = vec![0u8; self.iv_size()];
        fill_random(&mut iv)?;
        Ok(iv)
    }

    fn cipher(&self) -> Cipher {
        match self {
            ContentEncryption::A256GCM => Cipher::aes_256_gcm(),
        }
    }

    /// Encrypt plaintext using the content encryption algorithm.
    ///
    /// Returns (ciphertext, authentication_tag).
    pub fn encrypt(
        &self,
        cek: &CEK,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), Error> {
        ensure!(
            cek.as_bytes().len() == self.key_size(),
            JWEError::Encryption("content encryption key has the wrong size".to_string())
        );
        ensure!(
            iv.len() == self.iv_size(),
            JWEError::Encryption("initialization vector has the wrong size".to_string())
        );

        let cipher = self.cipher();
        let mut crypter =
            Crypter::new(cipher, Mode::Encrypt, cek.as_bytes(), Some(iv)).map_err(aead_error)?;
        crypter.aad_update(aad).map_err(aead_error)?;

        let mut ciphertext = vec![0u8; plaintext.len() + cipher.block_size()];
        let mut count = crypter
            .update(plaintext, &mut ciphertext)
            .map_err(aead_error)?;
        count += crypter
            .finalize(&mut ciphertext[count..])
            .map_err(aead_error)?;
        ciphertext.truncate(count);

        let mut tag = vec![0u8; self.tag_size()];
        crypter.get_tag(&mut tag).map_err(aead_error)?;

        Ok((ciphertext, tag))
    }

    #[cfg(test)]
    pub(crate) fn decrypt(
        &self,
        cek: &[u8],
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let cipher = self.cipher();
        let mut crypter = Crypter::new(cipher, Mode::Decrypt, cek, Some(iv))?;
        crypter.aad_update(aad)?;
        crypter.set_tag(tag)?;

        let mut plaintext = vec![0u8; ciphertext.len() + cipher.block_size()];
        let mut count = crypter.update(ciphertext, &mut plaintext)?;
        count += crypter
            .finalize(&mut plaintext[count..])
            .map_err(|_| anyhow!("authentication tag didn't verify"))?;
        plaintext.truncate(count);

        Ok(plaintext)
    }
}

fn aead_error(e: impl std::fmt::Display) -> JWEError {
    JWEError::Encryption(e.to_string())
}

fn fill_random(buf: &mut [u8]) -> Result<(), Error> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| JWEError::Entropy(e.to_string()).into())
}

/// A Content Encryption Key (CEK) that is zeroized on drop.
pub struct CEK {
    key: Vec<u8>,
}

impl CEK {
    pub fn new(key: Vec<u8>) -> Self {
        CEK { key }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

impl Drop for CEK {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl AsRef<[u8]> for CEK {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for CEK {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CEK").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a256gcm_roundtrip() {
        let enc = ContentEncryption::A256GCM;
        let cek = enc.generate_cek().unwrap();
        let iv = enc.generate_iv().unwrap();
        let aad = b"additional authenticated data";
        let plaintext = b"Hello, World!";

        let (ciphertext, tag) = enc.encrypt(&cek, &iv, aad, plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());
        assert_eq!(tag.len(), 16);
        let decrypted = enc
            .decrypt(cek.as_bytes(), &iv, aad, &ciphertext, &tag)
            .unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext() {
        let enc = ContentEncryption::A256GCM;
        let cek = enc.generate_cek().unwrap();
        let iv = enc.generate_iv().unwrap();

        let (ciphertext, tag) = enc.encrypt(&cek, &iv, b"aad", b"").unwrap();
        assert!(ciphertext.is_empty());
        let decrypted = enc
            .decrypt(cek.as_bytes(), &iv, b"aad", &ciphertext, &tag)
            .unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_tampered_aad_fails() {
        let enc = ContentEncryption::A256GCM;
        let cek = enc.generate_cek().unwrap();
        let iv = enc.generate_iv().unwrap();
        let aad = b"additional authenticated data";

        let (ciphertext, tag) = enc.encrypt(&cek, &iv, aad, b"Hello, World!").unwrap();

        let wrong_aad = b"wrong aad";
        let result = enc.decrypt(cek.as_bytes(), &iv, wrong_aad, &ciphertext, &tag);
        assert!(result.is_err());
    }

    #[test]
    fn test_fresh_keys_and_ivs() {
        let enc = ContentEncryption::A256GCM;
        assert_ne!(
            enc.generate_cek().unwrap().as_bytes(),
            enc.generate_cek().unwrap().as_bytes()
        );
        assert_ne!(enc.generate_iv().unwrap(), enc.generate_iv().unwrap());
    }

    #[test]
    fn test_wrong_sizes_are_rejected() {
        let enc = ContentEncryption::A256GCM;
        let short_cek = CEK::new(vec![0u8; 16]);
        let iv = enc.generate_iv().unwrap();
        let err = enc.encrypt(&short_cek, &iv, b"", b"x").unwrap_err();
        assert!(matches!(
            JWEError::classify(&err),
            Some(JWEError::Encryption(_))
        ));

        let cek = enc.generate_cek().unwrap();
        assert!(enc.encrypt(&cek, &[0u8; 8], b"", b"x").is_err());
    }

    #[test]
    fn test_cek_debug_hides_key() {
        let cek = CEK::new(vec![0x41; 32]);
        assert!(!format!("{:?}", cek).contains("65"));
    }

    #[test]
    fn test_unknown_alg_name() {
        assert!(ContentEncryption::from_alg_name("A128CBC-HS256").is_err());
        assert_eq!(
            ContentEncryption::from_alg_name("A256GCM").unwrap(),
            ContentEncryption::A256GCM
        );
    }
}
