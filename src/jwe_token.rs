//! JWE assembly and compact serialization.

use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};

use crate::algorithms::jwe::content::ContentEncryption;
use crate::error::*;
use crate::jwe_header::JWEHeader;

pub const MAX_JWE_HEADER_LENGTH: usize = 8192;

/// An encrypted message, before compact serialization.
///
/// `encoded_header` is the exact string that was authenticated as AAD; it is
/// emitted verbatim as the first segment.
#[derive(Debug, Clone)]
pub struct JWE {
    header: JWEHeader,
    encoded_header: String,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

impl JWE {
    pub fn header(&self) -> &JWEHeader {
        &self.header
    }

    /// Base64url-encoded protected header (also the AAD).
    pub fn encoded_header(&self) -> &str {
        &self.encoded_header
    }

    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// `header.encryptedKey.iv.ciphertext.tag`, base64url without padding.
    pub fn compact_serialize(&self) -> Result<String, Error> {
        Ok(format!(
            "{}.{}.{}.{}.{}",
            self.encoded_header,
            encode(&self.encrypted_key)?,
            encode(&self.iv)?,
            encode(&self.ciphertext)?,
            encode(&self.tag)?
        ))
    }
}

/// JWE token metadata extracted from the header (before decryption).
#[derive(Debug, Clone)]
pub struct JWETokenMetadata {
    header: JWEHeader,
}

impl JWETokenMetadata {
    /// The key management algorithm.
    pub fn algorithm(&self) -> &str {
        &self.header.algorithm
    }

    /// The content encryption algorithm.
    pub fn encryption(&self) -> &str {
        &self.header.encryption
    }

    /// The key ID (if present).
    pub fn key_id(&self) -> Option<&str> {
        self.header.key_id.as_deref()
    }

    /// Thumbprint of the recipient key (if present).
    pub fn server_key_id(&self) -> Option<&str> {
        self.header.server_key_id.as_deref()
    }

    /// A custom header member, if it is a string.
    pub fn extension(&self, name: &str) -> Option<&str> {
        self.header.extensions.get(name).and_then(|v| v.as_str())
    }

    /// Get the full header.
    pub fn header(&self) -> &JWEHeader {
        &self.header
    }
}

/// Utilities for working with JWE tokens.
pub struct JWEToken;

impl JWEToken {
    /// Encrypt `plaintext` under a fresh CEK and assemble the JWE.
    ///
    /// `key_wrap_fn` receives the CEK and returns the JWE Encrypted Key.
    pub fn seal<KeyWrapFn>(
        header: &JWEHeader,
        plaintext: &[u8],
        content_encryption: ContentEncryption,
        max_plaintext_length: usize,
        key_wrap_fn: KeyWrapFn,
    ) -> Result<JWE, Error>
    where
        KeyWrapFn: FnOnce(&[u8]) -> Result<Vec<u8>, Error>,
    {
        ensure!(
            plaintext.len() <= max_plaintext_length,
            JWEError::Validation(format!(
                "plaintext is {} bytes, the limit is {}",
                plaintext.len(),
                max_plaintext_length
            ))
        );
        ensure!(
            header.encryption == content_encryption.alg_name(),
            JWEError::Validation(format!(
                "header `enc` is `{}`, content is encrypted with `{}`",
                header.encryption,
                content_encryption.alg_name()
            ))
        );

        let cek = content_encryption.generate_cek()?;
        let iv = content_encryption.generate_iv()?;

        let encoded_header = encode(header.to_json()?.as_bytes())?;
        ensure!(
            encoded_header.len() <= MAX_JWE_HEADER_LENGTH,
            JWEError::Validation("protected header is too large".to_string())
        );

        let encrypted_key = key_wrap_fn(cek.as_bytes())?;

        // The AAD is the ASCII bytes of the base64url-encoded header
        let aad = encoded_header.as_bytes();
        let (ciphertext, tag) = content_encryption.encrypt(&cek, &iv, aad, plaintext)?;
        drop(cek);

        Ok(JWE {
            header: header.clone(),
            encoded_header,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        })
    }

    /// Decode JWE token metadata without decrypting.
    pub fn decode_metadata(token: &str) -> Result<JWETokenMetadata, Error> {
        let parts: Vec<&str> = token.split('.').collect();
        ensure!(
            parts.len() == 5,
            JWEError::InvalidInput("a compact JWE has five segments".to_string())
        );
        let header_b64 = parts[0];
        ensure!(
            header_b64.len() <= MAX_JWE_HEADER_LENGTH,
            JWEError::InvalidInput("JWE header too large".to_string())
        );
        let header_bytes = Base64UrlSafeNoPadding::decode_to_vec(header_b64, None)
            .map_err(|_| JWEError::InvalidInput("header is not valid base64url".to_string()))?;
        let header: JWEHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| JWEError::InvalidInput(format!("header is not a JWE header: {}", e)))?;

        Ok(JWETokenMetadata { header })
    }

    /// Parse and decrypt a compact JWE, for checking what `seal` produced.
    #[cfg(test)]
    pub(crate) fn open<KeyUnwrapFn>(token: &str, key_unwrap_fn: KeyUnwrapFn) -> Result<Vec<u8>, Error>
    where
        KeyUnwrapFn: FnOnce(&[u8]) -> Result<Vec<u8>, Error>,
    {
        let parts: Vec<&str> = token.split('.').collect();
        ensure!(parts.len() == 5, "a compact JWE has five segments");
        let metadata = Self::decode_metadata(token)?;
        let content_encryption = ContentEncryption::from_alg_name(metadata.encryption())?;

        let decode = |s: &str| Base64UrlSafeNoPadding::decode_to_vec(s, None);
        let encrypted_key = decode(parts[1])?;
        let iv = decode(parts[2])?;
        let ciphertext = decode(parts[3])?;
        let tag = decode(parts[4])?;

        let cek = crate::algorithms::jwe::content::CEK::new(key_unwrap_fn(&encrypted_key)?);
        content_encryption.decrypt(cek.as_bytes(), &iv, parts[0].as_bytes(), &ciphertext, &tag)
    }
}

fn encode(bytes: &[u8]) -> Result<String, Error> {
    Base64UrlSafeNoPadding::encode_to_string(bytes)
        .map_err(|_| JWEError::Serialization("base64url encoding failed".to_string()).into())
}
