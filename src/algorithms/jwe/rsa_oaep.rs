//! RSA-OAEP-256 key management algorithm for JWE.
//!
//! The content encryption key is wrapped with RSAES-OAEP, using SHA-256 both
//! as the label hash and inside MGF1. The boring bindings cannot select the
//! OAEP digest, so the wrap itself goes through the `rsa` crate; boring still
//! parses the key.

use ::rsa::{BigUint, Oaep, RsaPublicKey};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use sha2::Sha256;

use super::content::ContentEncryption;
use crate::algorithms::RSAPublicKey;
use crate::common::{EncryptionOptions, KeyImportOptions};
use crate::error::*;
use crate::jwe_header::JWEHeader;
use crate::jwe_token::{JWEToken, JWE};
use crate::jwk::{JwkThumbprint, RsaPublicJwk};

/// JWE "alg" value.
pub const RSA_OAEP_256: &str = "RSA-OAEP-256";

/// RSA public key for encryption (RSA-OAEP-256).
#[derive(Debug, Clone)]
pub struct RsaOaep256EncryptionKey {
    pk: RSAPublicKey,
    wrapping_key: RsaPublicKey,
    key_id: Option<String>,
}

impl RsaOaep256EncryptionKey {
    /// Create an encryption key from a PEM-encoded public key.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        Self::from_pem_with_options(pem, &KeyImportOptions::default())
    }

    pub fn from_pem_with_options(pem: &str, options: &KeyImportOptions) -> Result<Self, Error> {
        Self::new(RSAPublicKey::from_pem(pem, options)?, options)
    }

    /// Create an encryption key from a DER-encoded public key.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let options = KeyImportOptions::default();
        Self::new(RSAPublicKey::from_der(der, &options)?, &options)
    }

    /// Create an encryption key from its JWK representation.
    pub fn from_jwk(jwk: &RsaPublicJwk) -> Result<Self, Error> {
        let options = KeyImportOptions::default();
        let components = jwk.to_components()?;
        RsaPublicJwk::from_components(&components)?;
        let pk = RSAPublicKey::from_components(&components.n, &components.e, &options)?;
        Self::new(pk, &options)
    }

    fn new(pk: RSAPublicKey, options: &KeyImportOptions) -> Result<Self, Error> {
        let components = pk.to_components();
        let wrapping_key = RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(&components.n),
            BigUint::from_bytes_be(&components.e),
            options.max_modulus_bits,
        )
        .map_err(|e| JWEError::InvalidKey(e.to_string()))?;
        log::debug!("imported {} bit RSA public key", pk.modulus_bits());
        Ok(RsaOaep256EncryptionKey {
            pk,
            wrapping_key,
            key_id: None,
        })
    }

    /// Export the key as DER.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        self.pk.to_der()
    }

    /// Convert the key to a JWK.
    pub fn to_jwk(&self) -> Result<RsaPublicJwk, Error> {
        RsaPublicJwk::from_components(&self.pk.to_components())
    }

    /// RFC 7638 thumbprint of the key.
    pub fn thumbprint(&self) -> Result<JwkThumbprint, Error> {
        self.to_jwk()?.thumbprint()
    }

    pub fn modulus_bits(&self) -> usize {
        self.pk.modulus_bits()
    }

    /// Set the key ID.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Get the key ID.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    fn wrap_key(&self, cek: &[u8]) -> Result<Vec<u8>, Error> {
        self.wrap_key_with_entropy(OsRng, cek)
    }

    /// The `rsa` crate draws the OAEP seed infallibly, so it gets a generator
    /// seeded up front from `entropy`.
    fn wrap_key_with_entropy<R: RngCore>(
        &self,
        entropy: R,
        cek: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut rng = StdRng::from_rng(entropy).map_err(|e| JWEError::Entropy(e.to_string()))?;
        self.wrapping_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), cek)
            .map_err(|e| JWEError::Encryption(format!("key wrapping failed: {}", e)).into())
    }

    /// Encrypt `plaintext` into a compact JWE.
    pub fn encrypt(&self, plaintext: impl AsRef<[u8]>) -> Result<String, Error> {
        self.encrypt_with_options(plaintext, &EncryptionOptions::default())
    }

    /// Encrypt `plaintext` into a compact JWE with options.
    pub fn encrypt_with_options(
        &self,
        plaintext: impl AsRef<[u8]>,
        options: &EncryptionOptions,
    ) -> Result<String, Error> {
        self.seal(plaintext.as_ref(), options)?.compact_serialize()
    }

    /// Encrypt `plaintext`, returning the JWE before serialization.
    ///
    /// The protected header carries the key thumbprint as `server_kid`.
    pub fn seal(&self, plaintext: &[u8], options: &EncryptionOptions) -> Result<JWE, Error> {
        let content_encryption = ContentEncryption::A256GCM;
        let thumbprint = self.thumbprint()?;
        let mut header = JWEHeader::new(RSA_OAEP_256, content_encryption.alg_name())
            .with_server_key_id(thumbprint.as_str());

        if let Some(key_id) = &self.key_id {
            header.key_id = Some(key_id.clone());
        }
        if let Some(key_id) = &options.key_id {
            header.key_id = Some(key_id.clone());
        }
        if let Some(cty) = &options.content_type {
            header.content_type = Some(cty.clone());
        }
        let header = header.with_extensions(&options.header_extensions)?;

        let jwe = JWEToken::seal(
            &header,
            plaintext,
            content_encryption,
            options.max_plaintext_length,
            |cek| self.wrap_key(cek),
        )?;
        log::debug!(
            "sealed {} byte plaintext for server_kid {}",
            plaintext.len(),
            thumbprint
        );
        Ok(jwe)
    }
}
