//! RSA public keys as JSON Web Keys, and their RFC 7638 thumbprints.

use std::fmt;

use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use hmac_sha256::Hash as SHA256;
use serde::{Deserialize, Serialize};

use crate::algorithms::{trim_leading_zeros, RSAPublicKeyComponents};
use crate::error::*;

/// Public RSA key in JWK form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPublicJwk {
    /// Key type (always "RSA")
    pub kty: String,
    /// Modulus (base64url, big-endian, no leading zeros)
    pub n: String,
    /// Public exponent (base64url, big-endian, no leading zeros)
    pub e: String,
}

/// Members hashed by the thumbprint, in lexicographic order.
#[derive(Serialize)]
struct ThumbprintInput<'a> {
    e: &'a str,
    kty: &'a str,
    n: &'a str,
}

impl RsaPublicJwk {
    pub fn from_components(components: &RSAPublicKeyComponents) -> Result<Self, Error> {
        let n = trim_leading_zeros(&components.n);
        let e = trim_leading_zeros(&components.e);
        ensure!(
            !n.is_empty(),
            JWEError::InvalidKey("modulus is zero".to_string())
        );
        ensure!(
            !e.is_empty(),
            JWEError::InvalidKey("public exponent is zero".to_string())
        );
        Ok(RsaPublicJwk {
            kty: "RSA".to_string(),
            n: encode(n)?,
            e: encode(e)?,
        })
    }

    /// Decode `n` and `e` back into raw components.
    pub fn to_components(&self) -> Result<RSAPublicKeyComponents, Error> {
        ensure!(
            self.kty == "RSA",
            JWEError::KeyFormat(format!("unexpected key type `{}`", self.kty))
        );
        let decode = |value: &str, name: &str| {
            Base64UrlSafeNoPadding::decode_to_vec(value, None)
                .map_err(|_| JWEError::KeyFormat(format!("`{}` is not valid base64url", name)))
        };
        Ok(RSAPublicKeyComponents {
            n: decode(&self.n, "n")?,
            e: decode(&self.e, "e")?,
        })
    }

    /// The exact JSON document the thumbprint is computed over.
    pub fn canonical_json(&self) -> Result<String, Error> {
        ensure!(
            self.kty == "RSA",
            JWEError::Serialization(format!("no canonical form for key type `{}`", self.kty))
        );
        let input = ThumbprintInput {
            e: &self.e,
            kty: &self.kty,
            n: &self.n,
        };
        serde_json::to_string(&input).map_err(|e| JWEError::Serialization(e.to_string()).into())
    }

    /// RFC 7638 SHA-256 thumbprint.
    pub fn thumbprint(&self) -> Result<JwkThumbprint, Error> {
        let canonical = self.canonical_json()?;
        let digest = SHA256::hash(canonical.as_bytes());
        Ok(JwkThumbprint(encode(&digest)?))
    }
}

/// Base64url-encoded JWK thumbprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JwkThumbprint(String);

impl JwkThumbprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JwkThumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn encode(bytes: &[u8]) -> Result<String, Error> {
    Base64UrlSafeNoPadding::encode_to_string(bytes)
        .map_err(|_| JWEError::Serialization("base64url encoding failed".to_string()).into())
}
