#[cfg(any(feature = "pure-rust", target_arch = "wasm32", target_arch = "wasm64"))]
use superboring as boring;

use boring::bn::BigNum;
use boring::pkey::Public;
use boring::rsa::Rsa;

use crate::common::KeyImportOptions;
use crate::error::*;

/// An RSA public key imported from PEM, DER or raw components.
#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct RSAPublicKey(Rsa<Public>);

impl AsRef<Rsa<Public>> for RSAPublicKey {
    fn as_ref(&self) -> &Rsa<Public> {
        &self.0
    }
}

/// Big-endian, unsigned modulus and exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPublicKeyComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
}

impl RSAPublicKeyComponents {
    /// Number of significant bits of the modulus.
    pub fn modulus_bits(&self) -> usize {
        significant_bits(&self.n)
    }
}

impl RSAPublicKey {
    /// Parse a SubjectPublicKeyInfo or PKCS#1 DER public key.
    pub fn from_der(der: &[u8], options: &KeyImportOptions) -> Result<Self, Error> {
        let rsa_pk = Rsa::<Public>::public_key_from_der(der)
            .or_else(|_| Rsa::<Public>::public_key_from_der_pkcs1(der))
            .map_err(|e| JWEError::KeyFormat(format!("not an RSA public key ({})", e)))?;
        Self::checked(rsa_pk, options)
    }

    /// Parse a `PUBLIC KEY` or `RSA PUBLIC KEY` PEM block.
    pub fn from_pem(pem: &str, options: &KeyImportOptions) -> Result<Self, Error> {
        // Text before the encapsulation boundary is allowed (RFC 7468).
        let pem = match pem.find("-----BEGIN ") {
            Some(start) => pem[start..].trim_end(),
            None => bail!(JWEError::KeyFormat("no PEM block found".to_string())),
        };
        let rsa_pk = Rsa::<Public>::public_key_from_pem(pem.as_bytes())
            .or_else(|_| Rsa::<Public>::public_key_from_pem_pkcs1(pem.as_bytes()))
            .map_err(|e| JWEError::KeyFormat(format!("not an RSA public key ({})", e)))?;
        Self::checked(rsa_pk, options)
    }

    pub fn from_components(
        n: &[u8],
        e: &[u8],
        options: &KeyImportOptions,
    ) -> Result<Self, Error> {
        let n = BigNum::from_slice(n).map_err(invalid_key)?;
        let e = BigNum::from_slice(e).map_err(invalid_key)?;
        let rsa_pk = Rsa::<Public>::from_public_components(n, e).map_err(invalid_key)?;
        Self::checked(rsa_pk, options)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        self.0
            .public_key_to_der()
            .map_err(|e| JWEError::Serialization(e.to_string()).into())
    }

    pub fn to_components(&self) -> RSAPublicKeyComponents {
        let n = self.0.n().to_vec();
        let e = self.0.e().to_vec();
        RSAPublicKeyComponents { n, e }
    }

    pub fn modulus_bits(&self) -> usize {
        significant_bits(&self.0.n().to_vec())
    }

    fn checked(rsa_pk: Rsa<Public>, options: &KeyImportOptions) -> Result<Self, Error> {
        let pk = RSAPublicKey(rsa_pk);
        let bits = pk.modulus_bits();
        ensure!(
            bits >= options.min_modulus_bits,
            JWEError::KeyFormat(format!(
                "weak key: {} bit modulus, at least {} bits required",
                bits, options.min_modulus_bits
            ))
        );
        ensure!(
            bits <= options.max_modulus_bits,
            JWEError::KeyFormat(format!(
                "{} bit modulus exceeds the {} bit limit",
                bits, options.max_modulus_bits
            ))
        );
        Ok(pk)
    }
}

fn invalid_key(e: impl std::fmt::Display) -> JWEError {
    JWEError::InvalidKey(e.to_string())
}

pub(crate) fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

fn significant_bits(bytes: &[u8]) -> usize {
    match trim_leading_zeros(bytes) {
        [] => 0,
        [first, rest @ ..] => rest.len() * 8 + (8 - first.leading_zeros() as usize),
    }
}
