//! Request boundary: strict JSON decoding, validation and error mapping.
//!
//! This module is transport-agnostic. A server hands the raw body to
//! [`Encrypter::handle`] and writes back the returned status and body.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::algorithms::RsaOaep256EncryptionKey;
use crate::common::{EncrypterConfig, EncryptionOptions};
use crate::error::*;
use crate::jwe_header::validate_extension_names;

/// Body of an encryption request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptRequest {
    /// Text to encrypt
    pub plaintext: String,

    /// Recipient public key, PEM encoded
    #[serde(rename = "publicKeyPem")]
    pub public_key_pem: String,

    /// Additional protected header members
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl EncryptRequest {
    pub fn new(plaintext: impl Into<String>, public_key_pem: impl Into<String>) -> Self {
        EncryptRequest {
            plaintext: plaintext.into(),
            public_key_pem: public_key_pem.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Decode a request body, rejecting unknown fields.
    pub fn from_json(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|e| {
            JWEError::InvalidInput(format!("invalid JSON or unknown field: {}", e)).into()
        })
    }

    pub fn validate(&self, config: &EncrypterConfig) -> Result<(), Error> {
        ensure!(
            !self.public_key_pem.trim().is_empty(),
            JWEError::Validation("publicKeyPem is required".to_string())
        );
        let limit = config.plaintext_limit();
        ensure!(
            self.plaintext.len() <= limit,
            JWEError::Validation(format!(
                "plaintext is {} bytes, the limit is {}",
                self.plaintext.len(),
                limit
            ))
        );
        validate_extension_names(self.headers.keys().map(String::as_str))
    }
}

/// What a transport should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl EncryptResponse {
    fn ok(token: String) -> Self {
        EncryptResponse {
            status: 200,
            content_type: "text/plain; charset=utf-8",
            body: token,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
        EncryptResponse {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn from_error(err: &Error) -> Self {
        match JWEError::classify(err) {
            Some(e) if e.is_internal() => {
                log::error!("encryption request failed: {}", e);
                Self::error(e.http_status(), &e.to_string())
            }
            Some(e) => {
                log::warn!("encryption request rejected: {}", e);
                Self::error(e.http_status(), &e.to_string())
            }
            None => {
                log::error!("encryption request failed: {}", err);
                Self::error(500, "internal error")
            }
        }
    }
}

/// Runs encryption requests against a fixed configuration.
///
/// Holds no per-request state and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Encrypter {
    config: EncrypterConfig,
}

impl Encrypter {
    pub fn new(config: EncrypterConfig) -> Self {
        Encrypter { config }
    }

    pub fn config(&self) -> &EncrypterConfig {
        &self.config
    }

    /// Decode, validate and encrypt a raw request body.
    pub fn encrypt(&self, body: &[u8]) -> Result<String, Error> {
        ensure!(
            body.len() <= self.config.body_limit(),
            JWEError::InvalidInput("request body too large".to_string())
        );
        let request = EncryptRequest::from_json(body)?;
        self.encrypt_request(&request)
    }

    /// Validate and encrypt an already decoded request.
    pub fn encrypt_request(&self, request: &EncryptRequest) -> Result<String, Error> {
        request.validate(&self.config)?;
        let key = RsaOaep256EncryptionKey::from_pem_with_options(
            &request.public_key_pem,
            &self.config.key_import,
        )?;
        let options = EncryptionOptions {
            header_extensions: request.headers.clone(),
            max_plaintext_length: self.config.plaintext_limit(),
            ..Default::default()
        };
        key.encrypt_with_options(request.plaintext.as_bytes(), &options)
    }

    /// Full request/response cycle.
    pub fn handle(&self, body: &[u8]) -> EncryptResponse {
        match self.encrypt(body) {
            Ok(token) => EncryptResponse::ok(token),
            Err(err) => EncryptResponse::from_error(&err),
        }
    }
}
