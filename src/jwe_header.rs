use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::RESERVED_HEADER_NAMES;
use crate::error::*;

/// JWE protected header.
///
/// Registered members come first, in a fixed order; extensions follow,
/// sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JWEHeader {
    /// Key management algorithm
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// Content encryption algorithm
    #[serde(rename = "enc")]
    pub encryption: String,

    /// Key ID
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Content type
    #[serde(rename = "cty", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// JWK thumbprint of the recipient key
    #[serde(rename = "server_kid", default, skip_serializing_if = "Option::is_none")]
    pub server_key_id: Option<String>,

    /// Caller-supplied members
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl JWEHeader {
    pub fn new(algorithm: impl Into<String>, encryption: impl Into<String>) -> Self {
        JWEHeader {
            algorithm: algorithm.into(),
            encryption: encryption.into(),
            key_id: None,
            content_type: None,
            server_key_id: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_server_key_id(mut self, server_key_id: impl Into<String>) -> Self {
        self.server_key_id = Some(server_key_id.into());
        self
    }

    /// Add string extensions, refusing names that would shadow registered members.
    pub fn with_extensions(mut self, extensions: &BTreeMap<String, String>) -> Result<Self, Error> {
        validate_extension_names(extensions.keys().map(String::as_str))?;
        for (name, value) in extensions {
            self.extensions
                .insert(name.clone(), Value::String(value.clone()));
        }
        Ok(self)
    }

    /// Compact JSON encoding of the header.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| JWEError::Serialization(e.to_string()).into())
    }
}

pub(crate) fn validate_extension_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), Error> {
    for name in names {
        ensure!(
            !name.is_empty(),
            JWEError::Validation("header extension names cannot be empty".to_string())
        );
        ensure!(
            !RESERVED_HEADER_NAMES.contains(&name),
            JWEError::Validation(format!("header `{}` cannot be overridden", name))
        );
    }
    Ok(())
}
