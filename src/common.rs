use std::collections::BTreeMap;

/// Smallest accepted RSA modulus, in bits
pub const DEFAULT_MIN_RSA_MODULUS_BITS: usize = 2048;

/// Largest accepted RSA modulus, in bits
pub const DEFAULT_MAX_RSA_MODULUS_BITS: usize = 8192;

/// Largest accepted plaintext, in bytes
pub const DEFAULT_MAX_PLAINTEXT_LENGTH: usize = 1024 * 1024;

/// Header names that callers are not allowed to set through extensions
pub const RESERVED_HEADER_NAMES: &[&str] = &[
    "alg", "apu", "apv", "crit", "cty", "enc", "epk", "iv", "jku", "jwk", "kid", "p2c", "p2s",
    "server_kid", "tag", "typ", "x5c", "x5t", "x5t#S256", "x5u", "zip",
];

/// Constraints applied when importing a recipient public key
#[derive(Clone, Debug)]
pub struct KeyImportOptions {
    /// Reject keys whose modulus has fewer significant bits
    pub min_modulus_bits: usize,

    /// Reject keys whose modulus has more significant bits
    pub max_modulus_bits: usize,
}

impl Default for KeyImportOptions {
    fn default() -> Self {
        KeyImportOptions {
            min_modulus_bits: DEFAULT_MIN_RSA_MODULUS_BITS,
            max_modulus_bits: DEFAULT_MAX_RSA_MODULUS_BITS,
        }
    }
}

/// Options for JWE encryption.
#[derive(Clone, Debug)]
pub struct EncryptionOptions {
    /// Key ID (`kid` header)
    pub key_id: Option<String>,

    /// Content type (`cty` header)
    pub content_type: Option<String>,

    /// Additional protected header members
    pub header_extensions: BTreeMap<String, String>,

    /// Reject plaintexts longer than this
    pub max_plaintext_length: usize,
}

impl Default for EncryptionOptions {
    fn default() -> Self {
        EncryptionOptions {
            key_id: None,
            content_type: None,
            header_extensions: BTreeMap::new(),
            max_plaintext_length: DEFAULT_MAX_PLAINTEXT_LENGTH,
        }
    }
}

impl EncryptionOptions {
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add a custom protected header member.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header_extensions.insert(name.into(), value.into());
        self
    }

    pub fn with_max_plaintext_length(mut self, max_plaintext_length: usize) -> Self {
        self.max_plaintext_length = max_plaintext_length;
        self
    }
}

/// Immutable configuration of an [`Encrypter`](crate::request::Encrypter)
#[derive(Clone, Debug, Default)]
pub struct EncrypterConfig {
    /// Key size policy for recipient keys
    pub key_import: KeyImportOptions,

    /// Reject request bodies longer than this (`None`: derived from the plaintext limit)
    pub max_body_length: Option<usize>,

    /// Reject plaintexts longer than this (`None`: [`DEFAULT_MAX_PLAINTEXT_LENGTH`])
    pub max_plaintext_length: Option<usize>,
}

impl EncrypterConfig {
    pub fn with_key_import(mut self, key_import: KeyImportOptions) -> Self {
        self.key_import = key_import;
        self
    }

    pub fn with_max_plaintext_length(mut self, max_plaintext_length: usize) -> Self {
        self.max_plaintext_length = Some(max_plaintext_length);
        self
    }

    pub fn with_max_body_length(mut self, max_body_length: usize) -> Self {
        self.max_body_length = Some(max_body_length);
        self
    }

    pub fn plaintext_limit(&self) -> usize {
        self.max_plaintext_length
            .unwrap_or(DEFAULT_MAX_PLAINTEXT_LENGTH)
    }

    /// A JSON-escaped plaintext can grow up to six times, plus room for the key.
    pub fn body_limit(&self) -> usize {
        self.max_body_length
            .unwrap_or_else(|| self.plaintext_limit().saturating_mul(6).saturating_add(64 * 1024))
    }
}
