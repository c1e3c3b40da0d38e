//! JWE (JSON Web Encryption) key management and content encryption.
//!
//! One combination is supported: `RSA-OAEP-256` key encryption (RFC 7518,
//! section 4.3) with `A256GCM` content encryption (section 5.3).
//!
//! # Example
//!
//! ```rust,no_run
//! use jwe_simple::prelude::*;
//!
//! # fn main() -> Result<(), jwe_simple::Error> {
//! let pem = std::fs::read_to_string("recipient.pem")?;
//! let key = RsaOaep256EncryptionKey::from_pem(&pem)?;
//! let token = key.encrypt("hello world")?;
//! let metadata = JWEToken::decode_metadata(&token)?;
//! assert_eq!(metadata.algorithm(), "RSA-OAEP-256");
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod rsa_oaep;

pub use content::{ContentEncryption, CEK};
pub use rsa_oaep::{RsaOaep256EncryptionKey, RSA_OAEP_256};
