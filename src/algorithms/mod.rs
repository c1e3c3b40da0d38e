pub mod jwe;
mod rsa_key;

pub use self::jwe::*;
pub(crate) use self::rsa_key::trim_leading_zeros;
pub use self::rsa_key::{RSAPublicKey, RSAPublicKeyComponents};
