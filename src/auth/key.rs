//! The symmetric key material used to sign and verify access tokens.

use std::fmt::Debug;

use jsonwebtoken::{DecodingKey, EncodingKey};

/// The HMAC key pair derived from the server secret.
///
/// The same secret is used for signing and verification, so both keys are
/// derived together and never change for the lifetime of the process.
#[derive(Clone)]
pub struct SigningKeys {
    pub(super) encoding: EncodingKey,
    pub(super) decoding: DecodingKey,
}

impl SigningKeys {
    /// Derive the signing and verification keys from `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::SigningKeys;

    #[test]
    fn debug_output_does_not_contain_secret() {
        let keys = SigningKeys::from_secret("hunter2hunter2");

        let output = format!("{keys:?}");

        assert!(!output.contains("hunter2"));
    }
}
