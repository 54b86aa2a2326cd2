use hmac::{digest::KeyInit, Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

use crate::{
    algorithm::SignatureAlgorithm, base64url::serde_bytes, error::FormatError,
    verifier::SignatureVerifier,
};

/// Verifies HS256, HS384 and HS512 MACs with a shared secret.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct HmacVerifier {
    algorithm: SignatureAlgorithm,
    #[serde(with = "serde_bytes")]
    key: Vec<u8>,
}

impl HmacVerifier {
    /// Creates an HMAC verifier.
    ///
    /// # Arguments
    ///
    /// * `key` - The shared secret. Must not be empty.
    /// * `algorithm` - One of the HMAC algorithms.
    pub fn new(key: &[u8], algorithm: SignatureAlgorithm) -> Result<Self, FormatError> {
        if !algorithm.is_hmac() {
            return Err(FormatError::UnsupportedAlgorithm(format!(
                "{algorithm} is not an HMAC algorithm"
            )));
        }
        if key.is_empty() {
            return Err(FormatError::InvalidKey("HMAC key is empty".to_owned()));
        }

        Ok(HmacVerifier {
            algorithm,
            key: key.to_vec(),
        })
    }
}

impl SignatureVerifier for HmacVerifier {
    fn algorithm(&self) -> &str {
        self.algorithm.jwa_name()
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        log::trace!("Verifying {} MAC", self.algorithm);
        let key = &self.key;
        match self.algorithm {
            SignatureAlgorithm::HS256 => mac_matches::<Hmac<Sha256>>(key, signing_input, signature),
            SignatureAlgorithm::HS384 => mac_matches::<Hmac<Sha384>>(key, signing_input, signature),
            SignatureAlgorithm::HS512 => mac_matches::<Hmac<Sha512>>(key, signing_input, signature),
            _ => false,
        }
    }
}

fn mac_matches<M: Mac + KeyInit>(key: &[u8], signing_input: &[u8], signature: &[u8]) -> bool {
    let Ok(mut mac) = <M as Mac>::new_from_slice(key) else {
        return false;
    };
    mac.update(signing_input);
    // constant time
    mac.verify_slice(signature).is_ok()
}
