use p256::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{base64url::serde_bytes, error::FormatError, verifier::SignatureVerifier};

/// Verifier for ES256 (ECDSA over P-256 with SHA-256).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct P256Verifier {
    /// SEC1 encoded public key point
    #[serde(with = "serde_bytes")]
    public_key: Vec<u8>,
}

impl P256Verifier {
    /// Creates a P256Verifier from a SEC1 encoded point.
    ///
    /// # Arguments
    ///
    /// * `public_key` - Compressed (33 bytes) or uncompressed (65 bytes) point.
    ///
    /// # Returns
    ///
    /// A verifier, or `InvalidKey` if the bytes are not a point on the curve.
    pub fn new(public_key: &[u8]) -> Result<Self, FormatError> {
        VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|e| FormatError::InvalidKey(format!("P-256 public key: {e}")))?;

        Ok(P256Verifier {
            public_key: public_key.to_vec(),
        })
    }

    /// The SEC1 encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

impl SignatureVerifier for P256Verifier {
    fn algorithm(&self) -> &str {
        "ES256"
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        log::trace!("Verifying signature with P256 key");
        let Ok(key) = VerifyingKey::from_sec1_bytes(&self.public_key) else {
            return false;
        };
        // JWS carries the fixed-size r || s form, not DER
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(signing_input, &signature).is_ok()
    }
}
