use p384::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{base64url::serde_bytes, error::FormatError, verifier::SignatureVerifier};

/// Verifier for ES384 (ECDSA over P-384 with SHA-384).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct P384Verifier {
    /// SEC1 encoded public key point
    #[serde(with = "serde_bytes")]
    public_key: Vec<u8>,
}

impl P384Verifier {
    /// Creates a P384Verifier from a SEC1 encoded point.
    pub fn new(public_key: &[u8]) -> Result<Self, FormatError> {
        VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|e| FormatError::InvalidKey(format!("P-384 public key: {e}")))?;

        Ok(P384Verifier {
            public_key: public_key.to_vec(),
        })
    }

    /// The SEC1 encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

impl SignatureVerifier for P384Verifier {
    fn algorithm(&self) -> &str {
        "ES384"
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        log::trace!("Verifying signature with P384 key");
        let Ok(key) = VerifyingKey::from_sec1_bytes(&self.public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(signing_input, &signature).is_ok()
    }
}
