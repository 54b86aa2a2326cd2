use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{base64url::serde_bytes, error::FormatError, verifier::SignatureVerifier};

/// Verifier for EdDSA signatures made with an Ed25519 key.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Ed25519Verifier {
    #[serde(with = "serde_bytes")]
    public_key: Vec<u8>,
}

impl Ed25519Verifier {
    /// Creates an Ed25519Verifier from the 32 public key bytes.
    pub fn new(public_key: &[u8]) -> Result<Self, FormatError> {
        verifying_key(public_key)?;

        Ok(Ed25519Verifier {
            public_key: public_key.to_vec(),
        })
    }

    /// The raw public key bytes.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey, FormatError> {
    let bytes: [u8; 32] = public_key
        .try_into()
        .map_err(|_| FormatError::InvalidKey("Ed25519 public key must be 32 bytes".to_owned()))?;

    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| FormatError::InvalidKey(format!("Ed25519 public key: {e}")))
}

impl SignatureVerifier for Ed25519Verifier {
    fn algorithm(&self) -> &str {
        "EdDSA"
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        log::trace!("Verifying signature with Ed25519 key");
        let Ok(key) = verifying_key(&self.public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify_strict(signing_input, &signature).is_ok()
    }
}
