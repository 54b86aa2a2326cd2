use rsa::{
    pkcs1v15,
    pkcs8::DecodePublicKey,
    pss,
    signature::Verifier,
    RsaPublicKey,
};
use serde::{Deserialize, Serialize};
use sha2::{
    digest::{const_oid::AssociatedOid, FixedOutputReset},
    Digest, Sha256, Sha384, Sha512,
};

use crate::{
    algorithm::SignatureAlgorithm, base64url::serde_bytes, error::FormatError,
    verifier::SignatureVerifier,
};

/// Verifier for the RSASSA-PKCS1-v1_5 (RS*) and RSASSA-PSS (PS*) algorithms.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RsaVerifier {
    algorithm: SignatureAlgorithm,
    /// DER encoded SubjectPublicKeyInfo
    #[serde(with = "serde_bytes")]
    public_key: Vec<u8>,
}

impl RsaVerifier {
    /// Creates an RsaVerifier.
    ///
    /// # Arguments
    ///
    /// * `public_key` - DER encoded SubjectPublicKeyInfo.
    /// * `algorithm` - One of `RS256`, `RS384`, `RS512`, `PS256`, `PS384`, `PS512`.
    pub fn new(public_key: &[u8], algorithm: SignatureAlgorithm) -> Result<Self, FormatError> {
        if !algorithm.is_rsa() {
            return Err(FormatError::UnsupportedAlgorithm(format!(
                "{algorithm} is not an RSA algorithm"
            )));
        }
        rsa_public_key(public_key)?;

        Ok(RsaVerifier {
            algorithm,
            public_key: public_key.to_vec(),
        })
    }

    /// The DER encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

fn rsa_public_key(public_key: &[u8]) -> Result<RsaPublicKey, FormatError> {
    RsaPublicKey::from_public_key_der(public_key)
        .map_err(|e| FormatError::InvalidKey(format!("RSA public key: {e}")))
}

impl SignatureVerifier for RsaVerifier {
    fn algorithm(&self) -> &str {
        self.algorithm.jwa_name()
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        log::trace!("Verifying {} signature with RSA key", self.algorithm);
        let Ok(key) = rsa_public_key(&self.public_key) else {
            return false;
        };
        match self.algorithm {
            SignatureAlgorithm::RS256 => pkcs1v15_matches::<Sha256>(key, signing_input, signature),
            SignatureAlgorithm::RS384 => pkcs1v15_matches::<Sha384>(key, signing_input, signature),
            SignatureAlgorithm::RS512 => pkcs1v15_matches::<Sha512>(key, signing_input, signature),
            SignatureAlgorithm::PS256 => pss_matches::<Sha256>(key, signing_input, signature),
            SignatureAlgorithm::PS384 => pss_matches::<Sha384>(key, signing_input, signature),
            SignatureAlgorithm::PS512 => pss_matches::<Sha512>(key, signing_input, signature),
            _ => false,
        }
    }
}

fn pkcs1v15_matches<D>(key: RsaPublicKey, signing_input: &[u8], signature: &[u8]) -> bool
where
    D: Digest + AssociatedOid,
{
    let Ok(signature) = pkcs1v15::Signature::try_from(signature) else {
        return false;
    };
    pkcs1v15::VerifyingKey::<D>::new(key)
        .verify(signing_input, &signature)
        .is_ok()
}

fn pss_matches<D>(key: RsaPublicKey, signing_input: &[u8], signature: &[u8]) -> bool
where
    D: Digest + FixedOutputReset,
{
    let Ok(signature) = pss::Signature::try_from(signature) else {
        return false;
    };
    pss::VerifyingKey::<D>::new(key)
        .verify(signing_input, &signature)
        .is_ok()
}
