/// Ed25519 (EdDSA) verifier
pub mod ed25519_verifier;
/// HMAC-SHA2 (HS256/HS384/HS512) verifier
pub mod hmac_verifier;
/// ECDSA P-256 (ES256) verifier
pub mod p256_verifier;
/// ECDSA P-384 (ES384) verifier
pub mod p384_verifier;
/// RSA PKCS#1 v1.5 and PSS (RS*/PS*) verifier
pub mod rsa_verifier;

use std::str::FromStr;

pub use ed25519_verifier::*;
pub use hmac_verifier::*;
pub use p256_verifier::*;
pub use p384_verifier::*;
pub use rsa_verifier::*;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{algorithm::SignatureAlgorithm, error::FormatError, jwk::Jwk};

/// Checks signatures for exactly one algorithm.
///
/// Implementations must be side-effect free: the engine may call `verify` for
/// several entries and treats every `false` as "this entry is not validated by
/// this verifier".
pub trait SignatureVerifier {
    /// The JWA name of the algorithm this verifier was constructed for.
    fn algorithm(&self) -> &str;

    /// Checks `signature` against the JWS signing input.
    ///
    /// # Arguments
    ///
    /// * `signing_input` - `BASE64URL(protected) || '.' || BASE64URL(payload)`
    /// * `signature` - The decoded signature bytes.
    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn algorithm(&self) -> &str {
        (**self).algorithm()
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        (**self).verify(signing_input, signature)
    }
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for Box<T> {
    fn algorithm(&self) -> &str {
        (**self).algorithm()
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        (**self).verify(signing_input, signature)
    }
}

/// All built-in verifier implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
pub enum VerifierType {
    /// Shared-secret MAC verifier
    #[strum(serialize = "hmac")]
    Hmac(HmacVerifier),
    /// P-256 public key verifier
    #[strum(serialize = "p256")]
    P256(P256Verifier),
    /// P-384 public key verifier
    #[strum(serialize = "p384")]
    P384(P384Verifier),
    /// RSA public key verifier
    #[strum(serialize = "rsa")]
    Rsa(RsaVerifier),
    /// Ed25519 public key verifier
    #[strum(serialize = "ed25519")]
    Ed25519(Ed25519Verifier),
}

impl VerifierType {
    /// Builds an HMAC verifier from a shared secret.
    ///
    /// # Arguments
    ///
    /// * `key` - The raw secret bytes.
    /// * `algorithm` - One of `HS256`, `HS384`, `HS512`.
    pub fn from_secret(key: &[u8], algorithm: &str) -> Result<Self, FormatError> {
        let algorithm = parse_algorithm(algorithm)?;
        Ok(VerifierType::Hmac(HmacVerifier::new(key, algorithm)?))
    }

    /// Builds a verifier from raw public key bytes.
    ///
    /// # Arguments
    ///
    /// * `key` - A SEC1 encoded point for `ES256`/`ES384`, a DER encoded
    ///   SubjectPublicKeyInfo for the RSA algorithms, or the 32 key bytes for `EdDSA`.
    /// * `algorithm` - Any public key algorithm of [`SignatureAlgorithm`].
    pub fn from_public_key(key: &[u8], algorithm: &str) -> Result<Self, FormatError> {
        match parse_algorithm(algorithm)? {
            SignatureAlgorithm::ES256 => Ok(VerifierType::P256(P256Verifier::new(key)?)),
            SignatureAlgorithm::ES384 => Ok(VerifierType::P384(P384Verifier::new(key)?)),
            SignatureAlgorithm::EdDSA => Ok(VerifierType::Ed25519(Ed25519Verifier::new(key)?)),
            alg if alg.is_rsa() => Ok(VerifierType::Rsa(RsaVerifier::new(key, alg)?)),
            other => Err(FormatError::UnsupportedAlgorithm(format!(
                "{other} is not a public key algorithm"
            ))),
        }
    }

    /// Builds a verifier from a JSON Web Key.
    ///
    /// # Arguments
    ///
    /// * `jwk` - The key.
    /// * `algorithm` - Overrides the algorithm otherwise taken from, or derived
    ///   from, the key.
    pub fn from_jwk(jwk: &Jwk, algorithm: Option<&str>) -> Result<Self, FormatError> {
        let algorithm = jwk.resolve_algorithm(algorithm)?;

        match algorithm {
            SignatureAlgorithm::HS256 | SignatureAlgorithm::HS384 | SignatureAlgorithm::HS512 => {
                let key = jwk.octet_key()?;
                Ok(VerifierType::Hmac(HmacVerifier::new(&key, algorithm)?))
            }
            SignatureAlgorithm::RS256
            | SignatureAlgorithm::RS384
            | SignatureAlgorithm::RS512
            | SignatureAlgorithm::PS256
            | SignatureAlgorithm::PS384
            | SignatureAlgorithm::PS512 => {
                let key = jwk.rsa_public_key()?;
                Ok(VerifierType::Rsa(RsaVerifier::new(&key, algorithm)?))
            }
            SignatureAlgorithm::ES256 => {
                let point = jwk.p256_point()?;
                Ok(VerifierType::P256(P256Verifier::new(&point)?))
            }
            SignatureAlgorithm::ES384 => {
                let point = jwk.p384_point()?;
                Ok(VerifierType::P384(P384Verifier::new(&point)?))
            }
            SignatureAlgorithm::EdDSA => {
                let key = jwk.ed25519_key()?;
                Ok(VerifierType::Ed25519(Ed25519Verifier::new(&key)?))
            }
        }
    }
}

impl SignatureVerifier for VerifierType {
    fn algorithm(&self) -> &str {
        match self {
            VerifierType::Hmac(verifier) => verifier.algorithm(),
            VerifierType::P256(verifier) => verifier.algorithm(),
            VerifierType::P384(verifier) => verifier.algorithm(),
            VerifierType::Rsa(verifier) => verifier.algorithm(),
            VerifierType::Ed25519(verifier) => verifier.algorithm(),
        }
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8]) -> bool {
        match self {
            VerifierType::Hmac(verifier) => verifier.verify(signing_input, signature),
            VerifierType::P256(verifier) => verifier.verify(signing_input, signature),
            VerifierType::P384(verifier) => verifier.verify(signing_input, signature),
            VerifierType::Rsa(verifier) => verifier.verify(signing_input, signature),
            VerifierType::Ed25519(verifier) => verifier.verify(signing_input, signature),
        }
    }
}

pub(crate) fn parse_algorithm(algorithm: &str) -> Result<SignatureAlgorithm, FormatError> {
    SignatureAlgorithm::from_str(algorithm)
        .map_err(|_| FormatError::UnsupportedAlgorithm(algorithm.to_owned()))
}
