use serde::{Deserialize, Serialize};

/// JWA signature algorithms with a built-in verifier.
///
/// Entries and external verifiers may carry any algorithm name; this list only
/// covers what [`crate::verifier::VerifierType`] can check by itself.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
    strum::VariantNames,
)]
pub enum SignatureAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256
    PS256,
    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384
    PS384,
    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512
    PS512,
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
    /// Edwards-curve signatures (Ed25519)
    EdDSA,
}

impl SignatureAlgorithm {
    /// The JWA registry name, as it appears in an `alg` header.
    pub fn jwa_name(&self) -> &'static str {
        self.into()
    }

    /// Whether this is one of the HMAC algorithms.
    pub fn is_hmac(&self) -> bool {
        matches!(
            self,
            SignatureAlgorithm::HS256 | SignatureAlgorithm::HS384 | SignatureAlgorithm::HS512
        )
    }

    /// Whether this is one of the RSA algorithms, PKCS#1 v1.5 or PSS.
    pub fn is_rsa(&self) -> bool {
        matches!(
            self,
            SignatureAlgorithm::RS256
                | SignatureAlgorithm::RS384
                | SignatureAlgorithm::RS512
                | SignatureAlgorithm::PS256
                | SignatureAlgorithm::PS384
                | SignatureAlgorithm::PS512
        )
    }
}
