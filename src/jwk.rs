use rsa::{pkcs8::EncodePublicKey, BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};

use crate::{
    algorithm::SignatureAlgorithm, base64url, error::FormatError, verifier::parse_algorithm,
};

/// The subset of an RFC 7517 JSON Web Key needed to build a verifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: `oct`, `RSA`, `EC` or `OKP`
    pub kty: String,
    /// Curve for `EC` and `OKP` keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// Public x coordinate, or the whole public key for `OKP`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Public y coordinate for `EC`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Modulus for `RSA`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// Public exponent for `RSA`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Shared secret for `oct`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
    /// Intended algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Key identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Intended use (`sig` or `enc`)
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

impl Jwk {
    /// Picks the algorithm a verifier for this key should use.
    ///
    /// An explicit algorithm wins but must agree with the key's own `alg`.
    /// Without either, EC P-256 and P-384 keys map to `ES256` and `ES384`, and
    /// OKP Ed25519 keys map to `EdDSA`. Symmetric and RSA keys have no default.
    pub fn resolve_algorithm(
        &self,
        algorithm: Option<&str>,
    ) -> Result<SignatureAlgorithm, FormatError> {
        if self.key_use.as_deref().is_some_and(|u| u != "sig") {
            return Err(FormatError::InvalidKey(format!(
                "JWK is not a signature key (use: {})",
                self.key_use.as_deref().unwrap_or_default()
            )));
        }

        let name = match (algorithm, self.alg.as_deref()) {
            (Some(requested), Some(declared)) if requested != declared => {
                return Err(FormatError::InvalidKey(format!(
                    "JWK is bound to {declared}, not {requested}"
                )));
            }
            (Some(requested), _) => requested,
            (None, Some(declared)) => declared,
            (None, None) => match (self.kty.as_str(), self.crv.as_deref()) {
                ("EC", Some("P-256")) => "ES256",
                ("EC", Some("P-384")) => "ES384",
                ("OKP", Some("Ed25519")) => "EdDSA",
                ("oct", _) => {
                    return Err(FormatError::UnsupportedAlgorithm(
                        "symmetric JWK without an algorithm".to_owned(),
                    ))
                }
                // PKCS#1 v1.5 and PSS share the key type
                ("RSA", _) => {
                    return Err(FormatError::UnsupportedAlgorithm(
                        "RSA JWK without an algorithm".to_owned(),
                    ))
                }
                (kty, crv) => {
                    return Err(FormatError::UnsupportedAlgorithm(format!(
                        "no default algorithm for kty {kty} crv {crv:?}"
                    )))
                }
            },
        };

        parse_algorithm(name)
    }

    /// Decoded `k` of an `oct` key.
    pub fn octet_key(&self) -> Result<Vec<u8>, FormatError> {
        self.expect_kty("oct")?;
        base64url::decode("k", self.member("k", self.k.as_deref())?)
    }

    /// DER encoded SubjectPublicKeyInfo of an `RSA` key.
    pub fn rsa_public_key(&self) -> Result<Vec<u8>, FormatError> {
        self.expect_kty("RSA")?;

        let n = base64url::decode("n", self.member("n", self.n.as_deref())?)?;
        let e = base64url::decode("e", self.member("e", self.e.as_deref())?)?;
        let key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
            .map_err(|err| FormatError::InvalidKey(format!("RSA public key: {err}")))?;

        let der = key
            .to_public_key_der()
            .map_err(|err| FormatError::InvalidKey(format!("RSA public key: {err}")))?;
        Ok(der.as_bytes().to_vec())
    }

    /// Uncompressed SEC1 point of an `EC` P-256 key.
    pub fn p256_point(&self) -> Result<Vec<u8>, FormatError> {
        self.ec_point("P-256", 32)
    }

    /// Uncompressed SEC1 point of an `EC` P-384 key.
    pub fn p384_point(&self) -> Result<Vec<u8>, FormatError> {
        self.ec_point("P-384", 48)
    }

    fn ec_point(&self, crv: &str, coordinate_len: usize) -> Result<Vec<u8>, FormatError> {
        self.expect_kty("EC")?;
        self.expect_crv(crv)?;

        let x = base64url::decode("x", self.member("x", self.x.as_deref())?)?;
        let y = base64url::decode("y", self.member("y", self.y.as_deref())?)?;
        if x.len() != coordinate_len || y.len() != coordinate_len {
            return Err(FormatError::InvalidKey(format!(
                "{crv} coordinates must be {coordinate_len} bytes"
            )));
        }

        let mut point = Vec::with_capacity(1 + 2 * coordinate_len);
        point.push(0x04);
        point.extend_from_slice(&x);
        point.extend_from_slice(&y);
        Ok(point)
    }

    /// Public key bytes of an `OKP` Ed25519 key.
    pub fn ed25519_key(&self) -> Result<Vec<u8>, FormatError> {
        self.expect_kty("OKP")?;
        self.expect_crv("Ed25519")?;
        base64url::decode("x", self.member("x", self.x.as_deref())?)
    }

    fn expect_kty(&self, kty: &str) -> Result<(), FormatError> {
        if self.kty != kty {
            return Err(FormatError::InvalidKey(format!(
                "expected kty {kty}, got {}",
                self.kty
            )));
        }
        Ok(())
    }

    fn expect_crv(&self, crv: &str) -> Result<(), FormatError> {
        if self.crv.as_deref() != Some(crv) {
            return Err(FormatError::InvalidKey(format!(
                "expected crv {crv}, got {:?}",
                self.crv
            )));
        }
        Ok(())
    }

    fn member<'a>(&self, name: &str, value: Option<&'a str>) -> Result<&'a str, FormatError> {
        value.ok_or_else(|| FormatError::InvalidKey(format!("JWK has no '{name}' member")))
    }
}
