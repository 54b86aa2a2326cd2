//! Key material and signing helpers shared by the unit tests.

use std::sync::OnceLock;

use ed25519_dalek::Signer as _;
use hmac::{Hmac, Mac};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::{
    pkcs1v15, pkcs8::EncodePublicKey, pss, signature::RandomizedSigner as _,
    signature::SignatureEncoding as _, traits::PublicKeyParts, RsaPrivateKey,
};
use serde_json::{json, Value};
use sha2::Sha256;

use crate::{base64url, jwk::Jwk};

const P256_SECRET: [u8; 32] = [0x11; 32];
const ED25519_SECRET: [u8; 32] = [0x22; 32];
const P384_SECRET: [u8; 48] = [0x33; 48];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn hmac_sha256(key: &[u8], input: &[u8]) -> Vec<u8> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key).unwrap();
    mac.update(input);
    mac.finalize().into_bytes().to_vec()
}

fn p256_signing_key() -> p256::ecdsa::SigningKey {
    p256::ecdsa::SigningKey::from_slice(&P256_SECRET).unwrap()
}

pub fn p256_public_key() -> Vec<u8> {
    p256::PublicKey::from(p256_signing_key().verifying_key())
        .to_encoded_point(false)
        .as_bytes()
        .to_vec()
}

pub fn es256_sign(input: &[u8]) -> Vec<u8> {
    let signature: p256::ecdsa::Signature = p256_signing_key().sign(input);
    signature.to_bytes().to_vec()
}

pub fn p256_jwk() -> Jwk {
    let point = p256_public_key();
    Jwk {
        kty: "EC".to_owned(),
        crv: Some("P-256".to_owned()),
        x: Some(base64url::encode(&point[1..33])),
        y: Some(base64url::encode(&point[33..65])),
        ..Default::default()
    }
}

fn p384_signing_key() -> p384::ecdsa::SigningKey {
    p384::ecdsa::SigningKey::from_slice(&P384_SECRET).unwrap()
}

pub fn p384_public_key() -> Vec<u8> {
    p384::PublicKey::from(p384_signing_key().verifying_key())
        .to_encoded_point(false)
        .as_bytes()
        .to_vec()
}

pub fn es384_sign(input: &[u8]) -> Vec<u8> {
    let signature: p384::ecdsa::Signature = p384_signing_key().sign(input);
    signature.to_bytes().to_vec()
}

pub fn p384_jwk() -> Jwk {
    let point = p384_public_key();
    Jwk {
        kty: "EC".to_owned(),
        crv: Some("P-384".to_owned()),
        x: Some(base64url::encode(&point[1..49])),
        y: Some(base64url::encode(&point[49..97])),
        ..Default::default()
    }
}

/// One 2048-bit key per test run; generating it is slow.
fn rsa_private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).unwrap())
}

/// DER encoded SubjectPublicKeyInfo of the test RSA key.
pub fn rsa_public_key() -> Vec<u8> {
    rsa_private_key()
        .to_public_key()
        .to_public_key_der()
        .unwrap()
        .as_bytes()
        .to_vec()
}

pub fn rs256_sign(input: &[u8]) -> Vec<u8> {
    pkcs1v15::SigningKey::<Sha256>::new(rsa_private_key().clone())
        .sign_with_rng(&mut rand::rngs::OsRng, input)
        .to_vec()
}

pub fn ps256_sign(input: &[u8]) -> Vec<u8> {
    pss::SigningKey::<Sha256>::new(rsa_private_key().clone())
        .sign_with_rng(&mut rand::rngs::OsRng, input)
        .to_vec()
}

pub fn rsa_jwk() -> Jwk {
    let key = rsa_private_key().to_public_key();
    Jwk {
        kty: "RSA".to_owned(),
        n: Some(base64url::encode(key.n().to_bytes_be())),
        e: Some(base64url::encode(key.e().to_bytes_be())),
        ..Default::default()
    }
}

fn ed25519_signing_key() -> ed25519_dalek::SigningKey {
    ed25519_dalek::SigningKey::from_bytes(&ED25519_SECRET)
}

pub fn ed25519_public_key() -> Vec<u8> {
    ed25519_signing_key().verifying_key().to_bytes().to_vec()
}

pub fn eddsa_sign(input: &[u8]) -> Vec<u8> {
    ed25519_signing_key().sign(input).to_bytes().to_vec()
}

pub fn ed25519_jwk() -> Jwk {
    Jwk {
        kty: "OKP".to_owned(),
        crv: Some("Ed25519".to_owned()),
        x: Some(base64url::encode(ed25519_public_key())),
        ..Default::default()
    }
}

/// Base64url of a protected header given as JSON text.
pub fn protected(header: &str) -> String {
    base64url::encode(header)
}

/// A general-serialization signature object carrying an HS256 MAC.
pub fn hs256_signature_object(key: &[u8], protected_b64: &str, payload_b64: &str) -> Value {
    let input = format!("{protected_b64}.{payload_b64}");
    json!({
        "protected": protected_b64,
        "signature": base64url::encode(hmac_sha256(key, input.as_bytes())),
    })
}
