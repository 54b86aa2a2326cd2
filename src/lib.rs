//! Consumer for the JWS JSON Serialization (RFC 7515 section 7.2).
//!
//! This crate parses general and flattened JWS JSON documents into an immutable
//! model, matches their signatures with caller-supplied verifiers, and hands
//! verified documents over to a producer for re-serialization.
//!
//! ```no_run
//! use jws_json::{JwsJsonDocument, VerifierType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let text = std::fs::read_to_string("signed.json")?;
//! let document = JwsJsonDocument::parse(&text, None)?;
//!
//! let verifiers = vec![
//!     VerifierType::from_secret(b"shared secret", "HS256")?,
//!     VerifierType::from_public_key(&[0x04; 65], "ES256")?,
//! ];
//! if document.verify_all_with(&verifiers) {
//!     println!("{}", document.decoded_payload()?);
//! }
//! # Ok(())
//! # }
//! ```

/// Signature algorithm identifiers
pub mod algorithm;
/// Unpadded base64url helpers
pub mod base64url;
/// Parsed JWS JSON documents
pub mod document;
/// Signature entries and signing input reconstruction
pub mod entry;
/// Structural and verification errors
pub mod error;
/// JOSE header parameter storage
pub mod header;
/// JSON Web Key conversion into verifiers
pub mod jwk;
/// Trust policies: required verifier sets loaded from configuration files
pub mod policy;
/// Re-serialization of parsed documents
pub mod producer;
/// Signature verifier contract and built-in implementations
pub mod verifier;
/// Verifier to entry matching
pub mod verify;

#[cfg(test)]
mod test_support;

pub use algorithm::SignatureAlgorithm;
pub use document::JwsJsonDocument;
pub use entry::SignatureEntry;
pub use error::{FormatError, VerificationIssue};
pub use header::JoseHeaders;
pub use jwk::Jwk;
/// Wire models of the general and flattened serializations
pub use jws_json_models as models;
pub use policy::TrustPolicy;
pub use producer::JwsJsonProducer;
pub use verifier::{SignatureVerifier, VerifierType};
pub use verify::SignatureIndex;
