//! Serializable wire models for the JWS JSON Serialization.
//!
//! These structs mirror the two JSON shapes of RFC 7515 section 7.2 one to one
//! and carry no validation of their own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// General JWS JSON Serialization: a shared payload and an array of signatures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralJws {
    /// The base64url-encoded payload, absent when the payload is detached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// One or more signatures over the payload
    pub signatures: Vec<JwsSignature>,
}

/// Flattened JWS JSON Serialization: a payload and exactly one inline signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlattenedJws {
    /// The base64url-encoded payload, absent when the payload is detached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// The single signature, inlined at the top level
    #[serde(flatten)]
    pub signature: JwsSignature,
}

/// A single signature object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwsSignature {
    /// The base64url-encoded protected header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<String>,
    /// The unprotected header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Map<String, Value>>,
    /// The base64url-encoded signature bytes
    pub signature: String,
}
