use std::sync::Arc;

use anyhow::{bail, Result};
use jws_json_models::{FlattenedJws, GeneralJws};

use crate::{base64url, entry::SignatureEntry, error::FormatError};

/// Producing-side state for a JWS JSON document.
///
/// Holds the decoded payload and the signature entries collected so far, and
/// re-emits them in the general or flattened serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct JwsJsonProducer {
    payload: Vec<u8>,
    encoded_payload: Arc<str>,
    detached: bool,
    signature_entries: Vec<SignatureEntry>,
}

impl JwsJsonProducer {
    /// Starts a producer for `payload` with no signatures yet.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        let encoded_payload = Arc::from(base64url::encode(&payload));

        Self {
            payload,
            encoded_payload,
            detached: false,
            signature_entries: Vec::new(),
        }
    }

    /// Omits the payload member when serializing.
    pub fn detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    pub(crate) fn from_parts(
        payload: Vec<u8>,
        encoded_payload: Arc<str>,
        detached: bool,
        signature_entries: Vec<SignatureEntry>,
    ) -> Result<Self, FormatError> {
        let mut producer = Self {
            payload,
            encoded_payload,
            detached,
            signature_entries: Vec::with_capacity(signature_entries.len()),
        };
        for entry in signature_entries {
            producer.add_signature_entry(entry)?;
        }
        Ok(producer)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn signature_entries(&self) -> &[SignatureEntry] {
        &self.signature_entries
    }

    /// Appends an entry computed over this producer's payload.
    ///
    /// # Returns
    /// * `Err(FormatError::PayloadMismatch)` - The entry signs a different payload
    pub fn add_signature_entry(&mut self, entry: SignatureEntry) -> Result<(), FormatError> {
        if entry.encoded_payload() != &*self.encoded_payload {
            return Err(FormatError::PayloadMismatch);
        }
        self.signature_entries.push(entry);
        Ok(())
    }

    fn serialized_payload(&self) -> Option<String> {
        (!self.detached).then(|| self.encoded_payload.to_string())
    }

    /// Serializes all entries in the general JSON serialization.
    pub fn to_general_json(&self) -> Result<String> {
        if self.signature_entries.is_empty() {
            bail!("Cannot serialize a JWS without signatures.");
        }

        let jws = GeneralJws {
            payload: self.serialized_payload(),
            signatures: self
                .signature_entries
                .iter()
                .map(SignatureEntry::to_signature_object)
                .collect(),
        };

        Ok(serde_json::to_string(&jws)?)
    }

    /// Serializes the single entry in the flattened JSON serialization.
    pub fn to_flattened_json(&self) -> Result<String> {
        let [entry] = self.signature_entries.as_slice() else {
            bail!(
                "Flattened serialization needs exactly one signature, found {}.",
                self.signature_entries.len()
            );
        };

        let jws = FlattenedJws {
            payload: self.serialized_payload(),
            signature: entry.to_signature_object(),
        };

        Ok(serde_json::to_string(&jws)?)
    }
}
