use std::sync::Arc;

use jws_json_models::JwsSignature;

use crate::{
    base64url,
    error::{FormatError, VerificationIssue},
    header::JoseHeaders,
    verifier::SignatureVerifier,
};

/// One signature of a JWS JSON document.
///
/// All entries of a document share the same encoded payload. The protected
/// header is decoded once at construction; the signature value is only decoded
/// when verifying.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureEntry {
    encoded_payload: Arc<str>,
    encoded_protected_header: Option<String>,
    protected_header: Option<JoseHeaders>,
    unprotected_header: Option<JoseHeaders>,
    encoded_signature: String,
}

impl SignatureEntry {
    /// Creates a signature entry.
    ///
    /// # Arguments
    /// * `encoded_payload` - The base64url payload shared by the document
    /// * `encoded_protected_header` - The `protected` member, if any
    /// * `encoded_signature` - The `signature` member
    /// * `unprotected_header` - The `header` member, if any
    ///
    /// # Returns
    /// * `Result<Self, FormatError>` - The entry, or an error if the protected
    ///   header cannot be decoded or shares a parameter with the unprotected one
    pub fn new(
        encoded_payload: impl Into<Arc<str>>,
        encoded_protected_header: Option<String>,
        encoded_signature: String,
        unprotected_header: Option<JoseHeaders>,
    ) -> Result<Self, FormatError> {
        let protected_header = encoded_protected_header
            .as_deref()
            .map(JoseHeaders::decode)
            .transpose()?;

        if let (Some(protected), Some(unprotected)) = (&protected_header, &unprotected_header) {
            if let Some(name) = protected.first_shared_name(unprotected) {
                return Err(FormatError::DuplicateHeaderParameter(name.to_owned()));
            }
        }

        Ok(Self {
            encoded_payload: encoded_payload.into(),
            encoded_protected_header,
            protected_header,
            unprotected_header,
            encoded_signature,
        })
    }

    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    pub fn encoded_protected_header(&self) -> Option<&str> {
        self.encoded_protected_header.as_deref()
    }

    pub fn protected_header(&self) -> Option<&JoseHeaders> {
        self.protected_header.as_ref()
    }

    pub fn unprotected_header(&self) -> Option<&JoseHeaders> {
        self.unprotected_header.as_ref()
    }

    pub fn encoded_signature(&self) -> &str {
        &self.encoded_signature
    }

    /// The decoded signature bytes.
    pub fn decoded_signature(&self) -> Result<Vec<u8>, FormatError> {
        base64url::decode("signature", &self.encoded_signature)
    }

    /// The exact text the signature was computed over:
    /// `protected || '.' || payload`, with an empty `protected` when absent.
    pub fn signing_input(&self) -> String {
        format!(
            "{}.{}",
            self.encoded_protected_header.as_deref().unwrap_or_default(),
            self.encoded_payload
        )
    }

    /// The `alg` of the protected header, falling back to the unprotected one.
    ///
    /// Only used to match entries with verifiers. It is not evidence of anything
    /// until a verifier for that algorithm accepts the signature.
    pub fn algorithm(&self) -> Option<&str> {
        self.protected_header
            .as_ref()
            .and_then(JoseHeaders::algorithm)
            .or_else(|| {
                self.unprotected_header
                    .as_ref()
                    .and_then(JoseHeaders::algorithm)
            })
    }

    /// The protected and unprotected parameters as one header set.
    pub fn union_header(&self) -> JoseHeaders {
        match (&self.protected_header, &self.unprotected_header) {
            (Some(protected), Some(unprotected)) => protected.merge(unprotected),
            (Some(protected), None) => protected.clone(),
            (None, Some(unprotected)) => unprotected.clone(),
            (None, None) => JoseHeaders::new(),
        }
    }

    /// Checks this entry's signature with `verifier`.
    ///
    /// # Returns
    /// * `Ok(true)` - The verifier accepted the signature
    /// * `Ok(false)` - The verifier rejected it
    /// * `Err(VerificationIssue)` - The verifier is for another algorithm, or the
    ///   signature value is not base64url
    pub fn verify_with<V>(&self, verifier: &V) -> Result<bool, VerificationIssue>
    where
        V: SignatureVerifier + ?Sized,
    {
        if self.algorithm() != Some(verifier.algorithm()) {
            return Err(VerificationIssue::AlgorithmMismatch {
                expected: verifier.algorithm().to_owned(),
                actual: self.algorithm().map(str::to_owned),
            });
        }

        let signature = self
            .decoded_signature()
            .map_err(|e| VerificationIssue::MalformedSignature(e.to_string()))?;

        Ok(verifier.verify(self.signing_input().as_bytes(), &signature))
    }

    /// This entry as a wire signature object.
    pub fn to_signature_object(&self) -> JwsSignature {
        JwsSignature {
            protected: self.encoded_protected_header.clone(),
            header: self.unprotected_header.clone().map(JoseHeaders::into_map),
            signature: self.encoded_signature.clone(),
        }
    }
}
