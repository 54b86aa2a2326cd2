use thiserror::Error;

/// Structural errors. A document that produces one of these cannot be trusted
/// or interpreted, and no partial model is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("JWS document is not a valid JSON object: {0}")]
    InvalidJson(String),

    #[error("JSON JWS includes a payload expected to be detached")]
    PayloadConflict,

    #[error("JSON JWS has no payload")]
    MissingPayload,

    #[error("JSON JWS has a flattened 'signature' element and a 'signatures' array")]
    AmbiguousSignatureRepresentation,

    #[error("JSON JWS has no signatures")]
    NoSignatures,

    #[error("JSON JWS member '{field}' must be {expected}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
    },

    #[error("JSON JWS signature entry {index} has no 'signature' value")]
    MissingSignature { index: usize },

    #[error("Invalid protected header: {0}")]
    InvalidProtectedHeader(String),

    #[error("Header parameter '{0}' is present in both the protected and the unprotected header")]
    DuplicateHeaderParameter(String),

    #[error("'{field}' is not valid base64url: {reason}")]
    InvalidBase64 {
        field: &'static str,
        reason: String,
    },

    #[error("Payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Signature entry covers a different payload than this document")]
    PayloadMismatch,
}

/// Problems met while checking one entry against one verifier.
///
/// These never escape the list-level verification calls; there they count as
/// "not verified".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationIssue {
    #[error("Verifier algorithm '{expected}' does not match entry algorithm {actual:?}")]
    AlgorithmMismatch {
        expected: String,
        actual: Option<String>,
    },

    #[error("Malformed signature value: {0}")]
    MalformedSignature(String),
}
