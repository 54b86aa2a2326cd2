use base64::engine::{general_purpose::URL_SAFE_NO_PAD as BASE64_URL_NO_PAD, Engine};

use crate::error::FormatError;

/// Encodes bytes as unpadded base64url, the only encoding JWS uses.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    BASE64_URL_NO_PAD.encode(bytes)
}

/// Decodes unpadded base64url.
///
/// # Arguments
/// * `field` - Name of the JWS member being decoded, reported on failure
/// * `encoded` - The encoded text
pub fn decode(field: &'static str, encoded: &str) -> Result<Vec<u8>, FormatError> {
    BASE64_URL_NO_PAD
        .decode(encoded)
        .map_err(|e| FormatError::InvalidBase64 {
            field,
            reason: e.to_string(),
        })
}

/// Serde adapter storing key material as base64url strings.
pub(crate) mod serde_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode("key", &s).map_err(D::Error::custom)
    }
}
