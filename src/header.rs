use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{base64url, error::FormatError};

/// JOSE header parameters, kept as opaque JSON values in document order.
///
/// Used for both protected and unprotected headers. Only `alg` is interpreted
/// by this crate; everything else is stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoseHeaders(Map<String, Value>);

impl JoseHeaders {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a base64url-encoded protected header.
    ///
    /// # Arguments
    /// * `encoded` - The `protected` member of a signature object
    ///
    /// # Returns
    /// * `Result<Self, FormatError>` - The header parameters, or
    ///   `InvalidProtectedHeader` if the text is not a base64url JSON object
    pub fn decode(encoded: &str) -> Result<Self, FormatError> {
        let bytes = base64url::decode("protected", encoded)
            .map_err(|e| FormatError::InvalidProtectedHeader(e.to_string()))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(FormatError::InvalidProtectedHeader(
                "header is not a JSON object".to_owned(),
            )),
            Err(e) => Err(FormatError::InvalidProtectedHeader(e.to_string())),
        }
    }

    /// Returns the value of a header parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns whether a header parameter is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Sets a header parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// The `alg` parameter, if present and a string.
    pub fn algorithm(&self) -> Option<&str> {
        self.get_str("alg")
    }

    /// The `kid` parameter, if present and a string.
    pub fn key_id(&self) -> Option<&str> {
        self.get_str("kid")
    }

    /// The `cty` parameter, if present and a string.
    pub fn content_type(&self) -> Option<&str> {
        self.get_str("cty")
    }

    fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Name of the first parameter also present in `other`.
    pub fn first_shared_name(&self, other: &JoseHeaders) -> Option<&str> {
        self.0
            .keys()
            .find(|name| other.contains(name))
            .map(String::as_str)
    }

    /// Returns a new header set with the parameters of `self` followed by those
    /// of `other`. On a name clash the value from `other` wins.
    pub fn merge(&self, other: &JoseHeaders) -> JoseHeaders {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        JoseHeaders(merged)
    }

    /// Iterates over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for JoseHeaders {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
