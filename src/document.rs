use std::{str::FromStr, sync::Arc};

use serde_json::{Map, Value};

use crate::{
    base64url,
    entry::SignatureEntry,
    error::{FormatError, VerificationIssue},
    header::JoseHeaders,
    jwk::Jwk,
    producer::JwsJsonProducer,
    verifier::{SignatureVerifier, VerifierType},
    verify::{self, SignatureIndex},
};

/// A parsed JWS document in the general or flattened JSON serialization.
///
/// The model is built once by [`JwsJsonDocument::parse`] and never changes
/// afterwards, so any number of threads may verify it concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct JwsJsonDocument {
    signed_document: String,
    encoded_payload: Arc<str>,
    detached: bool,
    signature_entries: Vec<SignatureEntry>,
}

impl JwsJsonDocument {
    /// Parses a JWS JSON document.
    ///
    /// # Arguments
    /// * `signed_document` - The JSON text, general or flattened
    /// * `detached_payload` - The base64url payload when it travels outside the
    ///   document; the document must then have no `payload` member
    ///
    /// # Returns
    /// * `Result<Self, FormatError>` - The document, or the first structural
    ///   problem found
    pub fn parse(
        signed_document: &str,
        detached_payload: Option<&str>,
    ) -> Result<Self, FormatError> {
        let json = match serde_json::from_str::<Value>(signed_document) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                log::warn!("JSON JWS is not a JSON object");
                return Err(FormatError::InvalidJson(
                    "top-level value is not an object".to_owned(),
                ));
            }
            Err(e) => {
                log::warn!("JSON JWS could not be parsed: {e}");
                return Err(FormatError::InvalidJson(e.to_string()));
            }
        };

        let (encoded_payload, detached) =
            match (optional_str(&json, "payload")?, detached_payload) {
                (Some(_), Some(_)) => {
                    log::warn!("JSON JWS includes a payload expected to be detached");
                    return Err(FormatError::PayloadConflict);
                }
                (Some(payload), None) => (Arc::<str>::from(payload), false),
                (None, Some(payload)) => (Arc::<str>::from(payload), true),
                (None, None) => {
                    log::warn!("JSON JWS has no payload");
                    return Err(FormatError::MissingPayload);
                }
            };

        let signature_entries = match present(&json, "signatures") {
            Some(signatures) => {
                if json.contains_key("signature") {
                    log::warn!(
                        "JSON JWS has a flattened 'signature' element and a 'signatures' array"
                    );
                    return Err(FormatError::AmbiguousSignatureRepresentation);
                }

                let signatures =
                    signatures
                        .as_array()
                        .ok_or_else(|| FormatError::InvalidFieldType {
                            field: "signatures".to_owned(),
                            expected: "an array",
                        })?;

                log::trace!("Parsing general JSON JWS with {} signatures", signatures.len());
                signatures
                    .iter()
                    .enumerate()
                    .map(|(index, element)| {
                        let object =
                            element
                                .as_object()
                                .ok_or_else(|| FormatError::InvalidFieldType {
                                    field: format!("signatures[{index}]"),
                                    expected: "an object",
                                })?;
                        if present(object, "signature").is_none() {
                            log::warn!("JSON JWS signature entry {index} has no signature");
                            return Err(FormatError::MissingSignature { index });
                        }
                        signature_entry(&encoded_payload, object)
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            None if present(&json, "signature").is_some() => {
                log::trace!("Parsing flattened JSON JWS");
                vec![signature_entry(&encoded_payload, &json)?]
            }
            None => Vec::new(),
        };

        if signature_entries.is_empty() {
            log::warn!("JSON JWS has no signatures");
            return Err(FormatError::NoSignatures);
        }

        Ok(Self {
            signed_document: signed_document.to_owned(),
            encoded_payload,
            detached,
            signature_entries,
        })
    }

    /// The document text exactly as it was parsed.
    pub fn signed_document(&self) -> &str {
        &self.signed_document
    }

    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    /// Whether the payload was supplied out of band.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// The payload bytes.
    pub fn decoded_payload_bytes(&self) -> Result<Vec<u8>, FormatError> {
        base64url::decode("payload", &self.encoded_payload)
    }

    /// The payload as UTF-8 text.
    pub fn decoded_payload(&self) -> Result<String, FormatError> {
        String::from_utf8(self.decoded_payload_bytes()?).map_err(|_| FormatError::InvalidUtf8)
    }

    /// The signature entries in document order.
    pub fn signature_entries(&self) -> &[SignatureEntry] {
        &self.signature_entries
    }

    /// Entries grouped by algorithm. Rebuilt on every call.
    pub fn signature_index(&self) -> SignatureIndex<'_> {
        SignatureIndex::build(&self.signature_entries)
    }

    /// Returns true if `verifier` validates at least one entry of its algorithm.
    pub fn verify_with<V>(&self, verifier: &V) -> bool
    where
        V: SignatureVerifier + ?Sized,
    {
        verify::verify_with(&self.signature_entries, verifier)
    }

    /// Returns true only if every entry is validated by a distinct verifier.
    /// Verification problems count as a failed verification.
    pub fn verify_all_with<V: SignatureVerifier>(&self, verifiers: &[V]) -> bool {
        verify::verify_all_with(&self.signature_entries, verifiers)
    }

    /// Matches verifiers to entries and returns the entries nobody validated.
    pub fn verify_and_get_non_validated<V: SignatureVerifier>(
        &self,
        verifiers: &[V],
    ) -> Result<Vec<&SignatureEntry>, VerificationIssue> {
        verify::verify_and_get_non_validated(&self.signature_entries, verifiers)
    }

    /// Verifies with an HMAC secret. Unusable keys count as not verified.
    pub fn verify_with_secret(&self, key: &[u8], algorithm: &str) -> bool {
        self.verify_with_built(VerifierType::from_secret(key, algorithm))
    }

    /// Verifies with raw public key bytes. Unusable keys count as not verified.
    pub fn verify_with_public_key(&self, key: &[u8], algorithm: &str) -> bool {
        self.verify_with_built(VerifierType::from_public_key(key, algorithm))
    }

    /// Verifies with a JSON Web Key. Unusable keys count as not verified.
    pub fn verify_with_jwk(&self, jwk: &Jwk, algorithm: Option<&str>) -> bool {
        self.verify_with_built(VerifierType::from_jwk(jwk, algorithm))
    }

    fn verify_with_built(&self, verifier: Result<VerifierType, FormatError>) -> bool {
        match verifier {
            Ok(verifier) => self.verify_with(&verifier),
            Err(e) => {
                log::warn!("Cannot build JWS verifier: {e}");
                false
            }
        }
    }

    /// Hands the payload and all entries to a producer for re-serialization.
    pub fn to_producer(&self) -> Result<JwsJsonProducer, FormatError> {
        JwsJsonProducer::from_parts(
            self.decoded_payload_bytes()?,
            self.encoded_payload.clone(),
            self.detached,
            self.signature_entries.clone(),
        )
    }
}

impl FromStr for JwsJsonDocument {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, None)
    }
}

fn present<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|value| !value.is_null())
}

fn optional_str<'a>(
    object: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a str>, FormatError> {
    present(object, name)
        .map(|value| {
            value.as_str().ok_or_else(|| FormatError::InvalidFieldType {
                field: name.to_owned(),
                expected: "a string",
            })
        })
        .transpose()
}

fn signature_entry(
    encoded_payload: &Arc<str>,
    object: &Map<String, Value>,
) -> Result<SignatureEntry, FormatError> {
    let protected = optional_str(object, "protected")?.map(str::to_owned);
    let header = present(object, "header")
        .map(|value| {
            value
                .as_object()
                .cloned()
                .map(JoseHeaders::from)
                .ok_or_else(|| FormatError::InvalidFieldType {
                    field: "header".to_owned(),
                    expected: "an object",
                })
        })
        .transpose()?;
    let signature = optional_str(object, "signature")?
        .unwrap_or_default()
        .to_owned();

    SignatureEntry::new(encoded_payload.clone(), protected, signature, header)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{self, hs256_signature_object, protected};

    const PAYLOAD: &str = "eyJpc3MiOiJqb2UifQ";

    #[test]
    fn parse_flattened() {
        test_support::init_logger();
        let header = protected(r#"{"alg":"HS256"}"#);
        let mut doc = hs256_signature_object(b"secret", &header, PAYLOAD);
        doc["payload"] = json!(PAYLOAD);
        doc["header"] = json!({"kid": "k1"});

        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();

        assert_eq!(jws.encoded_payload(), PAYLOAD);
        assert!(!jws.is_detached());
        assert_eq!(jws.signed_document(), doc.to_string());
        assert_eq!(jws.signature_entries().len(), 1);

        let entry = &jws.signature_entries()[0];
        assert_eq!(entry.encoded_payload(), PAYLOAD);
        assert_eq!(entry.algorithm(), Some("HS256"));
        assert_eq!(entry.unprotected_header().and_then(|h| h.key_id()), Some("k1"));
        assert_eq!(entry.signing_input(), format!("{header}.{PAYLOAD}"));
        assert!(jws.verify_with_secret(b"secret", "HS256"));
    }

    #[test]
    fn parse_general_shares_payload() {
        test_support::init_logger();
        let doc = json!({
            "payload": PAYLOAD,
            "signatures": [
                hs256_signature_object(b"one", &protected(r#"{"alg":"HS256"}"#), PAYLOAD),
                {"header": {"alg": "ES256"}, "signature": "c2ln"},
            ]
        });

        let jws = JwsJsonDocument::parse(&doc.to_string(), None).unwrap();

        let entries = jws.signature_entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.encoded_payload() == PAYLOAD));
        assert_eq!(entries[1].algorithm(), Some("ES256"));
        assert_eq!(entries[1].signing_input(), format!(".{PAYLOAD}"));
    }

    #[test]
    fn payload_round_trips_through_base64url() {
        let bytes = [0u8, 159, 146, 150, 255, b'{', b'}'];
        let encoded = base64url::encode(bytes);
        let doc = json!({"payload": encoded, "header": {"alg": "HS256"}, "signature": "c2ln"});

        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();

        let decoded = jws.decoded_payload_bytes().unwrap();
        assert_eq!(decoded, bytes);
        assert_eq!(base64url::encode(&decoded), jws.encoded_payload());
        assert_eq!(jws.decoded_payload(), Err(FormatError::InvalidUtf8));
    }

    #[test]
    fn decoded_payload_text() {
        let doc = json!({"payload": PAYLOAD, "header": {"alg": "HS256"}, "signature": "c2ln"});
        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();
        assert_eq!(jws.decoded_payload().unwrap(), r#"{"iss":"joe"}"#);

        let doc = json!({"payload": "***", "header": {"alg": "HS256"}, "signature": "c2ln"});
        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();
        assert!(matches!(
            jws.decoded_payload_bytes(),
            Err(FormatError::InvalidBase64 {
                field: "payload",
                ..
            })
        ));
    }

    #[test]
    fn detached_payload() {
        test_support::init_logger();
        let header = protected(r#"{"alg":"HS256"}"#);
        let doc = json!({"signatures": [hs256_signature_object(b"k", &header, PAYLOAD)]});

        let jws = JwsJsonDocument::parse(&doc.to_string(), Some(PAYLOAD)).unwrap();
        assert!(jws.is_detached());
        assert_eq!(jws.encoded_payload(), PAYLOAD);
        assert!(jws.verify_with_secret(b"k", "HS256"));

        let other = JwsJsonDocument::parse(&doc.to_string(), Some("b3RoZXI")).unwrap();
        assert!(!other.verify_with_secret(b"k", "HS256"));
    }

    #[test]
    fn payload_sources_are_exclusive() {
        let doc = json!({"payload": PAYLOAD, "header": {"alg": "HS256"}, "signature": "c2ln"});
        assert_eq!(
            JwsJsonDocument::parse(&doc.to_string(), Some(PAYLOAD)),
            Err(FormatError::PayloadConflict)
        );

        let doc = json!({"header": {"alg": "HS256"}, "signature": "c2ln"});
        assert_eq!(
            JwsJsonDocument::parse(&doc.to_string(), None),
            Err(FormatError::MissingPayload)
        );

        let doc = json!({"payload": null, "header": {"alg": "HS256"}, "signature": "c2ln"});
        assert_eq!(
            JwsJsonDocument::parse(&doc.to_string(), None),
            Err(FormatError::MissingPayload)
        );
    }

    #[test]
    fn signature_shapes_are_exclusive() {
        let doc = json!({
            "payload": PAYLOAD,
            "signature": "c2ln",
            "signatures": [{"header": {"alg": "HS256"}, "signature": "c2ln"}]
        });
        assert_eq!(
            JwsJsonDocument::from_str(&doc.to_string()),
            Err(FormatError::AmbiguousSignatureRepresentation)
        );
    }

    #[test]
    fn signatures_must_not_be_empty() {
        for doc in [
            json!({"payload": PAYLOAD, "signatures": []}),
            json!({"payload": PAYLOAD}),
            json!({"payload": PAYLOAD, "protected": protected(r#"{"alg":"HS256"}"#)}),
        ] {
            assert_eq!(
                JwsJsonDocument::from_str(&doc.to_string()),
                Err(FormatError::NoSignatures),
                "{doc}"
            );
        }
    }

    #[test]
    fn general_entries_need_a_signature() {
        let doc = json!({
            "payload": PAYLOAD,
            "signatures": [
                {"header": {"alg": "HS256"}, "signature": "c2ln"},
                {"header": {"alg": "HS256"}}
            ]
        });
        assert_eq!(
            JwsJsonDocument::from_str(&doc.to_string()),
            Err(FormatError::MissingSignature { index: 1 })
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            JwsJsonDocument::from_str("{\"payload\":"),
            Err(FormatError::InvalidJson(_))
        ));
        assert!(matches!(
            JwsJsonDocument::from_str("[]"),
            Err(FormatError::InvalidJson(_))
        ));

        let cases = [
            (json!({"payload": 1, "signature": "c2ln"}), "payload"),
            (json!({"payload": PAYLOAD, "signatures": {}}), "signatures"),
            (json!({"payload": PAYLOAD, "signatures": ["c2ln"]}), "signatures[0]"),
            (json!({"payload": PAYLOAD, "header": "x", "signature": "c2ln"}), "header"),
            (json!({"payload": PAYLOAD, "protected": 1, "signature": "c2ln"}), "protected"),
            (json!({"payload": PAYLOAD, "signature": 7}), "signature"),
        ];
        for (doc, field) in cases {
            match JwsJsonDocument::from_str(&doc.to_string()) {
                Err(FormatError::InvalidFieldType { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{doc}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_bad_protected_headers() {
        let doc = json!({"payload": PAYLOAD, "protected": "e30*", "signature": "c2ln"});
        assert!(matches!(
            JwsJsonDocument::from_str(&doc.to_string()),
            Err(FormatError::InvalidProtectedHeader(_))
        ));

        let doc = json!({
            "payload": PAYLOAD,
            "protected": protected(r#"{"alg":"HS256"}"#),
            "header": {"alg": "HS256"},
            "signature": "c2ln"
        });
        assert_eq!(
            JwsJsonDocument::from_str(&doc.to_string()),
            Err(FormatError::DuplicateHeaderParameter("alg".to_owned()))
        );
    }

    #[test]
    fn convenience_verification_fails_closed() {
        let header = protected(r#"{"alg":"HS256"}"#);
        let mut doc = hs256_signature_object(b"secret", &header, PAYLOAD);
        doc["payload"] = json!(PAYLOAD);
        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();

        assert!(!jws.verify_with_secret(b"", "HS256"));
        assert!(!jws.verify_with_secret(b"secret", "XS256"));
        assert!(!jws.verify_with_public_key(&[1, 2, 3], "ES256"));
        assert!(!jws.verify_with_jwk(&test_support::p256_jwk(), Some("HS256")));
    }

    #[test]
    fn public_key_and_jwk_verification() {
        let es_header = protected(r#"{"alg":"ES256"}"#);
        let ed_header = protected(r#"{"alg":"EdDSA"}"#);
        let es_input = format!("{es_header}.{PAYLOAD}");
        let ed_input = format!("{ed_header}.{PAYLOAD}");
        let doc = json!({
            "payload": PAYLOAD,
            "signatures": [
                {
                    "protected": es_header,
                    "signature": base64url::encode(test_support::es256_sign(es_input.as_bytes()))
                },
                {
                    "protected": ed_header,
                    "signature": base64url::encode(test_support::eddsa_sign(ed_input.as_bytes()))
                }
            ]
        });
        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();

        assert!(jws.verify_with_public_key(&test_support::p256_public_key(), "ES256"));
        assert!(jws.verify_with_public_key(&test_support::ed25519_public_key(), "EdDSA"));
        assert!(jws.verify_with_jwk(&test_support::p256_jwk(), None));
        assert!(jws.verify_with_jwk(&test_support::ed25519_jwk(), None));
        assert!(!jws.verify_with_secret(b"secret", "HS256"));
    }

    #[test]
    fn rsa_and_p384_signatures_verify() {
        test_support::init_logger();
        let rs_header = protected(r#"{"alg":"RS256"}"#);
        let ps_header = protected(r#"{"alg":"PS256"}"#);
        let es_header = protected(r#"{"alg":"ES384"}"#);
        let rs_input = format!("{rs_header}.{PAYLOAD}");
        let ps_input = format!("{ps_header}.{PAYLOAD}");
        let es_input = format!("{es_header}.{PAYLOAD}");
        let doc = json!({
            "payload": PAYLOAD,
            "signatures": [
                {
                    "protected": rs_header,
                    "signature": base64url::encode(test_support::rs256_sign(rs_input.as_bytes()))
                },
                {
                    "protected": ps_header,
                    "signature": base64url::encode(test_support::ps256_sign(ps_input.as_bytes()))
                },
                {
                    "protected": es_header,
                    "signature": base64url::encode(test_support::es384_sign(es_input.as_bytes()))
                }
            ]
        });
        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();
        let rsa_key = test_support::rsa_public_key();

        assert!(jws.verify_with_public_key(&rsa_key, "RS256"));
        assert!(jws.verify_with_public_key(&rsa_key, "PS256"));
        assert!(jws.verify_with_public_key(&test_support::p384_public_key(), "ES384"));
        assert!(jws.verify_with_jwk(&test_support::rsa_jwk(), Some("RS256")));
        assert!(jws.verify_with_jwk(&test_support::p384_jwk(), None));
        assert!(!jws.verify_with_public_key(&rsa_key, "RS384"));

        let verifiers = vec![
            VerifierType::from_public_key(&rsa_key, "RS256").unwrap(),
            VerifierType::from_jwk(&test_support::rsa_jwk(), Some("PS256")).unwrap(),
            VerifierType::from_public_key(&test_support::p384_public_key(), "ES384").unwrap(),
        ];
        assert!(jws.verify_all_with(&verifiers));
        assert!(!jws.verify_all_with(&verifiers[..2]));
    }

    #[test]
    fn documents_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JwsJsonDocument>();
        assert_send_sync::<SignatureEntry>();
        assert_send_sync::<VerifierType>();

        let header = protected(r#"{"alg":"HS256"}"#);
        let doc = json!({
            "payload": PAYLOAD,
            "signatures": [hs256_signature_object(b"k", &header, PAYLOAD)]
        });
        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();

        std::thread::scope(|scope| {
            let handles = (0..4)
                .map(|_| scope.spawn(|| jws.verify_with_secret(b"k", "HS256")))
                .collect::<Vec<_>>();
            for handle in handles {
                assert!(handle.join().unwrap());
            }
        });
    }

    #[test]
    fn entries_are_read_only() {
        let header = protected(r#"{"alg":"HS256"}"#);
        let doc = json!({
            "payload": PAYLOAD,
            "signatures": [hs256_signature_object(b"k", &header, PAYLOAD)]
        });
        let jws = JwsJsonDocument::from_str(&doc.to_string()).unwrap();

        let mut copy = jws.signature_entries().to_vec();
        copy.clear();

        assert_eq!(jws.signature_entries().len(), 1);
        assert!(jws.verify_with_secret(b"k", "HS256"));
    }
}
