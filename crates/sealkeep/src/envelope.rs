//! The wire envelope.
//!
//! An envelope is `{ "acl": "<url>", "encrypted": "<hex>" }`. A JSON value
//! whose `encrypted` field is missing, empty or not a string is plaintext and
//! passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sealkeep_core::ObjectUrl;

use crate::error::{KernelError, Result};

/// Name of the field that marks a value as encrypted.
pub const ENCRYPTED_FIELD: &str = "encrypted";

/// An encrypted payload and the ACL that can open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Url of the ACL's public projection.
    pub acl: String,

    /// Hex-encoded ciphertext.
    pub encrypted: String,
}

impl Envelope {
    /// Wrap a ciphertext produced by the ACL published at `acl`.
    pub fn new(acl: ObjectUrl, ciphertext: &[u8]) -> Self {
        Self {
            acl: acl.to_string(),
            encrypted: hex::encode(ciphertext),
        }
    }

    /// Whether `value` carries the encrypted marker: a non-empty string
    /// under `encrypted`. `null`, `false` and `""` mark plaintext.
    pub fn is_encrypted(value: &Value) -> bool {
        value
            .get(ENCRYPTED_FIELD)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    }

    /// Parse an encrypted value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| KernelError::InvalidEnvelope(e.to_string()))
    }

    /// The envelope as a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// The ACL url.
    pub fn acl_url(&self) -> Result<ObjectUrl> {
        self.acl
            .parse()
            .map_err(|e| KernelError::InvalidEnvelope(format!("acl: {}", e)))
    }

    /// The raw ciphertext.
    pub fn ciphertext(&self) -> Result<Vec<u8>> {
        hex::decode(&self.encrypted)
            .map_err(|e| KernelError::InvalidEnvelope(format!("encrypted: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_shape() {
        let url = ObjectUrl::from_bytes([0xab; 32]);
        let envelope = Envelope::new(url, &[1, 2, 3]);
        let value = envelope.to_value().unwrap();

        assert_eq!(value["acl"], json!(url.to_string()));
        assert_eq!(value["encrypted"], json!("010203"));
        assert!(Envelope::is_encrypted(&value));

        let parsed = Envelope::from_value(value).unwrap();
        assert_eq!(parsed.acl_url().unwrap(), url);
        assert_eq!(parsed.ciphertext().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_plain_values_are_not_encrypted() {
        for value in [
            json!(null),
            json!("encrypted"),
            json!(["encrypted"]),
            json!({"acl": "blake3:00"}),
            json!({"text": "hello"}),
            json!({"text": "hi", "encrypted": null}),
            json!({"acl": "x", "encrypted": ""}),
            json!({"encrypted": false}),
            json!({"encrypted": 0}),
        ] {
            assert!(!Envelope::is_encrypted(&value), "{}", value);
        }
    }

    #[test]
    fn test_malformed_envelopes() {
        let missing_acl = Envelope::from_value(json!({"encrypted": "00"}));
        assert!(matches!(missing_acl, Err(KernelError::InvalidEnvelope(_))));

        let bad_url = Envelope::from_value(json!({"acl": "http://x", "encrypted": "00"})).unwrap();
        assert!(matches!(bad_url.acl_url(), Err(KernelError::InvalidEnvelope(_))));

        let bad_hex = Envelope::from_value(json!({"acl": "blake3:00", "encrypted": "zz"})).unwrap();
        assert!(matches!(bad_hex.ciphertext(), Err(KernelError::InvalidEnvelope(_))));
    }
}
