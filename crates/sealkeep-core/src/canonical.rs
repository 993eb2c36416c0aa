//! Canonical CBOR encoding for persisted objects and signed data.
//!
//! Objects are plain serde structs with a fixed field order and no maps, so
//! ciborium's encoding is deterministic: the same object always produces the
//! same bytes, and therefore the same url.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// Encode a value to canonical CBOR bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(buf)
}

/// Decode a value from CBOR bytes.
pub fn from_canonical_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::Decoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = Sample { name: "acl".into(), count: 3 };
        let b = Sample { name: "acl".into(), count: 3 };
        assert_eq!(to_canonical_bytes(&a).unwrap(), to_canonical_bytes(&b).unwrap());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = from_canonical_bytes::<Sample>(&[0xff, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, CoreError::Decoding(_)));
    }
}
