//! Strong identifier types.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::{Blake3Hash, Ed25519PublicKey};
use crate::error::CoreError;

/// Text prefix of a rendered [`ObjectUrl`].
pub const URL_SCHEME: &str = "blake3:";

/// Content address of a stored object.
///
/// Computed as `Blake3("sealkeep-object-v0:" || canonical_bytes(object))`, so a
/// url can be known before the object has been written anywhere.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectUrl(pub [u8; 32]);

impl ObjectUrl {
    const DOMAIN: &'static [u8] = b"sealkeep-object-v0:";

    /// Address the given canonical object bytes.
    pub fn for_canonical(bytes: &[u8]) -> Self {
        Self(Blake3Hash::hash_parts(&[Self::DOMAIN, bytes]).0)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectUrl({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", URL_SCHEME, self.to_hex())
    }
}

impl FromStr for ObjectUrl {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| CoreError::InvalidUrl(s.to_string()))?;
        let bytes = hex::decode(hex_part).map_err(|_| CoreError::InvalidUrl(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidUrl(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl AsRef<[u8]> for ObjectUrl {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Identifier of an append-only entry list.
///
/// Derived from Blake3(signer || list_name). Every copy of an ACL (master or
/// public, stale or fresh) shares the same list id, which is how a fetched
/// public copy finds entries appended after it was published.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListId(pub [u8; 32]);

impl ListId {
    /// Derive a list id from the signing key and list name.
    pub fn derive(signer: &Ed25519PublicKey, name: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"sealkeep-list-v0:");
        hasher.update(&signer.0);
        hasher.update(b":");
        hasher.update(name.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for ListId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_object_url_text_roundtrip() {
        let url = ObjectUrl::for_canonical(b"some object");
        let text = url.to_string();
        assert!(text.starts_with(URL_SCHEME));

        let parsed: ObjectUrl = text.parse().unwrap();
        assert_eq!(url, parsed);
    }

    #[test]
    fn test_object_url_rejects_foreign_text() {
        assert!("https://example.com/acl".parse::<ObjectUrl>().is_err());
        assert!("blake3:abcd".parse::<ObjectUrl>().is_err());
        assert!("blake3:zz".parse::<ObjectUrl>().is_err());
    }

    #[test]
    fn test_object_url_is_content_addressed() {
        assert_eq!(ObjectUrl::for_canonical(b"a"), ObjectUrl::for_canonical(b"a"));
        assert_ne!(ObjectUrl::for_canonical(b"a"), ObjectUrl::for_canonical(b"b"));
    }

    #[test]
    fn test_list_id_depends_on_signer_and_name() {
        let kp1 = Keypair::from_seed(&[1u8; 32]);
        let kp2 = Keypair::from_seed(&[2u8; 32]);

        let a = ListId::derive(&kp1.public_key(), "acl");
        assert_eq!(a, ListId::derive(&kp1.public_key(), "acl"));
        assert_ne!(a, ListId::derive(&kp2.public_key(), "acl"));
        assert_ne!(a, ListId::derive(&kp1.public_key(), "other"));
    }
}
