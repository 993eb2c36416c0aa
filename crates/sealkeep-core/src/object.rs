//! Persisted object model.
//!
//! Everything the persistence layer stores is a [`StoredObject`], an explicit
//! tagged union. Readers dispatch on the variant to tell a master ACL from a
//! public projection or an identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{from_canonical_bytes, to_canonical_bytes};
use crate::cipher::AccessKey;
use crate::identity::{IdentitySecret, PublicIdentity};
use crate::record::SignedRecord;
use crate::types::ObjectUrl;
use crate::error::Result;

/// Discriminator of a [`StoredObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Identity,
    PublicAcl,
    MasterAcl,
}

impl ObjectKind {
    /// Stable text name, used as a storage column value.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Identity => "identity",
            ObjectKind::PublicAcl => "public_acl",
            ObjectKind::MasterAcl => "master_acl",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content-addressed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredObject {
    /// The public half of an identity.
    Identity(PublicIdentity),

    /// A secret-free projection of an ACL, safe to publish.
    PublicAcl(PublicAclRecord),

    /// A privately held ACL including the accesskey and private keys.
    MasterAcl(MasterAclRecord),
}

impl StoredObject {
    /// The variant of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            StoredObject::Identity(_) => ObjectKind::Identity,
            StoredObject::PublicAcl(_) => ObjectKind::PublicAcl,
            StoredObject::MasterAcl(_) => ObjectKind::MasterAcl,
        }
    }

    /// Canonical CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        to_canonical_bytes(self)
    }

    /// Decode from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        from_canonical_bytes(bytes)
    }

    /// The content address of this object.
    pub fn url(&self) -> Result<ObjectUrl> {
        Ok(ObjectUrl::for_canonical(&self.to_bytes()?))
    }
}

/// Public projection of an ACL.
///
/// Carries no accesskey and no private key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAclRecord {
    pub name: String,
    pub identity: PublicIdentity,
    /// Entries known when the projection was taken.
    pub entries: Vec<SignedRecord>,
}

/// Full identity as stored inside a master ACL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub public: PublicIdentity,
    pub secret: IdentitySecret,
}

/// Master copy of an ACL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterAclRecord {
    pub name: String,
    pub accesskey: AccessKey,
    pub identity: IdentityRecord,
    pub entries: Vec<SignedRecord>,
    /// Every public url this master has been published under.
    pub published: Vec<ObjectUrl>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    fn public_record(identity: &Identity) -> PublicAclRecord {
        let entry = SignedRecord::sign(identity.keypair(), b"entry".to_vec());
        PublicAclRecord {
            name: "docs".into(),
            identity: *identity.public(),
            entries: vec![entry],
        }
    }

    #[test]
    fn test_stored_object_roundtrip() {
        let identity = Identity::from_seed(&[1u8; 32]).unwrap();
        let object = StoredObject::PublicAcl(public_record(&identity));

        let bytes = object.to_bytes().unwrap();
        let recovered = StoredObject::from_bytes(&bytes).unwrap();
        assert_eq!(object, recovered);
        assert_eq!(recovered.kind(), ObjectKind::PublicAcl);
    }

    #[test]
    fn test_url_is_stable_and_content_dependent() {
        let identity = Identity::from_seed(&[1u8; 32]).unwrap();
        let record = public_record(&identity);

        let a = StoredObject::PublicAcl(record.clone()).url().unwrap();
        let b = StoredObject::PublicAcl(record.clone()).url().unwrap();
        assert_eq!(a, b);

        let mut renamed = record;
        renamed.name = "other".into();
        assert_ne!(a, StoredObject::PublicAcl(renamed).url().unwrap());
    }

    #[test]
    fn test_public_record_json_has_no_secret_fields() {
        let identity = Identity::from_seed(&[2u8; 32]).unwrap();
        let json = serde_json::to_value(StoredObject::PublicAcl(public_record(&identity))).unwrap();
        let body = &json["public_acl"];

        assert!(body.get("accesskey").is_none());
        assert!(body["identity"].get("secret").is_none());
        assert!(body["identity"].get("signing_key").is_some());
    }
}
