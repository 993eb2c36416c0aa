//! Access entries: one viewer's wrapped copy of the accesskey.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use sealkeep_core::{Ed25519PublicKey, Keypair, ObjectUrl, SignedRecord};

use crate::error::{AclError, Result};

/// Grants one viewer the ability to recover the accesskey.
///
/// Carried as the data of a [`SignedRecord`] signed by the ACL's identity.
/// Several entries may name the same viewer; every one of them is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessEntry {
    /// Url of the viewer's identity object.
    pub viewer: ObjectUrl,

    /// The accesskey wrapped under the viewer's encryption key.
    pub token: Bytes,
}

impl AccessEntry {
    /// Create an entry.
    pub fn new(viewer: ObjectUrl, token: impl Into<Bytes>) -> Self {
        Self {
            viewer,
            token: token.into(),
        }
    }

    /// Encode and sign this entry.
    pub fn sign(&self, keypair: &Keypair) -> Result<SignedRecord> {
        Ok(SignedRecord::seal(keypair, self)?)
    }

    /// Decode an entry from a record, checking the signature when `signer` is given.
    pub fn open(record: &SignedRecord, signer: Option<&Ed25519PublicKey>) -> Result<Self> {
        if let Some(signer) = signer {
            record
                .verify(signer)
                .map_err(|e| AclError::InvalidEntry(format!("{:?}: {}", record.signature, e)))?;
        }
        record
            .decode()
            .map_err(|e| AclError::InvalidEntry(format!("{:?}: {}", record.signature, e)))
    }
}
