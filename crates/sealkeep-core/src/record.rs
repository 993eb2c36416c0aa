//! Signed records: the element type of append-only entry lists.
//!
//! A record is opaque canonical bytes plus an Ed25519 signature made by the
//! list owner. The list mechanics do not interpret `data`; typed entries are
//! layered on top with [`SignedRecord::seal`] and [`SignedRecord::decode`].

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::canonical::{from_canonical_bytes, to_canonical_bytes};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Keypair};
use crate::error::Result;

/// Domain separator prepended to record data before signing.
pub const RECORD_SIGN_DOMAIN: &[u8] = b"sealkeep-record-v0:";

/// One independently signed element of an entry list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedRecord {
    /// Signature over `RECORD_SIGN_DOMAIN || data`.
    pub signature: Ed25519Signature,

    /// Canonical CBOR bytes of the entry.
    pub data: Bytes,
}

impl SignedRecord {
    /// Sign raw data.
    pub fn sign(keypair: &Keypair, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let signature = keypair.sign(&signed_message(&data));
        Self { signature, data }
    }

    /// Encode `entry` canonically and sign it.
    pub fn seal<T: Serialize>(keypair: &Keypair, entry: &T) -> Result<Self> {
        let data = to_canonical_bytes(entry)?;
        Ok(Self::sign(keypair, data))
    }

    /// Verify the signature against the list owner's key.
    pub fn verify(&self, signer: &Ed25519PublicKey) -> Result<()> {
        signer.verify(&signed_message(&self.data), &self.signature)
    }

    /// Decode the typed entry carried by this record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        from_canonical_bytes(&self.data)
    }
}

fn signed_message(data: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(RECORD_SIGN_DOMAIN.len() + data.len());
    message.extend_from_slice(RECORD_SIGN_DOMAIN);
    message.extend_from_slice(data);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    #[test]
    fn test_seal_verify_decode() {
        let keypair = Keypair::generate();
        let note = Note { text: "hi".into() };

        let record = SignedRecord::seal(&keypair, &note).unwrap();
        record.verify(&keypair.public_key()).unwrap();
        assert_eq!(record.decode::<Note>().unwrap(), note);
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let owner = Keypair::generate();
        let stranger = Keypair::generate();
        let record = SignedRecord::sign(&owner, b"payload".to_vec());

        let err = record.verify(&stranger.public_key()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSignature));
    }

    #[test]
    fn test_tampered_data_rejected() {
        let owner = Keypair::generate();
        let mut record = SignedRecord::sign(&owner, b"payload".to_vec());
        record.data = Bytes::from_static(b"payloaD");

        assert!(record.verify(&owner.public_key()).is_err());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let owner = Keypair::from_seed(&[9u8; 32]);
        let r1 = SignedRecord::sign(&owner, b"same".to_vec());
        let r2 = SignedRecord::sign(&owner, b"same".to_vec());
        assert_eq!(r1, r2);
    }
}
