//! Identities: an addressable actor with a signing key and an encryption key.
//!
//! The url of an identity is the content address of its public half, so
//! anyone holding a [`PublicIdentity`] can compute the url it is stored under.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cipher::{X25519PublicKey, X25519StaticSecret};
use crate::crypto::{Ed25519PublicKey, Keypair};
use crate::error::Result;
use crate::object::StoredObject;
use crate::types::ObjectUrl;

/// The public half of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicIdentity {
    /// Verifies records signed by this identity.
    pub signing_key: Ed25519PublicKey,

    /// Wraps secrets addressed to this identity.
    pub encryption_key: X25519PublicKey,
}

impl PublicIdentity {
    /// Url this public identity is stored under.
    pub fn url(&self) -> Result<ObjectUrl> {
        StoredObject::Identity(*self).url()
    }
}

/// Private key material of an identity, as persisted with a master ACL.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySecret {
    /// Ed25519 signing seed.
    pub signing_seed: [u8; 32],

    /// X25519 static secret.
    pub encryption_secret: [u8; 32],
}

impl fmt::Debug for IdentitySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentitySecret(<redacted>)")
    }
}

/// A full identity, holding private keys.
#[derive(Clone)]
pub struct Identity {
    keypair: Keypair,
    encryption: X25519StaticSecret,
    public: PublicIdentity,
    url: ObjectUrl,
}

impl Identity {
    /// Generate a new random identity.
    pub fn generate() -> Result<Self> {
        Self::from_parts(Keypair::generate(), X25519StaticSecret::generate())
    }

    /// Deterministically derive an identity from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        let keypair = Keypair::from_seed(seed);
        let mut hasher = blake3::Hasher::new_derive_key("sealkeep-identity-x25519-v0");
        hasher.update(seed);
        let encryption = X25519StaticSecret::from_bytes(*hasher.finalize().as_bytes());
        Self::from_parts(keypair, encryption)
    }

    /// Assemble an identity from existing keys.
    pub fn from_parts(keypair: Keypair, encryption: X25519StaticSecret) -> Result<Self> {
        let public = PublicIdentity {
            signing_key: keypair.public_key(),
            encryption_key: encryption.public_key(),
        };
        let url = public.url()?;
        Ok(Self {
            keypair,
            encryption,
            public,
            url,
        })
    }

    /// Rebuild an identity from persisted secret material.
    pub fn from_secret(secret: &IdentitySecret) -> Result<Self> {
        Self::from_parts(
            Keypair::from_seed(&secret.signing_seed),
            X25519StaticSecret::from_bytes(secret.encryption_secret),
        )
    }

    /// Export the private key material.
    pub fn secret(&self) -> IdentitySecret {
        IdentitySecret {
            signing_seed: self.keypair.seed(),
            encryption_secret: self.encryption.to_bytes(),
        }
    }

    /// The url of this identity's public object.
    pub fn url(&self) -> ObjectUrl {
        self.url
    }

    /// The public half.
    pub fn public(&self) -> &PublicIdentity {
        &self.public
    }

    /// The signing keypair.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// The X25519 secret used to unwrap tokens addressed to this identity.
    pub fn encryption_secret(&self) -> &X25519StaticSecret {
        &self.encryption
    }

    /// The object to publish so others can address this identity.
    pub fn to_object(&self) -> StoredObject {
        StoredObject::Identity(self.public)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:?})", self.url)
    }
}
