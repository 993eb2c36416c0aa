//! Proptest generators for property-based testing.

use proptest::prelude::*;

use sealkeep_core::{AccessKey, Identity, ObjectUrl};

/// Generate a random accesskey.
pub fn access_key() -> impl Strategy<Value = AccessKey> {
    any::<[u8; 32]>().prop_map(AccessKey::from_bytes)
}

/// Generate a deterministic identity from a random seed.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(crate::fixtures::identity_from_seed)
}

/// Generate a random object url.
pub fn object_url() -> impl Strategy<Value = ObjectUrl> {
    any::<[u8; 32]>().prop_map(ObjectUrl::from_bytes)
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate an ACL name.
pub fn acl_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Parameters for building a master ACL with some grants.
#[derive(Debug, Clone)]
pub struct AclParams {
    pub name: String,
    pub accesskey: AccessKey,
    pub owner_seed: [u8; 32],
    /// Number of grants per viewer; a zero means a viewer never granted.
    pub grants: Vec<u8>,
}

impl Arbitrary for AclParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            acl_name(),
            access_key(),
            any::<[u8; 32]>(),
            prop::collection::vec(0u8..3, 0..5),
        )
            .prop_map(|(name, accesskey, owner_seed, grants)| AclParams {
                name,
                accesskey,
                owner_seed,
                grants,
            })
            .boxed()
    }
}
