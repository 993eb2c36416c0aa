//! # Sealkeep Testkit
//!
//! Testing utilities for Sealkeep.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: an owner, a shared memory store and helpers to make viewers
//! - **Faults**: a persistence wrapper that injects cancellation or timeouts
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use sealkeep_testkit::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let acl = fixture.master("docs", None);
//!     let viewer = fixture.viewer().await;
//!     acl.add_viewer(&viewer.url()).await.unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use sealkeep_testkit::generators::AclParams;
//!
//! proptest! {
//!     #[test]
//!     fn projection_has_no_secret(params: AclParams) {
//!         // build a master from params and inspect its projection
//!     }
//! }
//! ```

pub mod faults;
pub mod fixtures;
pub mod generators;

pub use faults::{Fault, FaultyStore};
pub use fixtures::{identity, identity_from_seed, multi_party_identities, TestFixture};
pub use generators::AclParams;
