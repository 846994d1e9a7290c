//! # Weave Testkit
//!
//! Testing utilities for the Weave SDK.
//!
//! ## Overview
//!
//! - **Golden vectors**: fixed inputs with the exact wire bytes, ids and
//!   roots any implementation must reproduce
//! - **Generators**: proptest strategies for identifiers, amounts and knots
//! - **Fixtures**: deterministic wallets and a populated state tree
//!
//! ## Golden Vectors
//!
//! ```rust
//! use weave_testkit::vectors::{knot_vectors, verify_all_vectors};
//!
//! for (name, ok, id) in verify_all_vectors() {
//!     assert!(ok, "{name}: got {id}");
//! }
//! assert!(!knot_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use weave_testkit::generators::{knot_params, sign_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn knots_verify(params in knot_params()) {
//!         prop_assert!(sign_from_params(&params).verify().is_ok());
//!     }
//! }
//! ```
//!
//! ## Fixtures
//!
//! ```rust
//! use weave_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::with_seed([7; 32]);
//! let knot = fixture.make_transfer(fixture.peer(1).address(), 10);
//! knot.verify().unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, StateFixture, TestFixture};
