//! # Weave Knot
//!
//! Wallets and canonical construction of knots, the ledger's signed state
//! transitions.
//!
//! ## Overview
//!
//! A knot mutates one or more threads. It is assembled in a fixed field
//! order, content-addressed, signed once with Ed25519, and handed to the
//! node as a lowercase hex string:
//!
//! ```text
//! id (32) | knot_type (1) | timestamp (u64) | expiry (option u64)
//!   | before_states (u32 count, entries) | kind fields
//!   | signature (64) | signer (32)
//! ```
//!
//! `id` is the Blake3 hash of everything between the id slot and the
//! signature. The signature covers `id` followed by that same body.
//!
//! ## Usage
//!
//! ```rust
//! use weave_knot::{build_transfer, parse_amount, Knot, TransferParams, Wallet};
//! use weave_core::Address;
//!
//! let wallet = Wallet::from_private_key(&[0x01; 32]).unwrap();
//! let to = Address::from_hex("0x0202020202020202020202020202020202020202").unwrap();
//! let amount = parse_amount("1.5").unwrap();
//!
//! let wire = build_transfer(&wallet, &TransferParams::new(to, amount)).unwrap();
//! let knot = Knot::from_hex(&wire).unwrap();
//! knot.verify().unwrap();
//! ```

pub mod amount;
pub mod builder;
pub mod config;
pub mod confirm;
pub mod error;
pub mod knot;
pub mod wallet;

pub use amount::{format_amount, parse_amount, AmountError, DECIMALS};
pub use builder::{
    build_loom_deploy, build_loom_upload, build_name_registration, build_token_burn,
    build_token_definition, build_token_mint, build_transfer, sign_knot, token_id_for,
    KnotBuilder, KnotParams, LoomDeployParams, LoomUploadParams, NameRegistrationParams,
    TokenBurnParams, TokenDefinitionParams, TokenMintParams, TransferParams,
};
pub use config::ConfirmationConfig;
pub use confirm::{wait_for_loom, LoomQuery};
pub use error::{KnotError, Result};
pub use knot::{unix_now, Knot, KnotPayload, KnotType, ParticipantState};
pub use wallet::Wallet;
