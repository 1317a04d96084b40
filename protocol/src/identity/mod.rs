//! # Identity Module
//!
//! Account identifiers for the stamp scheme. An account is a 20-byte
//! address, written as `0x` + 40 hex characters, derived from a secp256k1
//! public key the same way Ethereum derives addresses.
//!
//! Records carry sender and recipient as [`AccountId`]s. The sender is
//! never trusted on its own: the verifier recovers the signer's address
//! from the signature and compares it against the declared one.

pub mod account_id;

pub use account_id::{is_account_id, AccountId};
