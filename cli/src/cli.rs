//! # CLI Interface
//!
//! Argument structure for the `stamp` binary, via `clap` derive.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Sign and verify stamped transfer records.
#[derive(Parser, Debug)]
#[command(name = "stamp", version, propagate_version = true)]
pub struct StampCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
///
/// Precedence: flag, then environment variable, then `--config` file, then
/// the built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// JSON config file with optional `scheme` and `chain_id` keys.
    #[arg(long, short = 'c', global = true, env = "STAMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Domain-separation name used in the stamp prefix.
    #[arg(long, global = true, env = "STAMP_SCHEME_NAME")]
    pub scheme_name: Option<String>,

    /// Offset added to the recovery id to form `v`.
    #[arg(long, global = true, env = "STAMP_SCHEME_OFFSET")]
    pub scheme_offset: Option<u8>,

    /// Chain id records are built for and validated against.
    #[arg(long, global = true, env = "STAMP_CHAIN_ID")]
    pub chain_id: Option<u16>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a secp256k1 key and write it as hex.
    Keygen(KeygenArgs),
    /// Print the account id controlled by a key file.
    Address(AddressArgs),
    /// Build and sign a transfer record; prints the signed record as JSON.
    Sign(SignArgs),
    /// Validate a signed record and print the recovered signer.
    Verify(VerifyArgs),
    /// Print the stamp of an unsigned record.
    Digest(DigestArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the key file.
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Key file (64 hex characters).
    #[arg(long, short = 'k', env = "STAMP_KEY")]
    pub key: PathBuf,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Key file of the sender. Its address becomes `from`.
    #[arg(long, short = 'k', env = "STAMP_KEY")]
    pub key: PathBuf,

    /// Recipient account id.
    #[arg(long)]
    pub to: String,

    /// Amount to transfer.
    #[arg(long)]
    pub value: u64,

    #[arg(long, default_value_t = 0)]
    pub nonce: u64,

    #[arg(long, default_value_t = 0)]
    pub tip: u64,

    /// Payload, taken as UTF-8 bytes.
    #[arg(long, default_value = "")]
    pub data: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Signed record JSON. Reads stdin when omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Unsigned record JSON. Reads stdin when omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}
