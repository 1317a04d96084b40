// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # stamp
//!
//! Entry point for the `stamp` binary. Parses CLI arguments, initializes
//! logging, resolves the scheme, and dispatches to one of:
//!
//! - `keygen`  generate a key file
//! - `address` print the account of a key file
//! - `sign`    build and sign a record
//! - `verify`  validate a signed record
//! - `digest`  print the stamp of a record
//! - `version` print build version information

mod cli;
mod logging;
mod settings;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use stamp_protocol::config;
use stamp_protocol::{Secp256k1Keypair, SignedTx, Signer, Tx, TxBuilder, Verifier};

use cli::{Commands, StampCli};
use settings::Settings;

fn main() -> Result<()> {
    let cli = StampCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.global.log_format);

    match cli.command {
        Commands::Version => {
            print_version();
            Ok(())
        }
        Commands::Keygen(args) => keygen(args),
        Commands::Address(args) => address(args),
        Commands::Sign(args) => sign(&resolve_settings(&cli.global)?, args),
        Commands::Verify(args) => verify(&resolve_settings(&cli.global)?, args),
        Commands::Digest(args) => digest(&resolve_settings(&cli.global)?, args),
    }
}

fn resolve_settings(global: &cli::GlobalArgs) -> Result<Settings> {
    let settings = Settings::resolve(global)?;
    tracing::debug!(
        scheme = settings.scheme.name(),
        offset = settings.scheme.offset(),
        chain_id = settings.chain_id,
        "settings resolved"
    );
    Ok(settings)
}

/// Generates a key and writes it with owner-only permissions.
fn keygen(args: cli::KeygenArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "{} already exists, pass --force to overwrite",
            args.out.display()
        );
    }

    let keypair = Secp256k1Keypair::generate();
    keypair
        .save(&args.out)
        .with_context(|| format!("failed to write key to {}", args.out.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&args.out, fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(
        address = %keypair.address(),
        key_path = %args.out.display(),
        "key generated"
    );
    println!("{}", keypair.address());
    Ok(())
}

fn address(args: cli::AddressArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;
    println!("{}", keypair.address());
    Ok(())
}

/// Builds a record from the key's address and signs it.
fn sign(settings: &Settings, args: cli::SignArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;

    let tx = TxBuilder::new(settings.chain_id)
        .nonce(args.nonce)
        .from(keypair.address().to_string())
        .to(args.to)
        .value(args.value)
        .tip(args.tip)
        .data(args.data.into_bytes())
        .build()
        .context("failed to build transaction")?;

    let signed = Signer::new(settings.scheme.clone())
        .sign(&tx, &keypair)
        .context("failed to sign transaction")?;

    tracing::info!(
        from = %tx.from(),
        to = %tx.to(),
        nonce = tx.nonce(),
        signature = %signed.signature_string(&settings.scheme)?,
        "transaction signed"
    );
    println!("{}", serde_json::to_string_pretty(&signed)?);
    Ok(())
}

/// Validates a signed record. Any failure is a non-zero exit.
fn verify(settings: &Settings, args: cli::VerifyArgs) -> Result<()> {
    let input = read_input(args.input.as_deref())?;
    let signed: SignedTx =
        serde_json::from_str(&input).context("failed to parse signed transaction")?;

    let signer = Verifier::new(settings.scheme.clone())
        .validate_signer(&signed, settings.chain_id)
        .context("signed transaction rejected")?;

    tracing::info!(signer = %signer, nonce = signed.tx().nonce(), "signature valid");
    println!("{}", signer);
    Ok(())
}

fn digest(settings: &Settings, args: cli::DigestArgs) -> Result<()> {
    let input = read_input(args.input.as_deref())?;
    let tx: Tx = serde_json::from_str(&input).context("failed to parse transaction")?;
    let stamp = tx.digest(&settings.scheme)?;
    println!("0x{}", hex::encode(stamp));
    Ok(())
}

fn load_key(path: &Path) -> Result<Secp256k1Keypair> {
    Secp256k1Keypair::load(path)
        .with_context(|| format!("failed to load key from {}", path.display()))
}

/// Reads `path`, or all of stdin when `None`.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_version() {
    println!("stamp {}", env!("CARGO_PKG_VERSION"));
    println!(
        "scheme {} (offset {})",
        config::DEFAULT_SCHEME_NAME,
        config::DEFAULT_SCHEME_OFFSET
    );
}
