//! # badge CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use badge_cli::bake::{run_bake, run_extract, BakeArgs, ExtractArgs};
use badge_cli::keys::{run_keys, KeysArgs};
use badge_cli::sign::{run_sign, SignArgs};
use badge_cli::verify::{run_verify, VerifyArgs};

/// Badge engine CLI
///
/// Generates and inspects signing keys, issues Open Badges 3.0 credentials
/// offline, bakes them into SVG artwork, and verifies them.
#[derive(Parser, Debug)]
#[command(name = "badge", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ed25519 and RSA key generation and inspection.
    Keys(KeysArgs),

    /// Issue a signed credential.
    Sign(SignArgs),

    /// Verify a credential or baked SVG.
    Verify(VerifyArgs),

    /// Embed a credential into SVG artwork.
    Bake(BakeArgs),

    /// Read the credential embedded in a baked SVG.
    Extract(ExtractArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("badge CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Keys(args) => run_keys(&args),
        Commands::Sign(args) => run_sign(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Bake(args) => run_bake(&args),
        Commands::Extract(args) => run_extract(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
