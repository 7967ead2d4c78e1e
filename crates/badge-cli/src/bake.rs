//! # Bake and Extract Subcommands
//!
//! Embed a signed credential into SVG artwork, or read it back out. The
//! credential text is carried verbatim; see `badge_vc::bake`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use badge_vc::{bake, extract, SignedCredential};

use crate::{read_text, write_output};

/// Arguments for the `badge bake` subcommand.
#[derive(Args, Debug)]
pub struct BakeArgs {
    /// SVG artwork to bake into.
    #[arg(long, value_name = "FILE")]
    pub svg: PathBuf,

    /// Signed credential (JSON or compact token).
    #[arg(long, value_name = "FILE")]
    pub credential: PathBuf,

    /// Write the baked SVG here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `badge extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Baked SVG.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write the credential here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the bake subcommand.
pub fn run_bake(args: &BakeArgs) -> Result<u8> {
    let artwork = read_text(&args.svg, "SVG artwork")?;
    let credential = SignedCredential::parse(&read_text(&args.credential, "credential")?)
        .with_context(|| format!("not a signed credential: {}", args.credential.display()))?;
    let baked = bake(&artwork, &credential)
        .with_context(|| format!("failed to bake into {}", args.svg.display()))?;
    tracing::info!(form = %credential.form(), "credential baked");
    write_output(args.output.as_deref(), &baked)?;
    Ok(0)
}

/// Execute the extract subcommand. Exit code 1 when the SVG carries no
/// credential.
pub fn run_extract(args: &ExtractArgs) -> Result<u8> {
    let svg = read_text(&args.file, "SVG")?;
    match extract(&svg).with_context(|| format!("failed to read {}", args.file.display()))? {
        Some(text) => {
            write_output(args.output.as_deref(), &text)?;
            Ok(0)
        }
        None => {
            println!("FAIL: no credential embedded in {}", args.file.display());
            Ok(1)
        }
    }
}
