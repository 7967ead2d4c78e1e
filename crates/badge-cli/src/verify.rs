//! # Verify Subcommand
//!
//! Verifies a credential file or a baked SVG against the issuer's keys.
//! Exit code 0 means valid; 1 means the credential was read and rejected.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use badge_vc::{extract, Verifier};

use crate::{parse_issuer_url, read_text, KeyFiles};

/// Arguments for the `badge verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential (JSON or compact token) or baked SVG.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Issuer base URL the credential must have been issued under.
    #[arg(long)]
    pub issuer_url: String,

    #[command(flatten)]
    pub keys: KeyFiles,

    /// Print the full verification report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let origin = parse_issuer_url(&args.issuer_url)?;
    let keys = args.keys.load()?;
    let content = read_text(&args.file, "credential")?;

    let text = if content.trim_start().starts_with('<') {
        match extract(&content)? {
            Some(text) => text,
            None => bail!("no credential embedded in {}", args.file.display()),
        }
    } else {
        content
    };

    let report = Verifier::new(&keys, &origin).verify_text(&text)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.is_valid() {
        let form = report.form.map(|f| f.to_string()).unwrap_or_default();
        println!("OK: credential is valid ({form})");
        Ok(0)
    } else {
        println!(
            "FAIL: {}: {}",
            report.status,
            report.reason.as_deref().unwrap_or("no reason given")
        );
        Ok(1)
    }
}
