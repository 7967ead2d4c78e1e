//! # Sign Subcommand
//!
//! Issues a signed credential offline, exactly as `POST /api/badge` would
//! for the same issuer URL: same issuer profile id, same verification
//! method, same token `kid`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Deserialize;

use badge_core::Timestamp;
use badge_vc::{build_credential, Achievement, BadgeSigner, Conference, CredentialForm, Recipient};

use crate::{parse_issuer_url, read_text, write_output, KeyFiles};

/// Arguments for the `badge sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// JSON file with `recipient` and `achievement` objects.
    #[arg(value_name = "FILE")]
    pub request: PathBuf,

    /// Issuer base URL, e.g. `https://example.dev`.
    #[arg(long)]
    pub issuer_url: String,

    /// Issuer display name.
    #[arg(long, default_value = "Conference")]
    pub issuer_name: String,

    #[arg(long, value_enum, default_value_t = FormatArg::DataIntegrity)]
    pub format: FormatArg,

    /// Expiry, RFC 3339.
    #[arg(long)]
    pub valid_until: Option<String>,

    /// Credential id. Defaults to a fresh `urn:uuid:`.
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub keys: KeyFiles,

    /// Write the credential here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    DataIntegrity,
    Token,
}

impl From<FormatArg> for CredentialForm {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::DataIntegrity => CredentialForm::DataIntegrity,
            FormatArg::Token => CredentialForm::Token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BadgeRequest {
    recipient: Recipient,
    achievement: Achievement,
}

/// Execute the sign subcommand.
pub fn run_sign(args: &SignArgs) -> Result<u8> {
    let origin = parse_issuer_url(&args.issuer_url)?;
    let request: BadgeRequest = serde_json::from_str(&read_text(&args.request, "badge request")?)
        .with_context(|| format!("failed to parse badge request: {}", args.request.display()))?;
    let keys = args.keys.load()?;

    let conference = Conference {
        domain: origin.domain().to_string(),
        name: args.issuer_name.clone(),
        email: None,
        url: None,
        description: None,
    };
    let mut credential = build_credential(
        &request.recipient,
        &request.achievement,
        &conference.issuer_ref(&origin),
        Timestamp::now(),
    )?;
    if let Some(id) = &args.id {
        credential = credential.with_id(id.clone());
    }
    if let Some(until) = &args.valid_until {
        credential = credential.with_valid_until(Timestamp::parse(until).context("invalid --valid-until")?);
    }

    let form = CredentialForm::from(args.format);
    let signed = BadgeSigner::new(&keys, &origin)
        .sign(&credential, form)
        .with_context(|| format!("failed to sign {form} credential"))?;
    tracing::info!(form = %form, issuer = %origin.issuer_profile_url(), "credential signed");

    write_output(args.output.as_deref(), &signed.to_embedded_text()?)?;
    Ok(0)
}
