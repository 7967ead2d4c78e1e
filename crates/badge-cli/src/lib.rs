//! # badge-cli — CLI Tool for the Badge Engine
//!
//! Provides the `badge` command-line interface for operators: everything
//! the HTTP service does with keys and credentials, offline.
//!
//! ## Subcommands
//!
//! - `badge keys` — generate key files, inspect key ids and public forms.
//! - `badge sign` — issue a signed credential from a request file.
//! - `badge verify` — verify a credential or a baked SVG.
//! - `badge bake` / `badge extract` — embed or read a credential in an SVG.
//!
//! ```bash
//! badge keys generate --output ./keys
//! badge sign request.json --issuer-url https://example.dev \
//!     --ed25519-key keys/ed25519.key --output badge.json
//! badge bake --svg art.svg --credential badge.json --output badge.svg
//! badge verify badge.svg --issuer-url https://example.dev --ed25519-key keys/ed25519.key
//! ```

pub mod bake;
pub mod keys;
pub mod sign;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use zeroize::Zeroizing;

use badge_core::IssuerOrigin;
use badge_crypto::{normalize_pem, KeyConfig, KeyMaterial};

/// Key file flags shared by every subcommand that signs or verifies.
#[derive(Args, Debug, Clone, Default)]
pub struct KeyFiles {
    /// Ed25519 private key file (hex seed).
    #[arg(long, value_name = "FILE")]
    pub ed25519_key: Option<PathBuf>,

    /// RSA private key file (PKCS#8 PEM).
    #[arg(long, value_name = "FILE")]
    pub rsa_key: Option<PathBuf>,
}

impl KeyFiles {
    /// Read and parse the configured key files. Neither key is required
    /// here; operations needing an absent key fail when they run.
    pub fn load(&self) -> Result<KeyMaterial> {
        let config = KeyConfig {
            ed25519_private_hex: self
                .ed25519_key
                .as_deref()
                .map(|p| read_text(p, "Ed25519 private key").map(|s| Zeroizing::new(s.trim().to_string())))
                .transpose()?,
            rsa_private_pem: self
                .rsa_key
                .as_deref()
                .map(|p| read_text(p, "RSA private key").map(|s| Zeroizing::new(normalize_pem(&s))))
                .transpose()?,
            ..KeyConfig::default()
        };
        let keys = KeyMaterial::from_config(&config).context("failed to load signing keys")?;
        tracing::debug!(
            ed25519 = keys.ed25519().is_ok(),
            rsa = keys.rsa().is_ok(),
            "key files loaded"
        );
        Ok(keys)
    }
}

/// Read a UTF-8 file, naming it as `what` in errors.
pub fn read_text(path: &Path, what: &str) -> Result<String> {
    if !path.exists() {
        bail!("{what} file not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {what}: {}", path.display()))
}

/// Write `text` to `path`, or print it to stdout when no path is given.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Parse an `--issuer-url` value.
pub fn parse_issuer_url(url: &str) -> Result<IssuerOrigin> {
    IssuerOrigin::parse(url).with_context(|| format!("invalid issuer URL: {url}"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_files_load_both_keys() {
        let dir = tempfile::tempdir().unwrap();
        let keys = test_support::key_files(dir.path()).load().unwrap();
        assert!(keys.ed25519().is_ok());
        assert!(keys.rsa().is_ok());
    }

    #[test]
    fn missing_key_file_is_an_error() {
        let files = KeyFiles {
            ed25519_key: Some(PathBuf::from("/nonexistent/ed25519.key")),
            rsa_key: None,
        };
        let err = files.load().unwrap_err();
        assert!(format!("{err:#}").contains("not found"));
    }

    #[test]
    fn invalid_issuer_url_rejected() {
        assert!(parse_issuer_url("https://example.dev").is_ok());
        assert!(parse_issuer_url("ftp://example.dev").is_err());
    }
}
