//! # Keys Subcommand
//!
//! Generates the deployment's signing keys as files and prints the public
//! forms the service will publish for them: key id, Multikey, JWK.
//!
//! Private key files are written with owner-only permissions on Unix and
//! are never overwritten.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use badge_crypto::{derive_key_id, encode_multikey, Ed25519KeyPair, RsaKeyPair, MIN_RSA_BITS};
use badge_vc::{ed25519_jwk, RSA_KEY_FRAGMENT};

use crate::{parse_issuer_url, KeyFiles};

pub const ED25519_PRIVATE_FILE: &str = "ed25519.key";
pub const ED25519_PUBLIC_FILE: &str = "ed25519.pub";
pub const RSA_PRIVATE_FILE: &str = "rsa.key.pem";
pub const RSA_PUBLIC_FILE: &str = "rsa.pub.pem";

/// Arguments for the `badge keys` subcommand.
#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Generate signing keys into a directory.
    Generate {
        /// Output directory for the key files.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Generate only one key type.
        #[arg(long, value_enum)]
        only: Option<KeyKind>,
        /// RSA modulus size in bits.
        #[arg(long, default_value_t = MIN_RSA_BITS)]
        rsa_bits: usize,
    },

    /// Print the public forms of existing key files.
    Inspect {
        #[command(flatten)]
        keys: KeyFiles,
        /// Issuer base URL; prints the published key URLs when given.
        #[arg(long)]
        issuer_url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyKind {
    Ed25519,
    Rsa,
}

/// Execute the keys subcommand.
pub fn run_keys(args: &KeysArgs) -> Result<u8> {
    match &args.command {
        KeysCommand::Generate { output, only, rsa_bits } => cmd_generate(output, *only, *rsa_bits),
        KeysCommand::Inspect { keys, issuer_url } => cmd_inspect(keys, issuer_url.as_deref()),
    }
}

fn cmd_generate(output_dir: &Path, only: Option<KeyKind>, rsa_bits: usize) -> Result<u8> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    if only != Some(KeyKind::Rsa) {
        let pair = Ed25519KeyPair::generate();
        let public_hex = pair.public_key().to_hex();
        let private_path = output_dir.join(ED25519_PRIVATE_FILE);
        write_new(&private_path, &pair.seed_hex(), true)?;
        write_new(&output_dir.join(ED25519_PUBLIC_FILE), &public_hex, false)?;

        println!("OK: generated Ed25519 key");
        println!("  Private key: {}", private_path.display());
        println!("  Key id:      {}", derive_key_id(&public_hex));
        println!("  Public key (hex): {public_hex}");
    }

    if only != Some(KeyKind::Ed25519) {
        tracing::info!(bits = rsa_bits, "generating RSA key");
        let (pair, pem) = RsaKeyPair::generate(rsa_bits)?;
        let private_path = output_dir.join(RSA_PRIVATE_FILE);
        write_new(&private_path, &pem.private_pem, true)?;
        write_new(&output_dir.join(RSA_PUBLIC_FILE), &pem.public_pem, false)?;

        println!("OK: generated RSA-{} key", pair.modulus_bits());
        println!("  Private key: {}", private_path.display());
    }

    Ok(0)
}

fn cmd_inspect(files: &KeyFiles, issuer_url: Option<&str>) -> Result<u8> {
    if files.ed25519_key.is_none() && files.rsa_key.is_none() {
        bail!("nothing to inspect: pass --ed25519-key and/or --rsa-key");
    }
    let origin = issuer_url.map(parse_issuer_url).transpose()?;
    let keys = files.load()?;

    if let Ok(pair) = keys.ed25519() {
        let public = pair.public_key();
        let key_id = derive_key_id(&public.to_hex());
        println!("Ed25519");
        println!("  Key id:    {key_id}");
        println!("  Public key (hex): {}", public.to_hex());
        println!("  Multikey:  {}", encode_multikey(public.as_bytes()));
        if let Some(origin) = &origin {
            println!("  Key URL:   {}", origin.key_url(key_id.as_str()));
        }
        println!("  JWK:       {}", serde_json::to_string(&ed25519_jwk(&public))?);
    }

    if let Ok(pair) = keys.rsa() {
        let kid = origin
            .as_ref()
            .map(|o| format!("{}#{RSA_KEY_FRAGMENT}", o.issuer_profile_url()));
        println!("RSA-{}", pair.modulus_bits());
        if let Some(kid) = &kid {
            println!("  Token kid: {kid}");
        }
        println!("  JWK:       {}", serde_json::to_string(&pair.public_jwk(kid.as_deref()))?);
    }

    Ok(0)
}

/// Write a key file, refusing to replace an existing one.
fn write_new(path: &Path, contents: &str, private: bool) -> Result<()> {
    if path.exists() {
        bail!("refusing to overwrite existing key file: {}", path.display());
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    if private {
        restrict_permissions(path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn generate_ed25519_only() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cmd_generate(dir.path(), Some(KeyKind::Ed25519), MIN_RSA_BITS).unwrap(), 0);

        let seed = std::fs::read_to_string(dir.path().join(ED25519_PRIVATE_FILE)).unwrap();
        let public = std::fs::read_to_string(dir.path().join(ED25519_PUBLIC_FILE)).unwrap();
        assert_eq!(seed.len(), 64);
        assert_eq!(Ed25519KeyPair::from_hex(&seed).unwrap().public_key().to_hex(), public);
        assert!(!dir.path().join(RSA_PRIVATE_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        cmd_generate(dir.path(), Some(KeyKind::Ed25519), MIN_RSA_BITS).unwrap();
        let mode = std::fs::metadata(dir.path().join(ED25519_PRIVATE_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn generate_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        cmd_generate(dir.path(), Some(KeyKind::Ed25519), MIN_RSA_BITS).unwrap();
        let err = cmd_generate(dir.path(), Some(KeyKind::Ed25519), MIN_RSA_BITS).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }

    #[test]
    fn generate_rejects_small_rsa_modulus() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_generate(dir.path(), Some(KeyKind::Rsa), 1024).is_err());
    }

    #[test]
    fn inspect_requires_a_key() {
        assert!(cmd_inspect(&KeyFiles::default(), None).is_err());
    }

    #[test]
    fn inspect_both_keys() {
        let dir = tempfile::tempdir().unwrap();
        let files = test_support::key_files(dir.path());
        assert_eq!(cmd_inspect(&files, Some("https://example.dev")).unwrap(), 0);
    }
}
