use crate::error::{ConfigError, WalletError};
use anyhow::{Context, Result};
use ethers::signers::{LocalWallet, Signer};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One line of the input file, normalized. `private_key` is kept verbatim
/// (as typed by the user) so reports can echo it back.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletEntry {
    pub address: String,
    pub private_key: Option<String>,
}

impl fmt::Debug for WalletEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletEntry")
            .field("address", &self.address)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "***REDACTED***"),
            )
            .finish()
    }
}

pub struct WalletManager;

impl WalletManager {
    /// Loads and normalizes the address/key list.
    ///
    /// Blank lines and `#` comments are skipped; invalid lines are dropped
    /// with a warning. A missing file gets a commented sample written in its
    /// place and is fatal, as is a file with zero valid entries.
    pub fn load_entries(path: &str) -> Result<Vec<WalletEntry>> {
        let file = Path::new(path);
        if !file.exists() {
            fs::write(
                file,
                "# One address or private key per line\n\
                 # 0x946343a16b3b88dca7dad175f927949203723991\n\
                 # Private keys are accepted with or without the 0x prefix\n",
            )
            .with_context(|| format!("Failed to write sample input file {}", path))?;
            return Err(ConfigError::FileNotFound {
                path: path.to_string(),
            }
            .into());
        }

        let content =
            fs::read_to_string(file).with_context(|| format!("Failed to read {}", path))?;

        let mut entries = Vec::new();
        let mut invalid = 0usize;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match normalize_input(line) {
                Some(entry) => entries.push(entry),
                None => {
                    invalid += 1;
                    warn!("Ignoring invalid input line: {}", line);
                }
            }
        }

        if invalid > 0 {
            warn!("{} invalid entries in {} were ignored", invalid, path);
        }

        if entries.is_empty() {
            return Err(WalletError::NoValidEntries {
                path: path.to_string(),
            }
            .into());
        }

        let with_keys = entries.iter().filter(|e| e.private_key.is_some()).count();
        info!(
            "Loaded {} entries from {}, {} with private keys",
            entries.len(),
            path,
            with_keys
        );

        Ok(entries)
    }
}

/// `0x` + 40 hex digits.
pub fn is_address(input: &str) -> bool {
    match input.strip_prefix("0x") {
        Some(body) => body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// 64 hex digits, `0x` prefix optional.
pub fn is_private_key(input: &str) -> bool {
    let body = input.strip_prefix("0x").unwrap_or(input);
    body.len() == 64 && body.chars().all(|c| c.is_ascii_hexdigit())
}

/// Derives the lowercase `0x` address controlled by `private_key`.
pub fn key_to_address(private_key: &str) -> Result<String> {
    let wallet = private_key
        .parse::<LocalWallet>()
        .map_err(|e| WalletError::DerivationFailed {
            reason: e.to_string(),
        })?;

    Ok(format!("0x{}", hex::encode(wallet.address().as_bytes())))
}

/// Classifies one input line: an address yields an entry without a key, a
/// private key yields the derived address plus the key as typed. Anything
/// else is `None`.
pub fn normalize_input(line: &str) -> Option<WalletEntry> {
    let line = line.trim();

    if is_address(line) {
        return Some(WalletEntry {
            address: line.to_lowercase(),
            private_key: None,
        });
    }

    if is_private_key(line) {
        match key_to_address(line) {
            Ok(address) => {
                return Some(WalletEntry {
                    address,
                    private_key: Some(line.to_string()),
                })
            }
            Err(e) => {
                warn!("Failed to derive address from key: {}", e);
                return None;
            }
        }
    }

    None
}
