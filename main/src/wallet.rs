// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

use crate::AuthOpts;
use blog_creator_util::text;
use ethers::signers::LocalWallet;
use eyre::{eyre, Context, Result};
use std::fs;

/// Loads a wallet for signing transactions.
impl AuthOpts {
    /// Returns `None` when no key material is configured, in which case the node's own
    /// accounts sign instead.
    pub fn wallet(&self) -> Result<Option<LocalWallet>> {
        macro_rules! wallet {
            ($key:expr) => {{
                let key = text::decode0x($key).wrap_err("invalid private key")?;
                let wallet = LocalWallet::from_bytes(&key).wrap_err("invalid private key")?;
                Ok(Some(wallet))
            }};
        }

        if let Some(key) = &self.private_key {
            if key.is_empty() {
                return Err(eyre!("empty private key"));
            }
            return wallet!(key);
        }

        if let Some(file) = &self.private_key_path {
            let key = fs::read_to_string(file).wrap_err("could not open private key file")?;
            return wallet!(key);
        }

        let Some(keystore) = &self.keystore_path else {
            return Ok(None);
        };
        let password = self
            .keystore_password_path
            .as_ref()
            .map(fs::read_to_string)
            .unwrap_or(Ok("".into()))
            .wrap_err("could not read keystore password")?;

        let wallet = LocalWallet::decrypt_keystore(keystore, password.trim_end())
            .wrap_err("could not decrypt keystore")?;
        Ok(Some(wallet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::signers::Signer;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Hardhat's default account #0.
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn opts() -> AuthOpts {
        AuthOpts {
            private_key: None,
            private_key_path: None,
            keystore_path: None,
            keystore_password_path: None,
        }
    }

    #[test]
    fn no_key_material_means_node_accounts() -> Result<()> {
        assert!(opts().wallet()?.is_none());
        Ok(())
    }

    #[test]
    fn loads_key_from_flag_and_file() -> Result<()> {
        let from_flag = AuthOpts {
            private_key: Some(KEY.into()),
            ..opts()
        }
        .wallet()?
        .unwrap();
        assert_eq!(format!("{:?}", from_flag.address()), ADDRESS);

        let mut file = NamedTempFile::new()?;
        writeln!(file, "{}", KEY.trim_start_matches("0x"))?;
        let from_file = AuthOpts {
            private_key_path: Some(file.path().to_owned()),
            ..opts()
        }
        .wallet()?
        .unwrap();
        assert_eq!(from_file.address(), from_flag.address());
        Ok(())
    }

    #[test]
    fn rejects_bad_keys() {
        let empty = AuthOpts {
            private_key: Some(String::new()),
            ..opts()
        };
        assert!(empty.wallet().is_err());

        let garbage = AuthOpts {
            private_key: Some("0xnotakey".into()),
            ..opts()
        };
        assert!(garbage.wallet().is_err());
    }
}
