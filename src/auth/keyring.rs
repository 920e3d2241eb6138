//
//  devops-client
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Secure Credential Storage Module
//!
//! Secrets are kept in the platform keyring, never in the configuration file.
//!
//! - **macOS**: Keychain Services
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//! - **Windows**: Windows Credential Manager
//!
//! Entries use the service name `devops-client` and the normalized connection URL as
//! the key.
//!
//! ## Example
//!
//! ```rust,no_run
//! use devops_client::auth::KeyringStore;
//!
//! let store = KeyringStore::new();
//! store.store("https://dev.azure.com/fabrikam", "token")?;
//! assert!(store.get("https://dev.azure.com/fabrikam")?.is_some());
//! store.delete("https://dev.azure.com/fabrikam")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;
use keyring::Entry;

const SERVICE_NAME: &str = "devops-client";

pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    pub fn store(&self, url: &str, secret: &str) -> Result<()> {
        let entry = Entry::new(&self.service, url)?;
        entry.set_password(secret)?;
        Ok(())
    }

    pub fn get(&self, url: &str) -> Result<Option<String>> {
        let entry = Entry::new(&self.service, url)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(&self, url: &str) -> Result<()> {
        let entry = Entry::new(&self.service, url)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(e.into()),
        }
    }
}
