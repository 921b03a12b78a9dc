use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::constants::{SESSION_NETWORK_KEY, SESSION_WALLET_ADDRESS_KEY};

/// Key/value persistence behind the session (browser session storage in the web client).
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct WalletSession {
    address: String,
    network: String,
}

/// Wallet address and network for one client, mirrored into `SessionStorage`.
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<WalletSession>,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(WalletSession::default()),
        }
    }

    /// Restore whatever the storage still holds from a previous page load.
    pub fn initialize(&self) {
        let mut state = self.write();
        if let Some(address) = self.storage.get(SESSION_WALLET_ADDRESS_KEY) {
            state.address = address;
        }
        if let Some(network) = self.storage.get(SESSION_NETWORK_KEY) {
            state.network = network;
        }
        tracing::debug!(
            connected = !state.address.is_empty(),
            network = %state.network,
            "Session restored"
        );
    }

    pub fn current_address(&self) -> String {
        self.read().address.clone()
    }

    /// An empty address disconnects and clears the persisted value.
    pub fn set_current_address(&self, address: &str) {
        self.write().address = address.to_string();
        if address.is_empty() {
            self.storage.remove(SESSION_WALLET_ADDRESS_KEY);
        } else {
            self.storage.set(SESSION_WALLET_ADDRESS_KEY, address);
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.read().address.is_empty()
    }

    pub fn current_network(&self) -> String {
        self.read().network.clone()
    }

    pub fn set_current_network(&self, network: &str) {
        self.write().network = network.to_string();
        self.storage.set(SESSION_NETWORK_KEY, network);
    }

    pub fn disconnect(&self) {
        *self.write() = WalletSession::default();
        self.storage.remove(SESSION_WALLET_ADDRESS_KEY);
        self.storage.remove(SESSION_NETWORK_KEY);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, WalletSession> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, WalletSession> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
