use alloy_primitives::{map::HashMap, Address, Bytes, B256, U256};
use parking_lot::RwLock;
use tracing::debug;

use crate::{StateBackend, StateChanges};

/// A committed account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    /// The balance.
    pub balance: U256,
    /// The nonce.
    pub nonce: u64,
    /// The deployed code.
    pub code: Option<Bytes>,
    /// The cached instrumented code.
    pub transformed_code: Option<Bytes>,
}

#[derive(Debug, Default)]
struct Committed {
    accounts: HashMap<Address, Account>,
    storage: HashMap<(Address, B256), Bytes>,
}

/// The in-memory committed state shared by all executions.
///
/// Share it as `Arc<BaseStore>`. Committing a layer takes the write lock for the whole merge, so
/// readers observe either the state before or after a commit.
#[derive(Debug, Default)]
pub struct BaseStore {
    inner: RwLock<Committed>,
}

impl BaseStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account.
    pub fn insert_account(&self, address: Address, account: Account) {
        self.inner.write().accounts.insert(address, account);
    }

    /// Sets a storage value of an existing or new account.
    pub fn insert_storage(&self, address: Address, key: B256, value: Bytes) {
        let mut inner = self.inner.write();
        inner.accounts.entry(address).or_default();
        inner.storage.insert((address, key), value);
    }

    /// Returns a copy of the account, if it exists.
    pub fn account(&self, address: Address) -> Option<Account> {
        self.inner.read().accounts.get(&address).cloned()
    }

    /// Reads several storage slots under one lock, so all values come from the same commit.
    pub fn storage_batch(
        &self,
        slots: impl IntoIterator<Item = (Address, B256)>,
    ) -> Vec<Option<Bytes>> {
        let inner = self.inner.read();
        slots.into_iter().map(|slot| inner.storage.get(&slot).cloned()).collect()
    }

    /// The number of existing accounts.
    pub fn account_count(&self) -> usize {
        self.inner.read().accounts.len()
    }
}

impl StateBackend for BaseStore {
    fn account_exists(&self, address: Address) -> bool {
        self.inner.read().accounts.contains_key(&address)
    }

    fn balance(&self, address: Address) -> U256 {
        self.inner.read().accounts.get(&address).map(|account| account.balance).unwrap_or_default()
    }

    fn nonce(&self, address: Address) -> u64 {
        self.inner.read().accounts.get(&address).map(|account| account.nonce).unwrap_or_default()
    }

    fn code(&self, address: Address) -> Option<Bytes> {
        self.inner.read().accounts.get(&address).and_then(|account| account.code.clone())
    }

    fn transformed_code(&self, address: Address) -> Option<Bytes> {
        self.inner
            .read()
            .accounts
            .get(&address)
            .and_then(|account| account.transformed_code.clone())
    }

    fn storage(&self, address: Address, key: B256) -> Option<Bytes> {
        self.inner.read().storage.get(&(address, key)).cloned()
    }

    fn apply(&self, changes: StateChanges) {
        let mut inner = self.inner.write();
        let Committed { accounts, storage } = &mut *inner;

        for address in &changes.deleted {
            accounts.remove(address);
        }
        if !changes.deleted.is_empty() {
            storage.retain(|(owner, _), _| !changes.deleted.contains(owner));
        }

        for address in changes.live {
            accounts.entry(address).or_default();
        }
        for (address, balance) in changes.balances {
            accounts.entry(address).or_default().balance = balance;
        }
        for (address, nonce) in changes.nonces {
            accounts.entry(address).or_default().nonce = nonce;
        }
        for (address, code) in changes.code {
            accounts.entry(address).or_default().code = Some(code);
        }
        for (address, code) in changes.transformed_code {
            accounts.entry(address).or_default().transformed_code = Some(code);
        }
        for ((address, key), value) in changes.storage {
            match value {
                Some(value) => {
                    accounts.entry(address).or_default();
                    storage.insert((address, key), value);
                }
                None => {
                    storage.remove(&(address, key));
                }
            }
        }

        debug!(
            target: "mega_avm::state",
            deleted = changes.deleted.len(),
            accounts = accounts.len(),
            "applied committed layer to base store"
        );
    }
}
