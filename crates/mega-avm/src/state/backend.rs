use alloy_primitives::{Address, Bytes, B256, U256};
use auto_impl::auto_impl;

use crate::StateChanges;

/// The committed state at the bottom of a layer chain.
///
/// Reads see committed data only. [`apply`](Self::apply) merges the changes of a committed
/// top-level layer and must be atomic with respect to concurrent readers.
#[auto_impl(&, Arc)]
pub trait StateBackend {
    /// Whether the account exists.
    fn account_exists(&self, address: Address) -> bool;

    /// The balance of the account, zero if absent.
    fn balance(&self, address: Address) -> U256;

    /// The nonce of the account, zero if absent.
    fn nonce(&self, address: Address) -> u64;

    /// The deployed code of the account.
    fn code(&self, address: Address) -> Option<Bytes>;

    /// The cached instrumented form of the account's code.
    fn transformed_code(&self, address: Address) -> Option<Bytes>;

    /// The value stored under `key`.
    fn storage(&self, address: Address, key: B256) -> Option<Bytes>;

    /// Applies the changes of a committed layer.
    fn apply(&self, changes: StateChanges);
}
