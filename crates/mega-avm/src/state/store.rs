use core::{fmt, mem};

use alloy_primitives::{Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{LayerStatus, StateBackend, StateChanges, StateLayer};

/// Index of a layer in a [`LayeredState`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub usize);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Errors returned by [`LayeredState`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The layer id was never handed out by this arena.
    #[error("unknown {0}")]
    UnknownLayer(LayerId),
    /// The layer has already been committed or discarded.
    #[error("{0} is closed")]
    LayerClosed(LayerId),
    /// The layer's parent has been closed underneath it.
    #[error("parent {parent} of {layer} is closed")]
    ParentClosed {
        /// The layer being committed.
        layer: LayerId,
        /// Its closed parent.
        parent: LayerId,
    },
    /// The layer still has an open nested layer.
    #[error("{layer} has open nested {child}")]
    OpenChildLayer {
        /// The layer being committed.
        layer: LayerId,
        /// The open nested layer.
        child: LayerId,
    },
    /// A debit exceeds the account balance.
    #[error("balance of {address} is {balance}, cannot debit {amount}")]
    BalanceUnderflow {
        /// The debited account.
        address: Address,
        /// Its balance.
        balance: U256,
        /// The requested debit.
        amount: U256,
    },
    /// A credit overflows the account balance.
    #[error("balance of {address} overflows")]
    BalanceOverflow {
        /// The credited account.
        address: Address,
    },
    /// The account nonce cannot be incremented further.
    #[error("nonce of {address} overflows")]
    NonceOverflow {
        /// The account.
        address: Address,
    },
}

/// An arena of transaction layers on top of a [`StateBackend`].
///
/// Each execution owns its own `LayeredState`. Executions share committed data only through the
/// backend, typically an `Arc<BaseStore>`.
///
/// Reads walk from the given layer towards the backend and return the first value found. A
/// deletion recorded in a layer hides every value further down the chain.
#[derive(Debug)]
pub struct LayeredState<B> {
    backend: B,
    layers: Vec<StateLayer>,
}

impl<B: StateBackend> LayeredState<B> {
    /// Creates an arena without layers.
    pub const fn new(backend: B) -> Self {
        Self { backend, layers: Vec::new() }
    }

    /// The backend the layer chains end in.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Opens a layer directly on the backend.
    pub fn begin(&mut self) -> LayerId {
        self.push_layer(None)
    }

    /// Opens a layer nested in `parent`.
    pub fn begin_nested(&mut self, parent: LayerId) -> Result<LayerId, StateError> {
        self.open_layer(parent)?;
        Ok(self.push_layer(Some(parent)))
    }

    /// The lifecycle status of a layer.
    pub fn status(&self, id: LayerId) -> Result<LayerStatus, StateError> {
        self.layers.get(id.0).map(|layer| layer.status).ok_or(StateError::UnknownLayer(id))
    }

    /// The buffered changes of an open layer.
    pub fn changes(&self, id: LayerId) -> Result<&StateChanges, StateError> {
        Ok(&self.open_layer(id)?.changes)
    }

    /// Whether the account exists as seen from layer `id`.
    pub fn account_exists(&self, id: LayerId, address: Address) -> Result<bool, StateError> {
        self.resolve(
            id,
            address,
            |changes| changes.live.contains(&address).then_some(true),
            |backend| backend.account_exists(address),
            false,
        )
    }

    /// Creates the account in layer `id`. Existing values are kept unless the account was
    /// deleted.
    pub fn create_account(&mut self, id: LayerId, address: Address) -> Result<(), StateError> {
        self.changes_mut(id)?.live.insert(address);
        Ok(())
    }

    /// Deletes the account in layer `id`, hiding all of its values from this layer on.
    pub fn delete_account(&mut self, id: LayerId, address: Address) -> Result<(), StateError> {
        self.changes_mut(id)?.delete(address);
        Ok(())
    }

    /// The balance of the account, zero if absent.
    pub fn balance(&self, id: LayerId, address: Address) -> Result<U256, StateError> {
        self.resolve(
            id,
            address,
            |changes| changes.balances.get(&address).copied(),
            |backend| backend.balance(address),
            U256::ZERO,
        )
    }

    /// Adds the signed `delta` to the balance and returns the new balance.
    pub fn adjust_balance(
        &mut self,
        id: LayerId,
        address: Address,
        delta: I256,
    ) -> Result<U256, StateError> {
        if delta.is_negative() {
            self.debit(id, address, delta.unsigned_abs())
        } else {
            self.credit(id, address, delta.unsigned_abs())
        }
    }

    /// Adds `amount` to the balance and returns the new balance.
    pub fn credit(
        &mut self,
        id: LayerId,
        address: Address,
        amount: U256,
    ) -> Result<U256, StateError> {
        let updated = self
            .balance(id, address)?
            .checked_add(amount)
            .ok_or(StateError::BalanceOverflow { address })?;
        self.set_balance(id, address, updated)?;
        Ok(updated)
    }

    /// Subtracts `amount` from the balance and returns the new balance.
    pub fn debit(
        &mut self,
        id: LayerId,
        address: Address,
        amount: U256,
    ) -> Result<U256, StateError> {
        let balance = self.balance(id, address)?;
        let updated = balance
            .checked_sub(amount)
            .ok_or(StateError::BalanceUnderflow { address, balance, amount })?;
        self.set_balance(id, address, updated)?;
        Ok(updated)
    }

    fn set_balance(
        &mut self,
        id: LayerId,
        address: Address,
        balance: U256,
    ) -> Result<(), StateError> {
        let changes = self.changes_mut(id)?;
        changes.live.insert(address);
        changes.balances.insert(address, balance);
        Ok(())
    }

    /// Whether the balance is at least `amount`.
    pub fn balance_is_at_least(
        &self,
        id: LayerId,
        address: Address,
        amount: U256,
    ) -> Result<bool, StateError> {
        Ok(self.balance(id, address)? >= amount)
    }

    /// The nonce of the account, zero if absent.
    pub fn nonce(&self, id: LayerId, address: Address) -> Result<u64, StateError> {
        self.resolve(
            id,
            address,
            |changes| changes.nonces.get(&address).copied(),
            |backend| backend.nonce(address),
            0,
        )
    }

    /// Increments the nonce and returns the new value.
    pub fn increment_nonce(&mut self, id: LayerId, address: Address) -> Result<u64, StateError> {
        let nonce =
            self.nonce(id, address)?.checked_add(1).ok_or(StateError::NonceOverflow { address })?;
        self.set_nonce(id, address, nonce)?;
        Ok(nonce)
    }

    /// Overwrites the nonce.
    pub fn set_nonce(
        &mut self,
        id: LayerId,
        address: Address,
        nonce: u64,
    ) -> Result<(), StateError> {
        let changes = self.changes_mut(id)?;
        changes.live.insert(address);
        changes.nonces.insert(address, nonce);
        Ok(())
    }

    /// Whether the nonce equals `nonce`.
    pub fn nonce_equals(
        &self,
        id: LayerId,
        address: Address,
        nonce: u64,
    ) -> Result<bool, StateError> {
        Ok(self.nonce(id, address)? == nonce)
    }

    /// The deployed code of the account.
    pub fn code(&self, id: LayerId, address: Address) -> Result<Option<Bytes>, StateError> {
        self.resolve(
            id,
            address,
            |changes| changes.code.get(&address).cloned().map(Some),
            |backend| backend.code(address),
            None,
        )
    }

    /// Sets the deployed code of the account.
    pub fn put_code(
        &mut self,
        id: LayerId,
        address: Address,
        code: Bytes,
    ) -> Result<(), StateError> {
        let changes = self.changes_mut(id)?;
        changes.live.insert(address);
        changes.code.insert(address, code);
        Ok(())
    }

    /// The cached instrumented code of the account.
    pub fn transformed_code(
        &self,
        id: LayerId,
        address: Address,
    ) -> Result<Option<Bytes>, StateError> {
        self.resolve(
            id,
            address,
            |changes| changes.transformed_code.get(&address).cloned().map(Some),
            |backend| backend.transformed_code(address),
            None,
        )
    }

    /// Caches the instrumented code of the account.
    pub fn put_transformed_code(
        &mut self,
        id: LayerId,
        address: Address,
        code: Bytes,
    ) -> Result<(), StateError> {
        let changes = self.changes_mut(id)?;
        changes.live.insert(address);
        changes.transformed_code.insert(address, code);
        Ok(())
    }

    /// The value stored under `key`.
    pub fn storage(
        &self,
        id: LayerId,
        address: Address,
        key: B256,
    ) -> Result<Option<Bytes>, StateError> {
        self.resolve(
            id,
            address,
            |changes| changes.storage.get(&(address, key)).cloned(),
            |backend| backend.storage(address, key),
            None,
        )
    }

    /// Stores `value` under `key`.
    pub fn put_storage(
        &mut self,
        id: LayerId,
        address: Address,
        key: B256,
        value: Bytes,
    ) -> Result<(), StateError> {
        let changes = self.changes_mut(id)?;
        changes.live.insert(address);
        changes.storage.insert((address, key), Some(value));
        Ok(())
    }

    /// Removes the value stored under `key`.
    pub fn remove_storage(
        &mut self,
        id: LayerId,
        address: Address,
        key: B256,
    ) -> Result<(), StateError> {
        self.changes_mut(id)?.storage.insert((address, key), None);
        Ok(())
    }

    /// Merges layer `id` into its parent layer, or into the backend for a top-level layer.
    ///
    /// A layer is committed at most once and only after all of its nested layers are closed.
    pub fn commit(&mut self, id: LayerId) -> Result<(), StateError> {
        let parent = self.open_layer(id)?.parent;
        if let Some(child) = self.open_child(id) {
            return Err(StateError::OpenChildLayer { layer: id, child });
        }
        if let Some(parent) = parent {
            if !self.layers[parent.0].is_open() {
                return Err(StateError::ParentClosed { layer: id, parent });
            }
        }

        let layer = &mut self.layers[id.0];
        layer.status = LayerStatus::Committed;
        let changes = mem::take(&mut layer.changes);

        match parent {
            Some(parent) => {
                trace!(target: "mega_avm::state", %id, %parent, "merging layer into parent");
                self.layers[parent.0].changes.merge(changes);
            }
            None => {
                debug!(target: "mega_avm::state", %id, "committing layer to backend");
                self.backend.apply(changes);
            }
        }
        Ok(())
    }

    /// Drops layer `id` and every open layer nested in it without effect.
    pub fn discard(&mut self, id: LayerId) -> Result<(), StateError> {
        self.open_layer(id)?;
        self.close_discarded(id);
        for index in id.0 + 1..self.layers.len() {
            let layer = &self.layers[index];
            let orphaned = layer.is_open() &&
                layer
                    .parent
                    .is_some_and(|parent| self.layers[parent.0].status == LayerStatus::Discarded);
            if orphaned {
                self.close_discarded(LayerId(index));
            }
        }
        Ok(())
    }

    fn close_discarded(&mut self, id: LayerId) {
        let layer = &mut self.layers[id.0];
        layer.status = LayerStatus::Discarded;
        layer.changes = StateChanges::default();
        trace!(target: "mega_avm::state", %id, "discarded layer");
    }

    fn push_layer(&mut self, parent: Option<LayerId>) -> LayerId {
        self.layers.push(StateLayer::new(parent));
        LayerId(self.layers.len() - 1)
    }

    fn open_layer(&self, id: LayerId) -> Result<&StateLayer, StateError> {
        let layer = self.layers.get(id.0).ok_or(StateError::UnknownLayer(id))?;
        if !layer.is_open() {
            return Err(StateError::LayerClosed(id));
        }
        Ok(layer)
    }

    fn changes_mut(&mut self, id: LayerId) -> Result<&mut StateChanges, StateError> {
        self.open_layer(id)?;
        Ok(&mut self.layers[id.0].changes)
    }

    fn open_child(&self, id: LayerId) -> Option<LayerId> {
        self.layers
            .iter()
            .enumerate()
            .skip(id.0 + 1)
            .find(|(_, layer)| layer.is_open() && layer.parent == Some(id))
            .map(|(index, _)| LayerId(index))
    }

    /// Walks the chain from `id` to the backend.
    ///
    /// `in_layer` returns the value a layer defines for the address, if any. A deletion stops
    /// the walk with `absent`.
    fn resolve<T>(
        &self,
        id: LayerId,
        address: Address,
        in_layer: impl Fn(&StateChanges) -> Option<T>,
        in_backend: impl FnOnce(&B) -> T,
        absent: T,
    ) -> Result<T, StateError> {
        let mut cursor = Some(self.open_layer(id)?);
        while let Some(layer) = cursor {
            if let Some(value) = in_layer(&layer.changes) {
                return Ok(value);
            }
            if layer.changes.deleted.contains(&address) {
                return Ok(absent);
            }
            cursor = layer.parent.map(|parent| &self.layers[parent.0]);
        }
        Ok(in_backend(&self.backend))
    }
}
