use alloy_primitives::{
    map::{HashMap, HashSet},
    Address, Bytes, B256, U256,
};
use serde::{Deserialize, Serialize};

use crate::LayerId;

/// The lifecycle of a layer. Layers start open and are closed exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerStatus {
    /// The layer accepts reads and writes.
    Open,
    /// The layer was merged into its parent.
    Committed,
    /// The layer was dropped without effect.
    Discarded,
}

/// The buffered writes of one layer.
///
/// Entries are final values, not deltas. A storage entry of `None` records a removal that shadows
/// any ancestor value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateChanges {
    /// Accounts deleted in this layer. A deletion shadows every ancestor value of the account.
    pub deleted: HashSet<Address>,
    /// Accounts created or written in this layer.
    pub live: HashSet<Address>,
    /// Balances.
    pub balances: HashMap<Address, U256>,
    /// Nonces.
    pub nonces: HashMap<Address, u64>,
    /// Deployed code.
    pub code: HashMap<Address, Bytes>,
    /// Cached instrumented code.
    pub transformed_code: HashMap<Address, Bytes>,
    /// Storage writes and removals.
    pub storage: HashMap<(Address, B256), Option<Bytes>>,
}

impl StateChanges {
    /// Whether the layer has no buffered writes.
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() &&
            self.live.is_empty() &&
            self.balances.is_empty() &&
            self.nonces.is_empty() &&
            self.code.is_empty() &&
            self.transformed_code.is_empty() &&
            self.storage.is_empty()
    }

    /// Records the deletion of `address`, dropping everything written to it in this layer.
    pub fn delete(&mut self, address: Address) {
        self.wipe(address);
        self.deleted.insert(address);
    }

    /// Merges the changes of a committed child layer on top of these.
    ///
    /// Deletions are applied first so that the child's writes to a recreated account survive.
    pub fn merge(&mut self, child: Self) {
        for address in child.deleted {
            self.delete(address);
        }
        self.live.extend(child.live);
        self.balances.extend(child.balances);
        self.nonces.extend(child.nonces);
        self.code.extend(child.code);
        self.transformed_code.extend(child.transformed_code);
        self.storage.extend(child.storage);
    }

    fn wipe(&mut self, address: Address) {
        self.live.remove(&address);
        self.balances.remove(&address);
        self.nonces.remove(&address);
        self.code.remove(&address);
        self.transformed_code.remove(&address);
        self.storage.retain(|(owner, _), _| *owner != address);
    }
}

/// One entry of the layer arena.
#[derive(Clone, Debug)]
pub struct StateLayer {
    /// The enclosing layer, or `None` if the layer sits directly on the backend.
    pub parent: Option<LayerId>,
    /// Where the layer is in its lifecycle.
    pub status: LayerStatus,
    /// The buffered writes. Emptied when the layer is closed.
    pub changes: StateChanges,
}

impl StateLayer {
    pub(crate) fn new(parent: Option<LayerId>) -> Self {
        Self { parent, status: LayerStatus::Open, changes: StateChanges::default() }
    }

    /// Whether the layer still accepts reads and writes.
    pub fn is_open(&self) -> bool {
        self.status == LayerStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const A: Address = address!("00000000000000000000000000000000000000aa");

    #[test]
    fn test_merge_applies_deletions_before_writes() {
        let mut parent = StateChanges::default();
        parent.balances.insert(A, U256::from(7));
        parent.storage.insert((A, B256::ZERO), Some(Bytes::from_static(b"old")));

        let mut child = StateChanges::default();
        child.delete(A);
        child.live.insert(A);
        child.balances.insert(A, U256::from(2));

        parent.merge(child);
        assert_eq!(parent.balances.get(&A), Some(&U256::from(2)));
        assert!(parent.storage.is_empty());
        assert!(parent.deleted.contains(&A));
        assert!(parent.live.contains(&A));
    }
}
