//! Transaction admission and settlement around one execution.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    EnergyConfig, InternalErrorCode, LayerId, LayeredState, StateBackend, StateError,
    TransactionResult,
};

/// The fields of a transaction the sandbox checks and bills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    /// The paying account.
    pub sender: Address,
    /// The expected nonce of the sender.
    pub nonce: u64,
    /// The value transferred by the transaction.
    pub value: U256,
    /// The energy budget of the execution.
    pub energy_limit: u64,
    /// The price of one unit of energy.
    pub energy_price: U256,
}

impl TransactionEnvelope {
    /// The most the sender can be charged: the value plus the full energy limit at the energy
    /// price. `None` on overflow.
    pub fn max_cost(&self) -> Option<U256> {
        self.energy_price.checked_mul(U256::from(self.energy_limit))?.checked_add(self.value)
    }

    /// Checks whether the transaction may execute.
    ///
    /// # Returns
    ///
    /// The rejection code if the energy limit is out of range, the nonce does not match, or the
    /// sender cannot cover [`max_cost`](Self::max_cost).
    pub fn validate<B: StateBackend>(
        &self,
        state: &LayeredState<B>,
        layer: LayerId,
        limits: &EnergyConfig,
    ) -> Result<Option<InternalErrorCode>, StateError> {
        if !limits.accepts(self.energy_limit) {
            return Ok(Some(InternalErrorCode::RejectedInvalidEnergyLimit));
        }
        if !state.nonce_equals(layer, self.sender, self.nonce)? {
            return Ok(Some(InternalErrorCode::RejectedInvalidNonce));
        }
        let affordable = match self.max_cost() {
            Some(cost) => state.balance_is_at_least(layer, self.sender, cost)?,
            None => false,
        };
        if !affordable {
            return Ok(Some(InternalErrorCode::RejectedInsufficientBalance));
        }
        Ok(None)
    }

    /// Bills the executed transaction to the sender and bumps its nonce.
    ///
    /// Rejected transactions are left untouched. Returns the fee debited.
    pub fn settle<B: StateBackend>(
        &self,
        state: &mut LayeredState<B>,
        layer: LayerId,
        result: &TransactionResult,
    ) -> Result<U256, StateError> {
        if result.status.is_rejected() {
            return Ok(U256::ZERO);
        }
        let fee = self.energy_price.saturating_mul(U256::from(result.energy_used));
        state.debit(layer, self.sender, fee)?;
        let nonce = state.increment_nonce(layer, self.sender)?;
        debug!(
            target: "mega_avm::tx",
            sender = %self.sender,
            %fee,
            nonce,
            status = %result.status,
            "settled transaction"
        );
        Ok(fee)
    }
}
