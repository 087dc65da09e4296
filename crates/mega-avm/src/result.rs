//! Transaction results reported to the surrounding transaction-processing logic.

use core::fmt;

use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// The outcome category of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// The transaction executed successfully.
    Success,
    /// The transaction failed without the sandboxed code requesting it.
    NonRevertedFailure,
    /// The sandboxed code explicitly reverted.
    RevertedFailure,
    /// The transaction was rejected before execution.
    Rejected,
    /// The engine itself failed.
    Fatal,
}

/// The detailed reason for a transaction outcome.
///
/// Every code belongs to exactly one [`StatusKind`], see [`kind`](Self::kind).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InternalErrorCode {
    /// No error.
    #[display("NONE")]
    None,
    /// The energy limit is outside the accepted range.
    #[display("REJECTED_INVALID_ENERGY_LIMIT")]
    RejectedInvalidEnergyLimit,
    /// The nonce does not match the sender's account.
    #[display("REJECTED_INVALID_NONCE")]
    RejectedInvalidNonce,
    /// The sender cannot pay for value and energy.
    #[display("REJECTED_INSUFFICIENT_BALANCE")]
    RejectedInsufficientBalance,
    /// Generic failure of the sandboxed code.
    #[display("FAILED")]
    Failed,
    /// The energy budget ran out.
    #[display("FAILED_OUT_OF_ENERGY")]
    FailedOutOfEnergy,
    /// The call stack exceeded a watchdog limit.
    #[display("FAILED_OUT_OF_STACK")]
    FailedOutOfStack,
    /// An exception escaped the entry method.
    #[display("FAILED_EXCEPTION")]
    FailedException,
    /// Arguments or return data could not be decoded.
    #[display("FAILED_INVALID_DATA")]
    FailedInvalidData,
    /// The code referenced a class it may not load.
    #[display("FAILED_REJECTED_CLASS")]
    FailedRejectedClass,
    /// The sandboxed code explicitly reverted.
    #[display("FAILED_REVERTED")]
    FailedReverted,
    /// The execution was aborted by its supervisor.
    #[display("ABORTED")]
    Aborted,
    /// The engine hit an unexpected internal failure.
    #[display("FAILED_UNEXPECTED")]
    FailedUnexpected,
}

impl InternalErrorCode {
    /// The only status kind this code may be paired with.
    pub const fn kind(self) -> StatusKind {
        match self {
            Self::None => StatusKind::Success,
            Self::RejectedInvalidEnergyLimit |
            Self::RejectedInvalidNonce |
            Self::RejectedInsufficientBalance => StatusKind::Rejected,
            Self::Failed |
            Self::FailedOutOfEnergy |
            Self::FailedOutOfStack |
            Self::FailedException |
            Self::FailedInvalidData |
            Self::FailedRejectedClass |
            Self::Aborted => StatusKind::NonRevertedFailure,
            Self::FailedReverted => StatusKind::RevertedFailure,
            Self::FailedUnexpected => StatusKind::Fatal,
        }
    }
}

/// A status kind paired with a consistent error code.
///
/// The pairing is checked on construction. An inconsistent pairing means the engine is broken
/// and panics instead of producing a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TransactionStatus {
    kind: StatusKind,
    code: InternalErrorCode,
}

impl TransactionStatus {
    /// Pairs `kind` with `code`.
    ///
    /// # Panics
    ///
    /// Panics if `code` does not belong to `kind`.
    pub fn new(kind: StatusKind, code: InternalErrorCode) -> Self {
        assert_eq!(
            code.kind(),
            kind,
            "transaction status {kind:?} cannot carry internal error code {code}"
        );
        Self { kind, code }
    }

    /// A successful execution.
    pub const fn success() -> Self {
        Self { kind: StatusKind::Success, code: InternalErrorCode::None }
    }

    /// An explicit revert.
    pub const fn reverted() -> Self {
        Self { kind: StatusKind::RevertedFailure, code: InternalErrorCode::FailedReverted }
    }

    /// A failure the sandboxed code did not request.
    pub fn non_reverted_failure(code: InternalErrorCode) -> Self {
        Self::new(StatusKind::NonRevertedFailure, code)
    }

    /// A rejection before execution.
    pub fn rejected(code: InternalErrorCode) -> Self {
        Self::new(StatusKind::Rejected, code)
    }

    /// An internal engine failure.
    pub const fn fatal() -> Self {
        Self { kind: StatusKind::Fatal, code: InternalErrorCode::FailedUnexpected }
    }

    /// The status kind.
    pub const fn kind(&self) -> StatusKind {
        self.kind
    }

    /// The internal error code.
    pub const fn code(&self) -> InternalErrorCode {
        self.code
    }

    /// Whether the transaction succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self.kind, StatusKind::Success)
    }

    /// Whether the transaction was rejected before execution.
    pub const fn is_rejected(&self) -> bool {
        matches!(self.kind, StatusKind::Rejected)
    }

    /// Whether the transaction executed and failed, reverted or not.
    pub const fn is_failed(&self) -> bool {
        matches!(self.kind, StatusKind::NonRevertedFailure | StatusKind::RevertedFailure)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.code)
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            kind: StatusKind,
            code: InternalErrorCode,
        }

        let raw = Raw::deserialize(deserializer)?;
        if raw.code.kind() != raw.kind {
            return Err(serde::de::Error::custom(format!(
                "status {:?} cannot carry internal error code {}",
                raw.kind, raw.code
            )));
        }
        Ok(Self { kind: raw.kind, code: raw.code })
    }
}

/// The result of one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// The outcome.
    pub status: TransactionStatus,
    /// The data returned by the entry method, if any.
    pub output: Option<Bytes>,
    /// The energy billed to the sender.
    pub energy_used: u64,
}

impl TransactionResult {
    /// Creates a new result.
    pub const fn new(status: TransactionStatus, output: Option<Bytes>, energy_used: u64) -> Self {
        Self { status, output, energy_used }
    }

    /// A rejection, which never consumes energy.
    pub fn rejected(code: InternalErrorCode) -> Self {
        Self::new(TransactionStatus::rejected(code), None, 0)
    }
}
