use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};

use crate::InternalErrorCode;

/// A forced exit from sandboxed execution. Once raised it stays latched for the rest of the
/// execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum FatalSignal {
    /// A block checkpoint asked for more energy than remained.
    #[error("out of energy: block costs {cost}, {remaining} remaining")]
    OutOfEnergy {
        /// The cost of the block that could not be paid.
        cost: u64,
        /// The energy left before the failing charge.
        remaining: u64,
    },
    /// The call stack exceeded a watchdog limit.
    #[error("out of stack: depth {depth}, size {size}")]
    OutOfStack {
        /// The call depth after the failing entry.
        depth: u64,
        /// The cumulative frame size after the failing entry.
        size: u64,
    },
    /// The execution was aborted by its supervisor.
    #[error("execution aborted")]
    Aborted,
}

impl FatalSignal {
    /// The error code reported for a transaction ended by this signal.
    pub const fn error_code(&self) -> InternalErrorCode {
        match self {
            Self::OutOfEnergy { .. } => InternalErrorCode::FailedOutOfEnergy,
            Self::OutOfStack { .. } => InternalErrorCode::FailedOutOfStack,
            Self::Aborted => InternalErrorCode::Aborted,
        }
    }
}

/// A handle a supervisor uses to abort a running execution.
///
/// Aborting only sets a flag. The execution observes it at its next checkpoint or method
/// boundary and latches [`FatalSignal::Aborted`].
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Creates a handle that has not been aborted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the execution to stop.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    /// Whether an abort has been requested.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}
