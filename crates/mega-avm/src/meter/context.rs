use alloy_primitives::Bytes;
use tracing::debug;

use crate::{
    AbortHandle, EnergyMeter, FatalSignal, InternalErrorCode, StackWatchdog, TransactionResult,
    TransactionStatus, WatchdogConfig,
};

/// How the entry method of an execution ended, as observed by the host interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodExit {
    /// The method returned normally with the given output.
    Returned(Option<Bytes>),
    /// The sandboxed code explicitly reverted.
    Reverted(Option<Bytes>),
    /// An exception escaped the entry method.
    UncaughtException,
    /// The call arguments or return value could not be decoded.
    InvalidData,
    /// The executed code referenced a class it is not allowed to load.
    RejectedClass,
    /// Any other failure of the sandboxed code.
    Failed,
}

/// The per-execution state the instrumented code calls into.
///
/// One context serves one execution on one thread. The host interpreter calls
/// [`charge`](Self::charge) at every injected checkpoint, and
/// [`enter_method`](Self::enter_method) / [`exit_method`](Self::exit_method) around every method
/// activation. Each of them returns the latched [`FatalSignal`] once one has been raised.
#[derive(Debug)]
pub struct ExecutionContext {
    meter: EnergyMeter,
    watchdog: StackWatchdog,
    abort: AbortHandle,
}

impl ExecutionContext {
    /// Creates a context with `energy_limit` available and empty watchdog counters.
    pub fn new(energy_limit: u64, watchdog: &WatchdogConfig) -> Self {
        Self {
            meter: EnergyMeter::new(energy_limit),
            watchdog: StackWatchdog::new(watchdog),
            abort: AbortHandle::new(),
        }
    }

    /// Returns a handle that aborts this execution at its next checkpoint.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Charges a block's cost. This is the first action of every checkpoint.
    pub fn charge(&mut self, cost: u64) -> Result<(), FatalSignal> {
        self.poll_abort();
        self.meter.charge(cost)
    }

    /// Records entry into a method activation of `frame_size` words.
    ///
    /// The activation is always counted, so the host pairs every call with
    /// [`exit_method`](Self::exit_method), including failed ones.
    pub fn enter_method(&mut self, frame_size: u64) -> Result<(), FatalSignal> {
        let checked = self.watchdog.enter_method(frame_size);
        self.raise_latched()?;
        checked.map_err(|signal| self.meter.latch(signal))
    }

    /// Records exit from a method activation, then re-raises any latched signal.
    pub fn exit_method(&mut self, frame_size: u64) -> Result<(), FatalSignal> {
        self.watchdog.exit_method(frame_size);
        self.raise_latched()
    }

    /// Resynchronizes the watchdog with the frame a catch handler resumes in.
    pub fn enter_catch_block(&mut self, depth: u64, size: u64) {
        self.watchdog.enter_catch_block(depth, size);
    }

    /// The energy charged so far.
    pub const fn energy_used(&self) -> u64 {
        self.meter.used()
    }

    /// The energy left.
    pub const fn energy_remaining(&self) -> u64 {
        self.meter.remaining()
    }

    /// The energy limit of the execution.
    pub const fn energy_limit(&self) -> u64 {
        self.meter.limit()
    }

    /// The latched signal, if any.
    pub const fn forced_exit(&self) -> Option<FatalSignal> {
        self.meter.forced_exit()
    }

    /// The stack watchdog of this execution.
    pub const fn watchdog(&self) -> &StackWatchdog {
        &self.watchdog
    }

    /// Ends the execution and reports its result.
    ///
    /// A latched signal takes precedence over whatever the host observed, since sandboxed code
    /// may have swallowed it on the way out. Forced exits and failures consume the full energy
    /// limit; successful returns and explicit reverts consume what was charged.
    pub fn finish(mut self, exit: MethodExit) -> TransactionResult {
        self.poll_abort();
        let limit = self.meter.limit();
        let result = if let Some(signal) = self.meter.forced_exit() {
            TransactionResult::new(
                TransactionStatus::non_reverted_failure(signal.error_code()),
                None,
                limit,
            )
        } else {
            let used = self.meter.used();
            match exit {
                MethodExit::Returned(output) => {
                    TransactionResult::new(TransactionStatus::success(), output, used)
                }
                MethodExit::Reverted(output) => {
                    TransactionResult::new(TransactionStatus::reverted(), output, used)
                }
                MethodExit::UncaughtException => failure(InternalErrorCode::FailedException, limit),
                MethodExit::InvalidData => failure(InternalErrorCode::FailedInvalidData, limit),
                MethodExit::RejectedClass => failure(InternalErrorCode::FailedRejectedClass, limit),
                MethodExit::Failed => failure(InternalErrorCode::Failed, limit),
            }
        };

        debug!(
            target: "mega_avm::meter",
            status = %result.status,
            energy_used = result.energy_used,
            "execution finished"
        );
        result
    }

    fn poll_abort(&mut self) {
        if self.abort.is_aborted() {
            self.meter.latch(FatalSignal::Aborted);
        }
    }

    fn raise_latched(&mut self) -> Result<(), FatalSignal> {
        self.poll_abort();
        self.meter.forced_exit().map_or(Ok(()), Err)
    }
}

fn failure(code: InternalErrorCode, energy_used: u64) -> TransactionResult {
    TransactionResult::new(TransactionStatus::non_reverted_failure(code), None, energy_used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StatusKind, WatchdogPolicy};

    fn context(energy_limit: u64) -> ExecutionContext {
        ExecutionContext::new(
            energy_limit,
            &WatchdogConfig { policy: WatchdogPolicy::all(), max_depth: 3, max_size: 1_000 },
        )
    }

    #[test]
    fn test_stack_overflow_is_latched_for_checkpoints() {
        let mut ctx = context(1_000);
        for _ in 0..3 {
            ctx.enter_method(10).unwrap();
        }
        let signal = ctx.enter_method(10).unwrap_err();
        assert!(matches!(signal, FatalSignal::OutOfStack { depth: 4, .. }));
        assert_eq!(ctx.charge(1), Err(signal));
        assert_eq!(ctx.exit_method(10), Err(signal));
        assert_eq!(ctx.watchdog().depth(), 3);
    }

    #[test]
    fn test_abort_is_observed_at_next_checkpoint() {
        let mut ctx = context(1_000);
        let handle = ctx.abort_handle();
        ctx.charge(10).unwrap();
        handle.abort();
        assert_eq!(ctx.charge(10), Err(FatalSignal::Aborted));
        assert_eq!(ctx.energy_used(), 10);

        let result = ctx.finish(MethodExit::Returned(None));
        assert_eq!(result.status.kind(), StatusKind::NonRevertedFailure);
        assert_eq!(result.status.code(), InternalErrorCode::Aborted);
        assert_eq!(result.energy_used, 1_000);
    }

    #[test]
    fn test_revert_keeps_unused_energy() {
        let mut ctx = context(1_000);
        ctx.charge(250).unwrap();
        let result = ctx.finish(MethodExit::Reverted(Some(Bytes::from_static(b"no"))));
        assert_eq!(result.status, TransactionStatus::reverted());
        assert_eq!(result.energy_used, 250);
        assert_eq!(result.output, Some(Bytes::from_static(b"no")));
    }

    #[test]
    fn test_swallowed_signal_still_fails_the_transaction() {
        let mut ctx = context(50);
        assert!(ctx.charge(60).is_err());
        let result = ctx.finish(MethodExit::Returned(Some(Bytes::from_static(b"ok"))));
        assert_eq!(result.status.code(), InternalErrorCode::FailedOutOfEnergy);
        assert_eq!(result.energy_used, 50);
        assert_eq!(result.output, None);
    }

    #[test]
    fn test_uncaught_exception_consumes_limit() {
        let mut ctx = context(500);
        ctx.charge(5).unwrap();
        let result = ctx.finish(MethodExit::UncaughtException);
        assert_eq!(result.status.code(), InternalErrorCode::FailedException);
        assert_eq!(result.energy_used, 500);
    }
}
