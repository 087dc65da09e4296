use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{FatalSignal, WatchdogConfig};

bitflags! {
    /// The limits checked by the [`StackWatchdog`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct WatchdogPolicy: u8 {
        /// Bound the number of nested method activations.
        const CHECK_DEPTH = 1 << 0;
        /// Bound the cumulative frame size.
        const CHECK_SIZE = 1 << 1;
    }
}

impl Default for WatchdogPolicy {
    fn default() -> Self {
        Self::all()
    }
}

/// Tracks the call stack of one execution against the configured limits.
///
/// The watchdog only counts. Turning an exceeded limit into a latched signal is up to the
/// [`ExecutionContext`](crate::ExecutionContext).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackWatchdog {
    policy: WatchdogPolicy,
    max_depth: u64,
    max_size: u64,
    cur_depth: u64,
    cur_size: u64,
}

impl StackWatchdog {
    /// Creates a watchdog with empty counters.
    pub const fn new(config: &WatchdogConfig) -> Self {
        Self {
            policy: config.policy,
            max_depth: config.max_depth,
            max_size: config.max_size,
            cur_depth: 0,
            cur_size: 0,
        }
    }

    /// Counts one method activation of `frame_size` words.
    ///
    /// The activation is counted even when a limit is exceeded, so every call must be paired
    /// with [`exit_method`](Self::exit_method).
    pub fn enter_method(&mut self, frame_size: u64) -> Result<(), FatalSignal> {
        self.cur_depth = self.cur_depth.saturating_add(1);
        self.cur_size = self.cur_size.saturating_add(frame_size);
        if self.exceeds_depth() || self.exceeds_size() {
            return Err(FatalSignal::OutOfStack { depth: self.cur_depth, size: self.cur_size });
        }
        Ok(())
    }

    /// Reverses one [`enter_method`](Self::enter_method).
    ///
    /// # Panics
    ///
    /// Panics if no activation of at least `frame_size` words is being tracked, which means the
    /// host did not pair its enters and exits.
    pub fn exit_method(&mut self, frame_size: u64) {
        self.cur_depth =
            self.cur_depth.checked_sub(1).expect("unbalanced method exit: no active frame");
        self.cur_size = self.cur_size.checked_sub(frame_size).unwrap_or_else(|| {
            panic!("unbalanced method exit: frame of {frame_size} words, {} tracked", self.cur_size)
        });
    }

    /// Resynchronizes the counters with the frame a catch handler resumes in.
    pub fn enter_catch_block(&mut self, depth: u64, size: u64) {
        self.cur_depth = depth;
        self.cur_size = size;
    }

    /// The current number of nested activations.
    pub const fn depth(&self) -> u64 {
        self.cur_depth
    }

    /// The current cumulative frame size.
    pub const fn size(&self) -> u64 {
        self.cur_size
    }

    /// The enabled checks.
    pub const fn policy(&self) -> WatchdogPolicy {
        self.policy
    }

    fn exceeds_depth(&self) -> bool {
        self.policy.contains(WatchdogPolicy::CHECK_DEPTH) && self.cur_depth > self.max_depth
    }

    fn exceeds_size(&self) -> bool {
        self.policy.contains(WatchdogPolicy::CHECK_SIZE) && self.cur_size > self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watchdog(policy: WatchdogPolicy, max_depth: u64, max_size: u64) -> StackWatchdog {
        StackWatchdog::new(&WatchdogConfig { policy, max_depth, max_size })
    }

    #[test]
    fn test_depth_limit_is_inclusive() {
        let mut watchdog = watchdog(WatchdogPolicy::CHECK_DEPTH, 3, 0);
        for _ in 0..3 {
            watchdog.enter_method(100).unwrap();
        }
        assert_eq!(
            watchdog.enter_method(100),
            Err(FatalSignal::OutOfStack { depth: 4, size: 400 })
        );
        for _ in 0..4 {
            watchdog.exit_method(100);
        }
        assert_eq!((watchdog.depth(), watchdog.size()), (0, 0));
    }

    #[test]
    fn test_size_limit() {
        let mut watchdog = watchdog(WatchdogPolicy::CHECK_SIZE, 0, 10);
        watchdog.enter_method(6).unwrap();
        assert!(watchdog.enter_method(5).is_err());
        watchdog.exit_method(5);
        watchdog.enter_method(4).unwrap();
        assert_eq!(watchdog.size(), 10);
    }

    #[test]
    #[should_panic(expected = "unbalanced method exit: no active frame")]
    fn test_exit_without_enter_is_fatal() {
        let mut watchdog = watchdog(WatchdogPolicy::all(), 3, 100);
        watchdog.enter_method(4).unwrap();
        watchdog.exit_method(4);
        watchdog.exit_method(4);
    }

    #[test]
    #[should_panic(expected = "unbalanced method exit: frame of 9 words, 4 tracked")]
    fn test_exit_larger_than_tracked_frame_is_fatal() {
        let mut watchdog = watchdog(WatchdogPolicy::all(), 3, 100);
        watchdog.enter_method(4).unwrap();
        watchdog.exit_method(9);
    }

    #[test]
    fn test_disabled_checks_never_fire() {
        let mut watchdog = watchdog(WatchdogPolicy::empty(), 0, 0);
        watchdog.enter_method(1_000).unwrap();
        watchdog.enter_method(1_000).unwrap();
        assert_eq!(watchdog.depth(), 2);
    }

    #[test]
    fn test_catch_block_resynchronizes() {
        let mut watchdog = watchdog(WatchdogPolicy::all(), 10, 100);
        for _ in 0..5 {
            watchdog.enter_method(7).unwrap();
        }
        watchdog.enter_catch_block(2, 14);
        assert_eq!((watchdog.depth(), watchdog.size()), (2, 14));
    }

    #[test]
    fn test_policy_serde() {
        let policy: WatchdogPolicy = serde_json::from_str(r#""CHECK_DEPTH | CHECK_SIZE""#).unwrap();
        assert_eq!(policy, WatchdogPolicy::all());
    }
}
