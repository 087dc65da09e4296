//! # Execution-time metering
//!
//! The host interpreter runs an instrumented method body against one [`ExecutionContext`]. The
//! context owns the two runtime components the instrumented code calls into:
//!
//! - [`EnergyMeter`]: the remaining energy budget, target of every injected charge call.
//! - [`StackWatchdog`]: call depth and cumulative frame size, updated at every method boundary.
//!
//! Exhaustion of either, as well as an external [`AbortHandle::abort`], latches a
//! [`FatalSignal`]. Once latched the signal is returned again from every subsequent checkpoint,
//! so sandboxed code cannot swallow it in a local handler.

mod context;
mod energy;
mod signal;
mod watchdog;
pub use context::*;
pub use energy::*;
pub use signal::*;
pub use watchdog::*;
