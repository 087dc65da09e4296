//! Constants for the metered sandbox.
//!
//! It groups the constants by the component that consumes them.

/// Energy levels used by the default cost schedule.
///
/// The static fee of an opcode is its level plus [`MEMORY_LEVEL`](energy::MEMORY_LEVEL) for
/// every stack slot the opcode grows the operand stack by.
pub mod energy {
    /// Opcodes that do no work.
    pub const ZERO: u64 = 0;
    /// Trivial stack manipulation.
    pub const BASE: u64 = 2;
    /// Loads, stores, constants and simple arithmetic.
    pub const VERY_LOW: u64 = 3;
    /// Multiplication, type checks and monitor operations.
    pub const LOW: u64 = 5;
    /// Division, array and field access, control flow.
    pub const MID: u64 = 8;
    /// Invocations, allocations, switches and exceptions.
    pub const HIGH: u64 = 10;

    /// The energy charged for every additional operand stack slot an opcode produces.
    pub const MEMORY_LEVEL: u64 = 3;

    /// The smallest energy limit a transaction may carry.
    pub const MIN_ENERGY_LIMIT: u64 = 21_000;
    /// The largest energy limit a transaction may carry.
    pub const MAX_ENERGY_LIMIT: u64 = 2_000_000;
}

/// Defaults for the call-stack watchdog.
pub mod watchdog {
    /// The maximum number of nested method activations.
    pub const MAX_DEPTH: u64 = 512;
    /// The maximum cumulative frame size, in words.
    pub const MAX_SIZE: u64 = 128 * 1024;
    /// Words reserved in every frame for the instrumentation bookkeeping local.
    pub const FRAME_BOOKKEEPING_WORDS: u64 = 1;
}

/// Constants for the instrumentation pass.
pub mod instrument {
    /// The largest dimension count accepted for a multi-dimensional array allocation.
    pub const MAX_ARRAY_DIMENSIONS: u8 = 3;
}
