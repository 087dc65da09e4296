//! # Energy instrumentation
//!
//! Instrumentation turns a [`MethodBody`] into an [`InstrumentedMethod`] in three passes:
//!
//! 1. [`partition_blocks`] checks every instruction's operands against its opcode and splits the
//!    stream into basic blocks at control-flow seams.
//! 2. [`calculate_block_costs`] prices every block from the [`CostTable`].
//! 3. [`inject_checkpoints`] re-walks the original stream and emits a charge call at the entry of
//!    every block with a non-zero cost, rewriting object-array allocations to runtime helpers on
//!    the way.
//!
//! Failures in any pass reject the method body before any execution budget is spent.

use tracing::debug;

use crate::{CostTable, Instruction, MethodBody};

mod calculator;
mod injector;
mod partition;
pub use calculator::*;
pub use injector::*;
pub use partition::*;

/// Errors that reject a method body at instrumentation time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstrumentError {
    /// The instruction has no entry in the cost table.
    #[error("instruction {mnemonic} at index {index} has no cost entry")]
    UnknownInstruction {
        /// Position of the instruction in the method body.
        index: usize,
        /// Mnemonic of the instruction.
        mnemonic: String,
    },
    /// A dynamically resolved call site reached the partitioner.
    #[error("dynamically resolved call site at index {index} cannot be partitioned")]
    UnreachablePartition {
        /// Position of the instruction in the method body.
        index: usize,
    },
    /// The operands of the instruction do not match its opcode.
    #[error("instruction {mnemonic} at index {index} does not carry the operands of its opcode")]
    MalformedInstruction {
        /// Position of the instruction in the method body.
        index: usize,
        /// Mnemonic of the instruction.
        mnemonic: String,
    },
    /// A multi-dimensional array allocation exceeds the supported dimension count.
    #[error("array allocation at index {index} has {dimensions} dimensions, supported: 1..={max}")]
    UnsupportedArrayDimensions {
        /// Position of the instruction in the method body.
        index: usize,
        /// The requested dimension count.
        dimensions: u8,
        /// The largest supported dimension count.
        max: u8,
    },
}

/// A method body with energy checkpoints injected.
#[derive(Clone, Debug, PartialEq, derive_more::Deref)]
pub struct InstrumentedMethod {
    /// The rewritten instruction stream.
    #[deref]
    pub instructions: Vec<Instruction>,
    /// The costed basic blocks of the original stream.
    pub blocks: Vec<BasicBlock>,
    /// Words charged to the stack watchdog for one activation.
    pub frame_size: u64,
    /// The number of injected charge calls.
    pub checkpoints: usize,
}

impl InstrumentedMethod {
    /// The sum of all block costs, i.e. the energy charged by one pass over every block.
    pub fn total_block_cost(&self) -> u64 {
        self.blocks.iter().fold(0u64, |total, block| total.saturating_add(block.energy_cost()))
    }
}

/// Instruments a method body against the given cost table.
pub fn instrument(
    body: &MethodBody,
    table: &CostTable,
) -> Result<InstrumentedMethod, InstrumentError> {
    let mut blocks = partition_blocks(&body.instructions)?;
    calculate_block_costs(&mut blocks, table)?;
    let injected = inject_checkpoints(&body.instructions, &blocks)?;

    debug!(
        target: "mega_avm::instrument",
        instructions = body.instructions.len(),
        blocks = blocks.len(),
        checkpoints = injected.checkpoints,
        "instrumented method body"
    );

    Ok(InstrumentedMethod {
        instructions: injected.instructions,
        blocks,
        frame_size: body.frame_size(),
        checkpoints: injected.checkpoints,
    })
}
