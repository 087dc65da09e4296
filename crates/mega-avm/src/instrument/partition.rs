use core::mem;

use crate::{InstrumentError, Instruction, Opcode, TypeDescriptor};

/// A maximal straight-line run of instructions with a single entry.
///
/// Labels are kept in the block they precede, so the concatenation of all blocks reproduces the
/// partitioned stream exactly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BasicBlock {
    /// Index of the block's first instruction in the method body.
    pub start: usize,
    /// The instructions of the block, labels included.
    pub instructions: Vec<Instruction>,
    /// Types constructed by `NEW` inside the block, in program order.
    pub allocation_markers: Vec<TypeDescriptor>,
    energy_cost: Option<u64>,
}

impl BasicBlock {
    /// Creates an empty block starting at `start`.
    pub const fn new(start: usize) -> Self {
        Self { start, instructions: Vec::new(), allocation_markers: Vec::new(), energy_cost: None }
    }

    /// The energy charged on entry to the block. Zero until the block has been costed.
    pub fn energy_cost(&self) -> u64 {
        self.energy_cost.unwrap_or_default()
    }

    /// Whether the calculator has priced this block.
    pub const fn is_costed(&self) -> bool {
        self.energy_cost.is_some()
    }

    /// Sets the block cost. A block is priced exactly once per instrumentation pass.
    pub(crate) fn set_energy_cost(&mut self, cost: u64) {
        assert!(self.energy_cost.is_none(), "block at {} priced twice", self.start);
        self.energy_cost = Some(cost);
    }

    /// Whether the block holds anything besides labels.
    pub fn has_executable(&self) -> bool {
        self.instructions.iter().any(Instruction::is_executable)
    }

    fn push(&mut self, instruction: &Instruction) {
        if let Some(descriptor) = instruction.allocation_marker() {
            self.allocation_markers.push(descriptor.clone());
        }
        self.instructions.push(instruction.clone());
    }
}

/// Splits an instruction stream into basic blocks.
///
/// A block ends after every instruction that transfers control (branch, switch, return, throw)
/// and before every label that follows executable code. Consecutive seams collapse, so no block
/// is empty. Labels after the last executable instruction join the last block; a stream made of
/// labels only yields a single block without executable code.
///
/// Any instruction with the `INVOKEDYNAMIC` opcode is rejected with
/// [`InstrumentError::UnreachablePartition`], and any instruction whose operands do not match its
/// opcode with [`InstrumentError::MalformedInstruction`].
pub fn partition_blocks(instructions: &[Instruction]) -> Result<Vec<BasicBlock>, InstrumentError> {
    let mut blocks = Vec::new();
    let mut current = BasicBlock::new(0);
    let mut has_code = false;

    for (index, instruction) in instructions.iter().enumerate() {
        if instruction.opcode() == Some(Opcode::INVOKEDYNAMIC) {
            return Err(InstrumentError::UnreachablePartition { index });
        }
        if !instruction.is_well_formed() {
            return Err(InstrumentError::MalformedInstruction {
                index,
                mnemonic: instruction.mnemonic(),
            });
        }
        match instruction {
            Instruction::Label(_) => {
                if has_code {
                    blocks.push(mem::replace(&mut current, BasicBlock::new(index)));
                    has_code = false;
                }
                current.push(instruction);
            }
            _ => {
                current.push(instruction);
                has_code = true;
                if instruction.ends_block() {
                    blocks.push(mem::replace(&mut current, BasicBlock::new(index + 1)));
                    has_code = false;
                }
            }
        }
    }

    if !current.instructions.is_empty() {
        match blocks.last_mut() {
            Some(last) if !has_code => last.instructions.append(&mut current.instructions),
            _ => blocks.push(current),
        }
    }

    Ok(blocks)
}
