use crate::{
    Constant, CostSchedule, Instruction, Label, MemberRef, MethodBody, Opcode, ScheduleEntry,
};

/// A builder for assembling method bodies.
#[derive(Debug, Default)]
pub struct MethodBodyBuilder {
    instructions: Vec<Instruction>,
    max_stack: u16,
    max_locals: u16,
}

impl MethodBodyBuilder {
    /// Build the method body.
    pub fn build(self) -> MethodBody {
        MethodBody::new(self.instructions, self.max_stack, self.max_locals)
    }

    /// Build the instruction stream only.
    pub fn build_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Get the number of instructions, labels included.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if no instruction has been appended.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Set the operand stack depth and local variable count.
    pub const fn frame(mut self, max_stack: u16, max_locals: u16) -> Self {
        self.max_stack = max_stack;
        self.max_locals = max_locals;
        self
    }

    /// Append any instruction.
    pub fn append(mut self, instruction: impl Into<Instruction>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Append an opcode without operands.
    pub fn op(self, opcode: Opcode) -> Self {
        self.append(opcode)
    }

    /// Append the same opcode `count` times.
    pub fn repeat(mut self, opcode: Opcode, count: usize) -> Self {
        self.instructions.extend(core::iter::repeat_n(Instruction::Simple(opcode), count));
        self
    }

    /// Append a label.
    pub fn label(self, label: u32) -> Self {
        self.append(Label(label))
    }

    /// Append a jump to `label`.
    pub fn jump(self, opcode: Opcode, label: u32) -> Self {
        self.append(Instruction::jump(opcode, Label(label)))
    }

    /// Append an `int` constant.
    pub fn push_int(self, value: i32) -> Self {
        self.append(Instruction::Ldc(Constant::Int(value)))
    }

    /// Append a `NEW`.
    pub fn new_object(self, descriptor: &str) -> Self {
        self.append(Instruction::new_object(descriptor))
    }

    /// Append an `ANEWARRAY`.
    pub fn new_object_array(self, descriptor: &str) -> Self {
        self.append(Instruction::Type { opcode: Opcode::ANEWARRAY, descriptor: descriptor.into() })
    }

    /// Append a `MULTIANEWARRAY`.
    pub fn new_multi_array(self, descriptor: &str, dimensions: u8) -> Self {
        self.append(Instruction::MultiANewArray { descriptor: descriptor.into(), dimensions })
    }

    /// Append an `INVOKESTATIC`.
    pub fn invoke_static(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.append(Instruction::Invoke {
            opcode: Opcode::INVOKESTATIC,
            method: MemberRef::new(owner, name, descriptor),
            interface: false,
        })
    }
}

/// A schedule pricing each listed opcode at exactly `energy_level`, with no stack effect.
///
/// Handy for building blocks of a known cost.
pub fn flat_schedule(prices: &[(Opcode, u64)]) -> CostSchedule {
    CostSchedule(
        prices
            .iter()
            .map(|&(opcode, energy_level)| ScheduleEntry { opcode, energy_level, pop: 0, push: 0 })
            .collect(),
    )
}

/// A body of straight-line blocks, each a run of `NOP`s closed by a `GOTO` to the next block.
///
/// With `NOP` priced at 1 and `GOTO` at 0, block `i` costs `costs[i]`.
pub fn blocks_with_costs(costs: &[u64]) -> MethodBody {
    let mut builder = MethodBodyBuilder::default().frame(1, 1);
    for (index, &cost) in costs.iter().enumerate() {
        let next = u32::try_from(index + 1).expect("block count fits in a label");
        builder = builder
            .repeat(Opcode::NOP, usize::try_from(cost).expect("block cost fits in memory"))
            .jump(Opcode::GOTO, next)
            .label(next);
    }
    builder.op(Opcode::RETURN).build()
}
