use crate::{Constant, ExecutionContext, FatalSignal, Instruction, RuntimeCall};

/// What a straight-line replay did before it stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Replay {
    /// The costs of the checkpoints that were paid, in order.
    pub charged: Vec<u64>,
    /// The number of instructions run, excluding labels and checkpoints.
    pub executed: usize,
    /// The signal that stopped the replay, if any.
    pub signal: Option<FatalSignal>,
}

/// Walks an instrumented stream top to bottom, paying every checkpoint against `ctx`.
///
/// Jumps are not taken, so this only models bodies whose blocks run once in program order. The
/// replay stops at the first checkpoint that fails.
pub fn replay_straight_line(ctx: &mut ExecutionContext, instructions: &[Instruction]) -> Replay {
    let mut replay = Replay::default();
    let mut index = 0;
    while index < instructions.len() {
        match (&instructions[index], instructions.get(index + 1)) {
            (
                Instruction::Ldc(Constant::Long(cost)),
                Some(Instruction::Runtime(RuntimeCall::ChargeEnergy)),
            ) => {
                let cost = u64::try_from(*cost).expect("checkpoint costs are non-negative");
                if let Err(signal) = ctx.charge(cost) {
                    replay.signal = Some(signal);
                    return replay;
                }
                replay.charged.push(cost);
                index += 2;
            }
            (instruction, _) => {
                if instruction.is_executable() {
                    replay.executed += 1;
                }
                index += 1;
            }
        }
    }
    replay
}
