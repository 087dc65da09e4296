use crate::{
    constants::instrument::MAX_ARRAY_DIMENSIONS, BasicBlock, Constant, InstrumentError,
    Instruction, Opcode, RuntimeCall,
};

/// The rewritten instruction stream produced by [`inject_checkpoints`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InjectedStream {
    /// The instructions with charge calls and runtime helpers in place.
    pub instructions: Vec<Instruction>,
    /// The number of charge calls emitted.
    pub checkpoints: usize,
}

/// Where the injector is relative to the block list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// The next executable instruction opens the block at the cursor.
    ScanningForBlockStart,
    /// Inside the block before the cursor.
    WithinBlock,
}

/// Re-walks `instructions` alongside the costed `blocks` of the same stream and emits a charge
/// call at the entry of every block with a non-zero cost.
///
/// The charge call is `LDC cost` followed by [`RuntimeCall::ChargeEnergy`], placed after the
/// block's leading labels so that jumps into the block are charged too. `ANEWARRAY` and
/// `MULTIANEWARRAY` are rewritten to push their type descriptor and call the matching runtime
/// helper.
///
/// # Panics
///
/// Panics if the walk does not consume exactly `blocks.len()` blocks, which means `blocks` was
/// not partitioned from `instructions`.
pub fn inject_checkpoints(
    instructions: &[Instruction],
    blocks: &[BasicBlock],
) -> Result<InjectedStream, InstrumentError> {
    let mut output = InjectedStream {
        instructions: Vec::with_capacity(instructions.len() + 2 * blocks.len()),
        checkpoints: 0,
    };
    let mut state = ScanState::ScanningForBlockStart;
    let mut cursor = 0;

    for (index, instruction) in instructions.iter().enumerate() {
        if instruction.is_label() {
            output.instructions.push(instruction.clone());
            state = ScanState::ScanningForBlockStart;
            continue;
        }

        if state == ScanState::ScanningForBlockStart {
            let block = blocks.get(cursor).unwrap_or_else(|| {
                panic!("instruction {index} falls outside the {} partitioned blocks", blocks.len())
            });
            let cost = block.energy_cost();
            if cost > 0 {
                // Block costs beyond `i64::MAX` can never be paid anyway.
                let literal = i64::try_from(cost).unwrap_or(i64::MAX);
                output.instructions.push(Instruction::Ldc(Constant::Long(literal)));
                output.instructions.push(Instruction::Runtime(RuntimeCall::ChargeEnergy));
                output.checkpoints += 1;
            }
            cursor += 1;
            state = ScanState::WithinBlock;
        }

        emit(&mut output.instructions, index, instruction)?;

        if instruction.ends_block() {
            state = ScanState::ScanningForBlockStart;
        }
    }

    // A stream of labels only has one block without executable code.
    if cursor + 1 == blocks.len() && !blocks[cursor].has_executable() {
        cursor += 1;
    }
    assert_eq!(
        cursor,
        blocks.len(),
        "checkpoint injection consumed {cursor} blocks, partition produced {}",
        blocks.len()
    );

    Ok(output)
}

/// Emits one original instruction, rewriting object-array allocations.
fn emit(
    output: &mut Vec<Instruction>,
    index: usize,
    instruction: &Instruction,
) -> Result<(), InstrumentError> {
    match (instruction.opcode(), instruction) {
        (Some(Opcode::ANEWARRAY), Instruction::Type { descriptor, .. }) => {
            output.push(Instruction::Ldc(Constant::Type(descriptor.clone())));
            output.push(Instruction::Runtime(RuntimeCall::NewObjectArray));
        }
        (Some(Opcode::MULTIANEWARRAY), Instruction::MultiANewArray { descriptor, dimensions }) => {
            if *dimensions == 0 || *dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(InstrumentError::UnsupportedArrayDimensions {
                    index,
                    dimensions: *dimensions,
                    max: MAX_ARRAY_DIMENSIONS,
                });
            }
            output.push(Instruction::Ldc(Constant::Type(descriptor.clone())));
            let dimensions = *dimensions;
            output.push(Instruction::Runtime(RuntimeCall::NewMultiArray { dimensions }));
        }
        // Array allocations never reach the output in native form.
        (Some(Opcode::ANEWARRAY | Opcode::MULTIANEWARRAY), _) => {
            return Err(InstrumentError::MalformedInstruction {
                index,
                mnemonic: instruction.mnemonic(),
            });
        }
        _ => output.push(instruction.clone()),
    }
    Ok(())
}
