use crate::{BasicBlock, CostTable, InstrumentError};

/// Returns the summed static fee of a block's instructions.
///
/// Labels cost nothing. Instructions without a cost entry, including runtime calls emitted by a
/// previous instrumentation pass, are rejected.
pub fn block_cost(block: &BasicBlock, table: &CostTable) -> Result<u64, InstrumentError> {
    let mut cost = 0u64;
    for (offset, instruction) in block.instructions.iter().enumerate() {
        if instruction.is_label() {
            continue;
        }
        let fee = instruction.opcode().and_then(|opcode| table.static_fee(opcode)).ok_or_else(
            || InstrumentError::UnknownInstruction {
                index: block.start + offset,
                mnemonic: instruction.mnemonic(),
            },
        )?;
        cost = cost.saturating_add(fee);
    }
    Ok(cost)
}

/// Prices every block in place.
pub fn calculate_block_costs(
    blocks: &mut [BasicBlock],
    table: &CostTable,
) -> Result<(), InstrumentError> {
    for block in blocks {
        let cost = block_cost(block, table)?;
        block.set_energy_cost(cost);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::energy::{HIGH, MEMORY_LEVEL, VERY_LOW},
        partition_blocks, Instruction, Label, Opcode, RuntimeCall,
    };

    #[test]
    fn test_block_cost_sums_static_fees() {
        let table = CostTable::default();
        let code = vec![
            Label(0).into(),
            Instruction::new_object("a/A"),
            Opcode::ICONST_1.into(),
            Opcode::IRETURN.into(),
        ];
        let mut blocks = partition_blocks(&code).unwrap();
        calculate_block_costs(&mut blocks, &table).unwrap();

        let expected = (HIGH + MEMORY_LEVEL) +
            table.static_fee(Opcode::ICONST_1).unwrap() +
            table.static_fee(Opcode::IRETURN).unwrap();
        assert_eq!(blocks[0].energy_cost(), expected);
        assert!(blocks[0].is_costed());
        assert_eq!(table.static_fee(Opcode::ICONST_1), Some(VERY_LOW + MEMORY_LEVEL));
    }

    #[test]
    fn test_unknown_instruction_reports_stream_index() {
        let table = CostTable::default();
        let code = vec![
            Opcode::ICONST_0.into(),
            Instruction::jump(Opcode::IFEQ, Label(0)),
            Label(0).into(),
            Instruction::var(Opcode::RET, 1),
        ];
        let mut blocks = partition_blocks(&code).unwrap();
        let err = calculate_block_costs(&mut blocks, &table).unwrap_err();
        assert_eq!(err, InstrumentError::UnknownInstruction { index: 3, mnemonic: "RET".into() });
    }

    #[test]
    fn test_runtime_calls_are_not_priced() {
        let table = CostTable::default();
        let mut block = BasicBlock::new(0);
        block.instructions.push(Instruction::Runtime(RuntimeCall::ChargeEnergy));
        assert!(matches!(
            block_cost(&block, &table),
            Err(InstrumentError::UnknownInstruction { index: 0, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "priced twice")]
    fn test_block_is_priced_once() {
        let table = CostTable::default();
        let code: Vec<Instruction> = vec![Opcode::RETURN.into()];
        let mut blocks = partition_blocks(&code).unwrap();
        calculate_block_costs(&mut blocks, &table).unwrap();
        calculate_block_costs(&mut blocks, &table).unwrap();
    }
}
