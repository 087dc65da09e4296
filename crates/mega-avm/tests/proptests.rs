//! Property tests for the instrumentation pass.

use mega_avm::{
    calculate_block_costs, inject_checkpoints, partition_blocks,
    test_utils::replay_straight_line, AvmEngine, Constant, CostTable, Instruction, Label,
    MethodBody, Opcode, RuntimeCall, TypeDescriptor,
};
use proptest::{prelude::*, sample::select};

const STRAIGHT: &[Opcode] = &[
    Opcode::NOP,
    Opcode::ICONST_0,
    Opcode::ICONST_1,
    Opcode::IADD,
    Opcode::IMUL,
    Opcode::DUP,
    Opcode::POP,
    Opcode::ILOAD_0,
    Opcode::ISTORE_0,
    Opcode::ARRAYLENGTH,
];

const TERMINATORS: &[Opcode] = &[Opcode::RETURN, Opcode::IRETURN, Opcode::ATHROW];

const JUMPS: &[Opcode] = &[Opcode::GOTO, Opcode::IFEQ, Opcode::IFNULL, Opcode::IF_ICMPLT];

const TYPES: &[&str] = &["java/lang/Object", "a/B", "[I"];

fn arb_instruction() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        6 => select(STRAIGHT).prop_map(Instruction::Simple),
        2 => (0u32..6).prop_map(|label| Instruction::Label(Label(label))),
        2 => (select(JUMPS), 0u32..6)
            .prop_map(|(opcode, label)| Instruction::jump(opcode, Label(label))),
        1 => select(TERMINATORS).prop_map(Instruction::Simple),
        1 => select(TYPES).prop_map(Instruction::new_object),
        1 => select(TYPES).prop_map(|descriptor| Instruction::Type {
            opcode: Opcode::ANEWARRAY,
            descriptor: descriptor.into(),
        }),
        1 => (select(TYPES), 1u8..=3).prop_map(|(descriptor, dimensions)| {
            Instruction::MultiANewArray { descriptor: descriptor.into(), dimensions }
        }),
    ]
}

fn arb_stream() -> impl Strategy<Value = Vec<Instruction>> {
    proptest::collection::vec(arb_instruction(), 0..64)
}

/// Undoes the injector's rewrites to recover the original stream.
fn strip_instrumentation(instructions: &[Instruction]) -> Vec<Instruction> {
    let mut original = Vec::new();
    let mut index = 0;
    while index < instructions.len() {
        match (&instructions[index], instructions.get(index + 1)) {
            (
                Instruction::Ldc(Constant::Long(_)),
                Some(Instruction::Runtime(RuntimeCall::ChargeEnergy)),
            ) => {}
            (
                Instruction::Ldc(Constant::Type(descriptor)),
                Some(Instruction::Runtime(RuntimeCall::NewObjectArray)),
            ) => original.push(Instruction::Type {
                opcode: Opcode::ANEWARRAY,
                descriptor: descriptor.clone(),
            }),
            (
                Instruction::Ldc(Constant::Type(descriptor)),
                Some(Instruction::Runtime(RuntimeCall::NewMultiArray { dimensions })),
            ) => original.push(Instruction::MultiANewArray {
                descriptor: descriptor.clone(),
                dimensions: *dimensions,
            }),
            (instruction, _) => {
                original.push(instruction.clone());
                index += 1;
                continue;
            }
        }
        index += 2;
    }
    original
}

proptest! {
    #[test]
    fn partition_reproduces_stream(stream in arb_stream()) {
        let blocks = partition_blocks(&stream).unwrap();
        let joined: Vec<Instruction> =
            blocks.iter().flat_map(|block| block.instructions.iter().cloned()).collect();
        prop_assert_eq!(joined, stream.clone());
        prop_assert!(blocks.iter().all(|block| !block.instructions.is_empty()));

        let markers: Vec<TypeDescriptor> =
            blocks.iter().flat_map(|block| block.allocation_markers.iter().cloned()).collect();
        let allocations: Vec<TypeDescriptor> = stream
            .iter()
            .filter_map(|instruction| instruction.allocation_marker().cloned())
            .collect();
        prop_assert_eq!(markers, allocations);
    }

    #[test]
    fn block_cost_is_sum_of_static_fees(stream in arb_stream()) {
        let table = CostTable::default();
        let mut blocks = partition_blocks(&stream).unwrap();
        calculate_block_costs(&mut blocks, &table).unwrap();
        for block in &blocks {
            let expected: u64 = block
                .instructions
                .iter()
                .filter_map(|instruction| instruction.opcode())
                .map(|opcode| table.static_fee(opcode).unwrap())
                .sum();
            prop_assert_eq!(block.energy_cost(), expected);
        }
    }

    #[test]
    fn one_checkpoint_per_costly_block(stream in arb_stream()) {
        let table = CostTable::default();
        let mut blocks = partition_blocks(&stream).unwrap();
        calculate_block_costs(&mut blocks, &table).unwrap();
        let injected = inject_checkpoints(&stream, &blocks).unwrap();

        let costly = blocks.iter().filter(|block| block.energy_cost() > 0).count();
        prop_assert_eq!(injected.checkpoints, costly);
        let charge_calls = injected
            .instructions
            .iter()
            .filter(|instruction| **instruction == Instruction::Runtime(RuntimeCall::ChargeEnergy))
            .count();
        prop_assert_eq!(charge_calls, costly);
        prop_assert_eq!(strip_instrumentation(&injected.instructions), stream);
    }

    #[test]
    fn replay_is_deterministic(stream in arb_stream(), budget in 0u64..400) {
        let engine = AvmEngine::default();
        let instrumented = engine.instrument(&MethodBody::new(stream, 4, 2)).unwrap();
        let run = || {
            let mut ctx = engine.new_execution(budget);
            let replay = replay_straight_line(&mut ctx, &instrumented);
            (replay, ctx.energy_used(), ctx.energy_remaining())
        };
        let (first, used, remaining) = run();
        prop_assert_eq!(run(), (first.clone(), used, remaining));
        prop_assert_eq!(used + remaining, budget);
        if first.signal.is_some() {
            prop_assert_eq!(used, budget);
        } else {
            prop_assert_eq!(used, first.charged.iter().sum::<u64>());
        }
    }
}
