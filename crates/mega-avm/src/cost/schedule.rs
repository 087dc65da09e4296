use crate::{
    constants::energy::{BASE, HIGH, LOW, MID, VERY_LOW, ZERO},
    Opcode,
};

/// The built-in cost schedule as `(opcode, energy_level, pop, push)` rows.
///
/// Opcodes missing from this list are not chargeable: `JSR`, `RET` and `JSR_W` (subroutines are
/// not supported), `WIDE` (an encoding prefix, never a standalone instruction) and
/// `INVOKEDYNAMIC` (rejected before instrumentation).
pub const DEFAULT_SCHEDULE: &[(Opcode, u64, u8, u8)] = &[
    (Opcode::NOP, ZERO, 0, 0),
    (Opcode::ACONST_NULL, VERY_LOW, 0, 1),
    (Opcode::ICONST_M1, VERY_LOW, 0, 1),
    (Opcode::ICONST_0, VERY_LOW, 0, 1),
    (Opcode::ICONST_1, VERY_LOW, 0, 1),
    (Opcode::ICONST_2, VERY_LOW, 0, 1),
    (Opcode::ICONST_3, VERY_LOW, 0, 1),
    (Opcode::ICONST_4, VERY_LOW, 0, 1),
    (Opcode::ICONST_5, VERY_LOW, 0, 1),
    (Opcode::LCONST_0, VERY_LOW, 0, 1),
    (Opcode::LCONST_1, VERY_LOW, 0, 1),
    (Opcode::FCONST_0, VERY_LOW, 0, 1),
    (Opcode::FCONST_1, VERY_LOW, 0, 1),
    (Opcode::FCONST_2, VERY_LOW, 0, 1),
    (Opcode::DCONST_0, VERY_LOW, 0, 1),
    (Opcode::DCONST_1, VERY_LOW, 0, 1),
    (Opcode::BIPUSH, VERY_LOW, 0, 1),
    (Opcode::SIPUSH, VERY_LOW, 0, 1),
    (Opcode::LDC, VERY_LOW, 0, 1),
    (Opcode::LDC_W, VERY_LOW, 0, 1),
    (Opcode::LDC2_W, VERY_LOW, 0, 1),
    (Opcode::ILOAD, VERY_LOW, 0, 1),
    (Opcode::LLOAD, VERY_LOW, 0, 1),
    (Opcode::FLOAD, VERY_LOW, 0, 1),
    (Opcode::DLOAD, VERY_LOW, 0, 1),
    (Opcode::ALOAD, VERY_LOW, 0, 1),
    (Opcode::ILOAD_0, VERY_LOW, 0, 1),
    (Opcode::ILOAD_1, VERY_LOW, 0, 1),
    (Opcode::ILOAD_2, VERY_LOW, 0, 1),
    (Opcode::ILOAD_3, VERY_LOW, 0, 1),
    (Opcode::LLOAD_0, VERY_LOW, 0, 1),
    (Opcode::LLOAD_1, VERY_LOW, 0, 1),
    (Opcode::LLOAD_2, VERY_LOW, 0, 1),
    (Opcode::LLOAD_3, VERY_LOW, 0, 1),
    (Opcode::FLOAD_0, VERY_LOW, 0, 1),
    (Opcode::FLOAD_1, VERY_LOW, 0, 1),
    (Opcode::FLOAD_2, VERY_LOW, 0, 1),
    (Opcode::FLOAD_3, VERY_LOW, 0, 1),
    (Opcode::DLOAD_0, VERY_LOW, 0, 1),
    (Opcode::DLOAD_1, VERY_LOW, 0, 1),
    (Opcode::DLOAD_2, VERY_LOW, 0, 1),
    (Opcode::DLOAD_3, VERY_LOW, 0, 1),
    (Opcode::ALOAD_0, VERY_LOW, 0, 1),
    (Opcode::ALOAD_1, VERY_LOW, 0, 1),
    (Opcode::ALOAD_2, VERY_LOW, 0, 1),
    (Opcode::ALOAD_3, VERY_LOW, 0, 1),
    (Opcode::IALOAD, MID, 2, 1),
    (Opcode::LALOAD, MID, 2, 1),
    (Opcode::FALOAD, MID, 2, 1),
    (Opcode::DALOAD, MID, 2, 1),
    (Opcode::AALOAD, MID, 2, 1),
    (Opcode::BALOAD, MID, 2, 1),
    (Opcode::CALOAD, MID, 2, 1),
    (Opcode::SALOAD, MID, 2, 1),
    (Opcode::ISTORE, VERY_LOW, 1, 0),
    (Opcode::LSTORE, VERY_LOW, 1, 0),
    (Opcode::FSTORE, VERY_LOW, 1, 0),
    (Opcode::DSTORE, VERY_LOW, 1, 0),
    (Opcode::ASTORE, VERY_LOW, 1, 0),
    (Opcode::ISTORE_0, VERY_LOW, 1, 0),
    (Opcode::ISTORE_1, VERY_LOW, 1, 0),
    (Opcode::ISTORE_2, VERY_LOW, 1, 0),
    (Opcode::ISTORE_3, VERY_LOW, 1, 0),
    (Opcode::LSTORE_0, VERY_LOW, 1, 0),
    (Opcode::LSTORE_1, VERY_LOW, 1, 0),
    (Opcode::LSTORE_2, VERY_LOW, 1, 0),
    (Opcode::LSTORE_3, VERY_LOW, 1, 0),
    (Opcode::FSTORE_0, VERY_LOW, 1, 0),
    (Opcode::FSTORE_1, VERY_LOW, 1, 0),
    (Opcode::FSTORE_2, VERY_LOW, 1, 0),
    (Opcode::FSTORE_3, VERY_LOW, 1, 0),
    (Opcode::DSTORE_0, VERY_LOW, 1, 0),
    (Opcode::DSTORE_1, VERY_LOW, 1, 0),
    (Opcode::DSTORE_2, VERY_LOW, 1, 0),
    (Opcode::DSTORE_3, VERY_LOW, 1, 0),
    (Opcode::ASTORE_0, VERY_LOW, 1, 0),
    (Opcode::ASTORE_1, VERY_LOW, 1, 0),
    (Opcode::ASTORE_2, VERY_LOW, 1, 0),
    (Opcode::ASTORE_3, VERY_LOW, 1, 0),
    (Opcode::IASTORE, MID, 3, 0),
    (Opcode::LASTORE, MID, 3, 0),
    (Opcode::FASTORE, MID, 3, 0),
    (Opcode::DASTORE, MID, 3, 0),
    (Opcode::AASTORE, MID, 3, 0),
    (Opcode::BASTORE, MID, 3, 0),
    (Opcode::CASTORE, MID, 3, 0),
    (Opcode::SASTORE, MID, 3, 0),
    (Opcode::POP, BASE, 1, 0),
    (Opcode::POP2, BASE, 2, 0),
    (Opcode::DUP, VERY_LOW, 1, 2),
    (Opcode::DUP_X1, VERY_LOW, 2, 3),
    (Opcode::DUP_X2, VERY_LOW, 3, 4),
    (Opcode::DUP2, VERY_LOW, 2, 4),
    (Opcode::DUP2_X1, VERY_LOW, 3, 5),
    (Opcode::DUP2_X2, VERY_LOW, 4, 6),
    (Opcode::SWAP, VERY_LOW, 2, 2),
    (Opcode::IADD, VERY_LOW, 2, 1),
    (Opcode::LADD, VERY_LOW, 2, 1),
    (Opcode::FADD, VERY_LOW, 2, 1),
    (Opcode::DADD, VERY_LOW, 2, 1),
    (Opcode::ISUB, VERY_LOW, 2, 1),
    (Opcode::LSUB, VERY_LOW, 2, 1),
    (Opcode::FSUB, VERY_LOW, 2, 1),
    (Opcode::DSUB, VERY_LOW, 2, 1),
    (Opcode::IMUL, LOW, 2, 1),
    (Opcode::LMUL, LOW, 2, 1),
    (Opcode::FMUL, LOW, 2, 1),
    (Opcode::DMUL, LOW, 2, 1),
    (Opcode::IDIV, MID, 2, 1),
    (Opcode::LDIV, MID, 2, 1),
    (Opcode::FDIV, MID, 2, 1),
    (Opcode::DDIV, MID, 2, 1),
    (Opcode::IREM, MID, 2, 1),
    (Opcode::LREM, MID, 2, 1),
    (Opcode::FREM, MID, 2, 1),
    (Opcode::DREM, MID, 2, 1),
    (Opcode::INEG, VERY_LOW, 1, 1),
    (Opcode::LNEG, VERY_LOW, 1, 1),
    (Opcode::FNEG, VERY_LOW, 1, 1),
    (Opcode::DNEG, VERY_LOW, 1, 1),
    (Opcode::ISHL, VERY_LOW, 2, 1),
    (Opcode::LSHL, VERY_LOW, 2, 1),
    (Opcode::ISHR, VERY_LOW, 2, 1),
    (Opcode::LSHR, VERY_LOW, 2, 1),
    (Opcode::IUSHR, VERY_LOW, 2, 1),
    (Opcode::LUSHR, VERY_LOW, 2, 1),
    (Opcode::IAND, VERY_LOW, 2, 1),
    (Opcode::LAND, VERY_LOW, 2, 1),
    (Opcode::IOR, VERY_LOW, 2, 1),
    (Opcode::LOR, VERY_LOW, 2, 1),
    (Opcode::IXOR, VERY_LOW, 2, 1),
    (Opcode::LXOR, VERY_LOW, 2, 1),
    (Opcode::IINC, VERY_LOW, 0, 0),
    (Opcode::I2L, VERY_LOW, 1, 1),
    (Opcode::I2F, VERY_LOW, 1, 1),
    (Opcode::I2D, VERY_LOW, 1, 1),
    (Opcode::L2I, VERY_LOW, 1, 1),
    (Opcode::L2F, VERY_LOW, 1, 1),
    (Opcode::L2D, VERY_LOW, 1, 1),
    (Opcode::F2I, VERY_LOW, 1, 1),
    (Opcode::F2L, VERY_LOW, 1, 1),
    (Opcode::F2D, VERY_LOW, 1, 1),
    (Opcode::D2I, VERY_LOW, 1, 1),
    (Opcode::D2L, VERY_LOW, 1, 1),
    (Opcode::D2F, VERY_LOW, 1, 1),
    (Opcode::I2B, VERY_LOW, 1, 1),
    (Opcode::I2C, VERY_LOW, 1, 1),
    (Opcode::I2S, VERY_LOW, 1, 1),
    (Opcode::LCMP, VERY_LOW, 2, 1),
    (Opcode::FCMPL, VERY_LOW, 2, 1),
    (Opcode::FCMPG, VERY_LOW, 2, 1),
    (Opcode::DCMPL, VERY_LOW, 2, 1),
    (Opcode::DCMPG, VERY_LOW, 2, 1),
    (Opcode::IFEQ, MID, 1, 0),
    (Opcode::IFNE, MID, 1, 0),
    (Opcode::IFLT, MID, 1, 0),
    (Opcode::IFGE, MID, 1, 0),
    (Opcode::IFGT, MID, 1, 0),
    (Opcode::IFLE, MID, 1, 0),
    (Opcode::IF_ICMPEQ, MID, 2, 0),
    (Opcode::IF_ICMPNE, MID, 2, 0),
    (Opcode::IF_ICMPLT, MID, 2, 0),
    (Opcode::IF_ICMPGE, MID, 2, 0),
    (Opcode::IF_ICMPGT, MID, 2, 0),
    (Opcode::IF_ICMPLE, MID, 2, 0),
    (Opcode::IF_ACMPEQ, MID, 2, 0),
    (Opcode::IF_ACMPNE, MID, 2, 0),
    (Opcode::GOTO, MID, 0, 0),
    (Opcode::TABLESWITCH, HIGH, 1, 0),
    (Opcode::LOOKUPSWITCH, HIGH, 1, 0),
    (Opcode::IRETURN, VERY_LOW, 1, 0),
    (Opcode::LRETURN, VERY_LOW, 1, 0),
    (Opcode::FRETURN, VERY_LOW, 1, 0),
    (Opcode::DRETURN, VERY_LOW, 1, 0),
    (Opcode::ARETURN, VERY_LOW, 1, 0),
    (Opcode::RETURN, VERY_LOW, 0, 0),
    (Opcode::GETSTATIC, MID, 0, 1),
    (Opcode::PUTSTATIC, MID, 1, 0),
    (Opcode::GETFIELD, MID, 1, 1),
    (Opcode::PUTFIELD, MID, 2, 0),
    (Opcode::INVOKEVIRTUAL, HIGH, 1, 1),
    (Opcode::INVOKESPECIAL, HIGH, 1, 1),
    (Opcode::INVOKESTATIC, HIGH, 0, 1),
    (Opcode::INVOKEINTERFACE, HIGH, 1, 1),
    (Opcode::NEW, HIGH, 0, 1),
    (Opcode::NEWARRAY, HIGH, 1, 1),
    (Opcode::ANEWARRAY, HIGH, 1, 1),
    (Opcode::ARRAYLENGTH, BASE, 1, 1),
    (Opcode::ATHROW, HIGH, 1, 0),
    (Opcode::CHECKCAST, LOW, 1, 1),
    (Opcode::INSTANCEOF, LOW, 1, 1),
    (Opcode::MONITORENTER, LOW, 1, 0),
    (Opcode::MONITOREXIT, LOW, 1, 0),
    (Opcode::MULTIANEWARRAY, HIGH, 2, 1),
    (Opcode::IFNULL, MID, 1, 0),
    (Opcode::IFNONNULL, MID, 1, 0),
    (Opcode::GOTO_W, MID, 0, 0),
];
