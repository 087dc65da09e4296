//! The instruction model consumed and produced by the instrumentation pass.
//!
//! Method bodies arrive from the instruction-stream reader as an ordered list of
//! [`Instruction`]s. Labels are pseudo-instructions marking merge targets; they carry no cost and
//! are preserved in place so that jumps keep landing on them.

use core::fmt;

use serde::{Deserialize, Serialize};

mod opcode;
pub use opcode::*;

/// A merge target inside a method body.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A type descriptor in internal form, e.g. `java/lang/String` or `[[I`.
#[derive(
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
pub struct TypeDescriptor(pub String);

impl From<&str> for TypeDescriptor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A reference to a field or method of a class.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    /// Internal name of the declaring class.
    pub owner: String,
    /// Simple name of the member.
    pub name: String,
    /// Field or method descriptor.
    pub descriptor: String,
}

impl MemberRef {
    /// Creates a new member reference.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self { owner: owner.into(), name: name.into(), descriptor: descriptor.into() }
    }
}

/// A constant pushed by `LDC`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    /// A 32-bit integer.
    Int(i32),
    /// A 64-bit integer.
    Long(i64),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A string literal.
    String(String),
    /// A class literal.
    Type(TypeDescriptor),
}

impl Constant {
    /// Whether the constant occupies two stack words.
    pub const fn is_wide(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_))
    }
}

/// Calls into the sandbox runtime that only the instrumentation pass emits.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeCall {
    /// Pops a `long` cost and charges it against the remaining energy, raising any latched
    /// forced exit first.
    ChargeEnergy,
    /// Pops an `int` length and a type descriptor; pushes a new one-dimensional object array.
    NewObjectArray,
    /// Pops `dimensions` `int` lengths and a type descriptor; pushes a new multi-dimensional
    /// array.
    NewMultiArray {
        /// Number of dimensions being allocated.
        dimensions: u8,
    },
}

/// A single instruction of a method body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// An instruction without operands.
    Simple(Opcode),
    /// `BIPUSH`, `SIPUSH` and `NEWARRAY`.
    IntOperand {
        /// The opcode.
        opcode: Opcode,
        /// The immediate operand.
        operand: i32,
    },
    /// Local variable loads and stores, and `RET`.
    Var {
        /// The opcode.
        opcode: Opcode,
        /// The local variable index.
        index: u16,
    },
    /// `IINC`.
    Iinc {
        /// The local variable index.
        index: u16,
        /// The signed increment.
        increment: i16,
    },
    /// `LDC` family.
    Ldc(Constant),
    /// Conditional and unconditional jumps.
    Jump {
        /// The opcode.
        opcode: Opcode,
        /// The jump target.
        target: Label,
    },
    /// `TABLESWITCH`.
    TableSwitch {
        /// The lowest key.
        min: i32,
        /// The highest key.
        max: i32,
        /// The default target.
        default: Label,
        /// Targets for keys `min..=max`.
        targets: Vec<Label>,
    },
    /// `LOOKUPSWITCH`.
    LookupSwitch {
        /// The default target.
        default: Label,
        /// The sorted keys.
        keys: Vec<i32>,
        /// One target per key.
        targets: Vec<Label>,
    },
    /// `NEW`, `ANEWARRAY`, `CHECKCAST` and `INSTANCEOF`.
    Type {
        /// The opcode.
        opcode: Opcode,
        /// The type operand.
        descriptor: TypeDescriptor,
    },
    /// Field access.
    Field {
        /// The opcode.
        opcode: Opcode,
        /// The accessed field.
        field: MemberRef,
    },
    /// Method invocation.
    Invoke {
        /// The opcode.
        opcode: Opcode,
        /// The invoked method.
        method: MemberRef,
        /// Whether the owner is an interface.
        interface: bool,
    },
    /// A dynamically resolved call site. These are rejected before instrumentation.
    InvokeDynamic {
        /// The call site name.
        name: String,
        /// The call site descriptor.
        descriptor: String,
    },
    /// `MULTIANEWARRAY`.
    MultiANewArray {
        /// The array type.
        descriptor: TypeDescriptor,
        /// The number of dimensions to allocate.
        dimensions: u8,
    },
    /// A merge target.
    Label(Label),
    /// A call into the sandbox runtime inserted by the instrumentation pass.
    Runtime(RuntimeCall),
}

impl Instruction {
    /// Creates an instruction without operands.
    pub const fn simple(opcode: Opcode) -> Self {
        Self::Simple(opcode)
    }

    /// Creates a jump to `target`.
    pub const fn jump(opcode: Opcode, target: Label) -> Self {
        Self::Jump { opcode, target }
    }

    /// Creates a local variable access.
    pub const fn var(opcode: Opcode, index: u16) -> Self {
        Self::Var { opcode, index }
    }

    /// Creates a `NEW` of the given type.
    pub fn new_object(descriptor: impl Into<TypeDescriptor>) -> Self {
        Self::Type { opcode: Opcode::NEW, descriptor: descriptor.into() }
    }

    /// Returns the opcode of the instruction, or `None` for labels and runtime calls.
    pub const fn opcode(&self) -> Option<Opcode> {
        match self {
            Self::Simple(opcode) |
            Self::IntOperand { opcode, .. } |
            Self::Var { opcode, .. } |
            Self::Jump { opcode, .. } |
            Self::Type { opcode, .. } |
            Self::Field { opcode, .. } |
            Self::Invoke { opcode, .. } => Some(*opcode),
            Self::Iinc { .. } => Some(Opcode::IINC),
            Self::Ldc(constant) => {
                if constant.is_wide() {
                    Some(Opcode::LDC2_W)
                } else {
                    Some(Opcode::LDC)
                }
            }
            Self::TableSwitch { .. } => Some(Opcode::TABLESWITCH),
            Self::LookupSwitch { .. } => Some(Opcode::LOOKUPSWITCH),
            Self::InvokeDynamic { .. } => Some(Opcode::INVOKEDYNAMIC),
            Self::MultiANewArray { .. } => Some(Opcode::MULTIANEWARRAY),
            Self::Label(_) | Self::Runtime(_) => None,
        }
    }

    /// The operand shape of the variant, or `None` for labels and runtime calls.
    pub const fn operand_kind(&self) -> Option<OperandKind> {
        let kind = match self {
            Self::Simple(_) => OperandKind::None,
            Self::IntOperand { .. } => OperandKind::Int,
            Self::Var { .. } => OperandKind::Var,
            Self::Iinc { .. } => OperandKind::Iinc,
            Self::Ldc(_) => OperandKind::Constant,
            Self::Jump { .. } => OperandKind::Jump,
            Self::TableSwitch { .. } => OperandKind::TableSwitch,
            Self::LookupSwitch { .. } => OperandKind::LookupSwitch,
            Self::Type { .. } => OperandKind::Type,
            Self::Field { .. } => OperandKind::Field,
            Self::Invoke { .. } => OperandKind::Invoke,
            Self::InvokeDynamic { .. } => OperandKind::InvokeDynamic,
            Self::MultiANewArray { .. } => OperandKind::MultiArray,
            Self::Label(_) | Self::Runtime(_) => return None,
        };
        Some(kind)
    }

    /// Whether the operands carried by the variant are the ones its opcode requires, e.g. an
    /// `ANEWARRAY` that names its element type.
    pub const fn is_well_formed(&self) -> bool {
        match (self.opcode(), self.operand_kind()) {
            (Some(opcode), Some(kind)) => opcode.operand_kind() as u8 == kind as u8,
            _ => true,
        }
    }

    /// A short human readable name for diagnostics.
    pub fn mnemonic(&self) -> String {
        match self {
            Self::Label(label) => label.to_string(),
            Self::Runtime(call) => format!("runtime::{call:?}"),
            _ => self.opcode().map(|opcode| opcode.mnemonic().to_string()).unwrap_or_default(),
        }
    }

    /// Whether the instruction is a label.
    pub const fn is_label(&self) -> bool {
        matches!(self, Self::Label(_))
    }

    /// Whether the instruction is executed, i.e. it is not a label.
    pub const fn is_executable(&self) -> bool {
        !self.is_label()
    }

    /// Whether control leaves the current basic block after this instruction.
    pub fn ends_block(&self) -> bool {
        self.opcode().is_some_and(Opcode::ends_block)
    }

    /// Returns the allocated type if the instruction constructs a new object.
    pub const fn allocation_marker(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Type { opcode: Opcode::NEW, descriptor } => Some(descriptor),
            _ => None,
        }
    }
}

impl From<Opcode> for Instruction {
    fn from(opcode: Opcode) -> Self {
        Self::Simple(opcode)
    }
}

impl From<Label> for Instruction {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

/// A method body as produced by the instruction-stream reader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodBody {
    /// The instructions in program order.
    pub instructions: Vec<Instruction>,
    /// The maximum operand stack depth of the method.
    pub max_stack: u16,
    /// The number of local variable slots of the method.
    pub max_locals: u16,
}

impl MethodBody {
    /// Creates a new method body.
    pub const fn new(instructions: Vec<Instruction>, max_stack: u16, max_locals: u16) -> Self {
        Self { instructions, max_stack, max_locals }
    }

    /// The number of words charged to the stack watchdog for one activation of this method,
    /// including the instrumentation bookkeeping local.
    pub const fn frame_size(&self) -> u64 {
        self.max_stack as u64 +
            self.max_locals as u64 +
            crate::constants::watchdog::FRAME_BOOKKEEPING_WORDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ldc_width_selects_opcode() {
        assert_eq!(Instruction::Ldc(Constant::Int(1)).opcode(), Some(Opcode::LDC));
        assert_eq!(Instruction::Ldc(Constant::Double(1.0)).opcode(), Some(Opcode::LDC2_W));
        assert_eq!(Instruction::Label(Label(0)).opcode(), None);
        assert_eq!(Instruction::Runtime(RuntimeCall::ChargeEnergy).opcode(), None);
    }

    #[test]
    fn test_allocation_marker() {
        let new = Instruction::new_object("java/lang/Object");
        assert_eq!(new.allocation_marker(), Some(&TypeDescriptor::from("java/lang/Object")));
        let anew =
            Instruction::Type { opcode: Opcode::ANEWARRAY, descriptor: "java/lang/Object".into() };
        assert_eq!(anew.allocation_marker(), None);
    }

    #[test]
    fn test_operands_must_match_opcode() {
        assert!(Instruction::new_object("a/A").is_well_formed());
        assert!(Instruction::var(Opcode::ILOAD, 2).is_well_formed());
        assert!(Instruction::Label(Label(0)).is_well_formed());
        assert!(!Instruction::Simple(Opcode::ANEWARRAY).is_well_formed());
        assert!(!Instruction::Simple(Opcode::MULTIANEWARRAY).is_well_formed());
        assert!(!Instruction::var(Opcode::IADD, 0).is_well_formed());
        assert!(!Instruction::Type { opcode: Opcode::IADD, descriptor: "a/A".into() }
            .is_well_formed());
        let invoke = Instruction::Invoke {
            opcode: Opcode::INVOKEDYNAMIC,
            method: MemberRef::new("a/A", "run", "()V"),
            interface: false,
        };
        assert!(!invoke.is_well_formed());
    }

    #[test]
    fn test_frame_size_reserves_bookkeeping_word() {
        let body = MethodBody::new(vec![Opcode::RETURN.into()], 4, 3);
        assert_eq!(body.frame_size(), 8);
    }
}
