//! CIL instructions emitted by the rewrite passes.
//!
//! Only the instructions the synthesizers need are modelled. Each variant carries its operand
//! in typed form; the short forms of argument, local and integer-literal instructions are chosen
//! when the instruction is formatted, so `Ldarg(1)` prints as `ldarg.1`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::{signatures::TypeSignature, token::Token};

/// A single CIL instruction with its operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "operand", rename_all = "snake_case")]
pub enum Instruction {
    /// Load argument onto the stack
    Ldarg(u16),
    /// Load argument address onto the stack
    Ldarga(u16),
    /// Load local variable onto the stack
    Ldloc(u16),
    /// Load local variable address onto the stack
    Ldloca(u16),
    /// Load instance field of the object on the stack
    Ldfld(Token),
    /// Load address of an instance field
    Ldflda(Token),
    /// Load static field
    Ldsfld(Token),
    /// Load address of a static field
    Ldsflda(Token),
    /// Store into an instance field
    Stfld(Token),
    /// Store into a static field
    Stsfld(Token),
    /// Push a 32-bit integer literal
    LdcI4(i32),
    /// Push a 32-bit float literal
    LdcR4(f32),
    /// Push a 64-bit float literal
    LdcR8(f64),
    /// Convert to `int64`
    ConvI8,
    /// Convert to native int
    ConvI,
    /// Zero-initialize the value type at the address on the stack
    Initobj(Token),
    /// Copy a value type from the source address to the destination address
    Cpobj(Token),
    /// Load a value of the given kind from the address on the stack
    Ldind(IndirectKind),
    /// Store a value of the given kind to the address below it on the stack
    Stind(IndirectKind),
    /// Push a null reference
    Ldnull,
    /// Return from method
    Ret,
}

/// Element kind of an indirect load or store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndirectKind {
    /// `int8`, also used for `bool` stores
    I1,
    /// `unsigned int8` and `bool`
    U1,
    /// `int16`
    I2,
    /// `unsigned int16` and `char`
    U2,
    /// `int32`
    I4,
    /// `unsigned int32`
    U4,
    /// `int64` and `unsigned int64`
    I8,
    /// `float32`
    R4,
    /// `float64`
    R8,
    /// native int and native unsigned int
    I,
    /// Object reference
    Ref,
}

impl IndirectKind {
    /// Kind used to copy a value of type `signature` through a pointer.
    ///
    /// Defined value types, generic parameters and composite signatures have no indirect
    /// kind; they are copied with `cpobj` or not at all.
    #[must_use]
    pub fn of(signature: &TypeSignature) -> Option<Self> {
        let kind = match signature {
            TypeSignature::Boolean | TypeSignature::U1 => IndirectKind::U1,
            TypeSignature::I1 => IndirectKind::I1,
            TypeSignature::Char | TypeSignature::U2 => IndirectKind::U2,
            TypeSignature::I2 => IndirectKind::I2,
            TypeSignature::I4 => IndirectKind::I4,
            TypeSignature::U4 => IndirectKind::U4,
            TypeSignature::I8 | TypeSignature::U8 => IndirectKind::I8,
            TypeSignature::R4 => IndirectKind::R4,
            TypeSignature::R8 => IndirectKind::R8,
            TypeSignature::I | TypeSignature::U => IndirectKind::I,
            TypeSignature::String | TypeSignature::Object => IndirectKind::Ref,
            _ => return None,
        };
        Some(kind)
    }

    fn load_mnemonic(self) -> &'static str {
        match self {
            IndirectKind::I1 => "ldind.i1",
            IndirectKind::U1 => "ldind.u1",
            IndirectKind::I2 => "ldind.i2",
            IndirectKind::U2 => "ldind.u2",
            IndirectKind::I4 => "ldind.i4",
            IndirectKind::U4 => "ldind.u4",
            IndirectKind::I8 => "ldind.i8",
            IndirectKind::R4 => "ldind.r4",
            IndirectKind::R8 => "ldind.r8",
            IndirectKind::I => "ldind.i",
            IndirectKind::Ref => "ldind.ref",
        }
    }

    // Stores have no unsigned forms
    fn store_mnemonic(self) -> &'static str {
        match self {
            IndirectKind::I1 | IndirectKind::U1 => "stind.i1",
            IndirectKind::I2 | IndirectKind::U2 => "stind.i2",
            IndirectKind::I4 | IndirectKind::U4 => "stind.i4",
            IndirectKind::I8 => "stind.i8",
            IndirectKind::R4 => "stind.r4",
            IndirectKind::R8 => "stind.r8",
            IndirectKind::I => "stind.i",
            IndirectKind::Ref => "stind.ref",
        }
    }
}

/// How an instruction affects the evaluation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackBehavior {
    /// Number of items popped from the stack
    pub pops: u8,
    /// Number of items pushed onto the stack
    pub pushes: u8,
}

impl Instruction {
    /// Stack effect of this instruction.
    ///
    /// `ret` is reported as neutral; whether it consumes a value depends on the method's
    /// signature, which [`crate::assembly::MethodBodyBuilder`] checks separately.
    #[must_use]
    pub fn stack_behavior(&self) -> StackBehavior {
        let (pops, pushes) = match self {
            Instruction::Ldarg(_)
            | Instruction::Ldarga(_)
            | Instruction::Ldloc(_)
            | Instruction::Ldloca(_)
            | Instruction::Ldsfld(_)
            | Instruction::Ldsflda(_)
            | Instruction::LdcI4(_)
            | Instruction::LdcR4(_)
            | Instruction::LdcR8(_)
            | Instruction::Ldnull => (0, 1),
            Instruction::Ldfld(_)
            | Instruction::Ldflda(_)
            | Instruction::ConvI8
            | Instruction::ConvI
            | Instruction::Ldind(_) => (1, 1),
            Instruction::Stsfld(_) | Instruction::Initobj(_) => (1, 0),
            Instruction::Stfld(_) | Instruction::Cpobj(_) | Instruction::Stind(_) => (2, 0),
            Instruction::Ret => (0, 0),
        };
        StackBehavior { pops, pushes }
    }

    /// True for instructions that end the method
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Instruction::Ret)
    }

    /// Metadata token operand, if any
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match self {
            Instruction::Ldfld(token)
            | Instruction::Ldflda(token)
            | Instruction::Ldsfld(token)
            | Instruction::Ldsflda(token)
            | Instruction::Stfld(token)
            | Instruction::Stsfld(token)
            | Instruction::Initobj(token)
            | Instruction::Cpobj(token) => Some(*token),
            _ => None,
        }
    }

    /// Human-readable mnemonic, choosing the short form where one exists
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Ldarg(0) => "ldarg.0",
            Instruction::Ldarg(1) => "ldarg.1",
            Instruction::Ldarg(2) => "ldarg.2",
            Instruction::Ldarg(3) => "ldarg.3",
            Instruction::Ldarg(index) if *index <= 0xFF => "ldarg.s",
            Instruction::Ldarg(_) => "ldarg",
            Instruction::Ldarga(index) if *index <= 0xFF => "ldarga.s",
            Instruction::Ldarga(_) => "ldarga",
            Instruction::Ldloc(0) => "ldloc.0",
            Instruction::Ldloc(1) => "ldloc.1",
            Instruction::Ldloc(2) => "ldloc.2",
            Instruction::Ldloc(3) => "ldloc.3",
            Instruction::Ldloc(index) if *index <= 0xFF => "ldloc.s",
            Instruction::Ldloc(_) => "ldloc",
            Instruction::Ldloca(index) if *index <= 0xFF => "ldloca.s",
            Instruction::Ldloca(_) => "ldloca",
            Instruction::Ldfld(_) => "ldfld",
            Instruction::Ldflda(_) => "ldflda",
            Instruction::Ldsfld(_) => "ldsfld",
            Instruction::Ldsflda(_) => "ldsflda",
            Instruction::Stfld(_) => "stfld",
            Instruction::Stsfld(_) => "stsfld",
            Instruction::LdcI4(-1) => "ldc.i4.m1",
            Instruction::LdcI4(0) => "ldc.i4.0",
            Instruction::LdcI4(1) => "ldc.i4.1",
            Instruction::LdcI4(2) => "ldc.i4.2",
            Instruction::LdcI4(3) => "ldc.i4.3",
            Instruction::LdcI4(4) => "ldc.i4.4",
            Instruction::LdcI4(5) => "ldc.i4.5",
            Instruction::LdcI4(6) => "ldc.i4.6",
            Instruction::LdcI4(7) => "ldc.i4.7",
            Instruction::LdcI4(8) => "ldc.i4.8",
            Instruction::LdcI4(value) if i8::try_from(*value).is_ok() => "ldc.i4.s",
            Instruction::LdcI4(_) => "ldc.i4",
            Instruction::LdcR4(_) => "ldc.r4",
            Instruction::LdcR8(_) => "ldc.r8",
            Instruction::ConvI8 => "conv.i8",
            Instruction::ConvI => "conv.i",
            Instruction::Initobj(_) => "initobj",
            Instruction::Cpobj(_) => "cpobj",
            Instruction::Ldind(kind) => kind.load_mnemonic(),
            Instruction::Stind(kind) => kind.store_mnemonic(),
            Instruction::Ldnull => "ldnull",
            Instruction::Ret => "ret",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.mnemonic();
        match self {
            Instruction::Ldarg(index)
            | Instruction::Ldarga(index)
            | Instruction::Ldloc(index)
            | Instruction::Ldloca(index)
                if mnemonic.contains(".s") || !mnemonic.contains('.') =>
            {
                write!(f, "{mnemonic} {index}")
            }
            Instruction::LdcI4(value) if matches!(mnemonic, "ldc.i4.s" | "ldc.i4") => {
                write!(f, "{mnemonic} {value}")
            }
            Instruction::LdcR4(value) => write!(f, "{mnemonic} {value:?}"),
            Instruction::LdcR8(value) => write!(f, "{mnemonic} {value:?}"),
            _ => match self.token() {
                Some(token) => write!(f, "{mnemonic} {token}"),
                None => f.write_str(mnemonic),
            },
        }
    }
}
