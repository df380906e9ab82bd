//! Fluent instruction assembly with stack tracking.
//!
//! [`InstructionAssembler`] records instructions while simulating the evaluation stack, so an
//! instruction that would pop from an empty stack is rejected at the point it is emitted and
//! the maximum depth is known once assembly finishes.
//!
//! ```rust
//! use retarget::assembly::InstructionAssembler;
//! use retarget::metadata::token::Token;
//!
//! let mut asm = InstructionAssembler::new();
//! asm.ldarg_0()?.ldfld(Token::new(0x04000001))?.ret()?;
//! let (instructions, max_stack) = asm.finish()?;
//! assert_eq!(instructions.len(), 3);
//! assert_eq!(max_stack, 1);
//! # Ok::<(), retarget::Error>(())
//! ```

use crate::{
    assembly::{IndirectKind, Instruction},
    metadata::token::Token,
    Error, Result,
};

/// High-level builder for instruction sequences.
#[derive(Debug, Default)]
pub struct InstructionAssembler {
    instructions: Vec<Instruction>,
    depth: u16,
    max_depth: u16,
}

impl InstructionAssembler {
    /// Create an empty assembler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an arbitrary instruction, applying its stack effect.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBody`] if the instruction pops more values than the stack holds
    /// or follows a terminal instruction.
    pub fn emit(&mut self, instruction: Instruction) -> Result<&mut Self> {
        if self.instructions.last().is_some_and(Instruction::is_terminal) {
            return Err(Error::InvalidBody(format!(
                "'{instruction}' emitted after the method already returned"
            )));
        }

        let behavior = instruction.stack_behavior();
        let pops = u16::from(behavior.pops);
        if pops > self.depth {
            return Err(Error::InvalidBody(format!(
                "'{instruction}' pops {pops} value(s) with stack depth {}",
                self.depth
            )));
        }

        self.depth = self.depth - pops + u16::from(behavior.pushes);
        self.max_depth = self.max_depth.max(self.depth);
        self.instructions.push(instruction);
        Ok(self)
    }

    /// `ldarg.0`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldarg_0(&mut self) -> Result<&mut Self> {
        self.emit(Instruction::Ldarg(0))
    }

    /// Load argument `index`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldarg(&mut self, index: u16) -> Result<&mut Self> {
        self.emit(Instruction::Ldarg(index))
    }

    /// Load the address of argument `index`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldarga(&mut self, index: u16) -> Result<&mut Self> {
        self.emit(Instruction::Ldarga(index))
    }

    /// Load local `index`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldloc(&mut self, index: u16) -> Result<&mut Self> {
        self.emit(Instruction::Ldloc(index))
    }

    /// Load the address of local `index`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldloca(&mut self, index: u16) -> Result<&mut Self> {
        self.emit(Instruction::Ldloca(index))
    }

    /// `ldfld`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldfld(&mut self, field: Token) -> Result<&mut Self> {
        self.emit(Instruction::Ldfld(field))
    }

    /// `ldflda`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldflda(&mut self, field: Token) -> Result<&mut Self> {
        self.emit(Instruction::Ldflda(field))
    }

    /// `ldsfld`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldsfld(&mut self, field: Token) -> Result<&mut Self> {
        self.emit(Instruction::Ldsfld(field))
    }

    /// `ldsflda`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldsflda(&mut self, field: Token) -> Result<&mut Self> {
        self.emit(Instruction::Ldsflda(field))
    }

    /// `stfld`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn stfld(&mut self, field: Token) -> Result<&mut Self> {
        self.emit(Instruction::Stfld(field))
    }

    /// `stsfld`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn stsfld(&mut self, field: Token) -> Result<&mut Self> {
        self.emit(Instruction::Stsfld(field))
    }

    /// Push a 32-bit integer literal
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldc_i4(&mut self, value: i32) -> Result<&mut Self> {
        self.emit(Instruction::LdcI4(value))
    }

    /// Push a 32-bit float literal
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldc_r4(&mut self, value: f32) -> Result<&mut Self> {
        self.emit(Instruction::LdcR4(value))
    }

    /// Push a 64-bit float literal
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldc_r8(&mut self, value: f64) -> Result<&mut Self> {
        self.emit(Instruction::LdcR8(value))
    }

    /// `conv.i8`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn conv_i8(&mut self) -> Result<&mut Self> {
        self.emit(Instruction::ConvI8)
    }

    /// `conv.i`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn conv_i(&mut self) -> Result<&mut Self> {
        self.emit(Instruction::ConvI)
    }

    /// `initobj`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn initobj(&mut self, value_type: Token) -> Result<&mut Self> {
        self.emit(Instruction::Initobj(value_type))
    }

    /// `cpobj`; expects the destination address below the source address
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn cpobj(&mut self, value_type: Token) -> Result<&mut Self> {
        self.emit(Instruction::Cpobj(value_type))
    }

    /// `ldind.*`; replaces the address on the stack with the value it points to
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldind(&mut self, kind: IndirectKind) -> Result<&mut Self> {
        self.emit(Instruction::Ldind(kind))
    }

    /// `stind.*`; expects the address below the value
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn stind(&mut self, kind: IndirectKind) -> Result<&mut Self> {
        self.emit(Instruction::Stind(kind))
    }

    /// `ldnull`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ldnull(&mut self) -> Result<&mut Self> {
        self.emit(Instruction::Ldnull)
    }

    /// `ret`
    ///
    /// # Errors
    /// See [`Self::emit`].
    pub fn ret(&mut self) -> Result<&mut Self> {
        self.emit(Instruction::Ret)
    }

    /// Current simulated stack depth
    #[must_use]
    pub fn current_stack_depth(&self) -> u16 {
        self.depth
    }

    /// Maximum stack depth reached so far
    #[must_use]
    pub fn max_stack_depth(&self) -> u16 {
        self.max_depth
    }

    /// Finish assembly, returning the instructions and the maximum stack depth.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBody`] if the sequence is empty or does not end with `ret`.
    pub fn finish(self) -> Result<(Vec<Instruction>, u16)> {
        match self.instructions.last() {
            Some(last) if last.is_terminal() => Ok((self.instructions, self.max_depth)),
            Some(last) => Err(Error::InvalidBody(format!(
                "body ends with '{last}' instead of 'ret'"
            ))),
            None => Err(Error::InvalidBody("empty instruction sequence".to_string())),
        }
    }
}
