//! CIL instruction model and body construction.
//!
//! - [`Instruction`] - typed instructions with their stack effects
//! - [`InstructionAssembler`] - fluent emission with evaluation stack tracking
//! - [`MethodBodyBuilder`] / [`MethodBody`] - locals plus a validated instruction sequence

mod assembler;
mod body;
mod instruction;

pub use assembler::InstructionAssembler;
pub use body::{MethodBody, MethodBodyBuilder};
pub use instruction::{IndirectKind, Instruction, StackBehavior};
