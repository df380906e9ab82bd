//! Method bodies and their builder.

use serde::{Deserialize, Serialize};

use crate::{
    assembly::{Instruction, InstructionAssembler},
    metadata::signatures::TypeSignature,
    Error, Result,
};

/// Type alias for method body implementation closures
type ImplementationFn = Box<dyn FnOnce(&mut InstructionAssembler) -> Result<()>>;

/// A method implementation: locals plus an instruction sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodBody {
    /// Maximum evaluation stack depth
    pub max_stack: u16,
    /// Zero-initialize all locals on entry (`localsinit`)
    pub init_locals: bool,
    /// Local variable types, addressed by index
    #[serde(default)]
    pub locals: Vec<TypeSignature>,
    /// The instruction stream
    pub instructions: Vec<Instruction>,
}

/// Builder for creating method body implementations.
///
/// Wraps an [`InstructionAssembler`] and adds local variable management and a check that the
/// stack holds exactly the return value (or nothing, for `void` methods) when `ret` executes.
///
/// ```rust
/// use retarget::assembly::MethodBodyBuilder;
/// use retarget::metadata::{signatures::TypeSignature, token::Token};
///
/// let body = MethodBodyBuilder::new()
///     .returns_value(true)
///     .local(TypeSignature::ValueType(Token::new(0x01000002)))
///     .implementation(|asm| {
///         asm.ldloc(0)?.ret()?;
///         Ok(())
///     })
///     .build()?;
/// assert_eq!(body.max_stack, 1);
/// assert!(body.init_locals);
/// # Ok::<(), retarget::Error>(())
/// ```
pub struct MethodBodyBuilder {
    /// Initialize locals to zero
    init_locals: bool,

    /// Local variable definitions
    locals: Vec<TypeSignature>,

    /// Whether `ret` must find a value on the stack
    returns_value: bool,

    /// The implementation closure
    implementation: Option<ImplementationFn>,
}

impl Default for MethodBodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodBodyBuilder {
    /// Create a new method body builder for a `void` method.
    #[must_use]
    pub fn new() -> Self {
        Self {
            init_locals: true,
            locals: Vec::new(),
            returns_value: false,
            implementation: None,
        }
    }

    /// Declare whether the method returns a value.
    #[must_use]
    pub fn returns_value(mut self, returns_value: bool) -> Self {
        self.returns_value = returns_value;
        self
    }

    /// Set whether local variables are zero-initialized.
    #[must_use]
    pub fn init_locals(mut self, init: bool) -> Self {
        self.init_locals = init;
        self
    }

    /// Add a local variable; locals are numbered in the order they are added.
    #[must_use]
    pub fn local(mut self, signature: TypeSignature) -> Self {
        self.locals.push(signature);
        self
    }

    /// Set the implementation closure that emits the instructions.
    #[must_use]
    pub fn implementation<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut InstructionAssembler) -> Result<()> + 'static,
    {
        self.implementation = Some(Box::new(f));
        self
    }

    /// Build the method body.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBody`] if no implementation was provided, the implementation
    /// fails, a local index is out of range, or `ret` does not see exactly the expected number
    /// of values on the stack.
    pub fn build(self) -> Result<MethodBody> {
        let implementation = self
            .implementation
            .ok_or_else(|| Error::InvalidBody("no implementation provided".to_string()))?;

        let mut asm = InstructionAssembler::new();
        implementation(&mut asm)?;

        let expected = u16::from(self.returns_value);
        if asm.current_stack_depth() != expected {
            return Err(Error::InvalidBody(format!(
                "'ret' reached with stack depth {}, expected {expected}",
                asm.current_stack_depth()
            )));
        }

        let (instructions, max_stack) = asm.finish()?;

        let local_count = self.locals.len();
        if let Some(bad) = instructions.iter().find(|i| match i {
            Instruction::Ldloc(index) | Instruction::Ldloca(index) => {
                usize::from(*index) >= local_count
            }
            _ => false,
        }) {
            return Err(Error::InvalidBody(format!(
                "'{bad}' addresses a local beyond the {local_count} declared"
            )));
        }

        Ok(MethodBody {
            max_stack,
            init_locals: self.init_locals,
            locals: self.locals,
            instructions,
        })
    }
}
