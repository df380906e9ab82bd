//! # retarget Prelude
//!
//! The types needed to load a module, retarget it and write it back.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all retarget operations
pub use crate::Error;

/// The result type used throughout retarget
pub use crate::Result;

// ================================================================================================
// Metadata Model
// ================================================================================================

pub use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion},
    module::Module,
    signatures::{ReturnCategory, SignatureMethod, SignatureParameter, TypeSignature},
    token::{TableId, Token},
    typesystem::{FieldDef, MethodDef, ResolutionScope, TypeDef, TypeRef},
};

// ================================================================================================
// Body Construction
// ================================================================================================

pub use crate::assembly::{
    IndirectKind, Instruction, InstructionAssembler, MethodBody, MethodBodyBuilder,
};

// ================================================================================================
// Loading and Saving
// ================================================================================================

pub use crate::store::{ImageStore, ModuleStore, WriteOptions};

// ================================================================================================
// Retargeting
// ================================================================================================

pub use crate::retarget::{
    FileJob, FileOutcome, MappingTable, ModuleReport, RetargetConfig, Retargeter, RunSummary,
    StubBody,
};
