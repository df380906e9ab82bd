//! Results of retargeting modules and files.

use std::path::PathBuf;

use serde::Serialize;

use crate::metadata::{signatures::ReturnCategory, token::Token};

/// Which accessor convention a synthesized pair follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorShape {
    /// `T GetX()` with `void SetX(T)`
    ValueReturning,
    /// `void GetX(out T)` with `void SetX(T)`
    OutParameter,
}

/// One synthesized getter/setter pair and its backing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessorReport {
    /// Full name of the declaring type
    pub declaring_type: String,
    /// Getter name
    pub getter: String,
    /// Setter name
    pub setter: String,
    /// Name of the synthesized backing field
    pub field: String,
    /// Token of the synthesized backing field
    pub field_token: Token,
    /// Pairing convention
    pub shape: AccessorShape,
    /// True for static pairs
    pub is_static: bool,
}

/// The kind of dummy body a stub received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "category")]
pub enum StubBody {
    /// A zero value matching the return category
    Zero(ReturnCategory),
    /// The return type has no direct zero rule; a zero-initialized local of the exact return
    /// type is returned instead
    BestEffort,
}

/// One residual stub that received a dummy body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StubReport {
    /// Full name of the declaring type
    pub declaring_type: String,
    /// Method name
    pub method: String,
    /// Method token
    pub token: Token,
    /// What was emitted
    pub body: StubBody,
}

/// Everything that changed in one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleReport {
    /// Module name
    pub module: String,
    /// Type references whose scope was replaced
    pub remapped_type_refs: usize,
    /// Security attribute type references whose scope was replaced
    pub remapped_security_refs: usize,
    /// Source-library types that have no mapping entry
    pub unmapped: Vec<String>,
    /// `AssemblyRef` rows appended for new target libraries
    pub added_assembly_refs: usize,
    /// True if the target-framework attribute was removed
    pub stripped_target_framework: bool,
    /// Synthesized accessor pairs
    pub accessors: Vec<AccessorReport>,
    /// Residual stubs given dummy bodies
    pub stubs: Vec<StubReport>,
}

impl ModuleReport {
    /// Total number of type references patched
    #[must_use]
    pub fn total_remapped(&self) -> usize {
        self.remapped_type_refs + self.remapped_security_refs
    }
}

/// Input and output path of one file to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileJob {
    /// Module to read
    pub input: PathBuf,
    /// Destination of the rewritten module
    pub output: PathBuf,
}

impl FileJob {
    /// Create a job
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum FileOutcome {
    /// The module was rewritten (and written unless dry-run)
    Processed {
        /// Rewrite details
        report: ModuleReport,
        /// False in dry-run mode
        written: bool,
    },
    /// The file is not a module the store understands
    NotAModule,
    /// The module does not reference the source library
    NoSourceReference,
}

/// Counters of a whole run, with the reports of the rewritten modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Modules rewritten
    pub processed: usize,
    /// Files that failed
    pub errors: usize,
    /// Files skipped without error
    pub skipped: usize,
    /// Reports of the rewritten modules, ordered by module name
    pub modules: Vec<ModuleReport>,
}
