//! Module retargeting.
//!
//! Three passes move a module compiled against a monolithic engine library onto a split set of
//! libraries and make it loadable without the host runtime:
//!
//! - [`TypeRefRemapper`] points type references at the library that now hosts each type,
//!   according to a [`MappingTable`]
//! - [`AccessorSynthesizer`] turns getter/setter native-interop stubs into field-backed
//!   accessors
//! - [`StubSynthesizer`] gives every other stub a body returning a zero value
//!
//! [`Retargeter`] runs them over modules and files according to a [`RetargetConfig`].
//!
//! ```rust,no_run
//! use retarget::prelude::*;
//!
//! let retargeter = Retargeter::new(
//!     RetargetConfig::default(),
//!     MappingTable::builtin()?,
//!     Box::new(ImageStore::new()),
//! );
//! let summary = retargeter.run(&[FileJob::new("in/Game.dll", "out/Game.dll")]);
//! println!("{} processed, {} errors", summary.processed, summary.errors);
//! # Ok::<(), retarget::Error>(())
//! ```

mod accessors;
mod config;
mod engine;
mod mapping;
mod remapper;
mod report;
mod stubs;

pub use accessors::AccessorSynthesizer;
pub use config::RetargetConfig;
pub use engine::{Retargeter, TARGET_FRAMEWORK_CTOR};
pub use mapping::MappingTable;
pub use remapper::TypeRefRemapper;
pub use report::{
    AccessorReport, AccessorShape, FileJob, FileOutcome, ModuleReport, RunSummary, StubBody,
    StubReport,
};
pub use stubs::StubSynthesizer;
