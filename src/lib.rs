// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # retarget
//!
//! Retargets compiled .NET modules from one engine ABI surface to another by rewriting their
//! metadata and method bodies in place.
//!
//! A module built against a monolithic engine library (such as `UnityEngine.dll`) references
//! every engine type through that one library and implements much of its API as native-interop
//! stubs (`InternalCall` methods without a body). Retargeting
//!
//! - points each type reference at the library that hosts the type after the split, using a
//!   static [`retarget::MappingTable`]
//! - removes the `TargetFrameworkAttribute`
//! - turns getter/setter stub pairs into field-backed accessors
//! - gives every other stub a body that returns a zero value of its return type
//!
//! so the module loads and runs, with inert engine calls, outside the engine's runtime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retarget::prelude::*;
//! use std::path::Path;
//!
//! let store = ImageStore::new();
//! let mut module = store.load(Path::new("Assembly-CSharp.dll"))?;
//!
//! let retargeter = Retargeter::new(
//!     RetargetConfig::default(),
//!     MappingTable::builtin()?,
//!     Box::new(store),
//! );
//! if let Some(report) = retargeter.process_module(&mut module)? {
//!     println!("{} accessor pairs synthesized", report.accessors.len());
//! }
//! # Ok::<(), retarget::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - the module model: tokens, identities, signatures, types and members
//! - [`assembly`] - instruction model and stack-checked body construction
//! - [`store`] - loading and saving modules through the [`store::ModuleStore`] trait
//! - [`retarget`] - the rewrite passes and the [`retarget::Retargeter`] orchestrator
//!
//! Files are processed independently; [`retarget::Retargeter::run`] spreads them over a
//! `rayon` thread pool.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust,no_run
/// use retarget::prelude::*;
///
/// let mapping = MappingTable::builtin()?;
/// println!("{} types mapped away from {}", mapping.len(), mapping.source());
/// # Ok::<(), retarget::Error>(())
/// ```
pub mod prelude;

/// CIL instructions and method body construction
///
/// Bodies are assembled through [`assembly::InstructionAssembler`], which simulates the
/// evaluation stack and rejects underflow, and wrapped by [`assembly::MethodBodyBuilder`],
/// which adds locals and checks the stack at `ret`.
pub mod assembly;

/// The metadata model of a module
pub mod metadata;

/// Type reference remapping, accessor and stub synthesis, and the orchestrator
pub mod retarget;

/// Module loading and saving
pub mod store;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `retarget` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use retarget::{Error, retarget::MappingTable};
///
/// match MappingTable::from_path(std::path::Path::new("mapping.json")) {
///     Ok(table) => println!("{} entries", table.len()),
///     Err(Error::Config(message)) => println!("bad mapping: {message}"),
///     Err(e) => println!("Error: {e}"),
/// }
/// ```
pub use error::Error;

pub use metadata::module::Module;
pub use retarget::{MappingTable, RetargetConfig, Retargeter};
pub use store::{ImageStore, ModuleStore, WriteOptions};
