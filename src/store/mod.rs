//! Reading and writing modules.
//!
//! The rewrite passes operate on the in-memory [`Module`] tree and never touch files
//! themselves. A [`ModuleStore`] turns a path into a module and a module back into a file; the
//! crate ships the JSON [`ImageStore`], and a binary PE backend implements the same trait.

mod image;

pub use image::ImageStore;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{metadata::module::Module, Result};

/// Options for serializing a rewritten module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Keep metadata row numbers, so tokens held by other modules stay valid
    pub preserve_row_ids: bool,
    /// Keep offsets into the user-string heap, so `ldstr` operands stay valid
    pub preserve_user_string_offsets: bool,
    /// Keep trailing data of signature blobs
    pub preserve_signature_data: bool,
    /// Replace an existing destination file
    #[serde(skip)]
    pub overwrite: bool,
}

impl WriteOptions {
    /// Options that keep every identifier other modules may bind against
    #[must_use]
    pub fn preserving() -> Self {
        Self {
            preserve_row_ids: true,
            preserve_user_string_offsets: true,
            preserve_signature_data: true,
            overwrite: false,
        }
    }

    /// Builder-style toggle for [`Self::overwrite`]
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Loads and saves modules.
///
/// Implementations are shared by all workers of a run.
pub trait ModuleStore: Send + Sync {
    /// Load the module at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotAModule`] if the file is not a module this store reads,
    /// [`crate::Error::Malformed`] if it is one but violates a structural invariant, and
    /// [`crate::Error::FileError`] on I/O failure.
    fn load(&self, path: &Path) -> Result<Module>;

    /// Serialize `module` to `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::DestinationExists`] if `path` exists and
    /// [`WriteOptions::overwrite`] is off, otherwise I/O or serialization errors.
    fn save(&self, module: &Module, path: &Path, options: &WriteOptions) -> Result<()>;
}
