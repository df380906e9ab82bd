//! JSON module images.
//!
//! An image is a JSON document with a small header and the module tree:
//!
//! ```json
//! { "format": "retarget-image", "version": 1, "options": { ... }, "module": { ... } }
//! ```
//!
//! Files that do not carry the header are reported as [`Error::NotAModule`], so a directory of
//! mixed files can be handed to a run.

use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, ErrorKind, Write},
    path::Path,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    metadata::module::Module,
    store::{ModuleStore, WriteOptions},
    Error, Result,
};

const IMAGE_FORMAT: &str = "retarget-image";
const IMAGE_VERSION: u32 = 1;
const DOS_SIGNATURE: &[u8] = b"MZ";

#[derive(Deserialize)]
struct ImageHeader {
    format: String,
    version: u32,
}

#[derive(Deserialize)]
struct ImageFile {
    module: Module,
}

#[derive(Serialize)]
struct ImageFileRef<'a> {
    format: &'static str,
    version: u32,
    options: &'a WriteOptions,
    module: &'a Module,
}

/// [`ModuleStore`] for JSON module images.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageStore {
    pretty: bool,
}

impl ImageStore {
    /// Create a store writing compact JSON
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write indented JSON
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Parse an image from memory.
    ///
    /// # Errors
    /// See [`ModuleStore::load`].
    pub fn from_slice(data: &[u8]) -> Result<Module> {
        if data.starts_with(DOS_SIGNATURE) {
            return Err(Error::NotAModule(
                "PE image, no binary module backend configured".to_string(),
            ));
        }

        let header: ImageHeader = serde_json::from_slice(data)
            .map_err(|_| Error::NotAModule("missing module image header".to_string()))?;
        if header.format != IMAGE_FORMAT {
            return Err(Error::NotAModule(format!(
                "unknown image format '{}'",
                header.format
            )));
        }
        if header.version != IMAGE_VERSION {
            return Err(malformed_error!(
                "Unsupported image version {} (expected {})",
                header.version,
                IMAGE_VERSION
            ));
        }

        let image: ImageFile = serde_json::from_slice(data)
            .map_err(|e| malformed_error!("Invalid module image: {}", e))?;
        let mut module = image.module;
        module.reindex();
        module.validate()?;
        Ok(module)
    }

    /// Serialize a module to an image in memory.
    ///
    /// # Errors
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_vec(&self, module: &Module, options: &WriteOptions) -> Result<Vec<u8>> {
        let image = ImageFileRef {
            format: IMAGE_FORMAT,
            version: IMAGE_VERSION,
            options,
            module,
        };
        let data = if self.pretty {
            serde_json::to_vec_pretty(&image)?
        } else {
            serde_json::to_vec(&image)?
        };
        Ok(data)
    }
}

impl ModuleStore for ImageStore {
    fn load(&self, path: &Path) -> Result<Module> {
        let data = fs::read(path)?;
        Self::from_slice(&data).map_err(|e| match e {
            Error::NotAModule(reason) => Error::NotAModule(format!("{}: {reason}", path.display())),
            other => other,
        })
    }

    fn save(&self, module: &Module, path: &Path, options: &WriteOptions) -> Result<()> {
        let data = self.to_vec(module, options)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = if options.overwrite {
            File::create(path)?
        } else {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => Error::DestinationExists(path.to_path_buf()),
                    _ => Error::FileError(e),
                })?
        };

        let mut writer = BufWriter::new(file);
        writer.write_all(&data)?;
        writer.flush()?;
        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}
