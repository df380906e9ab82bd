//! The static type-to-library mapping table.
//!
//! A [`MappingTable`] names the source library whose references are retargeted and, for every
//! declaring type it knows, the target library that now hosts it. Target libraries are
//! described by assembly display names and become the new resolution scopes of rewritten type
//! references.
//!
//! Tables are read from JSON:
//!
//! ```json
//! {
//!   "source": "UnityEngine",
//!   "libraries": {
//!     "UnityEngine.CoreModule": "UnityEngine.CoreModule, Version=0.0.0.0, Culture=neutral, PublicKeyToken=null"
//!   },
//!   "types": {
//!     "UnityEngine.GameObject": "UnityEngine.CoreModule"
//!   }
//! }
//! ```
//!
//! The table is built once per run and shared read-only by every worker.

use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use crate::{metadata::identity::AssemblyIdentity, Error, Result};

const BUILTIN_MAPPING: &str = include_str!("default_mapping.json");

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingFile {
    source: String,
    libraries: HashMap<String, AssemblyIdentity>,
    types: HashMap<String, String>,
}

/// Immutable mapping from qualified type names to target library identities.
#[derive(Debug, Clone)]
pub struct MappingTable {
    source: String,
    types: HashMap<String, String>,
    libraries: HashMap<String, AssemblyIdentity>,
}

impl MappingTable {
    /// Build a table from its parts.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the source name is empty or a type maps to a library id
    /// missing from `libraries`.
    pub fn new(
        source: impl Into<String>,
        libraries: HashMap<String, AssemblyIdentity>,
        types: HashMap<String, String>,
    ) -> Result<Self> {
        let source = source.into();
        if source.is_empty() {
            return Err(Error::Config("mapping source library is empty".to_string()));
        }

        if let Some((type_name, library)) = types
            .iter()
            .find(|(_, library)| !libraries.contains_key(library.as_str()))
        {
            return Err(Error::Config(format!(
                "type '{type_name}' maps to unknown library '{library}'"
            )));
        }

        Ok(Self {
            source,
            types,
            libraries,
        })
    }

    /// The table shipped with the crate
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the embedded table is invalid.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_MAPPING)
    }

    /// Parse a table from JSON text.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for syntax errors, unknown fields, unparsable library display
    /// names, or dangling library ids.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: MappingFile = serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("invalid mapping table: {e}")))?;
        Self::new(file.source, file.libraries, file.types)
    }

    /// Read a table from a JSON file.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file cannot be read, otherwise see [`Self::from_json`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Simple name of the library whose references are retargeted
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolution scope for the declaring type `qualified_name`
    #[must_use]
    pub fn lookup(&self, qualified_name: &str) -> Option<&AssemblyIdentity> {
        self.types
            .get(qualified_name)
            .and_then(|library| self.libraries.get(library))
    }

    /// Number of mapped types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no type is mapped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
