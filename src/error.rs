use std::path::PathBuf;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only conditions that abort the processing of a whole module are represented here. Recoverable
/// conditions inside a module (an unmapped type reference, an accessor pair whose value type
/// cannot be copied by block, a stub with an unusual return type) are logged and recorded in the
/// [`crate::retarget::ModuleReport`] instead.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::NotAModule`] - The file is not a module image the store understands
/// - [`Error::Malformed`] - The module was recognized but violates a structural invariant
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Json`] - Serialization failures while writing images or reading mapping files
///
/// ## Run Errors
/// - [`Error::Config`] - Invalid mapping table or configuration
/// - [`Error::DestinationExists`] - Output already present and overwriting is disabled
/// - [`Error::InvalidBody`] - A synthesized instruction sequence failed stack validation
///
/// # Examples
///
/// ```rust,no_run
/// use retarget::{Error, store::{ImageStore, ModuleStore}};
/// use std::path::Path;
///
/// match ImageStore::new().load(Path::new("Game.dll")) {
///     Ok(module) => println!("loaded {}", module.name),
///     Err(Error::NotAModule(reason)) => eprintln!("skipping: {reason}"),
///     Err(e) => eprintln!("failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file is not a recognized module image.
    ///
    /// Raised by [`crate::store::ModuleStore::load`] for files that do not match the
    /// store's format. Callers skip such files without counting them as errors.
    #[error("Not a recognized binary module - {0}")]
    NotAModule(String),

    /// The module is damaged and could not be processed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// JSON serialization or deserialization error.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The mapping table or run configuration is invalid.
    #[error("Invalid configuration - {0}")]
    Config(String),

    /// The destination file already exists and overwriting was not requested.
    #[error("Destination already exists - {}", .0.display())]
    DestinationExists(PathBuf),

    /// A method body could not be assembled.
    ///
    /// The assembler tracks the evaluation stack while instructions are emitted; popping
    /// from an empty stack or finishing a body without `ret` produces this error.
    #[error("Invalid method body - {0}")]
    InvalidBody(String),
}
