//! Loading sync files from disk
//!
//! A TeX run writing `thesis.pdf` leaves its synchronization data in
//! `thesis.synctex`, or more commonly `thesis.synctex.gz`. This module resolves
//! either an output document or a sync file path to the plain-text sync file and
//! reads it. Decompression is left to the caller: when only the compressed
//! variant exists the loader says so with [`LoaderError::Compressed`].
//!
//! # Example
//!
//! ```rust
//! use synctex::synctex::loader::SyncLoader;
//!
//! let model = SyncLoader::from_path("thesis.pdf").unwrap().parse().unwrap();
//! let model = SyncLoader::from_string(text).parse().unwrap();
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::FormatError;
use super::model::SyncModel;
use super::parser::parse;

const SYNC_EXTENSION: &str = "synctex";
const COMPRESSED_EXTENSION: &str = "synctex.gz";

/// Error that can occur when loading sync files
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderError {
    /// IO error when reading the file
    Io(String),
    /// Only a compressed sync file is available
    Compressed { path: PathBuf },
    /// No sync file belongs to the given output document
    NotFound { output: PathBuf },
    /// The sync text is malformed
    Format(FormatError),
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::Io(msg) => write!(f, "IO error: {}", msg),
            LoaderError::Compressed { path } => write!(
                f,
                "{} is compressed; decompress it before loading",
                path.display()
            ),
            LoaderError::NotFound { output } => {
                write!(f, "no sync file found for {}", output.display())
            }
            LoaderError::Format(err) => write!(f, "Format error: {}", err),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::Io(err.to_string())
    }
}

impl From<FormatError> for LoaderError {
    fn from(err: FormatError) -> Self {
        LoaderError::Format(err)
    }
}

/// Find the plain-text sync file for `path`.
///
/// `path` may name the sync file itself or the output document next to it.
pub fn locate(path: &Path) -> Result<PathBuf, LoaderError> {
    let name = path.to_string_lossy();
    if name.ends_with(COMPRESSED_EXTENSION) {
        return Err(LoaderError::Compressed {
            path: path.to_path_buf(),
        });
    }
    if path.extension().is_some_and(|ext| ext == SYNC_EXTENSION) {
        return Ok(path.to_path_buf());
    }

    let plain = path.with_extension(SYNC_EXTENSION);
    if plain.is_file() {
        return Ok(plain);
    }
    let compressed = path.with_extension(COMPRESSED_EXTENSION);
    if compressed.is_file() {
        return Err(LoaderError::Compressed { path: compressed });
    }
    Err(LoaderError::NotFound {
        output: path.to_path_buf(),
    })
}

/// Sync text waiting to be parsed
pub struct SyncLoader {
    source: String,
    origin: Option<PathBuf>,
}

impl SyncLoader {
    /// Load from a sync file or from the output document it belongs to
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let sync_path = locate(path.as_ref())?;
        debug!(path = %sync_path.display(), "reading sync file");
        let source = fs::read_to_string(&sync_path)?;
        Ok(SyncLoader {
            source,
            origin: Some(sync_path),
        })
    }

    /// Load from already decompressed sync text
    pub fn from_string<S: Into<String>>(source: S) -> Self {
        SyncLoader {
            source: source.into(),
            origin: None,
        }
    }

    /// The sync file the text was read from, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Parse the text into a [`SyncModel`]
    pub fn parse(&self) -> Result<SyncModel, LoaderError> {
        Ok(parse(&self.source)?)
    }
}
