//! Error types for parsing sync files and answering queries
//!
//! Two families of failure exist:
//!
//! - [`FormatError`] is raised while parsing, when a structural marker shows up
//!   outside the context it requires. Parsing stops and no partial model is kept.
//! - [`LookupError`] is raised while querying a parsed model, when the requested
//!   data simply isn't there.
//!
//! [`SyncError`] wraps both (plus loader failures) for callers that go all the way
//! from a path on disk to a query result.

use std::fmt;

use super::loader::LoaderError;

/// Error raised while parsing sync text
///
/// Every variant carries the 1-based line number of the offending sync line.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// A close marker (`]` or `)`) with no open block to close
    UnbalancedClose { line: usize, marker: char },
    /// An open marker or record that needs an enclosing page or block, but has none
    MissingContext { line: usize, marker: char },
    /// An offset record naming an axis other than `X` or `Y`
    InvalidAxis { line: usize, axis: String },
    /// A record referring to an input id that was never declared
    UnknownInput { line: usize, id: u32 },
    /// A numeric field that doesn't fit the expected integer type
    InvalidNumber { line: usize, value: String },
    /// The text ended at `line` with a page or block still open, `marker` being its closer
    Unterminated { line: usize, marker: char },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnbalancedClose { line, marker } => {
                write!(f, "line {}: '{}' closes a block that was never opened", line, marker)
            }
            FormatError::MissingContext { line, marker } => {
                write!(f, "line {}: '{}' appears outside of its enclosing context", line, marker)
            }
            FormatError::InvalidAxis { line, axis } => {
                write!(f, "line {}: unknown offset axis '{}'", line, axis)
            }
            FormatError::UnknownInput { line, id } => {
                write!(f, "line {}: reference to undeclared input {}", line, id)
            }
            FormatError::InvalidNumber { line, value } => {
                write!(f, "line {}: invalid number '{}'", line, value)
            }
            FormatError::Unterminated { line, marker } => {
                write!(f, "line {}: sync text ends before the closing '{}'", line, marker)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Error raised by forward or backward search
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// Forward search: the source file has no entries in the line index
    UnknownInput { path: String },
    /// Backward search: the sync file declares no input files at all
    NoInputFiles,
    /// Backward search: nothing on the requested page could be compared
    NoPageContent { page: u32 },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::UnknownInput { path } => {
                write!(f, "no synchronization data for input '{}'", path)
            }
            LookupError::NoInputFiles => write!(f, "sync file declares no input files"),
            LookupError::NoPageContent { page } => {
                write!(f, "no synchronization data on page {}", page)
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Umbrella error for the full load-then-query path
#[derive(Debug)]
pub enum SyncError {
    Load(LoaderError),
    Format(FormatError),
    Lookup(LookupError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Load(err) => write!(f, "Load error: {}", err),
            SyncError::Format(err) => write!(f, "Format error: {}", err),
            SyncError::Lookup(err) => write!(f, "Lookup error: {}", err),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Load(err) => Some(err),
            SyncError::Format(err) => Some(err),
            SyncError::Lookup(err) => Some(err),
        }
    }
}

impl From<LoaderError> for SyncError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::Format(inner) => SyncError::Format(inner),
            other => SyncError::Load(other),
        }
    }
}

impl From<FormatError> for SyncError {
    fn from(err: FormatError) -> Self {
        SyncError::Format(err)
    }
}

impl From<LookupError> for SyncError {
    fn from(err: LookupError) -> Self {
        SyncError::Lookup(err)
    }
}
