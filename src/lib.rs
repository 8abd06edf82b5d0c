//! # synctex
//!
//! A reader for SyncTeX files.
//!
//! The [`synctex`] module decodes the synchronization text a TeX run writes
//! next to its output and answers the two questions an editor asks of it:
//!
//! - **Forward search**: which page and position does a source line land on?
//! - **Inverse search**: which source line produced a clicked position?
//!
//! Locating the sync file and decompressing it are left to the caller; the
//! [`loader`](synctex::loader) module only handles plain-text sync files.

pub mod synctex;

pub use synctex::{
    backward, forward, parse, BackwardResult, ForwardResult, SyncError, SyncModel,
};
