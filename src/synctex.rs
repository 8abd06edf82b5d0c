//! Main module for synctex library functionality

pub mod backward;
pub mod cache;
pub mod config;
pub mod error;
pub mod forward;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod parser;
pub mod paths;

pub use backward::{backward, BackwardResult};
pub use error::{FormatError, LookupError, SyncError};
pub use forward::{forward, forward_with, ForwardResult};
pub use geometry::{covering_rectangle, Rect};
pub use model::{SyncModel, UNIT};
pub use parser::parse;
