//! Backward (inverse) search: output position -> source line
//!
//! Every (file, line, page) bucket of the line index that lies on the requested
//! page is reduced to its covering rectangle. The first rectangle containing the
//! point wins outright; otherwise the bucket whose rectangle is nearest to the
//! point, by signed edge distance, is returned. Ties keep the bucket seen first.

use serde::Serialize;
use tracing::debug;

use super::error::LookupError;
use super::geometry::covering_rectangle;
use super::model::SyncModel;

/// The source location behind an output position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackwardResult {
    pub input: String,
    pub line: u32,
    /// Sync files carry no column information, this is always 0
    pub column: u32,
}

impl BackwardResult {
    fn new(input: &str, line: u32) -> Self {
        Self {
            input: input.to_string(),
            line,
            column: 0,
        }
    }
}

/// Find the source line that produced the point `(x, y)` on `page`.
///
/// `x` and `y` are output coordinates, offset included.
pub fn backward(model: &SyncModel, page: u32, x: f64, y: f64) -> Result<BackwardResult, LookupError> {
    if model.files.is_empty() {
        return Err(LookupError::NoInputFiles);
    }

    let x = x - model.offset.x;
    let y = y - model.offset.y;

    let mut nearest: Option<(f64, BackwardResult)> = None;
    for bucket in model.index.buckets().filter(|b| b.page == page) {
        let rect = covering_rectangle(model.resolve(bucket.elements));
        if rect.contains(x, y) {
            debug!(page, input = bucket.path, line = bucket.line, "point inside record");
            return Ok(BackwardResult::new(bucket.path, bucket.line));
        }

        let distance = rect.distance(x, y);
        let closer = match &nearest {
            Some((best, _)) => distance < *best,
            None => true,
        };
        if closer {
            nearest = Some((distance, BackwardResult::new(bucket.path, bucket.line)));
        }
    }

    match nearest {
        Some((distance, result)) => {
            debug!(page, input = %result.input, line = result.line, distance, "nearest record");
            Ok(result)
        }
        None => Err(LookupError::NoPageContent { page }),
    }
}
