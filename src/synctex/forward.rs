//! Forward search: source line -> output position
//!
//! Not every source line produces typeset material, so a line missing from the
//! index is placed by interpolating between the closest recorded lines around it.
//! The page and horizontal position come from the following recorded line. When
//! the two bracketing lines sit on different pages the interpolated height mixes
//! coordinates from both pages; that inaccuracy is accepted.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::LookupError;
use super::geometry::{covering_rectangle, Rect};
use super::model::{ElementId, SyncModel};
use super::paths::normalize;

/// Where a source line ended up in the output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForwardResult {
    pub page: u32,
    pub x: f64,
    pub y: f64,
}

/// Knobs for forward search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardOptions {
    /// Retry with lexically normalized paths when the exact path isn't indexed
    pub normalize_paths: bool,
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Self {
            normalize_paths: true,
        }
    }
}

/// Find the output position of `line` in `path`, matching paths exactly.
pub fn forward(model: &SyncModel, line: u32, path: &str) -> Result<ForwardResult, LookupError> {
    forward_with(
        model,
        line,
        path,
        ForwardOptions {
            normalize_paths: false,
        },
    )
}

/// Find the output position of `line` in `path`.
pub fn forward_with(
    model: &SyncModel,
    line: u32,
    path: &str,
    options: ForwardOptions,
) -> Result<ForwardResult, LookupError> {
    let unknown = || LookupError::UnknownInput {
        path: path.to_string(),
    };
    let lines = lookup_lines(model, path, options).ok_or_else(unknown)?;

    let mut recorded: Vec<u32> = lines.keys().copied().collect();
    recorded.sort_unstable();

    let i = recorded.partition_point(|&l| l < line);
    let (page, rect) = match recorded.get(i) {
        Some(&l1) if i == 0 || l1 == line => line_rect(model, lines, l1),
        Some(&l1) => {
            let l0 = recorded[i - 1];
            let (c0, c1) = match (line_rect(model, lines, l0), line_rect(model, lines, l1)) {
                (Some(c0), Some(c1)) => (c0, c1),
                _ => return Err(unknown()),
            };
            if c0.0 != c1.0 {
                warn!(line, l0, l1, "interpolating across a page boundary");
            }
            let span = f64::from(l1 - l0);
            let bottom = c0.1.bottom * f64::from(l1 - line) / span
                + c1.1.bottom * f64::from(line - l0) / span;
            Some((c1.0, Rect { bottom, ..c1.1 }))
        }
        // past the last recorded line
        None => recorded.last().and_then(|&last| line_rect(model, lines, last)),
    }
    .ok_or_else(unknown)?;

    debug!(path, line, page, "forward search");
    Ok(ForwardResult {
        page,
        x: rect.left + model.offset.x,
        y: rect.bottom + model.offset.y,
    })
}

type LineBuckets = IndexMap<u32, IndexMap<u32, Vec<ElementId>>>;

fn lookup_lines<'a>(
    model: &'a SyncModel,
    path: &str,
    options: ForwardOptions,
) -> Option<&'a LineBuckets> {
    if let Some(lines) = model.index.lines(path) {
        return Some(lines);
    }
    if !options.normalize_paths {
        return None;
    }
    let wanted = normalize(path);
    let found = model.index.paths().find(|p| normalize(p) == wanted)?;
    debug!(requested = path, indexed = found, "matched input by normalized path");
    model.index.lines(found)
}

/// Covering rectangle of the first page bucket recorded for `line`
fn line_rect(model: &SyncModel, lines: &LineBuckets, line: u32) -> Option<(u32, Rect)> {
    let (&page, ids) = lines.get(&line)?.first()?;
    Some((page, covering_rectangle(model.resolve(ids))))
}
