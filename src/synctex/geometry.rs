//! Covering rectangles
//!
//! Output coordinates grow downwards: a record's `bottom` is its baseline and it
//! extends `height` upwards, so its top edge is `bottom - height`.

use super::model::{Block, Element};

/// Anything with a position and a vertical extent
pub trait Extent {
    fn left(&self) -> f64;
    fn bottom(&self) -> f64;
    fn height(&self) -> f64;
    /// `None` when the record has no width; such records don't move the right edge
    fn width(&self) -> Option<f64>;
}

impl Extent for Element {
    fn left(&self) -> f64 {
        self.left
    }
    fn bottom(&self) -> f64 {
        self.bottom
    }
    fn height(&self) -> f64 {
        self.height
    }
    fn width(&self) -> Option<f64> {
        self.width
    }
}

impl Extent for Block {
    fn left(&self) -> f64 {
        self.left
    }
    fn bottom(&self) -> f64 {
        self.bottom
    }
    fn height(&self) -> f64 {
        self.height
    }
    fn width(&self) -> Option<f64> {
        Some(self.width)
    }
}

/// Axis-aligned box in output space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    /// Inclusive on all four edges
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.left <= x && x <= self.right && self.top <= y && y <= self.bottom
    }

    /// Largest signed distance from the point to any edge.
    ///
    /// Non-positive on an axis exactly when the point lies within the rectangle on
    /// that axis, so the result is positive for any point outside.
    pub fn distance(&self, x: f64, y: f64) -> f64 {
        (self.top - y)
            .max(y - self.bottom)
            .max(self.left - x)
            .max(x - self.right)
    }
}

/// Bounding box of a set of records.
///
/// `right` only considers records with a width. If none has one it stays at
/// negative infinity, and if `items` is empty every edge keeps its seed.
pub fn covering_rectangle<'a, T, I>(items: I) -> Rect
where
    T: Extent + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let seed = Rect {
        top: f64::INFINITY,
        bottom: f64::NEG_INFINITY,
        left: f64::INFINITY,
        right: f64::NEG_INFINITY,
    };

    items.into_iter().fold(seed, |rect, item| Rect {
        top: rect.top.min(item.bottom() - item.height()),
        bottom: rect.bottom.max(item.bottom()),
        left: rect.left.min(item.left()),
        right: match item.width() {
            Some(width) => rect.right.max(item.left() + width),
            None => rect.right,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synctex::model::{BlockId, BlockKind, Parent};

    fn element(left: f64, bottom: f64, width: Option<f64>, height: f64) -> Element {
        Element {
            kind: 'x',
            file: 1,
            line: 1,
            page: 1,
            left,
            bottom,
            width,
            height,
            parent: BlockId(0),
        }
    }

    #[test]
    fn reduces_every_edge() {
        let items = vec![
            element(10.0, 50.0, Some(5.0), 8.0),
            element(4.0, 60.0, Some(30.0), 12.0),
        ];
        let rect = covering_rectangle(&items);
        assert_eq!(
            rect,
            Rect {
                top: 42.0,
                bottom: 60.0,
                left: 4.0,
                right: 34.0,
            }
        );
    }

    #[test]
    fn widthless_records_do_not_move_right_edge() {
        let items = vec![
            element(10.0, 50.0, Some(5.0), 8.0),
            element(90.0, 50.0, None, 8.0),
        ];
        let rect = covering_rectangle(&items);
        assert_eq!(rect.right, 15.0);
        assert_eq!(rect.left, 10.0);
    }

    #[test]
    fn zero_width_still_counts() {
        let items = vec![element(90.0, 50.0, Some(0.0), 8.0)];
        assert_eq!(covering_rectangle(&items).right, 90.0);
    }

    #[test]
    fn blocks_always_have_width() {
        let block = Block {
            kind: BlockKind::Horizontal,
            file: 1,
            line: 1,
            page: 1,
            left: 2.0,
            bottom: 20.0,
            width: 40.0,
            height: 5.0,
            depth: None,
            parent: Parent::Page(1),
            blocks: Vec::new(),
            elements: Vec::new(),
        };
        let rect = covering_rectangle(std::iter::once(&block));
        assert_eq!(rect.right, 42.0);
        assert_eq!(rect.top, 15.0);
    }

    #[test]
    fn distance_is_positive_only_outside() {
        let rect = Rect {
            top: 0.0,
            bottom: 10.0,
            left: 0.0,
            right: 10.0,
        };
        assert!(rect.distance(5.0, 5.0) <= 0.0);
        assert!(rect.contains(10.0, 0.0));
        assert_eq!(rect.distance(13.0, 5.0), 3.0);
        assert_eq!(rect.distance(5.0, -2.0), 2.0);
    }
}
