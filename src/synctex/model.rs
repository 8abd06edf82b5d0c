//! In-memory model of a parsed sync file
//!
//! The model is built in one pass by [`parse`](super::parser::parse) and never
//! mutated afterwards. It is made of:
//!
//! - the input files table (id -> path),
//! - the page table, each page owning its top-level blocks,
//! - a block arena and an element arena, addressed by [`BlockId`] / [`ElementId`],
//! - the derived [`LineIndex`]: path -> line -> page -> elements.
//!
//! ## Arena layout
//!
//! Blocks point back at their parent and parents own their children. Instead of
//! references, both directions are plain indices into the arenas, and a parent is
//! a [`Parent`] discriminant that is either a page number or a block id. This keeps
//! the tree free of reference cycles while still letting the parser pop back to the
//! enclosing context when a block closes.
//!
//! All geometry is stored in big points: raw scaled-point values from the file are
//! divided by [`UNIT`] on the way in.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scaled points per big point. Fixed by the format.
pub const UNIT: f64 = 65781.76;

/// Convert a raw fixed-point value from the sync file into big points
pub fn to_length(raw: i64) -> f64 {
    raw as f64 / UNIT
}

/// A source file declared by an `Input:` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub id: u32,
    pub path: String,
}

/// Index of a block in [`SyncModel::blocks`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub usize);

/// Index of an element in [`SyncModel::elements`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub usize);

/// Box orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Vertical,
    Horizontal,
}

/// What a block hangs off: the page itself or another block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Page(u32),
    Block(BlockId),
}

/// A page of output, owning its top-level blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: u32,
    pub blocks: Vec<BlockId>,
}

impl Page {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            blocks: Vec::new(),
        }
    }
}

/// A vertical or horizontal box
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub file: u32,
    pub line: u32,
    pub page: u32,
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    /// Only vertical boxes keep their depth
    pub depth: Option<f64>,
    pub parent: Parent,
    pub blocks: Vec<BlockId>,
    pub elements: Vec<ElementId>,
}

/// A leaf record: glue, kern, math node, void box, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Record tag as written in the file (`k`, `g`, `$`, `x`, `h`, `v`, ...)
    pub kind: char,
    pub file: u32,
    pub line: u32,
    pub page: u32,
    pub left: f64,
    pub bottom: f64,
    /// `None` when the record carries no width. Not the same as a zero width.
    pub width: Option<f64>,
    /// Inherited from the enclosing block
    pub height: f64,
    pub parent: BlockId,
}

/// Calibration offset applied to every output coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// path -> line -> page -> elements, every level in first-insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineIndex {
    files: IndexMap<String, IndexMap<u32, IndexMap<u32, Vec<ElementId>>>>,
}

/// One (file, line, page) cell of the [`LineIndex`]
#[derive(Debug, Clone, Copy)]
pub struct Bucket<'a> {
    pub path: &'a str,
    pub line: u32,
    pub page: u32,
    pub elements: &'a [ElementId],
}

impl LineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, line: u32, page: u32, element: ElementId) {
        if !self.files.contains_key(path) {
            self.files.insert(path.to_string(), IndexMap::new());
        }
        if let Some(lines) = self.files.get_mut(path) {
            lines
                .entry(line)
                .or_default()
                .entry(page)
                .or_default()
                .push(element);
        }
    }

    /// Lines recorded for `path`, each with its page buckets
    pub fn lines(&self, path: &str) -> Option<&IndexMap<u32, IndexMap<u32, Vec<ElementId>>>> {
        self.files.get(path)
    }

    /// Indexed paths in first-insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every bucket, file-then-line-then-page, in insertion order
    pub fn buckets(&self) -> impl Iterator<Item = Bucket<'_>> {
        self.files.iter().flat_map(|(path, lines)| {
            lines.iter().flat_map(move |(&line, pages)| {
                pages.iter().map(move |(&page, elements)| Bucket {
                    path: path.as_str(),
                    line,
                    page,
                    elements: elements.as_slice(),
                })
            })
        })
    }
}

/// The parsed sync file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncModel {
    pub version: String,
    pub offset: Offset,
    pub files: BTreeMap<u32, InputFile>,
    pub pages: BTreeMap<u32, Page>,
    /// Highest page number opened in the file
    pub page_count: u32,
    pub blocks: Vec<Block>,
    pub elements: Vec<Element>,
    /// Every horizontal block, in creation order
    pub horizontal_blocks: Vec<BlockId>,
    pub index: LineIndex,
}

/// Shape of a model, as reported by `synctex inspect`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub version: String,
    pub pages: u32,
    pub inputs: Vec<String>,
    pub blocks: usize,
    pub horizontal_blocks: usize,
    pub elements: usize,
    pub offset: (f64, f64),
}

impl SyncModel {
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Resolve a list of element ids into the elements themselves
    pub fn resolve<'a>(&'a self, ids: &'a [ElementId]) -> impl Iterator<Item = &'a Element> + 'a {
        ids.iter().map(move |&id| self.element(id))
    }

    pub fn input_path(&self, id: u32) -> Option<&str> {
        self.files.get(&id).map(|file| file.path.as_str())
    }

    /// Rebuild the line index by walking the sealed page tree.
    ///
    /// Elements are re-inserted in the order they were read, so the result equals
    /// [`SyncModel::index`] for any model produced by the parser.
    pub fn rebuild_index(&self) -> LineIndex {
        let mut reachable = Vec::new();
        for page in self.pages.values() {
            let mut stack: Vec<BlockId> = page.blocks.iter().rev().copied().collect();
            while let Some(id) = stack.pop() {
                let block = self.block(id);
                reachable.extend(block.elements.iter().copied());
                stack.extend(block.blocks.iter().rev().copied());
            }
        }
        reachable.sort();

        let mut index = LineIndex::new();
        for id in reachable {
            let element = self.element(id);
            if let Some(path) = self.input_path(element.file) {
                index.insert(path, element.line, element.page, id);
            }
        }
        index
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            version: self.version.clone(),
            pages: self.page_count,
            inputs: self.files.values().map(|f| f.path.clone()).collect(),
            blocks: self.blocks.len(),
            horizontal_blocks: self.horizontal_blocks.len(),
            elements: self.elements.len(),
            offset: (self.offset.x, self.offset.y),
        }
    }
}
