//! Sync file parser
//!
//! A single forward scan over the lines of the (already decompressed) sync text.
//! Line 0 is the version banner. Every following line is tried against an ordered
//! list of classifiers and handled by the first one that matches:
//!
//! 1. input declaration   `Input:<id>:<path>`
//! 2. axis offset         `X Offset:<raw>` / `Y Offset:<raw>`
//! 3. page open           `{<n>`
//! 4. page close          `}<n>`
//! 5. vertical box open   `[<file>,<line>:<left>,<bottom>:<width>,<height>,<depth>`
//! 6. vertical box close  `]`
//! 7. horizontal box open `(<file>,<line>:<left>,<bottom>:<width>,<height>,<depth>`
//! 8. horizontal box close `)`
//! 9. element             `<tag><file>,<line>:<left>,<bottom>[:<width>]`
//!
//! The patterns are not disjoint in form (the element pattern also matches box
//! openers), so the order is significant. Lines no classifier recognises are
//! skipped: the grammar only covers what forward and inverse search need.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::str::FromStr;
use tracing::{debug, trace};

use super::error::FormatError;
use super::model::{
    to_length, Block, BlockId, BlockKind, Element, ElementId, InputFile, Page, Parent, SyncModel,
};

/// Kinds of sync lines the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Input,
    Offset,
    PageOpen,
    PageClose,
    VerticalOpen,
    VerticalClose,
    HorizontalOpen,
    HorizontalClose,
    Element,
}

/// Classifier patterns, tried in declaration order
const LINE_PATTERNS: &[(LineKind, &str)] = &[
    (LineKind::Input, r"^Input:(\d+):(.+)$"),
    (LineKind::Offset, r"^([XY]) Offset:(-?\d+)$"),
    (LineKind::PageOpen, r"^\{(\d+)$"),
    (LineKind::PageClose, r"^\}(\d+)$"),
    (
        LineKind::VerticalOpen,
        r"^\[(\d+),(\d+):(-?\d+),(-?\d+):(-?\d+),(-?\d+),(-?\d+)",
    ),
    (LineKind::VerticalClose, r"^\]$"),
    (
        LineKind::HorizontalOpen,
        r"^\((\d+),(\d+):(-?\d+),(-?\d+):(-?\d+),(-?\d+),(-?\d+)",
    ),
    (LineKind::HorizontalClose, r"^\)$"),
    (
        LineKind::Element,
        r"^(.)(\d+),(\d+):(-?\d+),(-?\d+)(?::(-?\d+))?",
    ),
];

static LINE_CLASSIFIERS: Lazy<Vec<(LineKind, Regex)>> = Lazy::new(|| {
    LINE_PATTERNS
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(pattern).unwrap()))
        .collect()
});

/// Find the first classifier matching `line`
fn classify(line: &str) -> Option<(LineKind, Captures<'_>)> {
    LINE_CLASSIFIERS
        .iter()
        .find_map(|(kind, regex)| regex.captures(line).map(|caps| (*kind, caps)))
}

/// The innermost open construct: the page itself, or a box on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Page,
    Block(BlockId),
}

/// Parse sync text into a [`SyncModel`].
///
/// Fails on the first structural marker found outside the context it requires,
/// and on text that ends while a page or block is still open. Nothing of the
/// partially built model is returned in either case.
pub fn parse(text: &str) -> Result<SyncModel, FormatError> {
    let mut parser = Parser::new();
    let mut lines = text.lines();

    if let Some(banner) = lines.next() {
        parser.model.version = version_of(banner);
    }

    for (idx, line) in lines.enumerate() {
        // +2: the banner is line 1
        parser.line_no = idx + 2;
        match classify(line) {
            Some((kind, caps)) => parser.handle(kind, &caps)?,
            None => trace!(line = parser.line_no, "skipping unrecognised sync line"),
        }
    }

    let model = parser.finish()?;
    debug!(
        version = %model.version,
        pages = model.page_count,
        inputs = model.files.len(),
        blocks = model.blocks.len(),
        elements = model.elements.len(),
        "parsed sync file"
    );
    Ok(model)
}

fn version_of(banner: &str) -> String {
    let banner = banner.trim();
    banner
        .strip_prefix("SyncTeX Version:")
        .unwrap_or(banner)
        .to_string()
}

struct Parser {
    model: SyncModel,
    page: Option<Page>,
    context: Option<Context>,
    line_no: usize,
}

impl Parser {
    fn new() -> Self {
        Self {
            model: SyncModel::default(),
            page: None,
            context: None,
            line_no: 0,
        }
    }

    fn handle(&mut self, kind: LineKind, caps: &Captures<'_>) -> Result<(), FormatError> {
        match kind {
            LineKind::Input => self.input(caps),
            LineKind::Offset => self.offset(caps),
            LineKind::PageOpen => self.open_page(caps),
            LineKind::PageClose => self.close_page(),
            LineKind::VerticalOpen => self.open_block(BlockKind::Vertical, caps),
            LineKind::VerticalClose => self.close_block(']'),
            LineKind::HorizontalOpen => self.open_block(BlockKind::Horizontal, caps),
            LineKind::HorizontalClose => self.close_block(')'),
            LineKind::Element => self.element(caps),
        }
    }

    /// Hand over the model once the text is exhausted, refusing truncated input
    fn finish(self) -> Result<SyncModel, FormatError> {
        let marker = match self.context {
            None => return Ok(self.model),
            Some(Context::Page) => '}',
            Some(Context::Block(id)) => match self.model.block(id).kind {
                BlockKind::Vertical => ']',
                BlockKind::Horizontal => ')',
            },
        };
        Err(FormatError::Unterminated {
            line: self.line_no,
            marker,
        })
    }

    fn input(&mut self, caps: &Captures<'_>) -> Result<(), FormatError> {
        let id: u32 = self.number(caps, 1)?;
        let path = caps[2].to_string();
        self.model.files.insert(id, InputFile { id, path });
        Ok(())
    }

    fn offset(&mut self, caps: &Captures<'_>) -> Result<(), FormatError> {
        let value = to_length(self.number(caps, 2)?);
        match &caps[1] {
            "X" => self.model.offset.x = value,
            "Y" => self.model.offset.y = value,
            axis => {
                return Err(FormatError::InvalidAxis {
                    line: self.line_no,
                    axis: axis.to_string(),
                })
            }
        }
        Ok(())
    }

    fn open_page(&mut self, caps: &Captures<'_>) -> Result<(), FormatError> {
        let number: u32 = self.number(caps, 1)?;
        self.model.page_count = self.model.page_count.max(number);
        self.page = Some(Page::new(number));
        self.context = Some(Context::Page);
        Ok(())
    }

    fn close_page(&mut self) -> Result<(), FormatError> {
        let missing = FormatError::MissingContext {
            line: self.line_no,
            marker: '}',
        };
        if self.context != Some(Context::Page) {
            return Err(missing);
        }
        let page = self.page.take().ok_or(missing)?;
        debug!(page = page.number, blocks = page.blocks.len(), "sealed page");
        self.model.pages.insert(page.number, page);
        self.context = None;
        Ok(())
    }

    fn open_block(&mut self, kind: BlockKind, caps: &Captures<'_>) -> Result<(), FormatError> {
        let marker = match kind {
            BlockKind::Vertical => '[',
            BlockKind::Horizontal => '(',
        };
        let (context, page) = match (self.context, self.page.as_ref()) {
            (Some(context), Some(page)) => (context, page.number),
            _ => {
                return Err(FormatError::MissingContext {
                    line: self.line_no,
                    marker,
                })
            }
        };
        let parent = match context {
            Context::Page => Parent::Page(page),
            Context::Block(id) => Parent::Block(id),
        };

        let depth = to_length(self.number(caps, 7)?);
        let block = Block {
            kind,
            file: self.number(caps, 1)?,
            line: self.number(caps, 2)?,
            page,
            left: to_length(self.number(caps, 3)?),
            bottom: to_length(self.number(caps, 4)?),
            width: to_length(self.number(caps, 5)?),
            height: to_length(self.number(caps, 6)?),
            depth: match kind {
                BlockKind::Vertical => Some(depth),
                BlockKind::Horizontal => None,
            },
            parent,
            blocks: Vec::new(),
            elements: Vec::new(),
        };

        let id = BlockId(self.model.blocks.len());
        self.model.blocks.push(block);
        if kind == BlockKind::Horizontal {
            self.model.horizontal_blocks.push(id);
        }
        self.context = Some(Context::Block(id));
        Ok(())
    }

    fn close_block(&mut self, marker: char) -> Result<(), FormatError> {
        let id = match self.context {
            Some(Context::Block(id)) => id,
            Some(Context::Page) | None => {
                return Err(FormatError::UnbalancedClose {
                    line: self.line_no,
                    marker,
                })
            }
        };

        match self.model.blocks[id.0].parent {
            Parent::Block(parent) => {
                self.model.blocks[parent.0].blocks.push(id);
                self.context = Some(Context::Block(parent));
            }
            Parent::Page(_) => {
                let page = self.page.as_mut().ok_or(FormatError::UnbalancedClose {
                    line: self.line_no,
                    marker,
                })?;
                page.blocks.push(id);
                self.context = Some(Context::Page);
            }
        }
        Ok(())
    }

    fn element(&mut self, caps: &Captures<'_>) -> Result<(), FormatError> {
        let kind = caps[1].chars().next().unwrap_or_default();
        let parent = match self.context {
            Some(Context::Block(id)) => id,
            Some(Context::Page) | None => {
                return Err(FormatError::MissingContext {
                    line: self.line_no,
                    marker: kind,
                })
            }
        };

        let file: u32 = self.number(caps, 2)?;
        let path = match self.model.files.get(&file) {
            Some(input) => input.path.clone(),
            None => {
                return Err(FormatError::UnknownInput {
                    line: self.line_no,
                    id: file,
                })
            }
        };
        let width = match caps.get(6) {
            Some(raw) => Some(to_length(self.parse_number(raw.as_str())?)),
            None => None,
        };

        let block = &self.model.blocks[parent.0];
        let element = Element {
            kind,
            file,
            line: self.number(caps, 3)?,
            page: block.page,
            left: to_length(self.number(caps, 4)?),
            bottom: to_length(self.number(caps, 5)?),
            width,
            height: block.height,
            parent,
        };

        let id = ElementId(self.model.elements.len());
        self.model
            .index
            .insert(&path, element.line, element.page, id);
        self.model.elements.push(element);
        self.model.blocks[parent.0].elements.push(id);
        Ok(())
    }

    fn number<T: FromStr>(&self, caps: &Captures<'_>, group: usize) -> Result<T, FormatError> {
        self.parse_number(caps.get(group).map_or("", |m| m.as_str()))
    }

    fn parse_number<T: FromStr>(&self, raw: &str) -> Result<T, FormatError> {
        raw.parse().map_err(|_| FormatError::InvalidNumber {
            line: self.line_no,
            value: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
SyncTeX Version:1
Input:1:/doc/main.tex
Output:pdf
Magnification:1000
Unit:1
X Offset:0
Y Offset:0
Content:
!123
{1
[1,1:0,0:39158276,51257262,0
(1,12:6578176,13156352:3289088,657818,0
g1,12:6578176,13156352
k1,12:7236176,13156352:-65781
x1,12:7894176,13156352
)
]
}1
Postamble:
Count:5
";

    #[test]
    fn classifier_order_is_significant() {
        // the element pattern would happily match a box opener
        let (kind, _) = classify("[1,1:0,0:10,10,0").unwrap();
        assert_eq!(kind, LineKind::VerticalOpen);
        let (kind, _) = classify("(1,1:0,0:10,10,0").unwrap();
        assert_eq!(kind, LineKind::HorizontalOpen);
        let (kind, _) = classify("k1,1:0,0:10").unwrap();
        assert_eq!(kind, LineKind::Element);
        assert!(classify("Postamble:").is_none());
    }

    #[test]
    fn parses_minimal_document() {
        let model = parse(MINIMAL).unwrap();
        assert_eq!(model.version, "1");
        assert_eq!(model.page_count, 1);
        assert_eq!(model.files[&1u32].path, "/doc/main.tex");
        assert_eq!(model.blocks.len(), 2);
        assert_eq!(model.horizontal_blocks, vec![BlockId(1)]);
        assert_eq!(model.elements.len(), 3);

        let page = &model.pages[&1u32];
        assert_eq!(page.blocks, vec![BlockId(0)]);
        assert_eq!(model.block(BlockId(0)).blocks, vec![BlockId(1)]);
        assert_eq!(model.block(BlockId(1)).parent, Parent::Block(BlockId(0)));
        assert_eq!(model.block(BlockId(0)).parent, Parent::Page(1));
    }

    #[test]
    fn element_inherits_block_height_and_keeps_missing_width() {
        let model = parse(MINIMAL).unwrap();
        let glue = model.element(ElementId(0));
        let kern = model.element(ElementId(1));
        assert_eq!(glue.kind, 'g');
        assert_eq!(glue.width, None);
        assert_eq!(glue.height, model.block(BlockId(1)).height);
        assert_eq!(kern.width, Some(to_length(-65781)));
    }

    #[test]
    fn vertical_blocks_keep_depth_horizontal_do_not() {
        let model = parse(MINIMAL).unwrap();
        assert_eq!(model.block(BlockId(0)).depth, Some(0.0));
        assert_eq!(model.block(BlockId(1)).depth, None);
    }

    #[test]
    fn offsets_are_converted() {
        let model = parse("SyncTeX Version:1\nX Offset:6578176\nY Offset:-657818\n").unwrap();
        assert!((model.offset.x - 100.0).abs() < 1e-9);
        assert_eq!(model.offset.y, to_length(-657818));
    }

    #[test]
    fn ignores_offsets_on_other_axes() {
        let model = parse("SyncTeX Version:1\nZ Offset:10\nx Offset:20\n").unwrap();
        assert_eq!(model.offset.x, 0.0);
        assert_eq!(model.offset.y, 0.0);
    }

    #[test]
    fn rejects_unbalanced_close() {
        let err = parse("SyncTeX Version:1\n{1\n]\n").unwrap_err();
        assert_eq!(err, FormatError::UnbalancedClose { line: 3, marker: ']' });
    }

    #[test]
    fn rejects_element_directly_on_page() {
        let text = "SyncTeX Version:1\nInput:1:a.tex\n{1\nx1,3:0,0\n}1\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err, FormatError::MissingContext { line: 4, marker: 'x' });
    }

    #[test]
    fn rejects_element_from_undeclared_input() {
        let text = "SyncTeX Version:1\n{1\n(2,3:0,0:1,1,0\nx2,3:0,0\n)\n}1\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err, FormatError::UnknownInput { line: 4, id: 2 });
    }

    #[test]
    fn rejects_text_ending_inside_a_page() {
        let truncated = MINIMAL.split("}1").next().unwrap();
        let err = parse(truncated).unwrap_err();
        assert_eq!(err, FormatError::Unterminated { line: 17, marker: '}' });
    }

    #[test]
    fn empty_text_gives_empty_model() {
        let model = parse("").unwrap();
        assert_eq!(model, SyncModel::default());
    }
}
