//! Bullet and numbered lists.
//!
//! Marker lines become [`ListItemNode`]s and are fed to a [`ListBuilder`],
//! which keeps a stack of open levels and emits properly nested markup.
//!
//! Depth is `ceil(indent / 4)` clamped to one more than the previous item's
//! depth, so a single over-indented line nests by one level only. The first
//! item of a run is always at depth 0.

use regex::Regex;
use std::sync::LazyLock;

use super::{split_lines, PreformattedGuard};
use crate::error::{Error, Result};

/// Indentation width of one nesting level.
pub const INDENT_WIDTH: usize = 4;

static RE_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)([-+*]|\d+\.)[ \t]+(\S.*)$").unwrap());

/// Kind of list a marker opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTag {
    /// `1.`, `2.`, ...
    Ordered,
    /// `-`, `+`, `*`
    Unordered,
}

impl ListTag {
    fn open(self) -> &'static str {
        match self {
            ListTag::Ordered => "<ol>",
            ListTag::Unordered => "<ul>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            ListTag::Ordered => "</ol>",
            ListTag::Unordered => "</ul>",
        }
    }
}

/// One list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemNode {
    pub depth: usize,
    pub tag: ListTag,
    pub content: String,
}

/// Parses a marker line. `previous_depth` is the depth of the item directly
/// above, or `None` if this line starts a new list.
pub fn parse_item(line: &str, previous_depth: Option<usize>) -> Option<ListItemNode> {
    let caps = RE_ITEM.captures(line)?;

    let indent = caps[1].chars().count();
    let depth = match previous_depth {
        Some(previous) => indent.div_ceil(INDENT_WIDTH).min(previous + 1),
        None => 0,
    };
    let tag = if caps[2].ends_with('.') {
        ListTag::Ordered
    } else {
        ListTag::Unordered
    };

    Some(ListItemNode {
        depth,
        tag,
        content: caps[3].trim_end().to_string(),
    })
}

#[derive(Debug, Clone, Copy)]
struct Level {
    depth: usize,
    tag: ListTag,
}

/// Stack machine that turns a run of items into nested list markup.
///
/// Every open level holds an open list element and an open `<li>`.
#[derive(Debug, Default)]
pub struct ListBuilder {
    stack: Vec<Level>,
    html: String,
}

impl ListBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any list level is open.
    pub fn is_open(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Current nesting depth (number of open levels).
    pub fn open_levels(&self) -> usize {
        self.stack.len()
    }

    /// Adds an item.
    pub fn push(&mut self, node: &ListItemNode) -> Result<()> {
        while self.stack.last().is_some_and(|top| top.depth > node.depth) {
            self.close_level()?;
        }

        match self.stack.last().copied() {
            Some(top) if top.depth == node.depth && top.tag == node.tag => {
                self.html.push_str("</li><li>");
            }
            Some(top) if top.depth == node.depth => {
                self.close_level()?;
                self.open_level(node.depth, node.tag);
            }
            top => {
                // Bridge a gap of more than one level with empty items.
                let first = top.map_or(0, |level| level.depth + 1);
                for depth in first..node.depth {
                    self.open_level(depth, node.tag);
                }
                self.open_level(node.depth, node.tag);
            }
        }

        self.html.push_str(&node.content);
        Ok(())
    }

    /// Closes every open level and returns the accumulated markup.
    pub fn finish(&mut self) -> Result<String> {
        while self.is_open() {
            self.close_level()?;
        }
        Ok(std::mem::take(&mut self.html))
    }

    fn open_level(&mut self, depth: usize, tag: ListTag) {
        self.html.push_str(tag.open());
        self.html.push_str("<li>");
        self.stack.push(Level { depth, tag });
    }

    fn close_level(&mut self) -> Result<()> {
        let level = self
            .stack
            .pop()
            .ok_or_else(|| Error::fault("list", "closed a level that was never opened"))?;
        self.html.push_str("</li>");
        self.html.push_str(level.tag.close());
        Ok(())
    }
}

/// Converts runs of marker lines to nested `<ul>`/`<ol>` markup.
///
/// Lists are emitted without line breaks. Every other line is emitted
/// followed by `\n` after any open list is closed.
pub fn convert(input: &str) -> Result<String> {
    let mut output = String::with_capacity(input.len() + 32);
    let mut builder = ListBuilder::new();
    let mut previous_depth = None;
    let mut guard = PreformattedGuard::default();

    for line in split_lines(input) {
        let item = if guard.observe(line) {
            None
        } else {
            parse_item(line, previous_depth)
        };

        match item {
            Some(node) => {
                builder.push(&node)?;
                previous_depth = Some(node.depth);
            }
            None => {
                output.push_str(&builder.finish()?);
                previous_depth = None;
                output.push_str(line);
                output.push('\n');
            }
        }
    }

    output.push_str(&builder.finish()?);
    Ok(output)
}
