//! Fenced front-matter blocks
//!
//! A block opens on the first line with `---` or `+++` and closes on the next
//! line holding the same fence. Anything after the closing fence is body.

use std::ops::Range;

use serde_yaml::{Mapping, Value};

use crate::{Error, Result};

/// Delimiter style of a front-matter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fence {
    Dashes,
    Pluses,
}

impl Fence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashes => "---",
            Self::Pluses => "+++",
        }
    }

    fn from_line(line: &str) -> Option<Self> {
        match line.trim_end() {
            "---" => Some(Self::Dashes),
            "+++" => Some(Self::Pluses),
            _ => None,
        }
    }
}

/// A located front-matter block, borrowed from the scanned content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    pub fence: Fence,
    /// Text between the fences, including its trailing newline.
    pub raw: &'a str,
    /// Byte range of `raw` within the scanned content.
    pub raw_range: Range<usize>,
    /// Everything after the closing fence line.
    pub body: &'a str,
    /// Zero-based line index of the closing fence.
    pub closing_line: usize,
}

/// Outcome of looking for a front-matter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split<'a> {
    /// The first line is not a fence.
    Absent,
    /// An opening fence with no matching closing fence.
    Malformed(Fence),
    Block(FrontmatterBlock<'a>),
}

impl<'a> Split<'a> {
    pub fn block(self) -> Option<FrontmatterBlock<'a>> {
        match self {
            Self::Block(block) => Some(block),
            Self::Absent | Self::Malformed(_) => None,
        }
    }
}

pub fn split(content: &str) -> Split<'_> {
    let bom = if content.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
    let mut lines = content[bom..].split_inclusive('\n');

    let Some(fence) = lines.next().and_then(Fence::from_line) else {
        return Split::Absent;
    };

    let raw_start = bom + fence_line_len(&content[bom..]);
    let mut offset = raw_start;
    for (idx, line) in lines.enumerate() {
        if line.trim_end() == fence.as_str() {
            let body_start = offset + line.len();
            return Split::Block(FrontmatterBlock {
                fence,
                raw: &content[raw_start..offset],
                raw_range: raw_start..offset,
                body: &content[body_start..],
                closing_line: idx + 1,
            });
        }
        offset += line.len();
    }

    Split::Malformed(fence)
}

/// Like [`split`], but an unclosed block is an error.
pub fn split_strict(content: &str) -> Result<Option<FrontmatterBlock<'_>>> {
    match split(content) {
        Split::Absent => Ok(None),
        Split::Malformed(fence) => Err(Error::MalformedFrontmatter {
            fence: fence.as_str(),
        }),
        Split::Block(block) => Ok(Some(block)),
    }
}

fn fence_line_len(text: &str) -> usize {
    text.find('\n').map_or(text.len(), |idx| idx + 1)
}

/// Parse raw front-matter text into a string-keyed mapping.
///
/// Returns `Ok(None)` for an empty block.
pub fn parse_mapping(raw: &str) -> Result<Option<Mapping>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_yaml::from_str::<Value>(raw)? {
        Value::Null => Ok(None),
        Value::Mapping(map) if map.keys().all(Value::is_string) => Ok(Some(map)),
        _ => Err(Error::NotAMapping),
    }
}

/// Best-effort read of a document's front-matter mapping.
///
/// Any failure (no block, unclosed block, bad YAML, non-mapping) reads as
/// `None`; validation treats all of them as "no front-matter".
pub fn read_frontmatter(content: &str) -> Option<Mapping> {
    let block = split(content).block()?;
    parse_mapping(block.raw).ok().flatten()
}
