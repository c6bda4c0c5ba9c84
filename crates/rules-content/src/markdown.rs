//! Markdown structure scanning
//!
//! [`Outline::parse`] makes one pass over a document and records headings,
//! fenced code blocks, pipe tables and bullet items, each tagged with its
//! 1-based line number and the nearest heading above it. Lines inside fenced
//! code are only ever part of a code block.

use std::sync::LazyLock;

use regex::Regex;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)\s+(.+?)\s*$").expect("heading regex"));

static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|[-:\s|]+\|$").expect("separator regex"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.+?)\s*$").expect("bullet regex"));

/// Two or more blank lines in a row.
static MULTIPLE_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string after the opening fence, lowercased. Empty when unlabeled.
    pub language: String,
    pub content: String,
    /// Line of the opening fence.
    pub line: usize,
    pub heading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Line of the header row.
    pub line: usize,
    pub heading: Option<String>,
}

impl Table {
    /// Index of the first header that contains `needle`, case-insensitively.
    pub fn column(&self, needle: &str) -> Option<usize> {
        let needle = needle.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    pub text: String,
    pub line: usize,
    pub heading: Option<String>,
}

/// Structural summary of a markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub headings: Vec<Heading>,
    pub code_blocks: Vec<CodeBlock>,
    pub tables: Vec<Table>,
    pub bullets: Vec<Bullet>,
}

struct OpenFence {
    language: String,
    line: usize,
    heading: Option<String>,
    body: Vec<String>,
}

impl Outline {
    pub fn parse(content: &str) -> Self {
        let mut outline = Self::default();
        let mut current_heading: Option<String> = None;
        let mut fence: Option<OpenFence> = None;
        let mut table_lines: Vec<(usize, &str)> = Vec::new();

        for (idx, raw_line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw_line.trim();

            if fence.is_some() {
                if trimmed.starts_with("```") {
                    if let Some(done) = fence.take() {
                        outline.code_blocks.push(CodeBlock {
                            language: done.language,
                            content: done.body.join("\n"),
                            line: done.line,
                            heading: done.heading,
                        });
                    }
                } else if let Some(open) = fence.as_mut() {
                    open.body.push(raw_line.to_string());
                }
                continue;
            }

            if trimmed.starts_with('|') {
                table_lines.push((line_no, trimmed));
                continue;
            }
            outline.flush_table(&mut table_lines, &current_heading);

            if let Some(info) = trimmed.strip_prefix("```") {
                fence = Some(OpenFence {
                    language: info.trim().to_lowercase(),
                    line: line_no,
                    heading: current_heading.clone(),
                    body: Vec::new(),
                });
            } else if let Some(caps) = HEADING.captures(raw_line) {
                let text = caps[2].to_string();
                outline.headings.push(Heading {
                    level: caps[1].len(),
                    text: text.clone(),
                    line: line_no,
                });
                current_heading = Some(text);
            } else if let Some(caps) = BULLET.captures(raw_line) {
                outline.bullets.push(Bullet {
                    text: caps[1].to_string(),
                    line: line_no,
                    heading: current_heading.clone(),
                });
            }
        }
        outline.flush_table(&mut table_lines, &current_heading);
        outline
    }

    fn flush_table(&mut self, lines: &mut Vec<(usize, &str)>, heading: &Option<String>) {
        let taken = std::mem::take(lines);
        if taken.len() < 3 || !TABLE_SEPARATOR.is_match(taken[1].1) {
            return;
        }
        self.tables.push(Table {
            headers: split_cells(taken[0].1),
            rows: taken[2..].iter().map(|(_, row)| split_cells(row)).collect(),
            line: taken[0].0,
            heading: heading.clone(),
        });
    }

    /// Heading texts in document order.
    pub fn heading_texts(&self) -> impl Iterator<Item = &str> {
        self.headings.iter().map(|h| h.text.as_str())
    }
}

fn split_cells(row: &str) -> Vec<String> {
    let inner = row.trim().trim_start_matches('|').trim_end_matches('|');
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Strip trailing spaces and tabs from every line, keeping line endings.
pub fn trim_trailing_whitespace(text: &str) -> String {
    let mut out: String = text
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    if text.ends_with('\n') && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Collapse runs of blank lines down to a single blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    MULTIPLE_BLANK_LINES.replace_all(text, "\n\n").into_owned()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
