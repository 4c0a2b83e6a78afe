//! Block-aware template parser and renderer.
//!
//! Blocks are HTML comments with explicit start/end markers:
//!
//! ```text
//! <!-- BEGIN ROWS items -->      ...  <!-- END ROWS items -->
//! <!-- BEGIN SECTION stamp -->   ...  <!-- END SECTION stamp -->
//! <!-- BEGIN COL unitPrice -->   ...  <!-- END COL unitPrice -->
//! ```
//!
//! `ROWS` repeats its body once per element of a bundle list, `SECTION` and
//! `COL` keep their body only when visible. Blocks nest. Other comments pass
//! through untouched. Scalars are written as `${NAME}`; unresolved names
//! render as an empty string.

use std::fmt;

use crate::bundle::derive::value_text;
use crate::bundle::{Fields, LedgerColumn};

use super::error::TemplateError;

/// Optional document section toggled by the visibility profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateSection {
    /// Company stamp image.
    Stamp,
    /// Per-type summary table.
    TypeSummary,
    /// Notice block.
    Notice,
    /// Bank account block.
    BankAccount,
    /// Contact block.
    Contact,
    /// "Show more" affordance for long item lists.
    ShowMore,
}

impl TemplateSection {
    /// Returns the marker name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stamp => "stamp",
            Self::TypeSummary => "typeSummary",
            Self::Notice => "notice",
            Self::BankAccount => "bankAccount",
            Self::Contact => "contact",
            Self::ShowMore => "showMore",
        }
    }

    /// Parses a marker name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "stamp" => Some(Self::Stamp),
            "typeSummary" => Some(Self::TypeSummary),
            "notice" => Some(Self::Notice),
            "bankAccount" => Some(Self::BankAccount),
            "contact" => Some(Self::Contact),
            "showMore" => Some(Self::ShowMore),
            _ => None,
        }
    }
}

/// Values and visibility a template is rendered against.
pub trait TemplateData {
    /// Resolves a scalar placeholder.
    fn scalar(&self, name: &str) -> Option<String>;

    /// Elements of a repeated list, or `None` if the list is unknown.
    fn rows(&self, list: &str) -> Option<&[Fields]>;

    /// Whether a section renders.
    fn section_visible(&self, section: TemplateSection) -> bool;

    /// Whether a column renders.
    fn column_visible(&self, column: LedgerColumn) -> bool;
}

/// How substituted values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Escape HTML special characters.
    Html,
    /// Insert values verbatim (subject lines).
    Plain,
}

impl Escape {
    fn write(self, value: &str, out: &mut String) {
        match self {
            Self::Plain => out.push_str(value),
            Self::Html => {
                for c in value.chars() {
                    match c {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        '"' => out.push_str("&quot;"),
                        '\'' => out.push_str("&#39;"),
                        _ => out.push(c),
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Rows(String),
    Section(TemplateSection),
    Column(LedgerColumn),
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(list) => write!(f, "ROWS {list}"),
            Self::Section(section) => write!(f, "SECTION {}", section.as_str()),
            Self::Column(column) => write!(f, "COL {column}"),
        }
    }
}

enum Marker {
    Begin(Block),
    End(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Placeholder(String),
    Block { block: Block, body: Vec<Node> },
}

struct OpenBlock {
    block: Block,
    body: Vec<Node>,
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parses template source.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed, unknown, mismatched or unclosed
    /// block markers.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut root = Vec::new();
        let mut open: Vec<OpenBlock> = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("<!--") {
            let after = &rest[start + 4..];
            let Some(end) = after.find("-->") else {
                break;
            };
            let target = match open.last_mut() {
                Some(frame) => &mut frame.body,
                None => &mut root,
            };
            push_text(target, &rest[..start]);

            match parse_marker(&after[..end])? {
                None => push_text(target, &rest[start..start + 4 + end + 3]),
                Some(Marker::Begin(block)) => open.push(OpenBlock {
                    block,
                    body: Vec::new(),
                }),
                Some(Marker::End(block)) => {
                    let frame = open
                        .pop()
                        .ok_or_else(|| TemplateError::EndWithoutBegin(block.to_string()))?;
                    if frame.block != block {
                        return Err(TemplateError::Mismatched {
                            open: frame.block.to_string(),
                            found: block.to_string(),
                        });
                    }
                    let target = match open.last_mut() {
                        Some(parent) => &mut parent.body,
                        None => &mut root,
                    };
                    target.push(Node::Block {
                        block: frame.block,
                        body: frame.body,
                    });
                }
            }
            rest = &after[end + 3..];
        }

        if let Some(frame) = open.last() {
            return Err(TemplateError::Unclosed(frame.block.to_string()));
        }
        push_text(&mut root, rest);
        Ok(Self { nodes: root })
    }

    /// Parses template bytes loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns `NotUtf8` for invalid encoding, or any parse error.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, TemplateError> {
        let source =
            std::str::from_utf8(bytes).map_err(|_| TemplateError::NotUtf8(name.to_string()))?;
        Self::parse(source)
    }

    /// Renders the template.
    ///
    /// # Errors
    ///
    /// Returns `UnknownList` if a `ROWS` block names a list the data lacks.
    pub fn render(&self, data: &dyn TemplateData, escape: Escape) -> Result<String, TemplateError> {
        let mut out = String::new();
        render_nodes(&self.nodes, data, None, escape, &mut out)?;
        Ok(out)
    }
}

fn render_nodes(
    nodes: &[Node],
    data: &dyn TemplateData,
    row: Option<&Fields>,
    escape: Escape,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Placeholder(name) => {
                let value = row
                    .and_then(|fields| fields.get(name))
                    .map(value_text)
                    .or_else(|| data.scalar(name))
                    .unwrap_or_default();
                escape.write(&value, out);
            }
            Node::Block { block, body } => match block {
                Block::Rows(list) => {
                    let rows = data
                        .rows(list)
                        .ok_or_else(|| TemplateError::UnknownList(list.clone()))?;
                    for fields in rows {
                        render_nodes(body, data, Some(fields), escape, out)?;
                    }
                }
                Block::Section(section) => {
                    if data.section_visible(*section) {
                        render_nodes(body, data, row, escape, out)?;
                    }
                }
                Block::Column(column) => {
                    if data.column_visible(*column) {
                        render_nodes(body, data, row, escape, out)?;
                    }
                }
            },
        }
    }
    Ok(())
}

fn parse_marker(comment: &str) -> Result<Option<Marker>, TemplateError> {
    let mut tokens = comment.split_whitespace();
    let begin = match tokens.next() {
        Some("BEGIN") => true,
        Some("END") => false,
        _ => return Ok(None),
    };
    let (Some(kind), Some(name), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(TemplateError::MalformedMarker(comment.trim().to_string()));
    };
    let block = match kind {
        "ROWS" => Block::Rows(name.to_string()),
        "SECTION" => Block::Section(
            TemplateSection::parse(name)
                .ok_or_else(|| TemplateError::UnknownSection(name.to_string()))?,
        ),
        "COL" => Block::Column(
            LedgerColumn::from_key(name)
                .ok_or_else(|| TemplateError::UnknownColumn(name.to_string()))?,
        ),
        _ => return Err(TemplateError::MalformedMarker(comment.trim().to_string())),
    };
    Ok(Some(if begin {
        Marker::Begin(block)
    } else {
        Marker::End(block)
    }))
}

/// Appends text, splitting out `${NAME}` placeholders.
fn push_text(nodes: &mut Vec<Node>, text: &str) {
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let name = &rest[start + 2..start + 2 + len];
        if is_placeholder_name(name) {
            push_literal(nodes, &rest[..start]);
            nodes.push(Node::Placeholder(name.to_string()));
        } else {
            push_literal(nodes, &rest[..start + 2 + len + 1]);
        }
        rest = &rest[start + 2 + len + 1..];
    }
    push_literal(nodes, rest);
}

fn push_literal(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}
