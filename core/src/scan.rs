#![deny(missing_docs)]

//! # Structural Scan
//!
//! A minimal line-oriented scan of the manifest. It understands just enough
//! structure to bound an insertion: section headers and footers, object
//! blocks inside a section, and parenthesised lists inside an object. It is
//! not a grammar parser; everything outside the scanned region is opaque.

use crate::ident::ID_WIDTH;
use regex::Regex;
use std::sync::OnceLock;

/// A half-open byte range into the manifest text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

/// Returns the offset of the first byte of the line containing `pos`.
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Returns the offset just past the `\n` ending the line containing `pos`,
/// or `text.len()` on the last line.
pub fn line_end(text: &str, pos: usize) -> usize {
    text[pos..]
        .find('\n')
        .map(|i| pos + i + 1)
        .unwrap_or(text.len())
}

/// Finds `marker` at or after `from` and returns the end of its line.
pub fn line_end_after(text: &str, marker: &str, from: usize) -> Option<usize> {
    let hit = text.get(from..)?.find(marker)? + from;
    Some(line_end(text, hit))
}

/// Leading whitespace of the line starting at `start`.
pub fn indent_at(text: &str, start: usize) -> &str {
    let line = &text[start..line_end(text, start)];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Full lines between `span.start` and `span.end`, as spans.
pub fn lines(text: &str, span: Span) -> Vec<Span> {
    let mut out = Vec::new();
    let mut pos = span.start;
    while pos < span.end {
        let end = line_end(text, pos).min(span.end);
        out.push(Span { start: pos, end });
        pos = end;
    }
    out
}

/// The body of a `/* Begin X section */` … `/* End X section */` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// End of the header line.
    pub header_end: usize,
    /// Start of the footer line.
    pub footer_start: usize,
}

impl Section {
    /// The lines strictly between header and footer.
    pub fn body(&self) -> Span {
        Span {
            start: self.header_end,
            end: self.footer_start,
        }
    }
}

/// Why a section could not be bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionMiss {
    /// No `/* Begin X section */` line.
    Header,
    /// Header present but no matching `/* End X section */`.
    Footer,
}

/// Locates the section holding objects of the given `isa`.
pub fn find_section(text: &str, isa: &str) -> Result<Section, SectionMiss> {
    let header = format!("/* Begin {} section */", isa);
    let footer = format!("/* End {} section */", isa);

    let header_end = line_end_after(text, &header, 0).ok_or(SectionMiss::Header)?;
    let footer_pos = text[header_end..]
        .find(&footer)
        .map(|i| header_end + i)
        .ok_or(SectionMiss::Footer)?;

    Ok(Section {
        header_end,
        footer_start: line_start(text, footer_pos),
    })
}

/// One `ID /* label */ = { … };` object inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBlock<'a> {
    /// The object identifier.
    pub id: &'a str,
    /// The comment label, if the writer emitted one.
    pub label: Option<&'a str>,
    /// Header line start through the end of the closing line.
    pub span: Span,
}

fn object_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^([ \t]*)([0-9A-F]{24})(?: /\* (.*?) \*/)? = \{(.*)$").expect("Invalid regex")
    })
}

/// Lists the objects declared in `body`, one-line and multi-line alike.
///
/// A multi-line object ends at the first `};` line with the header's indent.
/// An unterminated object runs to the end of `body`.
pub fn objects(text: &str, body: Span) -> Vec<ObjectBlock<'_>> {
    let mut out = Vec::new();
    let all = lines(text, body);
    let mut i = 0;
    while i < all.len() {
        let line = &text[all[i].start..all[i].end];
        let Some(caps) = object_header().captures(line.trim_end_matches(['\n', '\r'])) else {
            i += 1;
            continue;
        };

        let indent = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(4).map_or("", |m| m.as_str()).trim();
        let start = all[i].start;
        let id_match = caps.get(2).map(|m| (m.start(), m.end()));
        let label_match = caps.get(3).map(|m| (m.start(), m.end()));

        let mut last = i;
        if !rest.ends_with("};") {
            let close = format!("{}}};", indent);
            last = all.len() - 1;
            for (j, span) in all.iter().enumerate().skip(i + 1) {
                if text[span.start..span.end].trim_end() == close {
                    last = j;
                    break;
                }
            }
        }

        if let Some((s, e)) = id_match {
            out.push(ObjectBlock {
                id: &text[start + s..start + e],
                label: label_match.map(|(s, e)| &text[start + s..start + e]),
                span: Span {
                    start,
                    end: all[last].end,
                },
            });
        }
        i = last + 1;
    }
    out
}

/// A `key = (` … `);` list inside an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBlock {
    /// Start of the opening line.
    pub open_start: usize,
    /// End of the opening line.
    pub open_end: usize,
    /// Start of the closing `);` line.
    pub close_start: usize,
    /// The item lines between open and close.
    pub items: Vec<Span>,
}

/// Why a list could not be bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMiss {
    /// No `key = (` inside the object.
    Open,
    /// Opened but never closed inside the object.
    Close,
}

/// Locates the `key = (` list inside `object`.
pub fn find_list(text: &str, object: Span, key: &str) -> Result<ListBlock, ListMiss> {
    let opener = format!("{} = (", key);

    let open_pos = lines(text, object)
        .into_iter()
        .find(|span| text[span.start..span.end].trim_start().starts_with(&opener))
        .map(|span| span.start)
        .ok_or(ListMiss::Open)?;

    let open_end = line_end(text, open_pos);
    let after_open = Span {
        start: open_end,
        end: object.end,
    };

    let mut items = Vec::new();
    for span in lines(text, after_open) {
        let line = text[span.start..span.end].trim();
        if line.starts_with(");") {
            return Ok(ListBlock {
                open_start: open_pos,
                open_end,
                close_start: span.start,
                items,
            });
        }
        if !line.is_empty() {
            items.push(span);
        }
    }
    Err(ListMiss::Close)
}

/// True if the object's body assigns `key` to `value` (quoted or bare).
pub fn object_has_value(text: &str, object: Span, key: &str, value: &str) -> bool {
    let block = &text[object.start..object.end];
    let bare = format!("{} = {};", key, value);
    let quoted = format!("{} = \"{}\";", key, value);
    block.contains(&bare) || block.contains(&quoted)
}

/// Reads the bare identifier assigned to `key` inside the object.
pub fn object_ref<'a>(text: &'a str, object: Span, key: &str) -> Option<&'a str> {
    let block = &text[object.start..object.end];
    let prefix = format!("{} = ", key);
    let at = block.find(&prefix)? + prefix.len();
    let id = block[at..].get(..ID_WIDTH)?;
    id.chars()
        .all(|c| c.is_ascii_hexdigit())
        .then_some(id)
}
