//! Front matter and tags
//!
//! Entries may begin with a metadata block fenced by lines containing only
//! `---`:
//!
//! ```text
//! ---
//! tags: [rust, cli]
//! ---
//! body text
//! ```
//!
//! The block only counts when the very first line is a fence and a closing
//! fence follows. Otherwise the whole input is body.
//!
//! Only the `tags` field is interpreted. Both the inline form
//! (`tags: [a, b]` or `tags: a, b`) and the block list form are accepted:
//!
//! ```text
//! tags:
//!   - a
//!   - b
//! ```

use serde::{Deserialize, Serialize};

const FENCE: &[u8] = b"---";
const TAGS_KEY: &str = "tags:";

/// An entry split into its metadata block and body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Lines between the fences, without the fences themselves
    pub block: Option<&'a [u8]>,
    /// Everything after the closing fence (or the whole input)
    pub body: &'a [u8],
}

impl<'a> FrontMatter<'a> {
    /// Splits raw entry content into metadata block and body
    pub fn split(content: &'a [u8]) -> Self {
        let no_block = Self {
            block: None,
            body: content,
        };

        let mut lines = LineSpans::new(content);
        match lines.next() {
            Some((start, end)) if content[start..end].trim_ascii() == FENCE => {}
            _ => return no_block,
        }

        let block_start = lines.offset();
        for (start, end) in lines {
            if content[start..end].trim_ascii() == FENCE {
                let body_start = (end + 1).min(content.len());
                return Self {
                    block: Some(&content[block_start..start]),
                    body: &content[body_start..],
                };
            }
        }

        no_block
    }

    /// Parses the tag set from the metadata block, if any
    pub fn tags(&self) -> TagSet {
        match self.block {
            Some(block) => parse_tag_block(&String::from_utf8_lossy(block)),
            None => TagSet::default(),
        }
    }
}

/// Returns the body of an entry with any metadata block removed
pub fn strip_front_matter(content: &[u8]) -> &[u8] {
    FrontMatter::split(content).body
}

/// Parses the tags declared in an entry's metadata block
pub fn parse_tags(content: &[u8]) -> TagSet {
    FrontMatter::split(content).tags()
}

/// Iterates `(start, end)` byte spans of `\n`-separated lines, excluding the newline
struct LineSpans<'a> {
    content: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> LineSpans<'a> {
    fn new(content: &'a [u8]) -> Self {
        Self {
            content,
            pos: 0,
            done: false,
        }
    }

    /// Byte offset where the next line starts
    fn offset(&self) -> usize {
        self.pos
    }
}

impl Iterator for LineSpans<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = self.pos;
        match self.content[start..].iter().position(|&b| b == b'\n') {
            Some(rel) => {
                self.pos = start + rel + 1;
                Some((start, start + rel))
            }
            None => {
                self.done = true;
                self.pos = self.content.len();
                Some((start, self.content.len()))
            }
        }
    }
}

fn parse_tag_block(block: &str) -> TagSet {
    let mut tags = TagSet::default();
    let mut lines = block.lines().map(str::trim);

    while let Some(line) = lines.next() {
        let Some(value) = line.strip_prefix(TAGS_KEY) else {
            continue;
        };

        let value = value.trim();
        if !value.is_empty() {
            for tag in split_inline_list(value) {
                tags.insert(tag);
            }
        } else {
            for next in lines.by_ref() {
                if next.is_empty() {
                    continue;
                }
                match next.strip_prefix('-') {
                    Some(item) => {
                        tags.insert(normalize_tag(item));
                    }
                    None => break,
                }
            }
        }

        // Only the first tags field is honored
        break;
    }

    tags
}

fn split_inline_list(raw: &str) -> impl Iterator<Item = &str> {
    let raw = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .map(str::trim)
        .unwrap_or(raw);

    raw.split(',').map(normalize_tag).filter(|t| !t.is_empty())
}

fn normalize_tag(raw: &str) -> &str {
    raw.trim().trim_matches(&['\'', '"'][..]).trim()
}

/// Ordered tag list, unique by case-insensitive comparison
///
/// The first spelling seen for a tag is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag unless empty or already present (ignoring case)
    pub fn insert(&mut self, tag: &str) -> bool {
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Case-insensitive membership check (surrounding whitespace ignored)
    pub fn contains(&self, tag: &str) -> bool {
        let needle = tag.trim().to_lowercase();
        self.0.iter().any(|t| t.trim().to_lowercase() == needle)
    }

    /// Returns true if every required tag is present
    pub fn contains_all<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|r| self.contains(r.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::default();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}
