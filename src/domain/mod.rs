//! Core domain types for pea
//!
//! - [`EntryName`] - canonical, validated entry identifiers
//! - [`FrontMatter`] / [`TagSet`] - optional metadata block and its tags

mod frontmatter;
mod name;

pub use frontmatter::{parse_tags, strip_front_matter, FrontMatter, TagSet};
pub use name::{is_reserved, EntryName, NameError, RESERVED_NAMES};
