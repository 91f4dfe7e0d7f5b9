//! Markdown/MDX page parsing for docket.
//!
//! Extracts YAML frontmatter, renders Markdown bodies to HTML with unique
//! heading anchors and highlighted code blocks, and collects a table of
//! contents.

pub mod frontmatter;
pub mod highlight;
pub mod parser;
pub mod slug;

pub use frontmatter::{Frontmatter, FrontmatterError};
pub use highlight::{code_block, highlight_code, theme_css};
pub use parser::{
    parse_mdx, render_markdown, rewrite_link, ParseError, ParsedDoc, RenderOptions, RenderedDoc,
    TocEntry,
};
pub use slug::{slugify, HeadingIds};
