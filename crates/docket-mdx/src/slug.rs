//! Heading slugs and per-page anchor id allocation.

use std::collections::HashSet;

/// Convert heading text to an anchor-safe slug.
///
/// Keeps ASCII alphanumerics, `_`, Latin letters and CJK ideographs,
/// lower-cased. Whitespace runs become a single `-`; everything else,
/// `-` included, is dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_dash = true;

    for c in text.to_lowercase().chars() {
        if is_slug_char(c) {
            slug.push(c);
            last_was_dash = false;
        } else if c.is_whitespace() && !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    slug
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || is_latin_letter(c) || is_cjk(c)
}

fn is_latin_letter(c: char) -> bool {
    c.is_alphabetic() && matches!(c as u32, 0x00C0..=0x024F | 0x1E00..=0x1EFF)
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF)
}

/// Allocates unique anchor ids for the headings of a single page.
#[derive(Debug, Default)]
pub struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an explicit id (e.g. from `{#custom}`) as taken.
    pub fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }

    /// Assign an id for a heading.
    ///
    /// `ordinal` is the 1-based position of the heading among all headings
    /// of the page. Text that slugifies to nothing falls back to
    /// `heading-<ordinal>`. A taken slug gets the first free `-1`, `-2`, ...
    /// suffix.
    pub fn assign(&mut self, text: &str, ordinal: usize) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = format!("heading-{}", ordinal);
        }
        self.claim(&base)
    }

    /// Take `base` if free, otherwise its first free suffixed variant.
    pub fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        self.used.insert(candidate.clone());
        candidate
    }
}
