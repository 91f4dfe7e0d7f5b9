//! Syntax highlighting for code blocks and request snippets.
//!
//! Code is tokenized with syntect and emitted as `<span>` elements carrying
//! `hl-` prefixed scope classes. The matching colours come from
//! [`theme_css`], so pages stay free of inline styles.

use std::sync::OnceLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Class style shared by the generated markup and stylesheet.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Theme used for the generated stylesheet.
const THEME: &str = "InspiredGitHub";

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Highlight `code` as `lang` (an extension or language name such as
/// `bash`, `json` or `python`).
///
/// Returns HTML for the inside of a `<code>` element. Unknown languages are
/// returned as escaped plain text.
pub fn highlight_code(code: &str, lang: &str) -> String {
    let syntaxes = syntax_set();
    let Some(syntax) = syntaxes.find_syntax_by_token(lang) else {
        return escape_html(code);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntaxes, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!("Falling back to plain {} code block: {}", lang, e);
            return escape_html(code);
        }
    }

    generator.finalize()
}

/// A complete `<pre><code>` block for `code`, highlighted as `lang`.
pub fn code_block(code: &str, lang: &str) -> String {
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        escape_html(lang),
        highlight_code(code, lang)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Stylesheet rules for the classes emitted by [`highlight_code`].
pub fn theme_css() -> Result<String, syntect::Error> {
    let themes = ThemeSet::load_defaults();
    match themes.themes.get(THEME) {
        Some(theme) => css_for_theme_with_class_style(theme, CLASS_STYLE),
        None => Ok(String::new()),
    }
}
