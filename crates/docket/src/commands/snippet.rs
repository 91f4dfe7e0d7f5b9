//! Print request code snippets (`docket snippet`).

use anyhow::Result;

use docket_playground::{PreparedRequest, SnippetLanguage, SnippetRenderer};

use crate::commands::request::RequestArgs;
use crate::config::ConfigFile;

/// Run the snippet command.
pub fn run(config: &ConfigFile, args: &RequestArgs, lang: &str) -> Result<()> {
    let request = args.resolve(config)?.prepare();
    println!("{}", render(&SnippetRenderer::new(), &request, lang)?);
    Ok(())
}

/// Render one language, or every language with a heading each for `all`.
fn render(renderer: &SnippetRenderer, request: &PreparedRequest, lang: &str) -> Result<String> {
    if lang.eq_ignore_ascii_case("all") {
        let sections: Vec<String> = renderer
            .render_all(request)?
            .into_iter()
            .map(|snippet| format!("# {}\n{}", snippet.language.label(), snippet.code))
            .collect();
        return Ok(sections.join("\n\n"));
    }

    let language: SnippetLanguage = lang.parse()?;
    Ok(renderer.render(language, request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_playground::{Method, RequestDescriptor};

    fn request() -> PreparedRequest {
        let mut request = RequestDescriptor::new(Method::Post, "https://api.acme.test/v1/chat");
        request.set_header("Content-Type", "application/json");
        request.set_body(r#"{"message":"it's"}"#);
        request.prepare()
    }

    #[test]
    fn renders_single_language() {
        let code = render(&SnippetRenderer::new(), &request(), "curl").unwrap();

        assert!(code.starts_with("curl --request POST"));
        assert!(!code.contains("# cURL"));
    }

    #[test]
    fn renders_all_languages() {
        let code = render(&SnippetRenderer::new(), &request(), "all").unwrap();

        for language in SnippetLanguage::ALL {
            assert!(code.contains(&format!("# {}\n", language.label())));
        }
    }

    #[test]
    fn rejects_unknown_language() {
        let err = render(&SnippetRenderer::new(), &request(), "ruby").unwrap_err();

        assert!(err.to_string().contains("ruby"));
    }
}
