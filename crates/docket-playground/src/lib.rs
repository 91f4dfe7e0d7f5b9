//! Request playground for docket API pages.
//!
//! Builds HTTP requests from editable parameters, sends them, captures the
//! response for display, and renders the same request as code snippets.

pub mod client;
pub mod playground;
pub mod request;
pub mod snippet;

pub use client::{send, PlaygroundResponse, ResponseBody};
pub use playground::Playground;
pub use request::{
    endpoint_url, parse_header, Method, PlaygroundDefaults, PreparedRequest, RequestDescriptor,
    RequestError,
};
pub use snippet::{Snippet, SnippetError, SnippetLanguage, SnippetRenderer};
