//! Clientlib tag pattern.
//!
//! # Grammar
//! ```text
//! <(?:script|link) .* (?:src|href)="  PREFIX  [ .KEY ]  .(?:css|js)"  TAIL
//!
//! PREFIX  clientlibs_expression, or public_path when absent (used as a regex)
//! KEY     alternation of the key format expressions
//! TAIL    a trailing attribute up to `>`, `...></script>`, or a bare `>`
//! ```
//!
//! The separator before the extension is a regex `.`, matching any character.
//! This is targeted matching, not HTML parsing: `.*` is greedy within a line,
//! so two clientlib tags on the same line collapse into one match.

use regex::Regex;

use crate::config::{ConfigError, PluginOptions};

const TAG_OPEN: &str = r#"<(?:script|link).*(?:src|href)=""#;
const TAG_EXTENSION: &str = r#".(?:css|js)""#;
const TAG_TAIL: &str = r#"(?:[\w+]=['"][^'"]*['"][^>]*>|[^>]*></script>|>)"#;

/// A clientlib reference found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientlibMatch<'a> {
    /// The full matched tag text.
    pub text: &'a str,
    /// Byte offset of the match in the document.
    pub start: usize,
}

/// Compiled pattern matching clientlib `<script>`/`<link>` tags.
#[derive(Debug, Clone)]
pub struct ClientlibPattern {
    regex: Regex,
}

impl ClientlibPattern {
    /// Build the pattern from plugin options.
    pub fn compile(options: &PluginOptions) -> Result<Self, ConfigError> {
        let keys = options.key_format_expressions().join("|");
        let source = format!(
            "{TAG_OPEN}{prefix}(?:\\.(?:{keys}))?{TAG_EXTENSION}{TAG_TAIL}",
            prefix = options.clientlib_prefix(),
        );
        Ok(Self {
            regex: Regex::new(&source)?,
        })
    }

    /// All non-overlapping matches in document order.
    pub fn find_all<'a>(&self, html: &'a str) -> Vec<ClientlibMatch<'a>> {
        self.regex
            .find_iter(html)
            .map(|m| ClientlibMatch {
                text: m.as_str(),
                start: m.start(),
            })
            .collect()
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
