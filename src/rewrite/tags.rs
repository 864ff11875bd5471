//! Clientlib tag replacement.
//!
//! Every matched clientlib tag except the last is removed; the last one is
//! replaced by the development markup. Replacement works on the matched text
//! (first remaining occurrence), not on byte offsets.

use crate::rewrite::pattern::ClientlibPattern;

/// Result of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub html: String,
    /// Number of clientlib tags matched.
    pub matches: usize,
}

impl Rewrite {
    /// Whether any clientlib tag was replaced.
    pub fn modified(&self) -> bool {
        self.matches > 0
    }
}

/// Replace clientlib references in `html`.
///
/// `markup` is only called when at least one tag matched.
pub fn rewrite_clientlibs<F>(html: &str, pattern: &ClientlibPattern, markup: F) -> Rewrite
where
    F: FnOnce() -> String,
{
    let matches = pattern.find_all(html);
    let Some((last, rest)) = matches.split_last() else {
        return Rewrite {
            html: html.to_string(),
            matches: 0,
        };
    };

    tracing::debug!(
        matches = matches.len(),
        tags = ?matches.iter().map(|m| m.text).collect::<Vec<_>>(),
        "Stripping matched clientlibs"
    );

    let mut rewritten = html.to_string();
    for m in rest {
        rewritten = rewritten.replacen(m.text, "", 1);
    }
    rewritten = rewritten.replacen(last.text, &markup(), 1);

    Rewrite {
        html: rewritten,
        matches: matches.len(),
    }
}
