//! Development markup generation.
//!
//! Produces the tags that replace a page's clientlibs: the dev-server client,
//! one tag per bundle entry, and the fast-refresh preamble when that plugin is
//! active. Output depends only on the [`DevContext`], so the interceptor
//! renders it once at startup.

use std::path::Path;

use crate::config::store::REACT_REFRESH_PLUGIN;
use crate::config::DevContext;

/// Well-known path of the development server client.
pub const CLIENT_PATH: &str = "/@vite/client";

const SCRIPT_EXTENSIONS: [&str; 4] = ["js", "ts", "jsx", "tsx"];
const STYLE_EXTENSIONS: [&str; 5] = ["css", "less", "sass", "scss", "postcss"];

const BASE_PLACEHOLDER: &str = "__BASE__";

const REACT_REFRESH_PREAMBLE: &str = r#"import RefreshRuntime from "__BASE__@react-refresh"
RefreshRuntime.injectIntoGlobalHook(window)
window.$RefreshReg$ = () => {}
window.$RefreshSig$ = () => (type) => type
window.__vite_plugin_react_preamble_installed__ = true"#;

/// Kind of tag emitted for a bundle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Script,
    Style,
}

impl EntryKind {
    /// Classify a source path by extension; `None` when it is neither.
    pub fn of(source: &str) -> Option<Self> {
        let extension = Path::new(source).extension()?.to_str()?;
        if SCRIPT_EXTENSIONS.contains(&extension) {
            Some(Self::Script)
        } else if STYLE_EXTENSIONS.contains(&extension) {
            Some(Self::Style)
        } else {
            None
        }
    }
}

/// Build the full development markup fragment.
pub fn dev_markup(context: &DevContext) -> String {
    let entries: Vec<String> = context
        .bundle_entries
        .iter()
        .filter_map(entry_tag)
        .collect();

    let mut markup = format!(
        "\n<script type=\"module\" src=\"{CLIENT_PATH}\"></script>\n{}\n",
        entries.join("\n")
    );

    if context.build.is_plugin_active(REACT_REFRESH_PLUGIN) {
        let preamble = REACT_REFRESH_PREAMBLE.replace(BASE_PLACEHOLDER, &context.build.base);
        markup.push_str(&format!("<script type=\"module\">\n{preamble}\n</script>\n"));
    }

    markup
}

fn entry_tag(source: &str) -> Option<String> {
    let path = source.trim_start_matches('/');
    match EntryKind::of(source)? {
        EntryKind::Script => Some(format!("<script type=\"module\" src=\"/{path}\"></script>")),
        EntryKind::Style => Some(format!("<link rel=\"stylesheet\" href=\"/{path}\"/>")),
    }
}
