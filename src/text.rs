//! Markup-stripping and truncation helpers shared by the summarizers and the
//! orchestrator's fallback summary.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("<[^>]+>").expect("valid tag regex"));

/// Strips HTML tags and decodes the handful of entities the Stack Exchange
/// API emits in answer bodies.
///
/// Good enough for console summaries; this is not a general HTML parser.
pub fn strip_markup(html: &str) -> String {
    decode_entities(&TAG_RE.replace_all(html, ""))
}

/// Decodes common HTML entities. `&amp;` is decoded last so that encoded
/// entities like `&amp;lt;` come out as the literal `&lt;`.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Formats items as a `- ` bullet list, one item per line.
pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncates a line to `max` characters, appending an ellipsis marker when
/// anything was cut. Operates on characters, not bytes.
pub fn clip(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let mut clipped: String = line.chars().take(max).collect();
        clipped.push('…');
        clipped
    }
}
