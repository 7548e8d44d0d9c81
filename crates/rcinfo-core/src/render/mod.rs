//! Output formats for shaped records.
//!
//! - [`chat`]: Telegram HTML subset, one block per section.
//! - [`html`]: the web form page with section cards.

pub mod chat;
pub mod html;

/// Escape text for HTML bodies and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
