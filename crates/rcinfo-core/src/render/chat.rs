//! Chat text rendering.

use crate::shape::DisplaySection;

use super::escape_html;

/// Sections as Telegram HTML: `"\n{title}\n{label}: <b>{value}</b>"` per
/// section, sections separated by a blank line.
pub fn details_html(sections: &[DisplaySection]) -> String {
    render(sections, escape_html, |label, value| {
        format!("{}: <b>{}</b>", escape_html(label), escape_html(value))
    })
}

/// Same layout without markup, for terminals.
pub fn details_plain(sections: &[DisplaySection]) -> String {
    render(sections, str::to_string, |label, value| format!("{label}: {value}"))
}

fn render<T, F>(sections: &[DisplaySection], title: T, line: F) -> String
where
    T: Fn(&str) -> String,
    F: Fn(&str, &str) -> String,
{
    sections
        .iter()
        .map(|s| {
            let items = s
                .items
                .iter()
                .map(|i| line(&i.label, &i.value))
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n{}\n{}", title(&s.title), items)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
