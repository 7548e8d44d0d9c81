//! Web page rendering: search form, error banner and section cards.

use std::fmt::Write;

use crate::shape::DisplaySection;
use crate::vehicle::VehicleRecord;

use super::escape_html;

/// Everything the page can show. All fields optional except the form.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    /// Value to keep in the search box.
    pub query: &'a str,
    pub error: Option<&'a str>,
    pub record: Option<&'a VehicleRecord>,
    pub sections: &'a [DisplaySection],
    /// Link shown in the footer, e.g. the bot's handle.
    pub contact: Option<&'a str>,
}

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;margin:0;background:#f5f3ff;color:#111827}
main{max-width:72rem;margin:0 auto;padding:1.5rem}
header{text-align:center;margin-bottom:2rem}
h1{font-size:2.25rem;margin:.5rem 0;color:#4f46e5}
form{display:flex;gap:.75rem;margin-bottom:2rem}
input{flex:1;padding:1rem;font-size:1.1rem;border:2px solid #e5e7eb;border-radius:.75rem;text-transform:uppercase}
button{padding:1rem 2rem;border:0;border-radius:.75rem;background:#4f46e5;color:#fff;font-size:1rem}
.error{border-left:4px solid #ef4444;background:#fef2f2;color:#b91c1c;padding:1.25rem;border-radius:.5rem;margin-bottom:2rem}
.hero{position:relative;border-radius:1rem;overflow:hidden;margin-bottom:2rem}
.hero img{width:100%;height:20rem;object-fit:cover;display:block}
.hero div{position:absolute;bottom:0;left:0;right:0;padding:2rem;background:linear-gradient(transparent,rgba(0,0,0,.6));color:#fff}
.logo{width:4rem;height:4rem}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(20rem,1fr));gap:2rem}
.card{background:#fff;border:1px solid #f3f4f6;border-radius:.75rem;padding:1rem;margin-bottom:1rem}
.card h4{margin:0 0 .75rem;font-size:.85rem;color:#6b7280}
.row{display:flex;justify-content:space-between;gap:1rem;padding:.2rem 0}
.row span:first-child{color:#4b5563;font-size:.9rem}
.row span:last-child{font-weight:500;text-align:right}
footer{margin-top:3rem;text-align:center;color:#4b5563}
@media (prefers-color-scheme:dark){
body{background:#111827;color:#e5e7eb}
input{background:#1f2937;border-color:#374151;color:#fff}
.card{background:#1f2937;border-color:#374151}
.error{background:rgba(127,29,29,.2);color:#f87171}
}
"#;

/// Render the whole page.
pub fn render_page(view: &PageView<'_>) -> String {
    let mut out = String::with_capacity(8 * 1024);
    out.push_str("<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">");
    out.push_str("<title>Vehicle Information Portal</title><style>");
    out.push_str(STYLE);
    out.push_str("</style></head><body><main>");

    render_header(&mut out, view.record);
    render_form(&mut out, view.query);

    if let Some(err) = view.error {
        let _ = write!(out, "<div class=\"error\" role=\"alert\"><p>{}</p></div>", escape_html(err));
    }

    if let Some(record) = view.record {
        render_hero(&mut out, record);
        render_cards(&mut out, view.sections);
    }

    if let Some(contact) = view.contact {
        let handle = contact.trim_start_matches('@');
        let _ = write!(
            out,
            "<footer><a href=\"https://t.me/{}\" rel=\"noopener noreferrer\">Created by {}</a></footer>",
            escape_html(handle),
            escape_html(handle)
        );
    }

    out.push_str("</main></body></html>\n");
    out
}

fn render_header(out: &mut String, record: Option<&VehicleRecord>) {
    out.push_str("<header>");
    if let Some(logo) = record.and_then(|r| r.make_logo()) {
        let _ = write!(out, "<img class=\"logo\" src=\"{}\" alt=\"Brand Logo\">", escape_html(&logo));
    }
    out.push_str("<h1>Vehicle Information Portal</h1>");
    out.push_str("<p>Access comprehensive details about any registered vehicle in India</p>");
    out.push_str("</header>");
}

fn render_form(out: &mut String, query: &str) {
    let _ = write!(
        out,
        "<form method=\"get\" action=\"/lookup\">\
         <input type=\"text\" name=\"regno\" value=\"{}\" placeholder=\"Enter Vehicle Registration Number\" autocomplete=\"off\">\
         <button type=\"submit\">Search</button></form>",
        escape_html(query)
    );
}

fn render_hero(out: &mut String, record: &VehicleRecord) {
    let Some(image) = record.model_image_url() else {
        return;
    };
    let title = record.make_and_model();
    let reg = record.registration_number().unwrap_or_default();
    let fuel = record.fuel_type().unwrap_or_default();
    let _ = write!(
        out,
        "<section class=\"hero\"><img src=\"{}\" alt=\"{}\"><div><h2>{}</h2><p>{} • {}</p></div></section>",
        escape_html(&image),
        escape_html(&title),
        escape_html(&title),
        escape_html(&reg),
        escape_html(&fuel)
    );
}

/// Consecutive sections sharing a group go into one column.
fn render_cards(out: &mut String, sections: &[DisplaySection]) {
    out.push_str("<div class=\"grid\">");
    let mut current_group: Option<&str> = None;
    for section in sections {
        if current_group != Some(section.group.as_str()) {
            if current_group.is_some() {
                out.push_str("</section>");
            }
            let _ = write!(out, "<section><h3>{}</h3>", escape_html(&section.group));
            current_group = Some(section.group.as_str());
        }
        let _ = write!(out, "<div class=\"card\"><h4>{}</h4>", escape_html(&section.title));
        for item in &section.items {
            let _ = write!(
                out,
                "<div class=\"row\"><span>{}</span><span>{}</span></div>",
                escape_html(&item.label),
                escape_html(&item.value)
            );
        }
        out.push_str("</div>");
    }
    if current_group.is_some() {
        out.push_str("</section>");
    }
    out.push_str("</div>");
}
