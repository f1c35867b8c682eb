use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;

const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
];

/// Strip markup from server-rendered HTML and collapse whitespace.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag: Option<String> = None;

    for ch in html.chars() {
        if let Some(inner) = tag.as_mut() {
            if ch == '>' {
                if BLOCK_TAGS.contains(&tag_name(inner).as_str()) {
                    out.push(' ');
                }
                tag = None;
            } else {
                inner.push(ch);
            }
        } else if ch == '<' {
            tag = Some(String::new());
        } else {
            out.push(ch);
        }
    }

    decode_html_entities(&out)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn tag_name(inner: &str) -> String {
    inner
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| raw.parse::<DateTime<Utc>>().ok())
}

/// Format an ISO-8601 timestamp as `"Mon DD"`; empty when it does not parse.
pub fn short_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%b %d").to_string())
        .unwrap_or_default()
}
