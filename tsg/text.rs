use regex::Regex;
use std::sync::LazyLock;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link { label: String, href: String },
}

/// Splits `[label](href)` spans out of CMS text blocks, leaving the
/// surrounding text untouched.
#[must_use]
pub fn parse_markdown_links(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last_end = 0;
    for caps in LINK_RE.captures_iter(text) {
        let whole = caps.get(0).expect("capture group 0 always exists");
        if whole.start() > last_end {
            segments.push(Segment::Text(text[last_end..whole.start()].to_string()));
        }
        segments.push(Segment::Link {
            label: caps[1].to_string(),
            href: caps[2].to_string(),
        });
        last_end = whole.end();
    }
    if last_end < text.len() {
        segments.push(Segment::Text(text[last_end..].to_string()));
    }
    segments
}

/// Terminal rendering: links become `label (href)`.
#[must_use]
pub fn render_plain(text: &str) -> String {
    parse_markdown_links(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text,
            Segment::Link { label, href } => format!("{label} ({href})"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_markdown_links, render_plain, Segment};

    #[test]
    fn plain_text_stays_one_segment() {
        assert_eq!(
            parse_markdown_links("no links here"),
            vec![Segment::Text("no links here".to_string())]
        );
    }

    #[test]
    fn links_are_split_out_of_surrounding_text() {
        let segments = parse_markdown_links("see [the trees](https://example.org/trees) nearby");
        assert_eq!(
            segments,
            vec![
                Segment::Text("see ".to_string()),
                Segment::Link {
                    label: "the trees".to_string(),
                    href: "https://example.org/trees".to_string(),
                },
                Segment::Text(" nearby".to_string()),
            ]
        );
    }

    #[test]
    fn adjacent_links_need_no_text_between() {
        let segments = parse_markdown_links("[a](x)[b](y)");
        assert_eq!(segments.len(), 2);
        assert!(matches!(segments[0], Segment::Link { .. }));
        assert!(matches!(segments[1], Segment::Link { .. }));
    }

    #[test]
    fn render_plain_inlines_the_href() {
        assert_eq!(
            render_plain("hear [episode one](https://e.org/1) today"),
            "hear episode one (https://e.org/1) today"
        );
    }
}
