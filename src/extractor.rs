use crate::models::ExtractedContent;
use scraper::{Html, Node, Selector};

/// Pull plain text and link targets out of raw email markup.
///
/// Parsing is lenient: malformed markup is repaired best-effort by the HTML
/// parser rather than rejected, and plain-text input comes back as-is. Links
/// are the `href` values of anchors with a non-empty `href`, in document
/// order, duplicates preserved.
pub fn extract(raw: &str) -> ExtractedContent {
    let document = Html::parse_document(raw);

    ExtractedContent {
        text: visible_text(&document),
        links: anchor_targets(&document),
    }
}

fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.nodes() {
        let text = match node.value() {
            Node::Text(text) => text.trim(),
            _ => continue,
        };
        if text.is_empty() {
            continue;
        }
        // Script and style bodies are markup payload, not visible text.
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => matches!(element.name(), "script" | "style"),
            _ => false,
        });
        if !hidden {
            parts.push(text);
        }
    }

    parts.join(" ")
}

fn anchor_targets(document: &Html) -> Vec<String> {
    let link_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| href.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_and_links_from_email_markup() {
        let raw = r#"
            <html><body>
                <p>Your account has been compromised.</p>
                <a href="http://phishing.com">Reset Password</a>
            </body></html>
        "#;

        let content = extract(raw);
        assert!(content.text.contains("Your account has been compromised."));
        assert!(content.text.contains("Reset Password"));
        assert!(!content.text.contains("<"));
        assert_eq!(content.links, vec!["http://phishing.com"]);
    }

    #[test]
    fn preserves_link_order_and_duplicates() {
        let raw = concat!(
            r#"<a href="http://a.example">one</a>"#,
            r#"<a href="http://b.example">two</a>"#,
            r#"<a href="http://a.example">three</a>"#,
        );

        let content = extract(raw);
        assert_eq!(
            content.links,
            vec!["http://a.example", "http://b.example", "http://a.example"]
        );
    }

    #[test]
    fn skips_anchors_without_a_usable_href() {
        let raw = r#"<a>no href</a><a href="">empty</a><a href="http://ok.example">ok</a>"#;
        assert_eq!(extract(raw).links, vec!["http://ok.example"]);
    }

    #[test]
    fn script_and_style_bodies_are_not_visible_text() {
        let raw = r#"
            <html><head><style>p { color: red; }</style></head>
            <body><script>var secret = 1;</script><p>Hello</p></body></html>
        "#;

        let content = extract(raw);
        assert_eq!(content.text, "Hello");
    }

    #[test]
    fn plain_text_input_degrades_gracefully() {
        let content = extract("Just a plain text email, no markup at all.");
        assert_eq!(content.text, "Just a plain text email, no markup at all.");
        assert!(content.links.is_empty());
    }

    #[test]
    fn malformed_markup_still_yields_best_effort_output() {
        let content = extract("<p>Unclosed <a href=\"http://x.example\">link");
        assert_eq!(content.links, vec!["http://x.example"]);
        assert!(content.text.contains("Unclosed"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let raw = r#"<p>Hi</p><a href="http://x.example">x</a>"#;
        assert_eq!(extract(raw), extract(raw));
    }

    #[test]
    fn empty_input_yields_empty_content() {
        let content = extract("");
        assert!(content.text.is_empty());
        assert!(content.links.is_empty());
    }
}
