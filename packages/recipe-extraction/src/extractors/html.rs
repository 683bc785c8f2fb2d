//! Markup helpers: visible text, document title, meta descriptions.

use scraper::{ElementRef, Html, Node, Selector};

/// Title used when a page has no usable `<title>`.
pub const DEFAULT_PAGE_TITLE: &str = "Web Page";

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "header", "footer", "nav", "template",
];

/// Meta tags checked for a post description, highest priority first.
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[property="og:description"]"#,
    r#"meta[name="description"]"#,
    r#"meta[name="twitter:description"]"#,
    r#"meta[property="og:title"]"#,
];

/// Length of the title preview cut from a long description.
pub const TITLE_PREVIEW_CHARS: usize = 100;

/// All visible text in the document with whitespace collapsed to single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut chunks = Vec::new();
    collect_text(document.root_element(), &mut chunks);

    chunks
        .iter()
        .flat_map(|chunk| chunk.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(text),
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Trimmed `<title>` text, or [`DEFAULT_PAGE_TITLE`].
pub fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string())
}

/// First non-empty description-like meta tag.
pub fn meta_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    DESCRIPTION_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(str::to_string)
    })
}

/// Title derived from a description: the first 100 chars plus "..." when longer.
pub fn title_preview(description: &str) -> String {
    if description.chars().count() > TITLE_PREVIEW_CHARS {
        let preview: String = description.chars().take(TITLE_PREVIEW_CHARS).collect();
        format!("{}...", preview)
    } else {
        description.to_string()
    }
}
