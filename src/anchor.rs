// ABOUTME: Anchor revealer: opens the disclosure hiding a comment referenced by a URL fragment.
// ABOUTME: No-ops for visible targets, unknown fragments, and fragments outside the comment pattern.

use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::render::{escape_attr, is_void_element};

static FRAGMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#comment-\S+$").unwrap());

/// Reveals the comment a `#comment-<id>` fragment points at.
///
/// If the target element is hidden inside a closed disclosure, the nearest
/// enclosing `<details>` is opened and the re-serialized document is returned
/// so the host can navigate to the fragment again. Returns `None` when the
/// fragment doesn't match the comment pattern, the target doesn't exist, or it
/// is already visible.
pub fn reveal_anchor(html: &str, fragment: &str) -> Option<String> {
    if !FRAGMENT_RE.is_match(fragment) {
        return None;
    }
    let target_id = &fragment[1..];

    let doc = Html::parse_document(html);
    let target = doc
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().attr("id") == Some(target_id))?;

    // A parsed tree has no layout boxes; "hidden" means some ancestor is a
    // disclosure that is not open.
    let hidden = target.ancestors().any(|a| {
        ElementRef::wrap(a)
            .map(|el| is_details(&el) && el.value().attr("open").is_none())
            .unwrap_or(false)
    });
    if !hidden {
        return None;
    }

    let nearest = target
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(is_details)?;

    let mut out = String::new();
    for child in doc.tree.root().children() {
        serialize_with_open(child, nearest.id(), &mut out);
    }
    Some(out)
}

fn is_details(el: &ElementRef<'_>) -> bool {
    el.value().name().eq_ignore_ascii_case("details")
}

fn serialize_with_open(node: NodeRef<'_, Node>, open_id: NodeId, out: &mut String) {
    match node.value() {
        Node::Text(t) => out.push_str(&**t),
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(&**c);
            out.push_str("-->");
        }
        Node::Doctype(d) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(d.name());
            out.push('>');
        }
        Node::Element(el) => {
            let forced = node.id() == open_id;
            out.push('<');
            out.push_str(el.name());
            for (k, v) in el.attrs() {
                if forced && k == "open" {
                    continue;
                }
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape_attr(v));
                out.push('"');
            }
            if forced {
                out.push_str(" open=\"\"");
            }
            if is_void_element(el.name()) {
                out.push_str(" />");
                return;
            }
            out.push('>');
            for child in node.children() {
                serialize_with_open(child, open_id, out);
            }
            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIDDEN: &str = r#"<html><head></head><body>
        <details><summary>more</summary>
            <article id="comment-abc" data-comment-id="abc">deep reply</article>
        </details>
    </body></html>"#;

    #[test]
    fn test_opens_closed_disclosure_around_target() {
        let out = reveal_anchor(HIDDEN, "#comment-abc").unwrap();
        assert!(out.contains("<details open=\"\">"));
        assert!(out.contains("comment-abc"));
    }

    #[test]
    fn test_visible_target_is_untouched() {
        let html = r#"<html><body>
            <details open=""><article id="comment-abc">reply</article></details>
        </body></html>"#;
        assert!(reveal_anchor(html, "#comment-abc").is_none());
    }

    #[test]
    fn test_target_outside_any_disclosure_is_untouched() {
        let html = r#"<html><body><article id="comment-abc">reply</article></body></html>"#;
        assert!(reveal_anchor(html, "#comment-abc").is_none());
    }

    #[test]
    fn test_unmatched_fragment_is_a_noop() {
        assert!(reveal_anchor(HIDDEN, "#section-2").is_none());
        assert!(reveal_anchor(HIDDEN, "comment-abc").is_none());
        assert!(reveal_anchor(HIDDEN, "#comment-").is_none());
    }

    #[test]
    fn test_missing_target_is_a_noop() {
        assert!(reveal_anchor(HIDDEN, "#comment-nope").is_none());
    }
}
