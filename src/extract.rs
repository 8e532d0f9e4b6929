// ABOUTME: Comment data extraction: handle, id, and truncated body text from a comment article.
// ABOUTME: Degrades to a "[deleted]" sentinel when the author link or contents region is missing.

use scraper::ElementRef;
use serde::Serialize;

use crate::markup::CompiledMarkup;

/// Sentinel body text for deleted or moderation-hidden comments.
pub const DELETED_TEXT: &str = "[deleted]";

/// Comment body text longer than this many characters is truncated.
const TEXT_MAX_CHARS: usize = 80;
const TEXT_KEEP_CHARS: usize = 77;

/// Data extracted from a single comment article.
///
/// Also serves as the parent-reference snapshot quoted by later siblings: it is
/// cloned at the moment a comment's replies are processed and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentData {
    /// Author handle without its leading sigil; empty for deleted comments.
    pub handle: String,
    /// The comment's unique identifier from the page markup.
    pub id: String,
    /// Rendered body text, whitespace-normalized and truncated to 77 chars + `...`
    /// when longer than 80.
    pub text: String,
}

/// Parses the author handle, comment id, and body text of a comment article.
///
/// A comment missing its author link, the link's `title` attribute, or its
/// contents region is treated as deleted: `{handle: "", id, text: "[deleted]"}`.
/// This never fails outward.
pub fn extract_comment_data(article: ElementRef<'_>, markup: &CompiledMarkup) -> CommentData {
    let id = article
        .value()
        .attr(&markup.comment_id_attr)
        .unwrap_or_default()
        .to_string();

    let handle = article
        .select(&markup.author_link)
        .next()
        .and_then(|link| link.value().attr("title"))
        .map(|title| title.strip_prefix('@').unwrap_or(title).to_string());

    let text = article
        .select(&markup.contents)
        .next()
        .map(|contents| normalize_whitespace(&contents.text().collect::<String>()));

    match (handle, text) {
        (Some(handle), Some(text)) => CommentData {
            handle,
            id,
            text: truncate_chars(&text, TEXT_MAX_CHARS, TEXT_KEEP_CHARS),
        },
        _ => CommentData {
            handle: String::new(),
            id,
            text: DELETED_TEXT.to_string(),
        },
    }
}

/// Collapses runs of whitespace into single spaces.
pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates `s` to `keep` characters plus an ellipsis when it exceeds `max`
/// characters. Counts chars, not bytes, so multi-byte text never splits.
pub(crate) fn truncate_chars(s: &str, max: usize, keep: usize) -> String {
    if s.chars().count() > max {
        let mut out: String = s.chars().take(keep).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};

    fn markup() -> CompiledMarkup {
        crate::markup::PageMarkup::default().compile().unwrap()
    }

    fn first_article(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("article").unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn test_extracts_handle_id_and_text() {
        let doc = Html::parse_fragment(
            r#"<article data-comment-id="c1">
                <div><div><a title="@eggbug" href="/eggbug"><img></a></div></div>
                <div class="prose">hello   there
                world</div>
            </article>"#,
        );
        let data = extract_comment_data(first_article(&doc), &markup());
        assert_eq!(
            data,
            CommentData {
                handle: "eggbug".to_string(),
                id: "c1".to_string(),
                text: "hello there world".to_string(),
            }
        );
    }

    #[test]
    fn test_long_text_is_truncated_to_77_plus_ellipsis() {
        let long = "a".repeat(100);
        let html = format!(
            r#"<article data-comment-id="c2">
                <div><div><a title="@eggbug"></a></div></div>
                <div class="prose">{}</div>
            </article>"#,
            long
        );
        let doc = Html::parse_fragment(&html);
        let data = extract_comment_data(first_article(&doc), &markup());
        assert_eq!(data.text.chars().count(), 80);
        assert!(data.text.ends_with("..."));
        assert!(data.text.starts_with(&"a".repeat(77)));
    }

    #[test]
    fn test_exactly_80_chars_is_kept() {
        let text = "b".repeat(80);
        let html = format!(
            r#"<article data-comment-id="c3">
                <div><div><a title="@eggbug"></a></div></div>
                <div class="prose">{}</div>
            </article>"#,
            text
        );
        let doc = Html::parse_fragment(&html);
        let data = extract_comment_data(first_article(&doc), &markup());
        assert_eq!(data.text, text);
    }

    #[test]
    fn test_missing_author_link_yields_deleted() {
        let doc = Html::parse_fragment(
            r#"<article data-comment-id="c4">
                <div><div></div></div>
                <div class="prose">orphaned text</div>
            </article>"#,
        );
        let data = extract_comment_data(first_article(&doc), &markup());
        assert_eq!(data.handle, "");
        assert_eq!(data.id, "c4");
        assert_eq!(data.text, DELETED_TEXT);
    }

    #[test]
    fn test_missing_contents_yields_deleted() {
        let doc = Html::parse_fragment(
            r#"<article data-comment-id="c5">
                <div><div><a title="@eggbug"></a></div></div>
            </article>"#,
        );
        let data = extract_comment_data(first_article(&doc), &markup());
        assert_eq!(data.text, DELETED_TEXT);
        assert_eq!(data.handle, "");
    }

    #[test]
    fn test_title_without_sigil_is_kept_whole() {
        let doc = Html::parse_fragment(
            r#"<article data-comment-id="c6">
                <div><div><a title="eggbug"></a></div></div>
                <div class="prose">hi</div>
            </article>"#,
        );
        let data = extract_comment_data(first_article(&doc), &markup());
        assert_eq!(data.handle, "eggbug");
    }

    #[test]
    fn test_truncate_chars_is_char_based() {
        let s = "é".repeat(90);
        let out = truncate_chars(&s, 80, 77);
        assert_eq!(out.chars().count(), 80);
        assert!(out.ends_with("..."));
    }
}
