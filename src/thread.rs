// ABOUTME: Builds thread snapshots from the parsed page: top-level comments and nested reply trees.
// ABOUTME: Records the consumed reply-wrapper nodes so the renderer can drop the original nesting.

use std::collections::HashSet;

use ego_tree::NodeId;
use scraper::{ElementRef, Html};

use crate::extract::extract_comment_data;
use crate::flatten::ThreadNode;
use crate::markup::CompiledMarkup;

/// A top-level comment's replies container and its snapshotted reply tree.
#[derive(Debug)]
pub(crate) struct TopLevelThread {
    /// The replies container immediately following the top-level comment.
    pub container: NodeId,
    pub replies: Vec<ThreadNode<NodeId>>,
}

/// Every thread on the page plus the wrapper elements consumed while reading them.
#[derive(Debug, Default)]
pub(crate) struct PageThreads {
    pub threads: Vec<TopLevelThread>,
    /// Reply-wrapper elements whose articles were lifted out; dropped at render
    /// time together with their left-border styling.
    pub consumed: HashSet<NodeId>,
}

/// Walks every top-level comment and snapshots the reply tree following it.
///
/// Top-level comments without a trailing replies container are left alone.
pub(crate) fn collect_threads(doc: &Html, markup: &CompiledMarkup) -> PageThreads {
    let mut page = PageThreads::default();
    for article in doc.select(&markup.top_level_comments) {
        if let Some(container) = next_element_sibling(&article) {
            let replies = collect_replies(container, markup, &mut page.consumed);
            page.threads.push(TopLevelThread {
                container: container.id(),
                replies,
            });
        }
    }
    page
}

/// Snapshots one nesting level: each direct wrapper child of `container`
/// holding a comment article, paired with the article's own replies container.
fn collect_replies(
    container: ElementRef<'_>,
    markup: &CompiledMarkup,
    consumed: &mut HashSet<NodeId>,
) -> Vec<ThreadNode<NodeId>> {
    let mut nodes = Vec::new();
    for wrapper in child_elements(&container) {
        if !markup.reply_wrapper.matches(&wrapper) {
            continue;
        }
        let articles: Vec<ElementRef<'_>> = child_elements(&wrapper)
            .filter(|el| markup.reply_article.matches(el))
            .collect();
        if articles.is_empty() {
            continue;
        }
        consumed.insert(wrapper.id());
        for article in articles {
            let replies = next_element_sibling(&article)
                .map(|nested| collect_replies(nested, markup, consumed));
            nodes.push(ThreadNode {
                key: article.id(),
                data: extract_comment_data(article, markup),
                replies,
            });
        }
    }
    nodes
}

/// The next sibling that is an element, skipping text and comment nodes.
pub(crate) fn next_element_sibling<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut next = el.next_sibling();
    while let Some(node) = next {
        if let Some(found) = ElementRef::wrap(node) {
            return Some(found);
        }
        next = node.next_sibling();
    }
    None
}

/// Iterates an element's direct element children.
pub(crate) fn child_elements<'a>(
    el: &ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// The first descendant of `el` matched by `selector`, if any.
pub(crate) fn first_match<'a>(
    el: &ElementRef<'a>,
    selector: &scraper::Selector,
) -> Option<ElementRef<'a>> {
    el.select(selector).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::PageMarkup;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>post</title></head><body>
<div class="my-3"><div><div>
  <article data-comment-id="top">
    <div><div><a title="@alice"></a></div></div>
    <div class="prose">top comment</div>
  </article>
  <div class="replies">
    <div class="border-l">
      <article data-comment-id="r1">
        <div><div><a title="@bob"></a></div></div>
        <div class="prose">first reply</div>
      </article>
      <div class="replies">
        <div class="border-l">
          <article data-comment-id="r1a">
            <div><div><a title="@carol"></a></div></div>
            <div class="prose">nested reply</div>
          </article>
        </div>
      </div>
    </div>
    <div class="border-l">
      <article data-comment-id="r2">
        <div><div><a title="@dave"></a></div></div>
        <div class="prose">second reply</div>
      </article>
    </div>
  </div>
</div></div></div>
</body></html>"#;

    fn markup() -> CompiledMarkup {
        PageMarkup::default().compile().unwrap()
    }

    #[test]
    fn test_collects_nested_thread() {
        let doc = Html::parse_document(PAGE);
        let page = collect_threads(&doc, &markup());
        assert_eq!(page.threads.len(), 1);

        let replies = &page.threads[0].replies;
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].data.id, "r1");
        assert_eq!(replies[0].data.handle, "bob");
        assert_eq!(replies[1].data.id, "r2");
        assert!(replies[1].replies.is_none());

        let nested = replies[0].replies.as_ref().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].data.id, "r1a");
    }

    #[test]
    fn test_consumes_every_reply_wrapper() {
        let doc = Html::parse_document(PAGE);
        let page = collect_threads(&doc, &markup());
        // Three border wrappers: r1, r1a, r2.
        assert_eq!(page.consumed.len(), 3);
    }

    #[test]
    fn test_top_level_without_container_is_skipped() {
        let html = r#"<html><body><div class="my-3"><div><div>
            <article data-comment-id="lonely">
              <div><div><a title="@alice"></a></div></div>
              <div class="prose">no replies</div>
            </article>
        </div></div></div></body></html>"#;
        let doc = Html::parse_document(html);
        let page = collect_threads(&doc, &markup());
        assert!(page.threads.is_empty());
        assert!(page.consumed.is_empty());
    }

    #[test]
    fn test_non_wrapper_children_are_ignored() {
        let html = r#"<html><body><div class="my-3"><div><div>
            <article data-comment-id="top">
              <div><div><a title="@alice"></a></div></div>
              <div class="prose">top</div>
            </article>
            <div class="replies">
              <span>decoration</span>
              <div class="note">no article here</div>
            </div>
        </div></div></div></body></html>"#;
        let doc = Html::parse_document(html);
        let page = collect_threads(&doc, &markup());
        assert_eq!(page.threads.len(), 1);
        assert!(page.threads[0].replies.is_empty());
        assert!(page.consumed.is_empty());
    }
}
