// ABOUTME: HTML serialization applying the flatten plan: drops consumed wrappers, emits flattened
// ABOUTME: sequences, rewrites styled articles in place, and injects the style block once.

//! Rendering the flattened page.
//!
//! The renderer walks the parsed document and re-serializes it, replacing each
//! processed replies container's nested markup with the flattener's output
//! sequence. Styled comments are rewritten during the walk: the connector
//! wrapper lands above the avatar, the quote block above the contents region,
//! and the reply control is disabled past the depth limit.

use std::collections::{HashMap, HashSet};

use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::TransformError;
use crate::extract::{truncate_chars, CommentData};
use crate::flatten::{CommentStyle, Connector, RenderItem};
use crate::markup::CompiledMarkup;
use crate::thread::{first_match, next_element_sibling};

/// Author handles longer than this many characters are truncated in quotes.
const HANDLE_MAX_CHARS: usize = 20;
const HANDLE_KEEP_CHARS: usize = 17;

/// Classes marking the reply control as active, removed when disabling it.
const REPLY_ACTIVE_CLASSES: &[&str] = &["cursor-pointer", "hover:underline", "text-cherry"];
/// Classes added to a disabled reply control.
const REPLY_DISABLED_CLASSES: &[&str] = &["text-gray-400", "cursor-not-allowed"];
const REPLY_DISABLED_TITLE: &str = "Replying is disabled: this comment is nested too deep, \
readers without the flattened layout might not see your reply!";
const REPLY_DISABLED_LABEL: &str = "can't reply further";

// The injected style element carries this id; its presence makes injection idempotent.
static STYLE_MARKER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("style#uc-style").unwrap());

const STYLE_BLOCK: &str = r#"<style id="uc-style">
    .uc-reply-quote {
        text-overflow: ellipsis;
        overflow-x: clip;
        white-space: nowrap;
        padding-left: 1em;
        border-left-width: 0.25rem;
    }
    .uc-vertical-line__wrapper {
        display: flex;
        flex-direction: column;
        gap: 1rem;
    }
    .uc-vertical-line {
        background: rgb(160 156 152 / var(--tw-border-opacity));
        width: 1px;
        height: 100%;
        margin-left: auto;
        margin-right: auto;
    }

    .uc-collapse-summary {
        list-style-type: '';
        width: fit-content;
    }
    .uc-collapse-summary:hover::after {
        text-decoration-line: underline;
    }
    .uc-collapse-icon {
        text-align: center;
        font-size: 1.15rem;
    }

    details > .uc-collapse-summary::after {
        content: 'show more replies';
        margin-bottom: 0.75rem
    }
    details[open] > .uc-collapse-summary::after {
        content: 'show less replies';
        margin-bottom: 0rem;
    }
    details .uc-collapse-icon::after {
        content: '\2295'
    }
    details[open] .uc-collapse-icon::after {
        content: '\229d'
    }
</style>"#;

/// Opening markup of a collapse wrapper: disclosure, summary toggle, and the
/// short connector stub bridging to the collapsed chain.
const COLLAPSE_OPEN: &str = r#"<details style="display: contents"><summary class="uc-collapse-summary cursor-pointer flex flex-row text-sm font-bold text-gray-500"><div class="uc-collapse-icon w-8 lg:w-16"></div></summary><div class="uc-vertical-line-wrapper h-3 w-8 lg:w-16"><div class="uc-vertical-line"></div></div>"#;

/// Everything the renderer needs to rewrite the page in one pass.
#[derive(Debug, Default)]
pub(crate) struct PagePlan {
    /// Replies container -> flattened sequence appended in place of its nesting.
    pub replacements: HashMap<NodeId, Vec<RenderItem<NodeId>>>,
    /// Original reply wrappers to drop from the output.
    pub consumed: HashSet<NodeId>,
}

struct RenderCtx<'a> {
    doc: &'a Html,
    plan: &'a PagePlan,
    markup: &'a CompiledMarkup,
    inject_style: bool,
}

/// Serializes the whole document with the plan applied.
pub(crate) fn render_page(
    doc: &Html,
    plan: &PagePlan,
    markup: &CompiledMarkup,
) -> Result<String, TransformError> {
    let ctx = RenderCtx {
        doc,
        plan,
        markup,
        inject_style: doc.select(&STYLE_MARKER).next().is_none(),
    };
    let mut out = String::new();
    for child in doc.tree.root().children() {
        serialize_node(child, &ctx, &mut out)?;
    }
    Ok(out)
}

fn serialize_node(
    node: NodeRef<'_, Node>,
    ctx: &RenderCtx<'_>,
    out: &mut String,
) -> Result<(), TransformError> {
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
            let id = node.id();
            if ctx.plan.consumed.contains(&id) {
                return Ok(());
            }

            out.push('<');
            out.push_str(el.name());
            for (k, v) in el.attrs() {
                push_attr(out, k, v);
            }
            if is_void_element(el.name()) {
                out.push_str(" />");
                return Ok(());
            }
            out.push('>');

            for child in node.children() {
                serialize_node(child, ctx, out)?;
            }
            if let Some(items) = ctx.plan.replacements.get(&id) {
                serialize_items(items, ctx, out)?;
            }
            if ctx.inject_style && el.name().eq_ignore_ascii_case("head") {
                out.push_str(STYLE_BLOCK);
            }

            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
        _ => {}
    }
    Ok(())
}

fn serialize_items(
    items: &[RenderItem<NodeId>],
    ctx: &RenderCtx<'_>,
    out: &mut String,
) -> Result<(), TransformError> {
    for item in items {
        match item {
            RenderItem::Comment { key, style } => {
                serialize_styled_article(*key, style, ctx, out)?;
            }
            RenderItem::Collapse(inner) => {
                out.push_str(COLLAPSE_OPEN);
                serialize_items(inner, ctx, out)?;
                out.push_str("</details>");
            }
        }
    }
    Ok(())
}

/// Rewrite points inside one styled article, resolved before serialization.
#[derive(Debug, Default)]
struct ArticleTargets {
    avatar: Option<NodeId>,
    mobile: Option<NodeId>,
    /// Contents element preceded by the quote block, with the rendered block.
    quote: Option<(NodeId, String)>,
    button: Option<NodeId>,
}

fn serialize_styled_article(
    key: NodeId,
    style: &CommentStyle,
    ctx: &RenderCtx<'_>,
    out: &mut String,
) -> Result<(), TransformError> {
    let node = ctx
        .doc
        .tree
        .get(key)
        .and_then(ElementRef::wrap)
        .ok_or_else(|| TransformError::structure("resolve comment article", None))?;

    let mut targets = ArticleTargets::default();

    if style.connector != Connector::None {
        let avatar = first_match(&node, &ctx.markup.avatar)
            .or_else(|| first_match(&node, &ctx.markup.avatar_fallback))
            .ok_or_else(|| TransformError::structure("locate comment avatar", None))?;
        targets.avatar = Some(avatar.id());
        targets.mobile = first_match(&node, &ctx.markup.avatar_mobile).map(|el| el.id());
    }

    let contents = first_match(&node, &ctx.markup.contents);

    if let Some(parent) = &style.quote {
        let contents = contents.ok_or_else(|| {
            TransformError::structure("locate contents region for reply quote", None)
        })?;
        targets.quote = Some((
            contents.id(),
            quote_block(parent, &ctx.markup.profile_url_base),
        ));
    }

    if style.disable_reply {
        let contents = contents.ok_or_else(|| {
            TransformError::structure("locate contents region for reply control", None)
        })?;
        let actions = next_element_sibling(&contents).ok_or_else(|| {
            TransformError::structure("locate action row after contents", None)
        })?;
        // A missing control is skipped silently, matching the page's own
        // logged-out rendering which has no reply button at all.
        targets.button = first_match(&actions, &ctx.markup.reply_control).map(|el| el.id());
    }

    serialize_article_node(*node, style, &targets, ctx, out)
}

fn serialize_article_node(
    node: NodeRef<'_, Node>,
    style: &CommentStyle,
    targets: &ArticleTargets,
    ctx: &RenderCtx<'_>,
    out: &mut String,
) -> Result<(), TransformError> {
    match node.value() {
        Node::Text(t) => out.push_str(&**t),
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(&**c);
            out.push_str("-->");
        }
        Node::Element(el) => {
            let id = node.id();

            // The mobile avatar is re-homed into the connector wrapper.
            if targets.mobile == Some(id) && targets.avatar != Some(id) {
                return Ok(());
            }
            if let Some((quote_target, block)) = &targets.quote {
                if *quote_target == id {
                    out.push_str(block);
                }
            }
            if targets.avatar == Some(id) {
                out.push_str("<div class=\"uc-vertical-line__wrapper\">");
                if let Some(mobile) = targets.mobile.and_then(|m| ctx.doc.tree.get(m)) {
                    serialize_plain(mobile, out);
                }
                emit_open_tag(el, out);
                if !is_void_element(el.name()) {
                    for child in node.children() {
                        serialize_article_node(child, style, targets, ctx, out)?;
                    }
                    out.push_str("</");
                    out.push_str(el.name());
                    out.push('>');
                }
                if style.connector == Connector::Hidden {
                    out.push_str("<div class=\"uc-vertical-line hidden\"></div>");
                } else {
                    out.push_str("<div class=\"uc-vertical-line\"></div>");
                }
                out.push_str("</div>");
                return Ok(());
            }
            if targets.button == Some(id) {
                serialize_disabled_control(node, el, out);
                return Ok(());
            }

            emit_open_tag(el, out);
            if is_void_element(el.name()) {
                return Ok(());
            }
            for child in node.children() {
                serialize_article_node(child, style, targets, ctx, out)?;
            }
            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
        _ => {}
    }
    Ok(())
}

/// Emits the reply control with active styling stripped, disabled styling and
/// attributes added, and its label replaced.
fn serialize_disabled_control(
    node: NodeRef<'_, Node>,
    el: &scraper::node::Element,
    out: &mut String,
) {
    out.push('<');
    out.push_str(el.name());

    let mut classes: Vec<&str> = el
        .classes()
        .filter(|c| !REPLY_ACTIVE_CLASSES.contains(c))
        .collect();
    for c in REPLY_DISABLED_CLASSES {
        if !classes.contains(c) {
            classes.push(*c);
        }
    }

    for (k, v) in el.attrs() {
        if k == "class" || k == "title" || k == "disabled" {
            continue;
        }
        push_attr(out, k, v);
    }
    push_attr(out, "class", &classes.join(" "));
    push_attr(out, "title", REPLY_DISABLED_TITLE);
    push_attr(out, "disabled", "true");
    out.push('>');

    let children: Vec<NodeRef<'_, Node>> = node.children().collect();
    if let Some((last, rest)) = children.split_last() {
        for child in rest {
            serialize_plain(*child, out);
        }
        match last.value() {
            // The label lives in the control's last child; an element keeps its
            // tag with the label as its new text content.
            Node::Element(inner) if !is_void_element(inner.name()) => {
                emit_open_tag(inner, out);
                out.push_str(REPLY_DISABLED_LABEL);
                out.push_str("</");
                out.push_str(inner.name());
                out.push('>');
            }
            Node::Element(_) => serialize_plain(*last, out),
            _ => out.push_str(REPLY_DISABLED_LABEL),
        }
    } else {
        out.push_str(REPLY_DISABLED_LABEL);
    }

    out.push_str("</");
    out.push_str(el.name());
    out.push('>');
}

/// Plain serialization of a subtree, no rewrites.
pub(crate) fn serialize_plain(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(t) => out.push_str(&**t),
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(&**c);
            out.push_str("-->");
        }
        Node::Element(el) => {
            emit_open_tag(el, out);
            if is_void_element(el.name()) {
                return;
            }
            for child in node.children() {
                serialize_plain(child, out);
            }
            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
        _ => {}
    }
}

/// Renders the quoted back-reference to the branch-point comment.
fn quote_block(parent: &CommentData, profile_base: &str) -> String {
    let shown_handle = truncate_chars(&parent.handle, HANDLE_MAX_CHARS, HANDLE_KEEP_CHARS);
    format!(
        concat!(
            "<blockquote class=\"uc-reply-quote\"><span class=\"text-gray-500\">",
            "<a class=\"hover:underline\" href=\"{profile}\"><b>@{handle}</b></a>: ",
            "<a class=\"hover:underline\" href=\"#comment-{id}\">{text}</a>",
            "</span></blockquote>"
        ),
        profile = escape_attr(&format!("{}{}", profile_base, parent.handle)),
        handle = escape_text(&shown_handle),
        id = escape_attr(&parent.id),
        text = escape_text(&parent.text),
    )
}

fn emit_open_tag(el: &scraper::node::Element, out: &mut String) {
    out.push('<');
    out.push_str(el.name());
    for (k, v) in el.attrs() {
        push_attr(out, k, v);
    }
    if is_void_element(el.name()) {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

/// Escape attribute value.
pub(crate) fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape injected text content.
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Check if tag is a void element.
pub(crate) fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
