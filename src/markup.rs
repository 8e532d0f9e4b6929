// ABOUTME: Named-field adapter describing the host page's comment markup via CSS selectors.
// ABOUTME: PageMarkup is the serde-loadable config; CompiledMarkup holds pre-parsed selectors.

//! Page-structure adapter.
//!
//! The host page's comment tree is matched through a fixed set of structural
//! selectors. Rather than scattering selector strings through the algorithm,
//! they live here as named fields, deserializable from JSON so a markup change
//! on the site (or a differently themed page) only touches configuration.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// CSS selectors and attribute names locating the pieces of a comment thread.
///
/// All element selectors except `top_level_comments` are evaluated relative to
/// a single comment article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMarkup {
    /// Top-level comment articles on the post page.
    pub top_level_comments: String,
    /// A reply comment article at any nesting level.
    pub reply_article: String,
    /// The wrapper element holding a reply article inside a replies container.
    pub reply_wrapper: String,
    /// Attribute on a comment article carrying its unique identifier.
    pub comment_id_attr: String,
    /// Author profile link within a comment; its `title` attribute holds the
    /// sigil-prefixed handle.
    pub author_link: String,
    /// Avatar element within a comment.
    pub avatar: String,
    /// Fallback avatar region for deleted or moderation-hidden comments.
    pub avatar_fallback: String,
    /// Mobile-layout avatar element, moved into the connector wrapper when present.
    pub avatar_mobile: String,
    /// The rendered comment body.
    pub contents: String,
    /// The reply control within the action row following the contents region.
    pub reply_control: String,
    /// Base URL prefix for author profile links in quote blocks.
    pub profile_url_base: String,
}

impl Default for PageMarkup {
    fn default() -> Self {
        Self {
            top_level_comments: ".my-3 > div > div > article[data-comment-id]".to_string(),
            reply_article: "article[data-comment-id]".to_string(),
            reply_wrapper: "div".to_string(),
            comment_id_attr: "data-comment-id".to_string(),
            author_link: "div > div > a".to_string(),
            avatar: "div > div > a".to_string(),
            avatar_fallback: "div > div".to_string(),
            avatar_mobile: "div > div > div > div > div.mask".to_string(),
            contents: ".prose".to_string(),
            reply_control: "button".to_string(),
            profile_url_base: "https://cohost.org/".to_string(),
        }
    }
}

impl PageMarkup {
    /// Compile every selector once, for reuse across update passes.
    pub fn compile(&self) -> Result<CompiledMarkup, TransformError> {
        Ok(CompiledMarkup {
            top_level_comments: compile_one(&self.top_level_comments)?,
            reply_article: compile_one(&self.reply_article)?,
            reply_wrapper: compile_one(&self.reply_wrapper)?,
            comment_id_attr: self.comment_id_attr.clone(),
            author_link: compile_one(&self.author_link)?,
            avatar: compile_one(&self.avatar)?,
            avatar_fallback: compile_one(&self.avatar_fallback)?,
            avatar_mobile: compile_one(&self.avatar_mobile)?,
            contents: compile_one(&self.contents)?,
            reply_control: compile_one(&self.reply_control)?,
            profile_url_base: self.profile_url_base.clone(),
        })
    }
}

fn compile_one(css: &str) -> Result<Selector, TransformError> {
    Selector::parse(css).map_err(|e| {
        TransformError::selector(
            format!("compile selector {:?}", css),
            Some(anyhow::anyhow!("{}", e)),
        )
    })
}

/// Pre-parsed form of [`PageMarkup`], built once per transformer.
#[derive(Debug, Clone)]
pub struct CompiledMarkup {
    pub top_level_comments: Selector,
    pub reply_article: Selector,
    pub reply_wrapper: Selector,
    pub comment_id_attr: String,
    pub author_link: Selector,
    pub avatar: Selector,
    pub avatar_fallback: Selector,
    pub avatar_mobile: Selector,
    pub contents: Selector,
    pub reply_control: Selector,
    pub profile_url_base: String,
}
