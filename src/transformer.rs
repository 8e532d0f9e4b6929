// ABOUTME: The update orchestrator: parse, snapshot, flatten, and render in one synchronous pass.
// ABOUTME: Transformer owns the options and the compiled markup adapter, reused across passes.

use std::collections::HashMap;

use scraper::Html;

use crate::anchor;
use crate::error::TransformError;
use crate::flatten::flatten_replies;
use crate::markup::{CompiledMarkup, PageMarkup};
use crate::options::{Options, TransformerBuilder};
use crate::render::{render_page, PagePlan};
use crate::thread::collect_threads;

/// Applies the flattened comment layout to post-page HTML.
///
/// One `transform` call is one update pass: every top-level comment's replies
/// container is flattened and the rewritten document is returned. Passes are
/// structurally idempotent because the original nested wrappers are consumed
/// while reading them; a second pass finds none and changes nothing.
#[derive(Debug, Clone)]
pub struct Transformer {
    opts: Options,
    markup: CompiledMarkup,
}

impl Transformer {
    /// Create a Transformer, compiling the markup adapter's selectors.
    pub fn new(opts: Options, markup: PageMarkup) -> Result<Self, TransformError> {
        Ok(Self {
            opts,
            markup: markup.compile()?,
        })
    }

    /// Create a TransformerBuilder with default options.
    pub fn builder() -> TransformerBuilder {
        TransformerBuilder::new()
    }

    /// The configured depth options.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Runs one update pass over the page and returns the rewritten document.
    pub fn transform(&self, html: &str) -> Result<String, TransformError> {
        let doc = Html::parse_document(html);
        let threads = collect_threads(&doc, &self.markup);

        let mut replacements = HashMap::new();
        for thread in &threads.threads {
            let items = flatten_replies(&thread.replies, None, true, 1, &self.opts);
            replacements.insert(thread.container, items);
        }

        let plan = PagePlan {
            replacements,
            consumed: threads.consumed,
        };
        render_page(&doc, &plan, &self.markup)
    }

    /// Reveals a comment referenced by a `#comment-<id>` fragment, returning
    /// the updated document when a closed disclosure had to be opened.
    pub fn reveal_anchor(&self, html: &str, fragment: &str) -> Option<String> {
        anchor::reveal_anchor(html, fragment)
    }
}

impl Default for Transformer {
    fn default() -> Self {
        // The default markup adapter always compiles.
        Self::new(Options::default(), PageMarkup::default())
            .expect("default page markup compiles")
    }
}
