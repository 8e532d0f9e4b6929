// ABOUTME: Configuration options for the thread transformer and the TransformerBuilder.
// ABOUTME: TransformerBuilder provides a fluent API for constructing Transformer instances.

use crate::error::TransformError;
use crate::markup::PageMarkup;
use crate::transformer::Transformer;

/// Depths at or below this threshold are left visually unaltered (the
/// "shallow zone").
pub const DEFAULT_SHALLOW_DEPTH: u32 = 1;

/// Replies below this depth are wrapped in a closed disclosure widget.
pub const DEFAULT_COLLAPSE_DEPTH: u32 = 1;

/// At or past this depth the reply control is disabled: replies nested
/// further are invisible to readers without the flattened layout.
pub const DEFAULT_REPLY_DEPTH_LIMIT: u32 = 7;

/// Configuration options for the thread transformer.
///
/// Depth counts from 1 at the first level of replies to a top-level comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub shallow_depth: u32,
    pub collapse_depth: u32,
    pub reply_depth_limit: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shallow_depth: DEFAULT_SHALLOW_DEPTH,
            collapse_depth: DEFAULT_COLLAPSE_DEPTH,
            reply_depth_limit: DEFAULT_REPLY_DEPTH_LIMIT,
        }
    }
}

/// Builder for constructing Transformer instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct TransformerBuilder {
    opts: Options,
    markup: Option<PageMarkup>,
}

impl TransformerBuilder {
    /// Create a new TransformerBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shallow-zone depth threshold.
    pub fn shallow_depth(mut self, depth: u32) -> Self {
        self.opts.shallow_depth = depth;
        self
    }

    /// Set the depth at which reply chains are collapsed behind a disclosure.
    pub fn collapse_depth(mut self, depth: u32) -> Self {
        self.opts.collapse_depth = depth;
        self
    }

    /// Set the depth at or past which the reply control is disabled.
    pub fn reply_depth_limit(mut self, depth: u32) -> Self {
        self.opts.reply_depth_limit = depth;
        self
    }

    /// Use a custom page markup adapter instead of the default site shape.
    pub fn markup(mut self, markup: PageMarkup) -> Self {
        self.markup = Some(markup);
        self
    }

    /// Build the Transformer, compiling the markup adapter's selectors.
    pub fn build(self) -> Result<Transformer, TransformError> {
        let markup = self.markup.unwrap_or_default();
        Transformer::new(self.opts, markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_depth_thresholds() {
        let opts = Options::default();
        assert_eq!(opts.shallow_depth, 1);
        assert_eq!(opts.collapse_depth, 1);
        assert_eq!(opts.reply_depth_limit, 7);
    }

    #[test]
    fn test_builder_overrides() {
        let t = TransformerBuilder::new()
            .shallow_depth(2)
            .collapse_depth(3)
            .reply_depth_limit(9)
            .build()
            .unwrap();
        assert_eq!(t.options().shallow_depth, 2);
        assert_eq!(t.options().collapse_depth, 3);
        assert_eq!(t.options().reply_depth_limit, 9);
    }
}
