// ABOUTME: Main library entry point for the unnested comment-thread flattener.
// ABOUTME: Re-exports the public API: Transformer, TransformerBuilder, Session, Options, PageMarkup.

//! unnested - flattens nested comment threads on post pages into chained,
//! collapsible HTML.
//!
//! Nested reply markup past a configurable depth is reclassified as a flat
//! chain: each comment gains a vertical connector line, later siblings quote
//! the comment they branch from, deep chains collapse behind a disclosure
//! widget, and the reply control is disabled once a chain becomes too deep to
//! read without the flattened layout.
//!
//! # Example
//!
//! ```no_run
//! use unnested::{Transformer, TransformError};
//!
//! fn main() -> Result<(), TransformError> {
//!     let transformer = Transformer::builder().build()?;
//!     let page = std::fs::read_to_string("post.html").unwrap();
//!     println!("{}", transformer.transform(&page)?);
//!     Ok(())
//! }
//! ```

pub mod anchor;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod markup;
pub mod options;
mod render;
pub mod session;
mod thread;
pub mod transformer;

pub use crate::anchor::reveal_anchor;
pub use crate::error::{ErrorCode, TransformError};
pub use crate::extract::{extract_comment_data, CommentData};
pub use crate::flatten::{flatten_replies, CommentStyle, Connector, RenderItem, ThreadNode};
pub use crate::markup::{CompiledMarkup, PageMarkup};
pub use crate::options::{Options, TransformerBuilder};
pub use crate::session::Session;
pub use crate::transformer::Transformer;
