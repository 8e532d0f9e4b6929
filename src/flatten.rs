// ABOUTME: The core recursive thread flattener: turns nested reply trees into a flat render plan.
// ABOUTME: Pure over a thread snapshot and generic over the comment key, so synthetic trees test it.

//! Thread flattening.
//!
//! The flattener consumes a snapshot of the nested reply tree and produces an
//! ordered sequence of render instructions: each comment with its chain styling
//! decision, and disclosure wrappers interposed at the collapse depth. It never
//! touches the document; the renderer applies the plan.

use crate::extract::CommentData;
use crate::options::Options;

/// A comment and its nested replies, snapshotted from the page.
///
/// `replies` is `Some` whenever a replies container followed the comment in the
/// markup, even if that container held no comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadNode<K> {
    pub key: K,
    pub data: CommentData,
    pub replies: Option<Vec<ThreadNode<K>>>,
}

/// Vertical connector treatment for a comment's avatar column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// Chain-terminal within the shallow zone: left unaltered.
    None,
    /// A visible line continues the chain below this comment.
    Visible,
    /// Chain-terminal below the shallow zone: wrapper inserted but the line is
    /// hidden, preserving indentation without a stroke.
    Hidden,
}

/// Presentation decisions for one comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentStyle {
    pub connector: Connector,
    /// Quoted back-reference to the branch-point comment, absent for the first
    /// sibling at each level (it visually follows its parent directly).
    pub quote: Option<CommentData>,
    pub disable_reply: bool,
}

/// One instruction in the flattened output sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderItem<K> {
    Comment { key: K, style: CommentStyle },
    /// A closed disclosure wrapping everything from the collapse depth down.
    Collapse(Vec<RenderItem<K>>),
}

/// Recursively flattens one level of replies into render instructions.
///
/// `parent` is the extracted data of the comment these replies answer (None at
/// the top level, where replies never quote). `ancestor_last` records whether
/// the parent would have ended the visual chain without its replies; together
/// with sibling position and the shallow zone it decides connector suppression.
/// The known quirk that this flag folds "within the shallow zone" into "no more
/// siblings" is intentional, matching the original layout behavior.
pub fn flatten_replies<K: Copy>(
    nodes: &[ThreadNode<K>],
    parent: Option<&CommentData>,
    ancestor_last: bool,
    depth: u32,
    opts: &Options,
) -> Vec<RenderItem<K>> {
    let mut out = Vec::new();
    let last_index = nodes.len().saturating_sub(1);

    for (index, node) in nodes.iter().enumerate() {
        let is_last_reply =
            depth <= opts.shallow_depth || (ancestor_last && index == last_index);

        let mut nested = Vec::new();
        if let Some(children) = &node.replies {
            nested = flatten_replies(children, Some(&node.data), is_last_reply, depth + 1, opts);
            if depth == opts.collapse_depth {
                nested = vec![RenderItem::Collapse(nested)];
            }
        }

        let last_in_chain = node.replies.is_none() && is_last_reply;
        let connector = if last_in_chain {
            if depth <= opts.shallow_depth {
                Connector::None
            } else {
                Connector::Hidden
            }
        } else {
            Connector::Visible
        };

        out.push(RenderItem::Comment {
            key: node.key,
            style: CommentStyle {
                connector,
                // Subsequent siblings must re-quote the branch point, since the
                // direct visual line to it is broken by the first sibling's chain.
                quote: if index == 0 { None } else { parent.cloned() },
                disable_reply: depth >= opts.reply_depth_limit,
            },
        });
        out.extend(nested);
    }

    out
}
