// ABOUTME: Session: the page-lifetime subscription that re-applies the transform on DOM mutations
// ABOUTME: and fragment changes, with an explicit unsubscribe for testability.

use crate::error::TransformError;
use crate::transformer::Transformer;

/// A page-lifetime subscription over a post page's document.
///
/// The host delivers notifications in order; each one is processed to
/// completion before the next, and each update pass sees the document state
/// left by the previous pass. In a single-page-view model the subscription
/// lives as long as the page, but `unsubscribe` detaches it explicitly: later
/// notifications are ignored and the last rendered document stays available.
#[derive(Debug)]
pub struct Session {
    transformer: Transformer,
    html: String,
    fragment: Option<String>,
    subscribed: bool,
}

impl Session {
    /// Starts a session, running the eager initial update pass.
    pub fn new(transformer: Transformer, html: &str) -> Result<Self, TransformError> {
        let html = transformer.transform(html)?;
        Ok(Self {
            transformer,
            html,
            fragment: None,
            subscribed: true,
        })
    }

    /// The current rendered document.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Whether notifications are still being processed.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Detach from the page; subsequent notifications are ignored.
    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    /// The host's DOM changed; `html` is the document as the host now sees it.
    /// Re-applies the transform, then re-reveals the last known fragment so a
    /// linked comment stays visible across re-renders.
    pub fn dom_mutated(&mut self, html: &str) -> Result<(), TransformError> {
        if !self.subscribed {
            return Ok(());
        }
        self.html = self.transformer.transform(html)?;
        if let Some(fragment) = self.fragment.clone() {
            if let Some(updated) = self.transformer.reveal_anchor(&self.html, &fragment) {
                self.html = updated;
            }
        }
        Ok(())
    }

    /// The URL fragment changed; opens the disclosure hiding the target, if any.
    pub fn fragment_changed(&mut self, fragment: &str) {
        if !self.subscribed {
            return;
        }
        self.fragment = Some(fragment.to_string());
        if let Some(updated) = self.transformer.reveal_anchor(&self.html, fragment) {
            self.html = updated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head></head><body>
<div class="my-3"><div><div>
  <article data-comment-id="top">
    <div><div><a title="@alice"></a></div></div>
    <div class="prose">top comment</div>
  </article>
  <div class="replies">
    <div class="border-l">
      <article data-comment-id="r1">
        <div><div><a title="@bob"></a></div></div>
        <div class="prose">a reply</div>
      </article>
      <div class="replies">
        <div class="border-l">
          <article id="comment-r1a" data-comment-id="r1a">
            <div><div><a title="@carol"></a></div></div>
            <div class="prose">deep reply</div>
          </article>
        </div>
      </div>
    </div>
  </div>
</div></div></div>
</body></html>"#;

    #[test]
    fn test_eager_pass_runs_at_startup() {
        let session = Session::new(Transformer::default(), PAGE).unwrap();
        assert!(session.html().contains("<details"));
        assert!(session.html().contains("uc-style"));
    }

    #[test]
    fn test_mutation_reprocesses_in_order() {
        let mut session = Session::new(Transformer::default(), PAGE).unwrap();
        let first = session.html().to_string();
        // The host re-delivers the already-flattened document: nothing changes.
        session.dom_mutated(&first).unwrap();
        assert_eq!(session.html(), first);
    }

    #[test]
    fn test_fragment_change_opens_disclosure() {
        let mut session = Session::new(Transformer::default(), PAGE).unwrap();
        assert!(!session.html().contains("open=\"\""));
        session.fragment_changed("#comment-r1a");
        assert!(session.html().contains("open=\"\""));
    }

    #[test]
    fn test_mutation_re_reveals_known_fragment() {
        let mut session = Session::new(Transformer::default(), PAGE).unwrap();
        session.fragment_changed("#comment-r1a");
        // A fresh copy of the page arrives with the disclosure closed again.
        session.dom_mutated(PAGE).unwrap();
        assert!(session.html().contains("open=\"\""));
    }

    #[test]
    fn test_failed_mutation_keeps_previous_document() {
        // The depth-2 comment has no avatar region, so the update pass fails.
        const BROKEN: &str = r#"<html><head></head><body>
<div class="my-3"><div><div>
  <article data-comment-id="top">
    <div><div><a title="@alice"></a></div></div>
    <div class="prose">top comment</div>
  </article>
  <div class="replies">
    <div class="border-l">
      <article data-comment-id="r1">
        <div><div><a title="@bob"></a></div></div>
        <div class="prose">a reply</div>
      </article>
      <div class="replies">
        <div class="border-l">
          <article data-comment-id="bare">
            <div class="prose">no avatar here</div>
          </article>
        </div>
      </div>
    </div>
  </div>
</div></div></div>
</body></html>"#;

        let mut session = Session::new(Transformer::default(), PAGE).unwrap();
        let before = session.html().to_string();

        let err = session.dom_mutated(BROKEN).unwrap_err();
        assert!(err.is_structure());
        // The last rendered document survives the failed pass.
        assert_eq!(session.html(), before);

        // The session is still subscribed; the next valid notification lands.
        assert!(session.is_subscribed());
        session.dom_mutated(PAGE).unwrap();
        assert!(session.html().contains("<details"));
    }

    #[test]
    fn test_unsubscribed_session_ignores_notifications() {
        let mut session = Session::new(Transformer::default(), PAGE).unwrap();
        let before = session.html().to_string();
        session.unsubscribe();
        assert!(!session.is_subscribed());
        session.dom_mutated("<html><body></body></html>").unwrap();
        session.fragment_changed("#comment-r1a");
        assert_eq!(session.html(), before);
    }
}
