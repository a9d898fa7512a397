//! DOM Reconciler
//!
//! Merges a freshly fetched page into the live document.
//!
//! # Order
//!
//! ```text
//! body -> <html>/<body> attributes -> title -> stylesheets -> (frame) -> hydrate
//! ```
//!
//! The order is fixed so the re-activation hook always observes a fully
//! patched document. Errors are not swallowed here; the orchestrator turns
//! them into a full reload.
//!
//! # Modules
//!
//! - `attrs` - Pure attribute diff for root elements
//! - `hook` - Optional island re-activation callback
//! - `stylesheet` - Cache-busting href rewrite

pub mod attrs;
pub mod hook;
pub mod stylesheet;

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::dom::{Attrs, DomError, Document, Node};
use crate::utils::plural::plural_count;

pub use attrs::{AttrDiff, diff_attrs};
pub use hook::HydrateHook;
pub use stylesheet::CacheBuster;

/// Delay before re-activation, one display frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// =============================================================================
// Live document seam
// =============================================================================

/// Root elements whose attributes are synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    Html,
    Body,
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html => "html",
            Self::Body => "body",
        })
    }
}

/// The mutations the reconciler performs on a live page.
///
/// `dom::Document` implements this for the headless client; a browser
/// binding would map each method onto the matching DOM call.
pub trait LiveDocument {
    fn replace_body(&mut self, children: &[Node]) -> Result<(), DomError>;

    fn root_attrs(&self, root: Root) -> Attrs;

    fn set_root_attr(&mut self, root: Root, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_root_attr(&mut self, root: Root, name: &str) -> Result<(), DomError>;

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str) -> Result<(), DomError>;

    /// `href` of every stylesheet link, in document order.
    fn stylesheet_hrefs(&self) -> Vec<Option<String>>;

    fn set_stylesheet_href(&mut self, index: usize, href: &str) -> Result<(), DomError>;
}

// =============================================================================
// Errors and report
// =============================================================================

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid stylesheet href `{href}`")]
    Href {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub html: AttrDiff,
    pub body: AttrDiff,
    /// New title, if it changed
    pub title: Option<String>,
    /// Number of stylesheet hrefs rewritten
    pub stylesheets: usize,
    /// Whether the re-activation hook ran
    pub hydrated: bool,
}

impl ReconcileReport {
    /// One-line summary for status output.
    pub fn summary(&self) -> String {
        let mut parts = vec!["body replaced".to_string()];
        let attrs = self.html.len() + self.body.len();
        if attrs > 0 {
            parts.push(plural_count(attrs, "attribute change"));
        }
        if let Some(title) = &self.title {
            parts.push(format!("title \"{title}\""));
        }
        if self.stylesheets > 0 {
            parts.push(format!("{} refreshed", plural_count(self.stylesheets, "stylesheet")));
        }
        if self.hydrated {
            parts.push("islands re-activated".to_string());
        }
        parts.join(", ")
    }
}

// =============================================================================
// Reconciler
// =============================================================================

#[derive(Debug)]
pub struct Reconciler {
    /// Base for resolving stylesheet hrefs
    base: Url,
    buster: CacheBuster,
    frame: Duration,
    hook: HydrateHook,
}

impl Reconciler {
    pub fn new(page_url: &Url) -> Self {
        Self {
            base: page_url.clone(),
            buster: CacheBuster::new(),
            frame: FRAME_INTERVAL,
            hook: HydrateHook::none(),
        }
    }

    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_hook(mut self, hook: HydrateHook) -> Self {
        self.hook = hook;
        self
    }

    /// Patch `live` so it shows `fetched`.
    pub async fn reconcile<D: LiveDocument>(
        &mut self,
        live: &mut D,
        fetched: &Document,
    ) -> Result<ReconcileReport, ReconcileError> {
        live.replace_body(&fetched.body().children)?;

        let html = sync_root(live, Root::Html, fetched.html_attrs())?;
        let body = sync_root(live, Root::Body, &fetched.body().attrs)?;

        let title = fetched.title();
        let title = if live.title() != title {
            live.set_title(&title)?;
            Some(title)
        } else {
            None
        };

        let stylesheets = self.bust_stylesheets(live)?;

        // Let the new markup settle before handing it to the page runtime
        tokio::time::sleep(self.frame).await;
        let hydrated = self.hook.invoke();

        Ok(ReconcileReport {
            html,
            body,
            title,
            stylesheets,
            hydrated,
        })
    }

    fn bust_stylesheets<D: LiveDocument>(&mut self, live: &mut D) -> Result<usize, ReconcileError> {
        let stamp = self.buster.next_stamp();
        let mut count = 0;

        for (index, href) in live.stylesheet_hrefs().into_iter().enumerate() {
            let Some(href) = href else { continue };
            let busted = stylesheet::bust_href(&self.base, &href, stamp)
                .map_err(|source| ReconcileError::Href { href, source })?;
            live.set_stylesheet_href(index, &busted)?;
            count += 1;
        }

        Ok(count)
    }
}

/// Set new/changed attributes, then remove stale ones.
fn sync_root<D: LiveDocument>(
    live: &mut D,
    root: Root,
    fetched: &Attrs,
) -> Result<AttrDiff, DomError> {
    let diff = diff_attrs(&live.root_attrs(root), fetched);
    for (name, value) in &diff.set {
        live.set_root_attr(root, name, value)?;
    }
    for name in &diff.remove {
        live.remove_root_attr(root, name)?;
    }
    if !diff.is_empty() {
        crate::debug!("reload"; "<{}> {}", root, plural_count(diff.len(), "attribute change"));
    }
    Ok(diff)
}
