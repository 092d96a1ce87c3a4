//! Input-site adapter
//!
//! Finds the chat input on the current host page and writes prompt text into
//! it so the page's own framework notices. Nothing here returns an error for
//! an insertion problem: the host DOM is not ours, so failures are logged and
//! reported as an [`InsertOutcome`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::errors::{DockError, Result};
use crate::store::preferences::keys;
use crate::store::PromptStorage;

pub mod dom;
pub mod editable;
pub mod headless;
pub mod sites;

pub use dom::{HostElement, HostPage, PageLocation, PanelHandle, SyntheticEvent};
pub use editable::EditableKind;
pub use sites::{SiteRule, SiteTable, Strategy};

/// Default time to wait for the host page to render its input
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default poll interval while waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Result of [`InputAdapter::insert_prompt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// `text` was written into an element of the given kind
    Inserted { kind: EditableKind, text: String },
    /// Missing element, content or panel; nothing was touched
    Skipped,
    /// The element is neither contentEditable nor a textarea
    Unsupported { tag: String },
    /// The host page threw during insertion
    Failed(String),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// Wait budget for [`InputAdapter::wait_for_input_box`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTiming {
    pub timeout: Duration,
    pub poll:    Duration,
}

impl Default for WaitTiming {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll:    DEFAULT_POLL_INTERVAL,
        }
    }
}

pub struct InputAdapter {
    page:    Arc<dyn HostPage>,
    sites:   SiteTable,
    storage: Arc<PromptStorage>,
    timing:  WaitTiming,
}

impl InputAdapter {
    pub fn new(page: Arc<dyn HostPage>, sites: SiteTable, storage: Arc<PromptStorage>) -> Self {
        Self {
            page,
            sites,
            storage,
            timing: WaitTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: WaitTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing(&self) -> WaitTiming {
        self.timing
    }

    pub fn sites(&self) -> &SiteTable {
        &self.sites
    }

    /// Locate the input element for the current page
    ///
    /// Uses the first site rule matching the page location and returns the
    /// first element any of its strategies produces.
    pub fn get_input_box(&self) -> Option<Arc<dyn HostElement>> {
        let location = self.page.location();
        let rule = self.sites.rule_for(&location)?;
        rule.strategies
            .iter()
            .find_map(|strategy| self.resolve(strategy))
    }

    fn resolve(&self, strategy: &Strategy) -> Option<Arc<dyn HostElement>> {
        match strategy {
            Strategy::TextScan { css, contains } => self
                .page
                .query_selector_all(css)
                .into_iter()
                .filter(|el| el.text_content().contains(contains.as_str()))
                .find_map(first_editable),
            Strategy::Selector { .. } | Strategy::FormTextarea => self.page.query_selector(strategy.css()),
        }
    }

    /// Poll [`get_input_box`](Self::get_input_box) until it succeeds or
    /// `timeout` elapses
    ///
    /// The poll timer is dropped on both paths.
    pub async fn wait_for_input_box(&self, timeout: Duration, poll: Duration) -> Result<Arc<dyn HostElement>> {
        let poll_loop = async {
            let mut ticker = tokio::time::interval(poll);
            loop {
                ticker.tick().await;
                if let Some(el) = self.get_input_box() {
                    return el;
                }
            }
        };
        match tokio::time::timeout(timeout, poll_loop).await {
            Ok(el) => Ok(el),
            Err(_) => {
                let waited = timeout.as_millis() as u64;
                debug!(waited_ms = waited, host = %self.page.location().hostname, "no input box");
                Err(DockError::InputBoxNotFound(Some(waited)))
            },
        }
    }

    /// Wait using the configured timing
    pub async fn wait_default(&self) -> Result<Arc<dyn HostElement>> {
        self.wait_for_input_box(self.timing.timeout, self.timing.poll).await
    }

    /// Write `content` into `input_box` and hide the panel
    ///
    /// Reads the `disableOverwrite` preference to choose between appending
    /// and replacing. Never fails; see [`InsertOutcome`].
    pub async fn insert_prompt(
        &self,
        input_box: Option<&Arc<dyn HostElement>>,
        content: &str,
        panel: Option<&dyn PanelHandle>,
    ) -> InsertOutcome {
        let (Some(el), Some(panel)) = (input_box, panel) else {
            error!(
                has_input = input_box.is_some(),
                has_panel = panel.is_some(),
                "insert_prompt called without input box or panel"
            );
            return InsertOutcome::Skipped;
        };
        if content.is_empty() {
            error!("insert_prompt called with empty content");
            return InsertOutcome::Skipped;
        }

        let kind = EditableKind::of(el.as_ref());
        if !kind.is_supported() {
            let tag = el.tag_name();
            error!(tag = %tag, "unsupported input element");
            return InsertOutcome::Unsupported { tag };
        }

        let append = self.storage.get_value(keys::DISABLE_OVERWRITE, false).await;
        match editable::write(el.as_ref(), kind, content, append) {
            Ok(()) => {
                panel.hide();
                info!(?kind, append, chars = content.chars().count(), "prompt inserted");
                InsertOutcome::Inserted {
                    kind,
                    text: content.to_string(),
                }
            },
            Err(err) => {
                warn!(error = %err, ?kind, "insertion failed");
                InsertOutcome::Failed(err.user_message())
            },
        }
    }

    /// Current text of the input element
    pub fn get_input_content(&self, input_box: &dyn HostElement) -> String {
        editable::read_content(input_box)
    }
}

/// First supported editable at or below `el`, depth first
fn first_editable(el: Arc<dyn HostElement>) -> Option<Arc<dyn HostElement>> {
    if EditableKind::of(el.as_ref()).is_supported() {
        return Some(el);
    }
    el.children().into_iter().find_map(first_editable)
}
