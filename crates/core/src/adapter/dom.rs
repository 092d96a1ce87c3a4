//! Host page seam
//!
//! The adapter never touches a real DOM. It talks to the page through
//! [`HostPage`] and [`HostElement`]; a browser bridge implements them over the
//! live document and [`super::headless`] implements them in memory.

use std::sync::Arc;

use url::Url;

use crate::errors::Result;

/// Where the host page currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub hostname: String,
    pub pathname: String,
}

impl PageLocation {
    /// Parse a full page URL
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)?;
        Ok(Self {
            hostname: url.host_str().unwrap_or_default().to_ascii_lowercase(),
            pathname: url.path().to_string(),
        })
    }
}

/// Events the adapter simulates so host frameworks notice a change
///
/// All of them bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticEvent {
    Input,
    Change,
    /// Paste carrying `data` as `text/plain`
    Paste { data: String },
}

impl SyntheticEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SyntheticEvent::Input => "input",
            SyntheticEvent::Change => "change",
            SyntheticEvent::Paste { .. } => "paste",
        }
    }
}

/// Read/query access to the host document
pub trait HostPage: Send + Sync {
    fn location(&self) -> PageLocation;

    /// Every element matching `css`, in document order
    fn query_selector_all(&self, css: &str) -> Vec<Arc<dyn HostElement>>;

    fn query_selector(&self, css: &str) -> Option<Arc<dyn HostElement>> {
        self.query_selector_all(css).into_iter().next()
    }
}

/// One element of the host document
///
/// Mutating calls take `&self`; the underlying node is shared with the page.
pub trait HostElement: Send + Sync {
    /// Lowercase tag name
    fn tag_name(&self) -> String;

    /// `contentEditable === "true"`
    fn is_content_editable(&self) -> bool;

    fn attribute(&self, name: &str) -> Option<String>;

    fn children(&self) -> Vec<Arc<dyn HostElement>>;

    fn text_content(&self) -> String;

    fn inner_text(&self) -> String;

    fn set_inner_text(&self, text: &str);

    /// Form control value; empty for non-form elements
    fn value(&self) -> String;

    fn set_value(&self, value: &str);

    /// Remove all content
    fn clear(&self);

    /// Text of the last text-bearing node, `None` when empty
    fn last_text(&self) -> Option<String>;

    /// Insert text at the end of the last block
    fn append_text(&self, text: &str);

    /// Append a paragraph block; an empty line becomes a line-break placeholder
    fn append_paragraph(&self, line: &str);

    fn focus(&self);

    fn move_caret_to_end(&self);

    /// Dispatch a bubbling synthetic event; `Err` when a host listener threw
    fn dispatch(&self, event: &SyntheticEvent) -> Result<()>;

    fn scroll_height(&self) -> f64;

    fn set_style_height(&self, css: &str);
}

/// The widget panel, hidden after a successful insertion
pub trait PanelHandle: Send + Sync {
    fn hide(&self);
}
