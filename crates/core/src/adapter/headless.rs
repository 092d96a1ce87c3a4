//! In-memory host page
//!
//! Enough of a document to drive the adapter without a browser: a tree of
//! elements, CSS selector queries and configurable paste handling so both
//! sides of the insertion fallback chain can be exercised.
//!
//! Queries run through `scraper` against an HTML rendering of the element
//! tree, so nesting the HTML parser would rewrite (a `div` inside a `p`, children
//! of a `textarea`) matches the way a browser would see it.
//!
//! Elements hold either child elements or their own text, not both.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use scraper::{Html, Selector};
use tracing::warn;

use super::dom::{HostElement, HostPage, PageLocation, PanelHandle, SyntheticEvent};
use crate::errors::{DockError, Result};

/// Line height used for the fake `scrollHeight`
const LINE_HEIGHT_PX: f64 = 20.0;

/// How an element reacts to a synthetic paste
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasteBehavior {
    /// A framework listener inserts the pasted text at the caret
    #[default]
    Handled,
    /// Nobody listens; the element stays as it was
    Ignored,
    /// The listener throws
    Throws,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Paragraph(String),
}

#[derive(Debug, Default)]
struct ElementState {
    nodes:        Vec<Node>,
    value:        String,
    focused:      bool,
    caret_at_end: bool,
    style_height: Option<String>,
    events:       Vec<SyntheticEvent>,
}

/// Element of a [`HeadlessPage`]
#[derive(Debug)]
pub struct HeadlessElement {
    tag:        String,
    attributes: BTreeMap<String, String>,
    paste:      PasteBehavior,
    state:      Mutex<ElementState>,
    children:   Mutex<Vec<Arc<HeadlessElement>>>,
}

impl HeadlessElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag:        tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            paste:      PasteBehavior::default(),
            state:      Mutex::new(ElementState::default()),
            children:   Mutex::new(Vec::new()),
        }
    }

    pub fn textarea() -> Self {
        Self::new("textarea")
    }

    /// `<tag contenteditable="true">`
    pub fn editable(tag: &str) -> Self {
        Self::new(tag).attr("contenteditable", "true")
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn paste(mut self, behavior: PasteBehavior) -> Self {
        self.paste = behavior;
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.lock().nodes = vec![Node::Text(text.to_string())];
        self
    }

    pub fn with_value(self, value: &str) -> Self {
        self.lock().value = value.to_string();
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Attach `child` as the last child of `self`
    pub fn append_child(self: &Arc<Self>, child: Arc<HeadlessElement>) -> Arc<HeadlessElement> {
        self.children.lock().unwrap().push(Arc::clone(&child));
        child
    }

    /// Every synthetic event dispatched so far, oldest first
    pub fn events(&self) -> Vec<SyntheticEvent> {
        self.lock().events.clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.lock().events.iter().map(SyntheticEvent::name).collect()
    }

    pub fn caret_at_end(&self) -> bool {
        self.lock().caret_at_end
    }

    pub fn is_focused(&self) -> bool {
        self.lock().focused
    }

    pub fn style_height(&self) -> Option<String> {
        self.lock().style_height.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ElementState> {
        self.state.lock().unwrap()
    }

    fn child_elements(&self) -> Vec<Arc<HeadlessElement>> {
        self.children.lock().unwrap().clone()
    }

    fn insert_pasted(&self, data: &str) {
        if data.contains('\n') {
            for line in data.split('\n') {
                self.append_paragraph(line);
            }
        } else {
            self.append_text(data);
        }
    }
}

fn render_inner_text(nodes: &[Node]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut inline: Option<String> = None;
    for node in nodes {
        match node {
            Node::Text(text) => inline.get_or_insert_with(String::new).push_str(text),
            Node::Paragraph(text) => {
                if let Some(run) = inline.take() {
                    lines.push(run);
                }
                lines.push(text.clone());
            },
        }
    }
    if let Some(run) = inline {
        lines.push(run);
    }
    lines.join("\n")
}

impl HostElement for HeadlessElement {
    fn tag_name(&self) -> String {
        self.tag.clone()
    }

    fn is_content_editable(&self) -> bool {
        self.attributes.get("contenteditable").map(String::as_str) == Some("true")
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(&name.to_ascii_lowercase()).cloned()
    }

    fn children(&self) -> Vec<Arc<dyn HostElement>> {
        self.child_elements()
            .into_iter()
            .map(|c| c as Arc<dyn HostElement>)
            .collect()
    }

    fn text_content(&self) -> String {
        let own: String = self
            .lock()
            .nodes
            .iter()
            .map(|n| match n {
                Node::Text(t) | Node::Paragraph(t) => t.as_str(),
            })
            .collect();
        let nested: String = self.child_elements().iter().map(|c| c.text_content()).collect();
        own + &nested
    }

    fn inner_text(&self) -> String {
        render_inner_text(&self.lock().nodes)
    }

    fn set_inner_text(&self, text: &str) {
        let mut state = self.lock();
        state.nodes = if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::Text(text.to_string())]
        };
    }

    fn value(&self) -> String {
        if self.tag == "textarea" || self.tag == "input" {
            self.lock().value.clone()
        } else {
            String::new()
        }
    }

    fn set_value(&self, value: &str) {
        self.lock().value = value.to_string();
    }

    fn clear(&self) {
        let mut state = self.lock();
        state.nodes.clear();
        state.caret_at_end = false;
    }

    fn last_text(&self) -> Option<String> {
        self.lock().nodes.last().map(|n| match n {
            Node::Text(t) | Node::Paragraph(t) => t.clone(),
        })
    }

    fn append_text(&self, text: &str) {
        let mut state = self.lock();
        match state.nodes.last_mut() {
            Some(Node::Text(last)) | Some(Node::Paragraph(last)) => last.push_str(text),
            None => state.nodes.push(Node::Text(text.to_string())),
        }
    }

    fn append_paragraph(&self, line: &str) {
        self.lock().nodes.push(Node::Paragraph(line.to_string()));
    }

    fn focus(&self) {
        self.lock().focused = true;
    }

    fn move_caret_to_end(&self) {
        self.lock().caret_at_end = true;
    }

    fn dispatch(&self, event: &SyntheticEvent) -> Result<()> {
        self.lock().events.push(event.clone());
        if let SyntheticEvent::Paste { data } = event {
            match self.paste {
                PasteBehavior::Handled => self.insert_pasted(data),
                PasteBehavior::Ignored => {},
                PasteBehavior::Throws => {
                    return Err(DockError::Other("paste listener threw".to_string()));
                },
            }
        }
        Ok(())
    }

    fn scroll_height(&self) -> f64 {
        let state = self.lock();
        let lines = if self.tag == "textarea" {
            state.value.split('\n').count()
        } else {
            render_inner_text(&state.nodes).split('\n').count()
        };
        lines as f64 * LINE_HEIGHT_PX
    }

    fn set_style_height(&self, css: &str) {
        self.lock().style_height = Some(css.to_string());
    }
}

// ============================================================================
// Selector matching
// ============================================================================

/// Marks each rendered element with its pre-order position below `<body>`
const INDEX_ATTR: &str = "data-headless-index";

/// Render the tree under `body` as an HTML document for `scraper`
///
/// `rendered[i]` is the element carrying index `i`. Text and values are left
/// out; selectors only look at tags and attributes.
fn render_document(body: &HeadlessElement, rendered: &mut Vec<Arc<HeadlessElement>>) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head></head><body>");
    for child in body.child_elements() {
        render_element(&child, &mut html, rendered);
    }
    html.push_str("</body></html>");
    html
}

fn render_element(el: &Arc<HeadlessElement>, html: &mut String, rendered: &mut Vec<Arc<HeadlessElement>>) {
    html.push('<');
    html.push_str(&el.tag);
    for (name, value) in &el.attributes {
        if name == INDEX_ATTR {
            continue;
        }
        html.push(' ');
        html.push_str(name);
        html.push_str("=\"");
        html.push_str(&escape_attr(value));
        html.push('"');
    }
    html.push_str(&format!(" {}=\"{}\">", INDEX_ATTR, rendered.len()));
    rendered.push(Arc::clone(el));
    for child in el.child_elements() {
        render_element(&child, html, rendered);
    }
    html.push_str("</");
    html.push_str(&el.tag);
    html.push('>');
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

// ============================================================================
// Page
// ============================================================================

/// In-memory document with a current location
pub struct HeadlessPage {
    location: Mutex<PageLocation>,
    body:     Arc<HeadlessElement>,
}

impl HeadlessPage {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            location: Mutex::new(PageLocation::parse(url)?),
            body:     HeadlessElement::new("body").build(),
        })
    }

    /// The `<body>` element; attach page content under it
    pub fn body(&self) -> &Arc<HeadlessElement> {
        &self.body
    }

    /// Attach `el` under `<body>`
    pub fn mount(&self, el: Arc<HeadlessElement>) -> Arc<HeadlessElement> {
        self.body.append_child(el)
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        *self.location.lock().unwrap() = PageLocation::parse(url)?;
        Ok(())
    }
}

impl HostPage for HeadlessPage {
    fn location(&self) -> PageLocation {
        self.location.lock().unwrap().clone()
    }

    fn query_selector_all(&self, css: &str) -> Vec<Arc<dyn HostElement>> {
        let selector = match Selector::parse(css) {
            Ok(selector) => selector,
            Err(err) => {
                warn!(css, error = %err, "invalid selector");
                return Vec::new();
            },
        };
        let mut all = Vec::new();
        let document = Html::parse_document(&render_document(&self.body, &mut all));
        document
            .select(&selector)
            .filter_map(|node| node.value().attr(INDEX_ATTR)?.parse::<usize>().ok())
            .filter_map(|index| all.get(index).cloned())
            .map(|el| el as Arc<dyn HostElement>)
            .collect()
    }
}

/// Panel stand-in that counts `hide()` calls
#[derive(Debug, Default)]
pub struct RecordingPanel {
    hidden: Mutex<usize>,
}

impl RecordingPanel {
    pub fn hide_count(&self) -> usize {
        *self.hidden.lock().unwrap()
    }
}

impl PanelHandle for RecordingPanel {
    fn hide(&self) {
        *self.hidden.lock().unwrap() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> HeadlessPage {
        HeadlessPage::new("https://example.com/chat").unwrap()
    }

    // ========================================
    // Selectors
    // ========================================

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let page = page();
        page.mount(HeadlessElement::textarea().build());
        assert!(page.query_selector_all("textarea >").is_empty());
        assert!(page.query_selector_all("").is_empty());
    }

    #[test]
    fn test_child_combinator_and_pseudo_classes() {
        let page = page();
        let form = page.mount(HeadlessElement::new("form").build());
        form.append_child(HeadlessElement::textarea().id("direct").build());
        let wrapper = form.append_child(HeadlessElement::new("div").build());
        wrapper.append_child(HeadlessElement::textarea().id("nested").build());

        let direct = page.query_selector_all("form > textarea");
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].attribute("id").as_deref(), Some("direct"));

        let last = page.query_selector("form textarea:not(#direct)").unwrap();
        assert_eq!(last.attribute("id").as_deref(), Some("nested"));
        assert_eq!(page.query_selector_all(r#"[id^="dir"]"#).len(), 1);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let page = page();
        page.mount(HeadlessElement::new("div").attr("aria-label", r#"Say "hi" & <go>"#).build());
        assert_eq!(page.query_selector_all(r#"div[aria-label='Say "hi" & <go>']"#).len(), 1);
    }

    #[test]
    fn test_query_by_id_class_and_attr() {
        let page = page();
        page.mount(HeadlessElement::textarea().id("prompt-textarea").build());
        page.mount(HeadlessElement::editable("div").class("ql-editor other").build());

        assert_eq!(page.query_selector_all("#prompt-textarea").len(), 1);
        assert_eq!(page.query_selector_all("div.ql-editor").len(), 1);
        assert_eq!(page.query_selector_all(r#"[contenteditable="true"]"#).len(), 1);
        assert_eq!(page.query_selector_all("[contenteditable=false]").len(), 0);
        assert_eq!(page.query_selector_all("textarea, div").len(), 2);
    }

    #[test]
    fn test_descendant_combinator() {
        let page = page();
        let form = page.mount(HeadlessElement::new("form").build());
        let wrapper = form.append_child(HeadlessElement::new("div").build());
        wrapper.append_child(HeadlessElement::textarea().id("inner").build());
        page.mount(HeadlessElement::textarea().id("outer").build());

        let found = page.query_selector_all("form textarea");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attribute("id").as_deref(), Some("inner"));
    }

    // ========================================
    // Element behavior
    // ========================================

    #[test]
    fn test_inner_text_blocks() {
        let el = HeadlessElement::editable("div").text("lead").build();
        el.append_paragraph("one");
        el.append_paragraph("");
        el.append_text("!");
        assert_eq!(el.inner_text(), "lead\none\n!");
        assert_eq!(el.text_content(), "leadone!");
    }

    #[test]
    fn test_paste_behaviors() {
        let handled = HeadlessElement::editable("div").build();
        handled.dispatch(&SyntheticEvent::Paste { data: "a\nb".into() }).unwrap();
        assert_eq!(handled.inner_text(), "a\nb");

        let ignored = HeadlessElement::editable("div").paste(PasteBehavior::Ignored).build();
        ignored.dispatch(&SyntheticEvent::Paste { data: "a".into() }).unwrap();
        assert_eq!(ignored.inner_text(), "");

        let throws = HeadlessElement::editable("div").paste(PasteBehavior::Throws).build();
        assert!(throws.dispatch(&SyntheticEvent::Paste { data: "a".into() }).is_err());
        assert_eq!(throws.event_names(), vec!["paste"]);
    }

    #[test]
    fn test_value_only_on_form_controls() {
        let div = HeadlessElement::new("div").with_value("x").build();
        assert_eq!(div.value(), "");
        let ta = HeadlessElement::textarea().with_value("x\ny").build();
        assert_eq!(ta.value(), "x\ny");
        assert_eq!(ta.scroll_height(), 40.0);
    }

    #[test]
    fn test_navigate() {
        let page = page();
        page.navigate("https://claude.ai/new").unwrap();
        assert_eq!(page.location().hostname, "claude.ai");
        assert!(page.navigate("::").is_err());
    }

    #[test]
    fn test_recording_panel() {
        let panel = RecordingPanel::default();
        panel.hide();
        panel.hide();
        assert_eq!(panel.hide_count(), 2);
    }
}
