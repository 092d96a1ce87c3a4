//! Writing into the two kinds of editable elements chat sites use
//!
//! Host frameworks only pick up changes that arrive with the events a real
//! keystroke or paste would produce, so every write ends with synthetic
//! events and two trailing spaces.

use serde::Serialize;
use tracing::debug;

use super::dom::{HostElement, SyntheticEvent};
use crate::errors::Result;

/// Appended after inserted content so the host registers a dirty input
pub const TRAILING_PAD: &str = "  ";

/// What kind of input an element is, resolved once per element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditableKind {
    ContentEditable,
    TextArea,
    Unsupported,
}

impl EditableKind {
    pub fn of(el: &dyn HostElement) -> Self {
        if el.is_content_editable() {
            EditableKind::ContentEditable
        } else if el.tag_name().eq_ignore_ascii_case("textarea") {
            EditableKind::TextArea
        } else {
            EditableKind::Unsupported
        }
    }

    pub fn is_supported(self) -> bool {
        self != EditableKind::Unsupported
    }
}

/// Current text of an editable element; empty for unsupported ones
pub fn read_content(el: &dyn HostElement) -> String {
    match EditableKind::of(el) {
        EditableKind::ContentEditable => el.inner_text(),
        EditableKind::TextArea => el.value(),
        EditableKind::Unsupported => String::new(),
    }
}

/// Write `content` into `el`
///
/// `append` keeps the existing text; otherwise it is replaced. Callers must
/// not pass [`EditableKind::Unsupported`].
pub fn write(el: &dyn HostElement, kind: EditableKind, content: &str, append: bool) -> Result<()> {
    match kind {
        EditableKind::ContentEditable => write_content_editable(el, content, append),
        EditableKind::TextArea => write_textarea(el, content, append),
        EditableKind::Unsupported => Ok(()),
    }
}

fn ends_with_whitespace(text: &str) -> bool {
    text.chars().last().is_some_and(char::is_whitespace)
}

fn append_paragraphs(el: &dyn HostElement, content: &str) {
    for line in content.split('\n') {
        el.append_paragraph(line);
    }
}

fn write_content_editable(el: &dyn HostElement, content: &str, append: bool) -> Result<()> {
    el.focus();

    if append {
        el.move_caret_to_end();
        if content.contains('\n') {
            append_paragraphs(el, content);
        } else {
            let needs_space = el
                .last_text()
                .is_some_and(|last| !last.is_empty() && !ends_with_whitespace(&last));
            if needs_space {
                el.append_text(&format!(" {}", content));
            } else {
                el.append_text(content);
            }
        }
    } else {
        el.clear();

        // Paste first: frameworks that intercept paste update their own state
        if let Err(err) = el.dispatch(&SyntheticEvent::Paste {
            data: content.to_string(),
        }) {
            debug!(error = %err, "paste simulation failed");
        }

        if el.inner_text().trim().is_empty() && content.contains('\n') {
            debug!("paste not handled, rebuilding paragraphs");
            el.clear();
            append_paragraphs(el, content);
        }

        if el.inner_text().trim().is_empty() {
            debug!("element still empty, assigning innerText");
            el.set_inner_text(content);
        }
    }

    el.append_text(TRAILING_PAD);
    el.move_caret_to_end();
    el.dispatch(&SyntheticEvent::Input)
}

fn write_textarea(el: &dyn HostElement, content: &str, append: bool) -> Result<()> {
    let next = if append {
        let existing = el.value();
        let separator = if existing.is_empty() || ends_with_whitespace(&existing) {
            ""
        } else {
            " "
        };
        format!("{}{}{}{}", existing, separator, content, TRAILING_PAD)
    } else {
        format!("{}{}", content, TRAILING_PAD)
    };

    el.set_value(&next);
    el.focus();
    el.dispatch(&SyntheticEvent::Input)?;
    el.dispatch(&SyntheticEvent::Change)?;

    el.set_style_height("auto");
    el.set_style_height(&format!("{}px", el.scroll_height()));
    Ok(())
}
