//! Prompt, folder and store records plus their normalization rules
//!
//! Everything read from the substrate goes through `normalize_*` before the
//! rest of the crate sees it. Normalization is idempotent: feeding a
//! normalized record back in yields the same record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::schema::CURRENT_VERSION;
use crate::clock::{parse_timestamp, Clock};
use crate::ids;

/// One reusable text snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub uuid:       String,
    pub title:      String,
    pub content:    String,
    #[serde(default)]
    pub tags:       Vec<String>,
    #[serde(default)]
    pub folder_id:  Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Prompt {
    /// Timestamp used to decide which of two copies is newer
    pub fn effective_timestamp(&self) -> &str {
        self.updated_at.as_deref().unwrap_or(&self.created_at)
    }

    /// Whether `self` is strictly newer than `other`
    ///
    /// Unparseable timestamps never win.
    pub fn is_newer_than(&self, other: &Prompt) -> bool {
        match (
            parse_timestamp(self.effective_timestamp()),
            parse_timestamp(other.effective_timestamp()),
        ) {
            (Some(mine), Some(theirs)) => mine > theirs,
            _ => false,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Optional grouping container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id:         String,
    pub name:       String,
    #[serde(default)]
    pub parent_id:  Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Root persisted object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub version: u32,
    pub prompts: Vec<Prompt>,
    pub folders: Vec<Folder>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            prompts: Vec::new(),
            folders: Vec::new(),
        }
    }
}

/// Fields accepted when creating a prompt
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrompt {
    #[serde(default)]
    pub title:     String,
    #[serde(default)]
    pub content:   String,
    #[serde(default)]
    pub tags:      Option<Vec<String>>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub uuid:      Option<String>,
}

/// Partial update for a prompt; absent fields are left untouched
///
/// `folder_id: Some(None)` moves the prompt out of its folder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPatch {
    #[serde(default)]
    pub title:     Option<String>,
    #[serde(default)]
    pub content:   Option<String>,
    #[serde(default)]
    pub tags:      Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<String>>,
}

/// Fields accepted when creating a folder
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFolder {
    #[serde(default)]
    pub name:      String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Partial update for a folder
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPatch {
    #[serde(default)]
    pub name:      Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<String>>,
}

/// Distinguish an explicit `null` from an absent field
fn double_option<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Result of normalizing one record
#[derive(Debug)]
pub(crate) struct Normalized<T> {
    pub value:    T,
    /// An identity or creation stamp had to be invented
    pub repaired: bool,
}

/// Trim, drop empties and deduplicate while keeping first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

/// Folder references must be non-empty strings
pub fn normalize_folder_ref(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn optional_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn tags_field(obj: &Map<String, Value>) -> Vec<String> {
    match obj.get("tags") {
        Some(Value::Array(items)) => {
            normalize_tags(items.iter().filter_map(|v| v.as_str()))
        },
        // Very old records kept tags as one comma-separated string
        Some(Value::String(s)) => normalize_tags(s.split(',')),
        _ => Vec::new(),
    }
}

/// Coerce any prompt-like JSON value into a [`Prompt`]
///
/// Returns `None` for values that are not objects at all.
pub(crate) fn normalize_prompt_value(raw: &Value, clock: &dyn Clock) -> Option<Normalized<Prompt>> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            warn!(value = %raw, "dropping non-object prompt entry");
            return None;
        },
    };

    let mut repaired = false;
    let uuid = optional_string(obj, "uuid")
        .or_else(|| optional_string(obj, "id"))
        .unwrap_or_else(|| {
            repaired = true;
            ids::generate()
        });
    let created_at = optional_string(obj, "createdAt").unwrap_or_else(|| {
        repaired = true;
        clock.now_iso()
    });
    let folder_id = normalize_folder_ref(optional_string(obj, "folderId"));

    Some(Normalized {
        value: Prompt {
            uuid,
            title: text_field(obj, "title"),
            content: text_field(obj, "content"),
            tags: tags_field(obj),
            folder_id,
            created_at,
            updated_at: optional_string(obj, "updatedAt"),
        },
        repaired,
    })
}

/// Coerce any folder-like JSON value into a [`Folder`]
pub(crate) fn normalize_folder_value(raw: &Value, clock: &dyn Clock) -> Option<Normalized<Folder>> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            warn!(value = %raw, "dropping non-object folder entry");
            return None;
        },
    };

    let mut repaired = false;
    let id = optional_string(obj, "id").unwrap_or_else(|| {
        repaired = true;
        ids::generate()
    });
    let created_at = optional_string(obj, "createdAt").unwrap_or_else(|| {
        repaired = true;
        clock.now_iso()
    });

    Some(Normalized {
        value: Folder {
            id,
            name: text_field(obj, "name"),
            parent_id: normalize_folder_ref(optional_string(obj, "parentId")),
            created_at,
            updated_at: optional_string(obj, "updatedAt"),
        },
        repaired,
    })
}

/// Normalize an already-typed prompt
///
/// Used for records handed in by callers (`set_prompts`, merges) so the same
/// rules apply whether data came from disk or from the UI.
pub fn normalize_prompt(prompt: Prompt, clock: &dyn Clock) -> Prompt {
    let uuid = if prompt.uuid.trim().is_empty() {
        ids::generate()
    } else {
        prompt.uuid
    };
    let created_at = if prompt.created_at.trim().is_empty() {
        clock.now_iso()
    } else {
        prompt.created_at
    };
    Prompt {
        uuid,
        title: prompt.title,
        content: prompt.content,
        tags: normalize_tags(&prompt.tags),
        folder_id: normalize_folder_ref(prompt.folder_id),
        created_at,
        updated_at: prompt.updated_at.filter(|s| !s.trim().is_empty()),
    }
}

/// Normalize an already-typed folder
pub fn normalize_folder(folder: Folder, clock: &dyn Clock) -> Folder {
    let id = if folder.id.trim().is_empty() {
        ids::generate()
    } else {
        folder.id
    };
    let created_at = if folder.created_at.trim().is_empty() {
        clock.now_iso()
    } else {
        folder.created_at
    };
    Folder {
        id,
        name: folder.name,
        parent_id: normalize_folder_ref(folder.parent_id),
        created_at,
        updated_at: folder.updated_at.filter(|s| !s.trim().is_empty()),
    }
}

/// Normalize a list of raw prompt values, dropping non-objects
pub(crate) fn normalize_prompt_list(items: &[Value], clock: &dyn Clock) -> Normalized<Vec<Prompt>> {
    let mut repaired = false;
    let mut prompts = Vec::with_capacity(items.len());
    for item in items {
        if let Some(n) = normalize_prompt_value(item, clock) {
            repaired |= n.repaired;
            prompts.push(n.value);
        } else {
            repaired = true;
        }
    }
    Normalized {
        value: prompts,
        repaired,
    }
}

/// Normalize a list of raw folder values, dropping non-objects
pub(crate) fn normalize_folder_list(items: &[Value], clock: &dyn Clock) -> Normalized<Vec<Folder>> {
    let mut repaired = false;
    let mut folders = Vec::with_capacity(items.len());
    for item in items {
        if let Some(n) = normalize_folder_value(item, clock) {
            repaired |= n.repaired;
            folders.push(n.value);
        } else {
            repaired = true;
        }
    }
    Normalized {
        value: folders,
        repaired,
    }
}
