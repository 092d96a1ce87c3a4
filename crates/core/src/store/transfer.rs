//! Import/export formats
//!
//! - JSON export: pretty-printed prompt array, `prompts-<YYYY-MM-DD>.json`
//! - JSON backup: the whole store object
//! - JSON import: a bare prompt array or a `{prompts, folders}` object
//! - CSV (legacy): `Title,Content,Folder`, every field quoted

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::model::{Folder, Prompt};
use crate::errors::{DockError, ImportFormatKind, Result};

/// Where imported data comes from
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// A JSON file picked by the user
    File(PathBuf),
    /// Raw JSON text
    Text(String),
    /// An already-parsed prompt list
    Array(Vec<Value>),
    /// An already-parsed store-shaped object
    Object(Value),
}

impl From<Value> for ImportSource {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ImportSource::Array(items),
            other => ImportSource::Object(other),
        }
    }
}

impl From<&str> for ImportSource {
    fn from(text: &str) -> Self {
        ImportSource::Text(text.to_string())
    }
}

/// Import payload after format validation, before normalization
#[derive(Debug, Default)]
pub(crate) struct ImportPayload {
    pub prompts: Vec<Value>,
    pub folders: Vec<Value>,
}

/// Validate and unpack an import source
pub(crate) async fn read_import(source: ImportSource) -> Result<ImportPayload> {
    let value = match source {
        ImportSource::File(path) => {
            let text = tokio::fs::read_to_string(&path).await?;
            parse_json_text(&text)?
        },
        ImportSource::Text(text) => parse_json_text(&text)?,
        ImportSource::Array(items) => Value::Array(items),
        ImportSource::Object(value) => value,
    };
    unpack(value)
}

fn parse_json_text(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Err(DockError::invalid_format(ImportFormatKind::Empty, ""));
    }
    serde_json::from_str(text)
        .map_err(|e| DockError::invalid_format(ImportFormatKind::NotJson, e.to_string()))
}

fn unpack(value: Value) -> Result<ImportPayload> {
    match value {
        Value::Array(prompts) => Ok(ImportPayload {
            prompts,
            folders: Vec::new(),
        }),
        Value::Object(mut obj) => {
            let prompts = match obj.remove("prompts") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(DockError::invalid_format(
                        ImportFormatKind::WrongShape,
                        "object has no \"prompts\" array",
                    ))
                },
            };
            let folders = match obj.remove("folders") {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) => Vec::new(),
                Some(_) => {
                    return Err(DockError::invalid_format(
                        ImportFormatKind::WrongShape,
                        "\"folders\" must be an array",
                    ))
                },
            };
            Ok(ImportPayload { prompts, folders })
        },
        other => Err(DockError::invalid_format(
            ImportFormatKind::WrongShape,
            format!("got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A file ready to be handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

impl ExportFile {
    /// Write the file into `dir`, returning its full path
    pub async fn save_to(&self, dir: &std::path::Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.contents).await?;
        Ok(path)
    }
}

/// `prompts-2024-05-01.json`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("prompts-{}.json", now.format("%Y-%m-%d"))
}

/// `prompts-backup-2024-05-01.json`
pub fn backup_filename(now: DateTime<Utc>) -> String {
    format!("prompts-backup-{}.json", now.format("%Y-%m-%d"))
}

/// Pretty JSON with two-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// ============================================================================
// CSV
// ============================================================================

pub const CSV_HEADER: &str = "Title,Content,Folder";

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render prompts as CSV, resolving folder ids to names
pub fn prompts_to_csv(prompts: &[Prompt], folders: &[Folder]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for prompt in prompts {
        let folder = prompt
            .folder_id
            .as_deref()
            .and_then(|id| folders.iter().find(|f| f.id == id))
            .map(|f| f.name.as_str())
            .unwrap_or("");
        out.push_str(&csv_quote(&prompt.title));
        out.push(',');
        out.push_str(&csv_quote(&prompt.content));
        out.push(',');
        out.push_str(&csv_quote(folder));
        out.push('\n');
    }
    out
}

/// One data row from a CSV import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub title:   String,
    pub content: String,
    pub folder:  Option<String>,
}

/// Parse CSV records; quoted fields may contain commas, doubled quotes and
/// line breaks
pub fn parse_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                },
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {},
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            },
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .collect()
}

/// Parse a prompt CSV, skipping the header row when present
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>> {
    if text.trim().is_empty() {
        return Err(DockError::invalid_format(ImportFormatKind::Empty, ""));
    }
    let mut records = parse_csv_records(text).into_iter().peekable();
    let has_header = records
        .peek()
        .map(|r| r.first().map(|f| f.trim().eq_ignore_ascii_case("title")).unwrap_or(false))
        .unwrap_or(false);
    if has_header {
        records.next();
    }

    let mut rows = Vec::new();
    for record in records {
        if record.len() < 2 {
            return Err(DockError::invalid_format(
                ImportFormatKind::WrongShape,
                format!("expected at least Title,Content columns, got {} field(s)", record.len()),
            ));
        }
        let folder = record
            .get(2)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        rows.push(CsvRow {
            title: record[0].clone(),
            content: record[1].clone(),
            folder,
        });
    }
    Ok(rows)
}
