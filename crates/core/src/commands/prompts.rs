use std::path::PathBuf;

use serde_json::{json, Value};

use super::{parse_args, str_arg, CommandContext};
use crate::errors::{DockError, Result};
use crate::runtime;
use crate::store::{ImportSource, NewPrompt, PromptPatch};

/// `{}` lists everything; `{folderId}` filters, with `null` meaning unfiled
pub fn list(ctx: &CommandContext, args: Value) -> Result<Value> {
    let prompts = match args.get("folderId") {
        Some(folder) => {
            let folder = folder.as_str().map(String::from);
            runtime::block_on(ctx.storage.prompts_in_folder(folder.as_deref()))
        },
        None => runtime::block_on(ctx.storage.get_prompts()),
    };
    Ok(json!({ "prompts": prompts }))
}

pub fn get(ctx: &CommandContext, args: Value) -> Result<Value> {
    let uuid = str_arg("prompts.get", &args, "uuid")?;
    let prompt = runtime::block_on(ctx.storage.get_prompt(uuid))
        .ok_or_else(|| DockError::PromptNotFound(uuid.to_string()))?;
    Ok(json!(prompt))
}

/// Returns the save outcome as-is; only validation failures become errors
pub fn save(ctx: &CommandContext, args: Value) -> Result<Value> {
    let input: NewPrompt = parse_args("prompts.save", args)?;
    let outcome = runtime::block_on(ctx.storage.save_prompt(input))?;
    Ok(json!(outcome))
}

pub fn update(ctx: &CommandContext, args: Value) -> Result<Value> {
    let uuid = str_arg("prompts.update", &args, "uuid")?.to_string();
    let patch: PromptPatch = parse_args("prompts.update", args)?;
    let prompt = runtime::block_on(ctx.storage.update_prompt(&uuid, patch))?;
    Ok(json!(prompt))
}

pub fn delete(ctx: &CommandContext, args: Value) -> Result<Value> {
    let uuid = str_arg("prompts.delete", &args, "uuid")?;
    let deleted = runtime::block_on(ctx.storage.delete_prompt(uuid))?;
    Ok(json!({ "success": deleted }))
}

/// Replace the whole list (drag-reorder)
pub fn set(ctx: &CommandContext, args: Value) -> Result<Value> {
    let prompts: Vec<Value> = parse_args("prompts.set", args.get("prompts").cloned().unwrap_or(Value::Null))?;
    runtime::block_on(ctx.storage.set_prompt_values(&prompts))?;
    Ok(json!({ "success": true }))
}

pub fn merge(ctx: &CommandContext, args: Value) -> Result<Value> {
    let incoming: Vec<Value> = parse_args("prompts.merge", args.get("prompts").cloned().unwrap_or(Value::Null))?;
    let merged = runtime::block_on(ctx.storage.merge_prompt_values(&incoming))?;
    Ok(json!({ "prompts": merged }))
}

/// `{text}` JSON text, `{csv}` legacy CSV, `{path}` a file, `{data}` parsed JSON
pub fn import(ctx: &CommandContext, args: Value) -> Result<Value> {
    let merged = if let Some(csv) = args.get("csv").and_then(Value::as_str) {
        runtime::block_on(ctx.storage.import_csv(csv))?
    } else {
        let source = if let Some(text) = args.get("text").and_then(Value::as_str) {
            ImportSource::Text(text.to_string())
        } else if let Some(path) = args.get("path").and_then(Value::as_str) {
            ImportSource::File(PathBuf::from(path))
        } else if let Some(data) = args.get("data") {
            ImportSource::from(data.clone())
        } else {
            return Err(DockError::InvalidArgs {
                command: "prompts.import".to_string(),
                reason:  "expected one of 'text', 'csv', 'path' or 'data'".to_string(),
            });
        };
        runtime::block_on(ctx.storage.import_prompts(source))?
    };
    Ok(json!({ "prompts": merged, "count": merged.len() }))
}

/// `{format?: "json" | "backup" | "csv", dir?}`
///
/// With `dir` the JSON export is written there and its path returned.
pub fn export(ctx: &CommandContext, args: Value) -> Result<Value> {
    let format = args.get("format").and_then(Value::as_str).unwrap_or("json");
    let dir = args.get("dir").and_then(Value::as_str).map(PathBuf::from);

    match (format, dir) {
        ("json", Some(dir)) => {
            let path = runtime::block_on(ctx.storage.export_to_dir(&dir))?;
            Ok(json!({ "path": path }))
        },
        ("json", None) => {
            let file = runtime::block_on(ctx.storage.export_prompts())?;
            Ok(json!({ "filename": file.filename, "contents": file.contents }))
        },
        ("backup", dir) => {
            let file = runtime::block_on(ctx.storage.export_store())?;
            match dir {
                Some(dir) => {
                    let path = runtime::block_on(file.save_to(&dir))?;
                    Ok(json!({ "path": path }))
                },
                None => Ok(json!({ "filename": file.filename, "contents": file.contents })),
            }
        },
        ("csv", _) => {
            let contents = runtime::block_on(ctx.storage.export_csv())?;
            Ok(json!({ "contents": contents }))
        },
        (other, _) => Err(DockError::InvalidArgs {
            command: "prompts.export".to_string(),
            reason:  format!("unknown format '{}'", other),
        }),
    }
}

pub fn search(ctx: &CommandContext, args: Value) -> Result<Value> {
    let query = args.get("query").and_then(Value::as_str).unwrap_or("");
    let prompts = runtime::block_on(ctx.storage.search_prompts(query));
    Ok(json!({ "prompts": prompts }))
}
