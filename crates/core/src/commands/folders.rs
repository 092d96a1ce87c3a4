use serde_json::{json, Value};

use super::{parse_args, str_arg, CommandContext};
use crate::errors::Result;
use crate::runtime;
use crate::store::{FolderPatch, NewFolder};

pub fn list(ctx: &CommandContext, _args: Value) -> Result<Value> {
    let folders = runtime::block_on(ctx.storage.get_folders());
    Ok(json!({ "folders": folders }))
}

pub fn save(ctx: &CommandContext, args: Value) -> Result<Value> {
    let input: NewFolder = parse_args("folders.save", args)?;
    let folder = runtime::block_on(ctx.storage.save_folder(input))?;
    Ok(json!(folder))
}

/// `{id, name?, parentId?}`; `parentId: null` moves the folder to the top level
pub fn update(ctx: &CommandContext, args: Value) -> Result<Value> {
    let id = str_arg("folders.update", &args, "id")?.to_string();
    let patch: FolderPatch = parse_args("folders.update", args)?;
    let folder = runtime::block_on(ctx.storage.update_folder(&id, patch))?;
    Ok(json!(folder))
}

/// Prompts in the folder are kept and become unfiled
pub fn delete(ctx: &CommandContext, args: Value) -> Result<Value> {
    let id = str_arg("folders.delete", &args, "id")?;
    runtime::block_on(ctx.storage.delete_folder(id))?;
    Ok(json!({ "success": true }))
}
