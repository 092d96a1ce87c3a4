use serde_json::{json, Value};

use super::{parse_args, str_arg, CommandContext};
use crate::errors::Result;
use crate::runtime;

pub fn add(ctx: &CommandContext, args: Value) -> Result<Value> {
    let uuid = str_arg("tags.add", &args, "uuid")?;
    let tag = str_arg("tags.add", &args, "tag")?;
    let prompt = runtime::block_on(ctx.storage.add_tag_to_prompt(uuid, tag))?;
    Ok(json!(prompt))
}

pub fn remove(ctx: &CommandContext, args: Value) -> Result<Value> {
    let uuid = str_arg("tags.remove", &args, "uuid")?;
    let tag = str_arg("tags.remove", &args, "tag")?;
    let prompt = runtime::block_on(ctx.storage.remove_tag_from_prompt(uuid, tag))?;
    Ok(json!(prompt))
}

pub fn set(ctx: &CommandContext, args: Value) -> Result<Value> {
    let uuid = str_arg("tags.set", &args, "uuid")?.to_string();
    let tags: Vec<String> = parse_args("tags.set", args.get("tags").cloned().unwrap_or(Value::Null))?;
    let prompt = runtime::block_on(ctx.storage.set_tags_for_prompt(&uuid, tags))?;
    Ok(json!(prompt))
}

pub fn list(ctx: &CommandContext, _args: Value) -> Result<Value> {
    let tags = runtime::block_on(ctx.storage.all_tags());
    Ok(json!({ "tags": tags }))
}
