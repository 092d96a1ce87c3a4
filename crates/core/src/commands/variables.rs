use std::collections::HashMap;

use serde_json::{json, Value};

use super::{parse_args, str_arg, CommandContext};
use crate::errors::Result;
use crate::variables::{extract_variables, replace_variables};

pub fn extract(_ctx: &CommandContext, args: Value) -> Result<Value> {
    let content = str_arg("variables.extract", &args, "content")?;
    Ok(json!({ "variables": extract_variables(content) }))
}

/// `{content, values: {name: value}}`
pub fn replace(_ctx: &CommandContext, args: Value) -> Result<Value> {
    let content = str_arg("variables.replace", &args, "content")?;
    let values: HashMap<String, String> = parse_args(
        "variables.replace",
        args.get("values").cloned().unwrap_or_else(|| json!({})),
    )?;
    Ok(json!({ "content": replace_variables(content, &values) }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::commands::dispatch;
    use crate::commands::test_support::context;

    #[test]
    fn test_extract_and_replace() {
        let ctx = context();
        let vars = dispatch(&ctx, "variables.extract", json!({"content": "Hello #name#, you are #age#"})).unwrap();
        assert_eq!(vars["variables"], json!(["name", "age"]));

        let out = dispatch(
            &ctx,
            "variables.replace",
            json!({"content": "Hi #name#", "values": {"name": "Ada"}}),
        )
        .unwrap();
        assert_eq!(out["content"], json!("Hi Ada"));
    }

    #[test]
    fn test_replace_rejects_non_string_values() {
        let ctx = context();
        assert!(dispatch(&ctx, "variables.replace", json!({"content": "#a#", "values": {"a": 1}})).is_err());
    }
}
