use serde_json::{json, Value};

use super::{str_arg, CommandContext};
use crate::errors::{DockError, Result};
use crate::runtime;

/// `{key}` returns one value (with its default), `{}` every preference
pub fn get(ctx: &CommandContext, args: Value) -> Result<Value> {
    match args.get("key").and_then(Value::as_str) {
        Some(key) => {
            let value = runtime::block_on(ctx.storage.get_raw(key));
            Ok(json!({ "key": key, "value": value }))
        },
        None => {
            let prefs = runtime::block_on(ctx.storage.preferences());
            Ok(json!(prefs))
        },
    }
}

pub fn set(ctx: &CommandContext, args: Value) -> Result<Value> {
    let key = str_arg("prefs.set", &args, "key")?;
    let value = args.get("value").cloned().ok_or_else(|| DockError::InvalidArgs {
        command: "prefs.set".to_string(),
        reason:  "missing field 'value'".to_string(),
    })?;
    runtime::block_on(ctx.storage.set_value(key, &value))?;
    Ok(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::commands::dispatch;
    use crate::commands::test_support::context;

    #[test]
    fn test_prefs_defaults_and_set() {
        let ctx = context();
        let all = dispatch(&ctx, "prefs.get", json!({})).unwrap();
        assert_eq!(all["disableOverwrite"], json!(false));
        assert_eq!(all["keyboardShortcut"]["requiresShift"], json!(true));
        assert_eq!(all["buttonPosition"], json!({"x": 20.0, "y": 20.0}));

        dispatch(&ctx, "prefs.set", json!({"key": "displayMode", "value": "hotCorner"})).unwrap();
        let one = dispatch(&ctx, "prefs.get", json!({"key": "displayMode"})).unwrap();
        assert_eq!(one["value"], json!("hotCorner"));

        let unknown = dispatch(&ctx, "prefs.get", json!({"key": "nope"})).unwrap();
        assert_eq!(unknown["value"], json!(null));
    }

    #[test]
    fn test_prefs_set_requires_value() {
        let ctx = context();
        assert!(dispatch(&ctx, "prefs.set", json!({"key": "enableTags"})).is_err());
    }
}
