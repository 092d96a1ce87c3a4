//! Command registry and dispatch system
//!
//! The widget talks to the core through named commands. Commands are
//! registered as "category.action" (e.g., "prompts.list", "tags.add") and
//! dispatched to handler functions that take and return JSON.
//!
//! ## Adding a new command
//!
//! 1. Create handler function: `pub fn my_command(ctx: &CommandContext, args: Value) -> Result<Value>`
//! 2. Register in `REGISTRY`: `("category.action", my_command as CommandHandler)`
//! 3. Add tests for the command

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{DockError, Result};
use crate::store::PromptStorage;

pub mod folders;
pub mod prefs;
pub mod prompts;
pub mod tags;
pub mod variables;

/// Everything a handler may touch
#[derive(Clone)]
pub struct CommandContext {
    pub storage: Arc<PromptStorage>,
}

impl CommandContext {
    pub fn new(storage: Arc<PromptStorage>) -> Self {
        Self { storage }
    }
}

/// Type alias for command handler functions
///
/// All command handlers take the context plus a JSON Value (arguments) and
/// return a Result<Value>.
pub type CommandHandler = fn(&CommandContext, Value) -> Result<Value>;

/// Static command registry
///
/// Maps command names to handler functions. Initialized lazily on first access.
static REGISTRY: Lazy<HashMap<&'static str, CommandHandler>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Test command
    map.insert("ping", ping as CommandHandler);

    // Prompts
    map.insert("prompts.list", prompts::list as CommandHandler);
    map.insert("prompts.get", prompts::get as CommandHandler);
    map.insert("prompts.save", prompts::save as CommandHandler);
    map.insert("prompts.update", prompts::update as CommandHandler);
    map.insert("prompts.delete", prompts::delete as CommandHandler);
    map.insert("prompts.set", prompts::set as CommandHandler);
    map.insert("prompts.merge", prompts::merge as CommandHandler);
    map.insert("prompts.import", prompts::import as CommandHandler);
    map.insert("prompts.export", prompts::export as CommandHandler);
    map.insert("prompts.search", prompts::search as CommandHandler);

    // Folders
    map.insert("folders.list", folders::list as CommandHandler);
    map.insert("folders.save", folders::save as CommandHandler);
    map.insert("folders.update", folders::update as CommandHandler);
    map.insert("folders.delete", folders::delete as CommandHandler);

    // Tags
    map.insert("tags.add", tags::add as CommandHandler);
    map.insert("tags.remove", tags::remove as CommandHandler);
    map.insert("tags.set", tags::set as CommandHandler);
    map.insert("tags.list", tags::list as CommandHandler);

    // Variables
    map.insert("variables.extract", variables::extract as CommandHandler);
    map.insert("variables.replace", variables::replace as CommandHandler);

    // Preferences
    map.insert("prefs.get", prefs::get as CommandHandler);
    map.insert("prefs.set", prefs::set as CommandHandler);

    map
});

/// Dispatch a command by name
///
/// Looks up the command in the registry and executes it with the provided arguments.
///
/// # Arguments
/// * `ctx` - Shared command context
/// * `command` - Command name (e.g., "ping", "prompts.list")
/// * `args` - Command arguments as JSON Value
///
/// # Returns
/// Command result as JSON Value, or error if command not found
pub fn dispatch(ctx: &CommandContext, command: &str, args: Value) -> Result<Value> {
    match REGISTRY.get(command) {
        Some(handler) => {
            debug!(command, "dispatching command");
            handler(ctx, args)
        },
        None => Err(DockError::CommandNotFound(command.to_string())),
    }
}

/// Dispatch and fold errors into a structured error object
///
/// Never fails. Errors come back as `{error: true, message, category}` so
/// the UI can show `message` and branch on `category`.
pub fn call(ctx: &CommandContext, command: &str, args: Value) -> Value {
    match dispatch(ctx, command, args) {
        Ok(result) => result,
        Err(err) => {
            debug!(command, category = err.category(), error = %err, "command failed");
            create_error_object(&err)
        },
    }
}

/// Create a structured error object for the UI
fn create_error_object(err: &DockError) -> Value {
    json!({
        "error": true,
        "message": err.user_message(),
        "category": err.category(),
    })
}

/// List all available commands
///
/// Returns a sorted list of all registered command names.
pub fn list_commands() -> Vec<String> {
    let mut commands: Vec<String> = REGISTRY.keys().map(|&k| k.to_string()).collect();
    commands.sort();
    commands
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Required string argument
pub(crate) fn str_arg<'a>(command: &str, args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| DockError::InvalidArgs {
            command: command.to_string(),
            reason:  format!("missing string field '{}'", key),
        })
}

/// Deserialize the whole argument object (or one field of it) into `T`
pub(crate) fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| DockError::InvalidArgs {
        command: command.to_string(),
        reason:  e.to_string(),
    })
}

// ============================================================================
// Test Commands
// ============================================================================

/// Ping command - simple test to verify command dispatch works
///
/// Returns the input arguments with an added "pong" field.
///
/// # Example
/// ```json
/// // Input:  {"message": "hello"}
/// // Output: {"message": "hello", "pong": true}
/// ```
fn ping(_ctx: &CommandContext, args: Value) -> Result<Value> {
    let mut result = match args {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    result.insert("pong".to_string(), Value::Bool(true));
    Ok(Value::Object(result))
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::test_support::context;
    use super::*;

    // ========================================
    // dispatch() tests
    // ========================================

    #[test]
    fn test_dispatch_ping() {
        let ctx = context();
        let result = dispatch(&ctx, "ping", json!({"message": "hello"}));

        let value = result.unwrap();
        assert_eq!(value["pong"], json!(true));
        assert_eq!(value["message"], json!("hello"));
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let ctx = context();
        match dispatch(&ctx, "unknown.command", json!({})) {
            Err(DockError::CommandNotFound(cmd)) => {
                assert_eq!(cmd, "unknown.command");
            },
            _ => panic!("Expected CommandNotFound error"),
        }
    }

    #[test]
    fn test_dispatch_with_null_args() {
        let ctx = context();
        let result = dispatch(&ctx, "ping", json!(null));
        assert_eq!(result.unwrap()["pong"], json!(true));
    }

    // ========================================
    // call() tests
    // ========================================

    #[test]
    fn test_call_unknown_command_returns_error_object() {
        let ctx = context();
        let obj = call(&ctx, "unknown.command", json!({}));

        assert_eq!(obj["error"], json!(true));
        assert!(obj["message"].as_str().unwrap().contains("unknown.command"));
        assert_eq!(obj["category"], json!("command"));
    }

    #[test]
    fn test_call_passes_results_through() {
        let ctx = context();
        assert_eq!(call(&ctx, "ping", json!({}))["pong"], json!(true));
    }

    #[test]
    fn test_call_reports_bad_arguments() {
        let ctx = context();
        let obj = call(&ctx, "prompts.get", json!({}));
        assert_eq!(obj["error"], json!(true));
        assert_eq!(obj["category"], json!("arguments"));
    }

    // ========================================
    // list_commands() tests
    // ========================================

    #[test]
    fn test_list_commands_is_sorted() {
        let commands = list_commands();
        let mut sorted = commands.clone();
        sorted.sort();
        assert_eq!(commands, sorted);
    }

    #[test]
    fn test_every_category_is_registered() {
        let commands = list_commands();
        for name in [
            "ping",
            "prompts.list",
            "prompts.import",
            "folders.delete",
            "tags.list",
            "variables.replace",
            "prefs.set",
        ] {
            assert!(commands.contains(&name.to_string()), "missing {}", name);
        }
    }

    // ========================================
    // ping command tests
    // ========================================

    #[test]
    fn test_ping_with_non_object() {
        let ctx = context();
        let result = ping(&ctx, json!(42)).unwrap();
        assert_eq!(result, json!({"pong": true}));
    }

    #[test]
    fn test_ping_preserves_fields() {
        let ctx = context();
        let result = ping(&ctx, json!({"field1": "value1", "field2": 42})).unwrap();

        assert_eq!(result["pong"], json!(true));
        assert_eq!(result["field1"], json!("value1"));
        assert_eq!(result["field2"], json!(42));
    }
}
