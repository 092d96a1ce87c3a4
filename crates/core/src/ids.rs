//! Identifier generation for prompts and folders

use uuid::Uuid;

/// Generate a fresh identifier (UUID v4, hyphenated lowercase)
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}
