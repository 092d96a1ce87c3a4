//! `#name#` placeholder extraction and substitution
//!
//! Extraction recognizes a `#`, one or more `[A-Za-z0-9_]`, and a closing
//! `#`. Substitution looks for whatever keys the caller supplies.
//! All functions are pure.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Za-z0-9_]+)#").expect("placeholder pattern is valid"));

/// Unique placeholder names in first-occurrence order
///
/// # Example
/// ```
/// use promptdock_core::variables::extract_variables;
///
/// assert_eq!(
///     extract_variables("Hello #name#, you are #age# years old, #name#"),
///     vec!["name", "age"]
/// );
/// ```
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(String::from)
        .collect()
}

/// Replace every `#key#` with `values[key]`
///
/// One left-to-right pass looking only for the given keys: replacement text
/// is inserted literally and never rescanned, so the order of keys is
/// irrelevant and a value containing `#other#` stays as typed. Keys may hold
/// any characters. Placeholders without a value are left untouched, and
/// where two keys match at the same position the longer one wins.
pub fn replace_variables(content: &str, values: &HashMap<String, String>) -> String {
    let mut keys: Vec<&str> = values.keys().map(String::as_str).filter(|k| !k.is_empty()).collect();
    if keys.is_empty() {
        return content.to_string();
    }
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternation = keys.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
    let pattern = match Regex::new(&format!("#({})#", alternation)) {
        Ok(pattern) => pattern,
        Err(err) => {
            warn!(error = %err, keys = keys.len(), "placeholder set too large, replacing word keys only");
            return PLACEHOLDER
                .replace_all(content, |caps: &Captures| match values.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                })
                .into_owned();
        },
    };
    pattern
        .replace_all(content, |caps: &Captures| values[&caps[1]].clone())
        .into_owned()
}

/// True when `content` has at least one placeholder
pub fn has_variables(content: &str) -> bool {
    PLACEHOLDER.is_match(content)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ========================================
    // extract_variables
    // ========================================

    #[test]
    fn test_extract_in_order() {
        assert_eq!(
            extract_variables("Hello #name#, you are #age# years old"),
            vec!["name", "age"]
        );
    }

    #[test]
    fn test_extract_none() {
        assert!(extract_variables("No vars here").is_empty());
        assert!(extract_variables("").is_empty());
    }

    #[test]
    fn test_extract_collapses_duplicates() {
        assert_eq!(extract_variables("#x# and #x# again"), vec!["x"]);
    }

    #[test]
    fn test_extract_ignores_invalid_names() {
        assert!(extract_variables("## #has space# #dash-ed#").is_empty());
        assert_eq!(extract_variables("#snake_case_1#"), vec!["snake_case_1"]);
    }

    #[test]
    fn test_extract_adjacent_placeholders() {
        // "#a##b#": the middle "##" cannot start a new match after "#a#"
        assert_eq!(extract_variables("#a##b#"), vec!["a", "b"]);
    }

    #[test]
    fn test_has_variables() {
        assert!(has_variables("Hi #name#"));
        assert!(!has_variables("Hi #"));
    }

    // ========================================
    // replace_variables
    // ========================================

    #[test]
    fn test_replace_single() {
        assert_eq!(replace_variables("Hi #name#", &values(&[("name", "Ada")])), "Hi Ada");
    }

    #[test]
    fn test_replace_every_occurrence() {
        assert_eq!(
            replace_variables("#x#-#x#-#y#", &values(&[("x", "1"), ("y", "2")])),
            "1-1-2"
        );
    }

    #[test]
    fn test_replace_is_literal() {
        // "$1" must not be read as a capture reference
        assert_eq!(replace_variables("cost: #p#", &values(&[("p", "$1.00")])), "cost: $1.00");
    }

    #[test]
    fn test_replace_is_not_recursive() {
        let out = replace_variables("#a# #b#", &values(&[("a", "#b#"), ("b", "B")]));
        assert_eq!(out, "#b# B");
    }

    #[test]
    fn test_replace_overlapping_placeholders() {
        // Only keys present in the map are looked for
        assert_eq!(replace_variables("#a#b#", &values(&[("b", "B")])), "#aB");
        assert_eq!(replace_variables("#a#b#", &values(&[("a", "A"), ("b", "B")])), "Ab#");
        assert_eq!(replace_variables("#a#b#", &values(&[("a", "A"), ("a#b", "X")])), "X");
    }

    #[test]
    fn test_replace_keys_with_any_characters() {
        let out = replace_variables("Hi #first name#, #a.b#", &values(&[("first name", "Ada"), ("a.b", "!")]));
        assert_eq!(out, "Hi Ada, !");
        assert_eq!(replace_variables("##", &values(&[("", "x")])), "##");
    }

    #[test]
    fn test_replace_leaves_missing_keys() {
        assert_eq!(replace_variables("#a# #b#", &values(&[("a", "A")])), "A #b#");
        assert_eq!(replace_variables("#a#", &HashMap::new()), "#a#");
    }

    // ========================================
    // Properties
    // ========================================

    proptest! {
        #[test]
        fn prop_extracted_names_are_unique(text in "[a-z#_ ]{0,64}") {
            let names = extract_variables(&text);
            let unique: HashSet<&String> = names.iter().collect();
            prop_assert_eq!(unique.len(), names.len());
        }

        #[test]
        fn prop_full_substitution_removes_placeholders(
            names in proptest::collection::vec("[a-z]{1,6}", 1..5),
            value in "[A-Za-z ]{0,10}",
        ) {
            let content = names.iter().map(|n| format!("#{}#", n)).collect::<Vec<_>>().join(" ");
            let map: HashMap<String, String> =
                names.iter().map(|n| (n.clone(), value.clone())).collect();
            let out = replace_variables(&content, &map);
            prop_assert!(extract_variables(&out).is_empty());
        }
    }
}
