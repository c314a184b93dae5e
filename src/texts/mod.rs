//! Reply-text catalog.
//!
//! Templates are embedded at compile time and looked up by dot-separated
//! key. Placeholders like `{user}` are substituted by callers via
//! `str::replace`, so this module never branches on message content.

use std::sync::OnceLock;

use serde_json::Value;

static CATALOG: OnceLock<Value> = OnceLock::new();

fn catalog() -> &'static Value {
    CATALOG.get_or_init(|| {
        serde_json::from_str(include_str!("en.json"))
            .expect("embedded text catalog must be valid JSON")
    })
}

/// Get the template for a key.
///
/// Supports nested keys via dot notation, e.g. `"group.mute.on"`.
/// Returns the key itself when no template exists, so a missing entry is
/// visible in the chat instead of crashing the engine.
pub fn get_text(key: &str) -> String {
    let mut current = catalog();
    for part in key.split('.') {
        match current.get(part) {
            Some(v) => current = v,
            None => return key.to_string(),
        }
    }
    current.as_str().map(|s| s.to_string()).unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lookup() {
        assert!(get_text("group.mute.on").contains("muted"));
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        assert_eq!(get_text("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_placeholder_replacement() {
        let text = get_text("moderation.detected_link").replace("{user}", "5511999999999");
        assert!(text.contains("5511999999999"));
    }
}
