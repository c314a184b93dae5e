//! Utility functions.
//!
//! Helpers for WhatsApp JID handling shared across the engine.

use chrono::{DateTime, Utc};

/// JID suffix for individual users.
pub const USER_SUFFIX: &str = "@s.whatsapp.net";

/// JID suffix for groups.
pub const GROUP_SUFFIX: &str = "@g.us";

/// Turn a bare phone number into a user JID.
pub fn add_user_suffix(number: &str) -> String {
    format!("{}{}", number.trim(), USER_SUFFIX)
}

/// Strip the JID suffix, leaving the phone number for display.
pub fn remove_user_suffix(user_id: &str) -> &str {
    user_id.split('@').next().unwrap_or(user_id)
}

/// The numeric part of a user JID (country code first).
pub fn phone_digits(user_id: &str) -> &str {
    remove_user_suffix(user_id)
}

/// Whether a chat id refers to a group.
pub fn is_group_id(chat_id: &str) -> bool {
    chat_id.ends_with(GROUP_SUFFIX)
}

/// Format a timestamp for reply texts.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_round_trip() {
        let jid = add_user_suffix("5511999999999");
        assert_eq!(jid, "5511999999999@s.whatsapp.net");
        assert_eq!(remove_user_suffix(&jid), "5511999999999");
    }

    #[test]
    fn test_remove_suffix_without_at() {
        assert_eq!(remove_user_suffix("5511999999999"), "5511999999999");
    }

    #[test]
    fn test_is_group_id() {
        assert!(is_group_id("123456789-987654@g.us"));
        assert!(!is_group_id("5511999999999@s.whatsapp.net"));
    }
}
