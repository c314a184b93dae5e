//! Antifake validation.
//!
//! Checks a user's phone-number country code against the group's allow-list.
//! Used on join events; configuration happens through the command layer.

use crate::database::Group;
use crate::utils::phone_digits;

/// Whether a user's number fails the group's country-code allow-list.
///
/// Always false while antifake is disabled. An empty allow-list rejects
/// every number, matching a misconfigured group failing closed.
pub fn is_fake_number(user_id: &str, group: &Group) -> bool {
    if !group.antifake.status {
        return false;
    }

    let digits = phone_digits(user_id);

    !group
        .antifake
        .allowed
        .iter()
        .any(|code| digits.starts_with(code.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(allowed: &[&str]) -> Group {
        let mut g = Group::new("123@g.us");
        g.antifake.status = true;
        g.antifake.allowed = allowed.iter().map(|s| s.to_string()).collect();
        g
    }

    #[test]
    fn test_allowed_country_code_passes() {
        let g = group(&["55"]);
        assert!(!is_fake_number("5511999999999@s.whatsapp.net", &g));
    }

    #[test]
    fn test_foreign_country_code_fails() {
        let g = group(&["55"]);
        assert!(is_fake_number("14155552671@s.whatsapp.net", &g));
    }

    #[test]
    fn test_multiple_codes() {
        let g = group(&["55", "351"]);
        assert!(!is_fake_number("351912345678@s.whatsapp.net", &g));
        assert!(is_fake_number("4479460000@s.whatsapp.net", &g));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let mut g = group(&["55"]);
        g.antifake.status = false;
        assert!(!is_fake_number("14155552671@s.whatsapp.net", &g));
    }
}
