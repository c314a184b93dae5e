//! Per-user command-rate limiting.
//!
//! Rolling one-minute windows per user, with a temporary block once the
//! configured rate is exceeded. Expired windows and blocks are pruned
//! lazily on access; there is no background timer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::database::{BotProfile, CommandRateConfig};

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    cmds: u32,
    expires_at: Instant,
}

/// In-memory command-rate state for one engine instance.
#[derive(Clone, Default)]
pub struct CommandRateLimiter {
    windows: Arc<DashMap<String, Window>>,
    blocked: Arc<DashMap<String, Instant>>,
}

impl CommandRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command and check whether the user is over the limit.
    ///
    /// Bot admins are always exempt; so is everyone while the feature is
    /// globally disabled.
    pub fn has_exceeded(&self, bot: &BotProfile, user_id: &str, is_bot_admin: bool) -> bool {
        if is_bot_admin || !bot.command_rate.status {
            return false;
        }

        self.check_at(Instant::now(), &bot.command_rate, user_id)
    }

    fn check_at(&self, now: Instant, config: &CommandRateConfig, user_id: &str) -> bool {
        if let Some(until) = self.blocked.get(user_id).map(|entry| *entry) {
            if now < until {
                return true;
            }
            // block expired, fall back to normal counting
            self.blocked.remove(user_id);
        }

        let mut limited = false;

        {
            let mut window = self.windows.entry(user_id.to_string()).or_insert(Window {
                cmds: 0,
                expires_at: now + WINDOW,
            });

            if now >= window.expires_at {
                window.cmds = 1;
                window.expires_at = now + WINDOW;
            } else {
                window.cmds += 1;
                limited = window.cmds > config.max_cmds_minute;
            }
        }

        if limited {
            let block = Duration::from_secs(config.block_time as u64 * 60);
            debug!(
                "User {} exceeded command rate, blocked for {}min",
                user_id, config.block_time
            );
            self.windows.remove(user_id);
            self.blocked.insert(user_id.to_string(), now + block);
        }

        limited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "5511999999999@s.whatsapp.net";

    fn config() -> CommandRateConfig {
        CommandRateConfig {
            status: true,
            max_cmds_minute: 10,
            block_time: 5,
        }
    }

    fn bot_with_rate() -> BotProfile {
        let mut b = BotProfile::new("Zelador", "!");
        b.command_rate = config();
        b
    }

    #[test]
    fn test_bot_admin_is_exempt() {
        let limiter = CommandRateLimiter::new();
        let bot = bot_with_rate();

        for _ in 0..50 {
            assert!(!limiter.has_exceeded(&bot, USER, true));
        }
    }

    #[test]
    fn test_disabled_never_limits() {
        let limiter = CommandRateLimiter::new();
        let mut bot = bot_with_rate();
        bot.command_rate.status = false;

        for _ in 0..50 {
            assert!(!limiter.has_exceeded(&bot, USER, false));
        }
    }

    #[test]
    fn test_eleventh_command_within_a_minute_is_limited() {
        let limiter = CommandRateLimiter::new();
        let cfg = config();
        let now = Instant::now();

        for i in 0..10 {
            assert!(
                !limiter.check_at(now + Duration::from_secs(i), &cfg, USER),
                "command {} should pass",
                i + 1
            );
        }
        assert!(limiter.check_at(now + Duration::from_secs(10), &cfg, USER));
    }

    #[test]
    fn test_block_holds_until_expiry_then_fresh_window() {
        let limiter = CommandRateLimiter::new();
        let cfg = config();
        let now = Instant::now();

        for i in 0..11 {
            limiter.check_at(now + Duration::from_secs(i), &cfg, USER);
        }

        // still blocked a few minutes in
        assert!(limiter.check_at(now + Duration::from_secs(120), &cfg, USER));
        assert!(limiter.check_at(now + Duration::from_secs(299), &cfg, USER));

        // block_time (5min) counted from the 11th command at t=10s
        assert!(!limiter.check_at(now + Duration::from_secs(311), &cfg, USER));
        assert!(!limiter.check_at(now + Duration::from_secs(312), &cfg, USER));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = CommandRateLimiter::new();
        let cfg = config();
        let now = Instant::now();

        for i in 0..10 {
            assert!(!limiter.check_at(now + Duration::from_secs(i), &cfg, USER));
        }

        // window started at t=0 and expired; the next command starts fresh
        assert!(!limiter.check_at(now + Duration::from_secs(61), &cfg, USER));
    }

    #[test]
    fn test_limits_are_per_user() {
        let limiter = CommandRateLimiter::new();
        let cfg = config();
        let now = Instant::now();

        for _ in 0..11 {
            limiter.check_at(now, &cfg, "a@s.whatsapp.net");
        }
        assert!(limiter.check_at(now, &cfg, "a@s.whatsapp.net"));
        assert!(!limiter.check_at(now, &cfg, "b@s.whatsapp.net"));
    }
}
