//! User preference types.

/// Default retention for auto-cleanup in days.
pub const DEFAULT_CLEANUP_DAYS: i64 = 30;

/// Default daily notification time.
pub const DEFAULT_NOTIFICATION_TIME: &str = "08:00";

/// Default daily AI summary time.
pub const DEFAULT_AI_SUMMARY_TIME: &str = "09:00";

/// Prompt used when the user has not set one.
pub const DEFAULT_AI_SUMMARY_PROMPT: &str = "Analyze and summarize today's RSS articles:

1. Overview: briefly describe the main topics
2. Categories: group the articles by theme, one `- theme: titles` line per group
3. Highlights: pick the 3-5 most valuable articles
4. Key insights: extract the key takeaways

Use a clear, structured format.";

/// Per-user settings for background jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreference {
    /// Owner key (e-mail).
    pub owner: String,
    /// Retention for auto-cleanup in days.
    pub cleanup_expired_days: i64,
    /// Delete old read articles periodically.
    pub enable_auto_cleanup: bool,
    /// Send the daily digest notification.
    pub enable_notification: bool,
    /// Notification time, "HH:MM" in the configured timezone.
    pub notification_time: String,
    /// Generate the daily AI summary.
    pub enable_ai_summary: bool,
    /// Summary time, "HH:MM" in the configured timezone.
    pub ai_summary_time: String,
    /// Custom summary prompt. Empty means the default.
    pub ai_summary_prompt: String,
    /// Last update (unix seconds).
    pub updated_at: i64,
}

impl UserPreference {
    /// Default preferences for an owner.
    pub fn with_defaults(owner: impl Into<String>, now: i64) -> Self {
        Self {
            owner: owner.into(),
            cleanup_expired_days: DEFAULT_CLEANUP_DAYS,
            enable_auto_cleanup: false,
            enable_notification: false,
            notification_time: DEFAULT_NOTIFICATION_TIME.to_string(),
            enable_ai_summary: false,
            ai_summary_time: DEFAULT_AI_SUMMARY_TIME.to_string(),
            ai_summary_prompt: String::new(),
            updated_at: now,
        }
    }

    /// The prompt to send, falling back to the default.
    pub fn effective_prompt(&self) -> &str {
        if self.ai_summary_prompt.trim().is_empty() {
            DEFAULT_AI_SUMMARY_PROMPT
        } else {
            &self.ai_summary_prompt
        }
    }
}

/// Preference update request.
#[derive(Debug, Clone, Default)]
pub struct PreferenceUpdate {
    /// Retention days; values <= 0 reset to the default.
    pub cleanup_expired_days: Option<i64>,
    /// Auto-cleanup switch.
    pub enable_auto_cleanup: Option<bool>,
    /// Notification switch.
    pub enable_notification: Option<bool>,
    /// Notification time.
    pub notification_time: Option<String>,
    /// AI summary switch.
    pub enable_ai_summary: Option<bool>,
    /// AI summary time.
    pub ai_summary_time: Option<String>,
    /// AI summary prompt.
    pub ai_summary_prompt: Option<String>,
}

impl PreferenceUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable notifications at the given time.
    pub fn with_notification(mut self, enabled: bool, time: impl Into<String>) -> Self {
        self.enable_notification = Some(enabled);
        self.notification_time = Some(time.into());
        self
    }

    /// Enable or disable AI summaries at the given time.
    pub fn with_ai_summary(mut self, enabled: bool, time: impl Into<String>) -> Self {
        self.enable_ai_summary = Some(enabled);
        self.ai_summary_time = Some(time.into());
        self
    }

    /// Set the summary prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.ai_summary_prompt = Some(prompt.into());
        self
    }

    /// Enable or disable auto-cleanup with a retention in days.
    pub fn with_auto_cleanup(mut self, enabled: bool, days: i64) -> Self {
        self.enable_auto_cleanup = Some(enabled);
        self.cleanup_expired_days = Some(days);
        self
    }

    /// Apply this update onto a preference.
    pub fn apply(&self, pref: &mut UserPreference) {
        if let Some(days) = self.cleanup_expired_days {
            pref.cleanup_expired_days = if days > 0 { days } else { DEFAULT_CLEANUP_DAYS };
        }
        if let Some(enabled) = self.enable_auto_cleanup {
            pref.enable_auto_cleanup = enabled;
        }
        if let Some(enabled) = self.enable_notification {
            pref.enable_notification = enabled;
        }
        if let Some(ref time) = self.notification_time {
            pref.notification_time = time.clone();
        }
        if let Some(enabled) = self.enable_ai_summary {
            pref.enable_ai_summary = enabled;
        }
        if let Some(ref time) = self.ai_summary_time {
            pref.ai_summary_time = time.clone();
        }
        if let Some(ref prompt) = self.ai_summary_prompt {
            pref.ai_summary_prompt = prompt.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pref = UserPreference::with_defaults("a@example.com", 10);
        assert_eq!(pref.cleanup_expired_days, 30);
        assert_eq!(pref.notification_time, "08:00");
        assert_eq!(pref.ai_summary_time, "09:00");
        assert!(!pref.enable_notification);
        assert!(!pref.enable_ai_summary);
        assert_eq!(pref.effective_prompt(), DEFAULT_AI_SUMMARY_PROMPT);
    }

    #[test]
    fn test_apply_update() {
        let mut pref = UserPreference::with_defaults("a@example.com", 10);
        PreferenceUpdate::new()
            .with_notification(true, "07:30")
            .with_prompt("Be brief.")
            .with_auto_cleanup(true, 0)
            .apply(&mut pref);

        assert!(pref.enable_notification);
        assert_eq!(pref.notification_time, "07:30");
        assert_eq!(pref.effective_prompt(), "Be brief.");
        assert!(pref.enable_auto_cleanup);
        // Non-positive retention resets to the default
        assert_eq!(pref.cleanup_expired_days, DEFAULT_CLEANUP_DAYS);
        assert!(!pref.enable_ai_summary);
    }
}
