//! Per-user preferences for the background jobs.

pub mod repository;
pub mod service;
pub mod types;

pub use repository::PreferenceRepository;
pub use service::PreferenceService;
pub use types::{
    PreferenceUpdate, UserPreference, DEFAULT_AI_SUMMARY_PROMPT, DEFAULT_AI_SUMMARY_TIME,
    DEFAULT_CLEANUP_DAYS, DEFAULT_NOTIFICATION_TIME,
};
