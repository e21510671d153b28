//! Daily AI summaries.
//!
//! A day's articles are formatted into a prompt and sent to a completion
//! backend. When the backend is missing or fails, a digest grouped by source
//! is stored instead.

pub mod completion;
pub mod generator;
pub mod prompt;
pub mod repository;

pub use completion::{Completion, OpenAiCompletion};
pub use generator::{summary_title, SummaryGenerator};
pub use prompt::{extract_categories, fallback_digest, format_articles, plain_text, FallbackDigest};
pub use repository::{AiSummary, NewAiSummary, SummaryRepository};
