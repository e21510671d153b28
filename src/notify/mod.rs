//! Daily digest notifications.

pub mod dispatcher;

pub use dispatcher::{DigestMessage, DispatchOutcome, NotificationDispatcher};
