//! Webhook-facing results flow: score a submission, then text the link.

pub mod notify;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use notify::{InMemorySender, LoggingSender, Notification, NotificationSender, TwilioSender};
pub use router::{results_router, FORM_RESPONSE_WEBHOOK};
pub use service::{ResultsLinkBuilder, ResultsService};
