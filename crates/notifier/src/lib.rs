//! Notification delivery.
//!
//! A single [`PublisherWorker`] drains the notification queue and posts each
//! message to the chat webhook through a [`WebhookSink`]. Delivery is
//! best-effort: a failed message is logged and dropped, never retried.

pub mod publisher;
pub mod webhook;

pub use publisher::{DeliveryStats, PublisherWorker};
pub use webhook::{WebhookClient, WebhookSink};
