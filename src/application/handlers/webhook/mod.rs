//! Webhook command handlers.

mod handle_notification;

pub use handle_notification::{HandleNotificationCommand, HandleNotificationHandler};
