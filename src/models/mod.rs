//! Domain models shared across the core.

pub mod notification;
pub mod user;

pub use notification::NotificationItem;
pub use user::{Role, UserProfile};
