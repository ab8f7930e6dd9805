//! Background notification feed.

pub mod poller;

pub use poller::{NotificationPoller, NotificationState, DEFAULT_POLL_INTERVAL};
