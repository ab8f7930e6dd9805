//! Authentication module for managing the credential and the session.
//!
//! This module provides:
//! - `CredentialStore`: durable bearer-token storage with change notification
//! - `SessionManager`: credential resolution and session phase tracking
//! - `token`: unverified claims decoding and expiry checks
//! - `policy`: client-side username/password complexity rules

pub mod credentials;
pub mod policy;
pub mod session;
pub mod token;

pub use credentials::CredentialStore;
pub use session::{AuthError, SessionManager, SessionPhase, SessionState};
pub use token::{decode_unverified, Claims, DecodeError};
