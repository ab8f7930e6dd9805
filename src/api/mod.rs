//! Transport layer for the Schedulix backend.
//!
//! This module defines the [`Transport`] contract the rest of the core
//! programs against, plus the reqwest-backed [`ApiClient`] that implements
//! it. Every authenticated request carries `Authorization: Bearer <token>`
//! read from the shared credential store at send time.

pub mod client;
pub mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{NotificationItem, Role, UserProfile};

pub use client::ApiClient;
pub use error::ApiError;

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Response body of `POST /auth/forgot/start`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForgotStartResponse {
    #[serde(rename = "securityQuestionIndex")]
    pub security_question_index: u32,
}

/// Request body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    pub role: Role,
    pub security_question_index: u32,
    pub security_answer: String,
}

/// Backend contract consumed by the core.
///
/// The reqwest client implements this for real use; tests substitute
/// in-memory fakes. Each method maps one endpoint of the backend API and
/// fails with an [`ApiError`] carrying the HTTP-status-like cause.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// `POST /auth/register`
    async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError>;

    /// `POST /auth/forgot/start`
    async fn forgot_start(&self, username: &str) -> Result<ForgotStartResponse, ApiError>;

    /// `POST /auth/forgot/verify`
    async fn forgot_verify(&self, username: &str, answer: &str) -> Result<String, ApiError>;

    /// `POST /auth/forgot/update`
    async fn forgot_update(&self, username: &str, new_password: &str) -> Result<String, ApiError>;

    /// `GET /users/me` (bearer-authenticated)
    async fn fetch_current_user(&self) -> Result<UserProfile, ApiError>;

    /// `GET /notifications` (bearer-authenticated, unread items only)
    async fn fetch_notifications(&self) -> Result<Vec<NotificationItem>, ApiError>;

    /// `POST /notifications/{id}/read` (bearer-authenticated)
    async fn mark_notification_read(&self, id: i64) -> Result<(), ApiError>;
}
