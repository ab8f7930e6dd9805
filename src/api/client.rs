//! Reqwest-backed implementation of the backend transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::credentials::CredentialStore;
use crate::models::{NotificationItem, UserProfile};

use super::{ApiError, ForgotStartResponse, LoginResponse, RegisterRequest, Transport};

/// HTTP request timeout in seconds.
/// 30s allows for slow backend responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the Schedulix backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<CredentialStore>,
}

impl ApiClient {
    /// Create a new API client reading its bearer token through the shared
    /// credential store.
    pub fn new(base_url: String, store: Arc<CredentialStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            client,
            base_url,
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, if one is currently stored. The store is the
    /// single source of truth; the client never caches the token.
    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.store.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self
            .apply_auth(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let mut request = self.client.post(self.url(path)).json(body);
        if authenticated {
            request = self.apply_auth(request);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// POST for endpoints that answer with a plain-text confirmation.
    async fn post_text<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        authenticated: bool,
    ) -> Result<String, ApiError> {
        debug!(path, "POST");
        let mut request = self.client.post(self.url(path)).json(body);
        if authenticated {
            request = self.apply_auth(request);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let response = Self::check_response(response).await?;
        response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        self.post_json("/auth/login", &body, false).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        self.post_text("/auth/register", request, false).await
    }

    async fn forgot_start(&self, username: &str) -> Result<ForgotStartResponse, ApiError> {
        let body = serde_json::json!({ "username": username });
        self.post_json("/auth/forgot/start", &body, false).await
    }

    async fn forgot_verify(&self, username: &str, answer: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "answer": answer,
        });
        self.post_text("/auth/forgot/verify", &body, false).await
    }

    async fn forgot_update(&self, username: &str, new_password: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "newPassword": new_password,
        });
        self.post_text("/auth/forgot/update", &body, false).await
    }

    async fn fetch_current_user(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/users/me").await
    }

    async fn fetch_notifications(&self) -> Result<Vec<NotificationItem>, ApiError> {
        self.get_json("/notifications").await
    }

    async fn mark_notification_read(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/notifications/{}/read", id);
        debug!(path = %path, "POST");
        let response = self
            .apply_auth(self.client.post(self.url(&path)))
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::check_response(response).await?;
        Ok(())
    }
}
