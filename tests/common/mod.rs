//! Shared test fixtures: an in-memory transport and a token builder.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use schedulix_core::api::{
    ApiError, ForgotStartResponse, LoginResponse, RegisterRequest, Transport,
};
use schedulix_core::auth::CredentialStore;
use schedulix_core::models::{NotificationItem, Role, UserProfile};

/// Build an unsigned bearer token with the given subject and expiry.
pub fn make_token(sub: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = serde_json::json!({
        "sub": sub,
        "role": "ROLE_STUDENT",
        "exp": exp,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{}.{}.testsig", header, payload)
}

pub fn profile(username: &str) -> UserProfile {
    UserProfile {
        id: Some(1),
        username: username.to_string(),
        role: Role::Student,
        full_name: None,
        email: None,
        department: None,
        subjects: None,
        profile_image_url: None,
    }
}

pub fn notification(id: i64, message: &str) -> NotificationItem {
    NotificationItem {
        id,
        message: message.to_string(),
        read: false,
        created_at: None,
    }
}

/// Scriptable in-memory backend. Authenticated calls read the bearer token
/// through the same credential store the core uses, mirroring the real
/// client.
pub struct MockTransport {
    store: Arc<CredentialStore>,
    /// username -> token issued at login
    pub accounts: Mutex<HashMap<String, String>>,
    /// token -> profile returned by /users/me
    pub profiles: Mutex<HashMap<String, UserProfile>>,
    /// token -> artificial latency before the profile response
    pub profile_delays: Mutex<HashMap<String, Duration>>,
    pub notifications: Mutex<Result<Vec<NotificationItem>, ApiError>>,
    pub notification_fetch_delay: Mutex<Duration>,
    pub notification_fetches: AtomicUsize,
    active_notification_fetches: AtomicUsize,
    pub max_concurrent_notification_fetches: AtomicUsize,
    pub mark_read_result: Mutex<Result<(), ApiError>>,
    pub mark_read_attempts: AtomicUsize,
    pub marked_read: Mutex<Vec<i64>>,
    /// username -> security question index
    pub questions: Mutex<HashMap<String, u32>>,
    /// username -> expected security answer
    pub answers: Mutex<HashMap<String, String>>,
    pub updated_password: Mutex<Option<(String, String)>>,
    pub forgot_start_network_down: Mutex<bool>,
}

impl MockTransport {
    pub fn new(store: Arc<CredentialStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            accounts: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            profile_delays: Mutex::new(HashMap::new()),
            notifications: Mutex::new(Ok(Vec::new())),
            notification_fetch_delay: Mutex::new(Duration::ZERO),
            notification_fetches: AtomicUsize::new(0),
            active_notification_fetches: AtomicUsize::new(0),
            max_concurrent_notification_fetches: AtomicUsize::new(0),
            mark_read_result: Mutex::new(Ok(())),
            mark_read_attempts: AtomicUsize::new(0),
            marked_read: Mutex::new(Vec::new()),
            questions: Mutex::new(HashMap::new()),
            answers: Mutex::new(HashMap::new()),
            updated_password: Mutex::new(None),
            forgot_start_network_down: Mutex::new(false),
        })
    }

    /// Register a login account whose token resolves to the given profile.
    pub fn add_user(&self, username: &str, token: &str, user: UserProfile) {
        self.accounts
            .lock()
            .unwrap()
            .insert(username.to_string(), token.to_string());
        self.profiles
            .lock()
            .unwrap()
            .insert(token.to_string(), user);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn login(&self, username: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        match self.accounts.lock().unwrap().get(username) {
            Some(token) => Ok(LoginResponse {
                token: token.clone(),
            }),
            None => Err(ApiError::Unauthorized),
        }
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<String, ApiError> {
        Ok("User registered successfully!".to_string())
    }

    async fn forgot_start(&self, username: &str) -> Result<ForgotStartResponse, ApiError> {
        if *self.forgot_start_network_down.lock().unwrap() {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        match self.questions.lock().unwrap().get(username).copied() {
            Some(index) => Ok(ForgotStartResponse {
                security_question_index: index,
            }),
            None => Err(ApiError::BadRequest("User not found.".to_string())),
        }
    }

    async fn forgot_verify(&self, username: &str, answer: &str) -> Result<String, ApiError> {
        let expected = self.answers.lock().unwrap().get(username).cloned();
        match expected {
            Some(ref correct) if correct == answer => {
                Ok("Verification successful.".to_string())
            }
            _ => Err(ApiError::BadRequest("Incorrect answer.".to_string())),
        }
    }

    async fn forgot_update(&self, username: &str, new_password: &str) -> Result<String, ApiError> {
        *self.updated_password.lock().unwrap() =
            Some((username.to_string(), new_password.to_string()));
        Ok("Password updated successfully.".to_string())
    }

    async fn fetch_current_user(&self) -> Result<UserProfile, ApiError> {
        let Some(token) = self.store.get() else {
            return Err(ApiError::Unauthorized);
        };
        let delay = self.profile_delays.lock().unwrap().get(&token).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.profiles.lock().unwrap().get(&token).cloned() {
            Some(user) => Ok(user),
            None => Err(ApiError::Unauthorized),
        }
    }

    async fn fetch_notifications(&self) -> Result<Vec<NotificationItem>, ApiError> {
        let active = self.active_notification_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_notification_fetches
            .fetch_max(active, Ordering::SeqCst);

        let delay = *self.notification_fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.active_notification_fetches
            .fetch_sub(1, Ordering::SeqCst);
        self.notification_fetches.fetch_add(1, Ordering::SeqCst);
        self.notifications.lock().unwrap().clone()
    }

    async fn mark_notification_read(&self, id: i64) -> Result<(), ApiError> {
        self.mark_read_attempts.fetch_add(1, Ordering::SeqCst);
        let result = self.mark_read_result.lock().unwrap().clone();
        if result.is_ok() {
            self.marked_read.lock().unwrap().push(id);
        }
        result
    }
}
