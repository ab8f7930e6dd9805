//! Three-step forgot-password flow.
//!
//! Runs entirely before a session exists and never touches the credential
//! store. The step is a closed tagged-variant state, so skipping a step is
//! unrepresentable: each operation is only accepted in exactly one state and
//! anything else is a caller contract bug, not a user-facing error.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::api::{ApiError, Transport};
use crate::auth::policy;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecoveryError {
    /// The operation was invoked outside its valid step. Fix the caller;
    /// this is not recoverable at runtime.
    #[error("`{operation}` is not valid in the {step} step")]
    IllegalState {
        operation: &'static str,
        step: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Opaque by contract: callers cannot tell an unknown username apart
    /// from a transport fault.
    #[error("Could not start password recovery")]
    StartFailed,

    #[error("Incorrect answer")]
    WrongAnswer,

    #[error(transparent)]
    Api(ApiError),
}

/// Current step of the flow. Advances strictly forward; `Closed` is
/// terminal and holds no captured fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryStep {
    Username,
    Answer {
        username: String,
        question_index: u32,
    },
    Password {
        username: String,
    },
    Closed,
}

impl RecoveryStep {
    pub fn name(&self) -> &'static str {
        match self {
            RecoveryStep::Username => "username",
            RecoveryStep::Answer { .. } => "answer",
            RecoveryStep::Password { .. } => "password",
            RecoveryStep::Closed => "closed",
        }
    }
}

/// Driver for the challenge/response exchange. Create one per opened
/// recovery dialog; it is never persisted.
pub struct RecoveryFlow {
    transport: Arc<dyn Transport>,
    step: RecoveryStep,
}

impl RecoveryFlow {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            step: RecoveryStep::Username,
        }
    }

    pub fn step(&self) -> &RecoveryStep {
        &self.step
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.step, RecoveryStep::Closed)
    }

    fn illegal(&self, operation: &'static str) -> RecoveryError {
        RecoveryError::IllegalState {
            operation,
            step: self.step.name(),
        }
    }

    /// Step 1: look up the security question for a username. On success the
    /// flow advances to the answer step and the question index is returned.
    pub async fn start(&mut self, username: &str) -> Result<u32, RecoveryError> {
        if !matches!(self.step, RecoveryStep::Username) {
            return Err(self.illegal("start"));
        }

        match self.transport.forgot_start(username).await {
            Ok(response) => {
                self.step = RecoveryStep::Answer {
                    username: username.to_string(),
                    question_index: response.security_question_index,
                };
                Ok(response.security_question_index)
            }
            Err(e) => {
                // Unknown-username and transport faults are collapsed into
                // one variant; the distinction must not leak to the caller.
                debug!(error = %e, "recovery start failed");
                Err(RecoveryError::StartFailed)
            }
        }
    }

    /// Step 2: submit the security answer. A wrong answer keeps the flow on
    /// this step; retries are unlimited here (rate limiting is the
    /// backend's concern).
    pub async fn verify(&mut self, answer: &str) -> Result<(), RecoveryError> {
        let RecoveryStep::Answer { username, .. } = &self.step else {
            return Err(self.illegal("verify"));
        };
        let username = username.clone();

        match self.transport.forgot_verify(&username, answer).await {
            Ok(_) => {
                self.step = RecoveryStep::Password { username };
                Ok(())
            }
            Err(ApiError::BadRequest(_)) => Err(RecoveryError::WrongAnswer),
            Err(e) => Err(RecoveryError::Api(e)),
        }
    }

    /// Step 3: set the new password. The complexity policy is checked
    /// locally first; a validation failure never reaches the backend. On
    /// backend success the flow closes and all captured fields are dropped.
    pub async fn update(&mut self, new_password: &str) -> Result<(), RecoveryError> {
        let RecoveryStep::Password { username } = &self.step else {
            return Err(self.illegal("update"));
        };
        policy::validate_password(new_password).map_err(RecoveryError::Validation)?;
        let username = username.clone();

        match self.transport.forgot_update(&username, new_password).await {
            Ok(_) => {
                self.step = RecoveryStep::Closed;
                Ok(())
            }
            Err(e) => Err(RecoveryError::Api(e)),
        }
    }

    /// Abandon the flow from any step, discarding all captured fields.
    pub fn cancel(&mut self) {
        self.step = RecoveryStep::Closed;
    }
}
