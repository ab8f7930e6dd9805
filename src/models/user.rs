use serde::{Deserialize, Serialize};

/// Role assigned to an account at registration.
///
/// The backend stores roles with the `ROLE_` prefix but accepts the bare
/// form at registration, so both spellings deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_STUDENT", alias = "STUDENT")]
    Student,
    #[serde(rename = "ROLE_FACULTY", alias = "FACULTY")]
    Faculty,
}

impl Role {
    pub fn is_faculty(&self) -> bool {
        matches!(self, Role::Faculty)
    }
}

/// Authenticated-user view returned by `GET /users/me`.
///
/// Fetched fresh on every credential resolution; the core never mutates it
/// except through the explicit profile-update setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub subjects: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl UserProfile {
    /// Display name, falling back to the username when no full name is set.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}
