//! Client-side input policy, matching what the backend enforces at
//! registration so bad input never leaves the process.

/// Username: 3-20 alphanumeric characters.
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    let alphanumeric = username.chars().all(|c| c.is_ascii_alphanumeric());
    if (3..=20).contains(&len) && alphanumeric {
        Ok(())
    } else {
        Err("Username must be 3-20 alphanumeric characters".to_string())
    }
}

/// Password: 8+ characters, at least one uppercase letter, one lowercase
/// letter, and one digit; no other characters allowed.
pub fn validate_password(password: &str) -> Result<(), String> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let alphanumeric_only = password.chars().all(|c| c.is_ascii_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && alphanumeric_only {
        Ok(())
    } else {
        Err("Password must be 8+ characters with at least one uppercase letter, \
             one lowercase letter, and one digit; no special characters allowed"
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Valid1Pass").is_ok());
        assert!(validate_password("aB3aB3aB3aB3").is_ok());

        assert!(validate_password("short1").is_err());
        assert!(validate_password("nocaps123").is_err());
        assert!(validate_password("NOLOWER123").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
        assert!(validate_password("Valid1Pass!").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_username_policy() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("alice99").is_ok());

        assert!(validate_username("ab").is_err());
        assert!(validate_username("waytoolongusername999").is_err());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username("dash-ed").is_err());
    }
}
