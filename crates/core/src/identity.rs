use serde::{Deserialize, Serialize};

/// Sentinel returned when the acting user cannot be resolved.
pub const UNKNOWN_USER: &str = "UNKNOWN_USER";

/// Sentinel returned when the acting role cannot be resolved.
pub const UNKNOWN_ROLE: &str = "UNKNOWN_ROLE";

/// The principal behind the current warehouse session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    user: String,
    role: String,
}

impl SessionIdentity {
    /// Creates an identity from resolved session values.
    #[must_use]
    pub fn new(user: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            role: role.into(),
        }
    }

    /// Creates the sentinel identity used when resolution fails.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_USER, UNKNOWN_ROLE)
    }

    /// Returns the acting user name.
    #[must_use]
    pub fn user(&self) -> &str {
        self.user.as_str()
    }

    /// Returns the acting role name.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }
}
