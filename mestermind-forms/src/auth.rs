//! Sign-in gate in front of submission. Identity itself lives with the
//! external provider; the engine only asks who is signed in.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: Option<String>,
}

pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthenticatedUser>;

    fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }
}

/// Fixed answer, for hosts that know the user up front
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<AuthenticatedUser>,
}

impl StaticAuth {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn signed_in(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user: Some(AuthenticatedUser {
                id: id.into(),
                email,
            }),
        }
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.user.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPolicy {
    pub require_sign_in: bool,
    /// Where a signed-out customer is sent before submitting
    pub sign_in_path: String,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            require_sign_in: true,
            sign_in_path: "/register".to_string(),
        }
    }
}

impl SubmitPolicy {
    pub fn allows(&self, auth: &dyn AuthProvider) -> bool {
        !self.require_sign_in || auth.is_signed_in()
    }
}
