use crate::models::{Role, User};

/// Snapshot of the client's authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    /// True while a session action awaits the network.
    pub loading: bool,
    /// Set once the password-reset OTP has been accepted.
    pub is_verified_otp: bool,
    /// Email the password-reset flow is running for.
    pub verified_email: Option<String>,
    pub error: Option<String>,
    pub success_message: Option<String>,
}

impl Session {
    /// Authenticated iff both a token and a user are present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}
