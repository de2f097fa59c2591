use super::{session::Session, token};
use crate::{
    api::ApiClient,
    error::AppError,
    models::{
        AuthResponse, ForgotPasswordData, LoginCredentials, RegisterData, ResetPasswordData, Role,
        User, VerifyOtpData,
    },
    routes::{Location, Navigator, RouteName},
    storage::{KeyValueStore, TOKEN_KEY, USER_KEY},
};
use chrono::Utc;
use log::{debug, info, warn};
use serde::de::IgnoredAny;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Views from which `logout` does not navigate away.
pub const PUBLIC_VIEWS: [RouteName; 5] = [
    RouteName::Login,
    RouteName::Home,
    RouteName::Register,
    RouteName::ForgotPassword,
    RouteName::ResetPassword,
];

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const FORGOT_PASSWORD_FAILED: &str = "Failed to send reset instructions";
const VERIFY_OTP_FAILED: &str = "OTP verification failed";
const RESET_PASSWORD_FAILED: &str = "Password reset failed";
const OTP_VERIFIED: &str = "OTP verified successfully";
const PASSWORD_RESET: &str =
    "Password reset successfully. You can now login with your new password.";

/// The server's message when it sent one, otherwise the static fallback.
fn failure_message(error: &AppError, fallback: &str) -> String {
    error
        .server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Owner of the client's authentication state.
///
/// Every network-calling action catches its own failures and reports them through the
/// session's `error` field; none of them return an error. Concurrent actions are not
/// coordinated: the last write wins.
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<Session>,
    reset_redirect_delay: Duration,
    pending_redirect: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Creates the store, hydrating `token` and `user` from storage.
    pub fn new(
        api: ApiClient,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        reset_redirect_delay: Duration,
    ) -> Self {
        let token = storage.get(TOKEN_KEY);
        let user = storage
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("ignoring unreadable stored user: {}", e);
                    None
                }
            });

        Self {
            api,
            storage,
            navigator,
            state: RwLock::new(Session {
                user,
                token,
                ..Default::default()
            }),
            reset_redirect_delay,
            pending_redirect: Mutex::new(None),
        }
    }

    /// A copy of the current session state.
    pub fn snapshot(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.snapshot().user_role()
    }

    fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Marks an action as started: loading, no error, optionally no success message.
    fn begin(&self, clear_success: bool) {
        self.update(|s| {
            s.loading = true;
            s.error = None;
            if clear_success {
                s.success_message = None;
            }
        });
    }

    fn finish(&self) {
        self.update(|s| s.loading = false);
    }

    pub async fn login(&self, credentials: &LoginCredentials) {
        self.begin(false);

        match self
            .api
            .post::<_, AuthResponse>("/auth/login", credentials)
            .await
        {
            Ok(auth) => {
                self.set_token(&auth.access_token);
                info!("signed in as {}", auth.user.email);
                self.set_user(auth.user);
                self.navigator.push(Location::named(RouteName::Dashboard));
            }
            Err(e) => {
                warn!("login failed: {}", e);
                self.clear_auth_state();
                self.update(|s| s.error = Some(failure_message(&e, LOGIN_FAILED)));
            }
        }

        self.finish();
    }

    pub async fn register(&self, data: &RegisterData) {
        self.begin(false);

        match self.api.post::<_, AuthResponse>("/users", data).await {
            Ok(auth) => {
                self.set_token(&auth.access_token);
                info!("registered {}", auth.user.email);
                self.set_user(auth.user);
                self.navigator.push(Location::named(RouteName::Dashboard));
            }
            Err(e) => {
                warn!("registration failed: {}", e);
                self.update(|s| s.error = Some(failure_message(&e, REGISTRATION_FAILED)));
            }
        }

        self.finish();
    }

    /// Asks the server to email a one-time code to `email`.
    pub async fn forgot_password(&self, email: &str) {
        self.begin(true);

        let data = ForgotPasswordData {
            email: email.to_string(),
        };
        match self
            .api
            .post::<_, IgnoredAny>("/auth/forgot-password", &data)
            .await
        {
            Ok(_) => self.update(|s| {
                s.verified_email = Some(email.to_string());
                s.success_message = Some(format!("OTP has been sent to {}", email));
            }),
            Err(e) => {
                warn!("forgot-password request failed: {}", e);
                self.update(|s| {
                    s.error = Some(failure_message(&e, FORGOT_PASSWORD_FAILED));
                    s.verified_email = None;
                });
            }
        }

        self.finish();
    }

    /// Checks the one-time code. A failure clears the verified flag but keeps the email.
    pub async fn verify_otp(&self, email: &str, otp: &str) {
        self.begin(true);

        let data = VerifyOtpData {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        match self
            .api
            .post::<_, IgnoredAny>("/auth/verify-otp", &data)
            .await
        {
            Ok(_) => self.update(|s| {
                s.is_verified_otp = true;
                s.verified_email = Some(email.to_string());
                s.success_message = Some(OTP_VERIFIED.to_string());
            }),
            Err(e) => {
                warn!("OTP verification failed: {}", e);
                self.update(|s| {
                    s.error = Some(failure_message(&e, VERIFY_OTP_FAILED));
                    s.is_verified_otp = false;
                });
            }
        }

        self.finish();
    }

    /// Submits the new password. On success the OTP state is cleared and the login view
    /// is requested after the configured delay; on failure the OTP state is kept for a
    /// retry.
    pub async fn reset_password(&self, data: &ResetPasswordData) {
        self.begin(true);

        match self
            .api
            .post::<_, IgnoredAny>("/auth/reset-password", data)
            .await
        {
            Ok(_) => {
                info!("password reset for {}", data.email);
                self.update(|s| s.success_message = Some(PASSWORD_RESET.to_string()));
                self.clear_reset_state();
                self.schedule_redirect(Location::named(RouteName::Login));
            }
            Err(e) => {
                warn!("password reset failed: {}", e);
                self.update(|s| s.error = Some(failure_message(&e, RESET_PASSWORD_FAILED)));
            }
        }

        self.finish();
    }

    fn schedule_redirect(&self, to: Location) {
        let navigator = Arc::clone(&self.navigator);
        let delay = self.reset_redirect_delay;
        let redirect = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.push(to);
        });

        let mut pending = self
            .pending_redirect
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(redirect) {
            previous.abort();
        }
    }

    /// Validates the persisted token and refreshes the user from the server.
    ///
    /// Fails closed: a missing, undecodable or expired token, or a failed profile fetch,
    /// clears the session and returns `false`.
    pub async fn check_auth(&self) -> bool {
        self.update(|s| s.loading = true);
        let authenticated = self.restore().await;
        self.finish();
        authenticated
    }

    async fn restore(&self) -> bool {
        let Some(token) = self.storage.get(TOKEN_KEY) else {
            debug!("no stored token");
            self.clear_auth_state();
            return false;
        };

        let claims = match token::decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("discarding stored token: {}", e);
                self.clear_auth_state();
                return false;
            }
        };

        if claims.is_expired_at(Utc::now()) {
            info!("stored token has expired");
            self.clear_auth_state();
            return false;
        }

        self.update(|s| s.token = Some(token));

        match self.api.profile().get().await {
            Ok(user) => {
                self.set_user(user);
                true
            }
            Err(e) => {
                warn!("could not refresh current user: {}", e);
                self.clear_auth_state();
                false
            }
        }
    }

    /// Clears the session and, unless already on a public view, requests `Home`.
    pub fn logout(&self) {
        self.clear_auth_state();
        info!("signed out");

        let on_public_view = self
            .navigator
            .current()
            .map_or(false, |name| PUBLIC_VIEWS.contains(&name));
        if !on_public_view {
            self.navigator.push(Location::named(RouteName::Home));
        }
    }

    pub fn set_token(&self, token: &str) {
        self.update(|s| s.token = Some(token.to_string()));
        if let Err(e) = self.storage.set(TOKEN_KEY, token) {
            warn!("failed to persist token: {}", e);
        }
    }

    /// Replaces the user wholesale and persists it.
    pub fn set_user(&self, user: User) {
        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(USER_KEY, &raw) {
                    warn!("failed to persist user: {}", e);
                }
            }
            Err(e) => warn!("failed to serialize user: {}", e),
        }
        self.update(|s| s.user = Some(user));
    }

    pub fn clear_reset_state(&self) {
        self.update(|s| {
            s.is_verified_otp = false;
            s.verified_email = None;
        });
    }

    /// Drops token, user, messages and reset state, in memory and in storage.
    pub fn clear_auth_state(&self) {
        self.update(|s| {
            s.user = None;
            s.token = None;
            s.error = None;
            s.success_message = None;
            s.is_verified_otp = false;
            s.verified_email = None;
        });
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!("failed to remove stored {}: {}", key, e);
            }
        }
    }

    pub fn clear_messages(&self) {
        self.update(|s| {
            s.error = None;
            s.success_message = None;
        });
    }

    /// Cancels a scheduled post-reset redirect, if one is pending.
    pub fn shutdown(&self) {
        let pending = self
            .pending_redirect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(redirect) = pending {
            redirect.abort();
        }
    }
}
