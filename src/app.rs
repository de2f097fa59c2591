//! The application context.
//!
//! `App` is constructed once and owns every long-lived piece of client state. Nothing in the
//! crate reaches for a global; callers borrow what they need from here.

use crate::{
    api::ApiClient,
    auth::{Session, SessionStore},
    config::Config,
    error::AppError,
    routes::{Location, Router},
    storage::KeyValueStore,
    toast::ToastQueue,
};
use log::{debug, info};
use std::sync::Arc;

pub struct App {
    config: Config,
    storage: Arc<dyn KeyValueStore>,
    api: ApiClient,
    session: SessionStore,
    router: Arc<Router>,
    toasts: ToastQueue,
}

impl App {
    /// Wires storage, API client, router, session store and toast queue together.
    ///
    /// # Arguments
    /// * `config` - Runtime configuration.
    /// * `storage` - Backing store for the persisted `token` and `user` entries.
    pub fn new(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let api = ApiClient::new(&config, Arc::clone(&storage))?;
        let router = Arc::new(Router::new());
        let session = SessionStore::new(
            api.clone(),
            Arc::clone(&storage),
            router.clone(),
            config.reset_redirect_delay,
        );
        let toasts = ToastQueue::new(config.toast_timeout);

        debug!("application context ready for {}", config.api_base_url);
        Ok(Self {
            config,
            storage,
            api,
            session,
            router,
            toasts,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// Validates the persisted session against the backend.
    pub async fn restore_session(&self) -> bool {
        let restored = self.session.check_auth().await;
        info!("session restored: {}", restored);
        restored
    }

    /// Resolves `href` and navigates to it.
    pub fn navigate(&self, href: &str) -> Result<Location, AppError> {
        let to = Location::parse(href)?;
        self.navigate_to(to)
    }

    /// Navigates to `to` through the guard, using the session as it is now.
    pub fn navigate_to(&self, to: Location) -> Result<Location, AppError> {
        let session: Session = self.session.snapshot();
        self.router.navigate(to, &session)
    }

    /// Commits every navigation the session store has requested so far, in order.
    ///
    /// # Returns
    /// The location finally committed, or `None` if nothing was pending.
    pub fn process_navigation(&self) -> Result<Option<Location>, AppError> {
        let mut committed = None;
        while let Some(next) = self.router.next_pending() {
            committed = Some(self.navigate_to(next)?);
        }
        Ok(committed)
    }

    /// Cancels outstanding timers: toast expiries and any scheduled redirect.
    pub fn shutdown(self) {
        self.toasts.shutdown();
        self.session.shutdown();
        debug!("application context shut down");
    }
}
