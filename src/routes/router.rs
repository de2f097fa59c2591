use super::{guard, meta, GuardDecision, Location, RouteName};
use crate::{auth::Session, error::AppError};
use log::{debug, info};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Guard redirects followed before a navigation is abandoned.
const MAX_REDIRECTS: usize = 8;

/// Port through which the session store asks for navigation.
///
/// Requests are queued; they pass through the guard only when the owner of the router
/// processes them.
pub trait Navigator: Send + Sync {
    /// Name of the committed current view, if any navigation has happened.
    fn current(&self) -> Option<RouteName>;
    fn push(&self, to: Location);
}

#[derive(Debug, Default)]
struct RouterState {
    current: Option<Location>,
    pending: VecDeque<Location>,
    history: Vec<Location>,
}

/// Holds the current view, the committed history and queued navigation requests.
#[derive(Debug, Default)]
pub struct Router {
    state: Mutex<RouterState>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_location(&self) -> Option<Location> {
        self.state().current.clone()
    }

    /// Every committed location, oldest first.
    pub fn history(&self) -> Vec<Location> {
        self.state().history.clone()
    }

    /// Removes and returns the next queued navigation request.
    pub fn next_pending(&self) -> Option<Location> {
        self.state().pending.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.state().pending.is_empty()
    }

    /// Runs the guard for `to`, following redirects, and commits the final location.
    ///
    /// # Returns
    /// The committed location, or `AppError::Navigation` if redirects did not settle.
    pub fn navigate(&self, to: Location, session: &Session) -> Result<Location, AppError> {
        let requested = to.name;
        let mut target = to;

        for _ in 0..MAX_REDIRECTS {
            match guard::evaluate(&target, &meta(target.name), session) {
                GuardDecision::Proceed => {
                    if target.name != requested {
                        info!("navigation to {} redirected to {}", requested, target.name);
                    }
                    let mut state = self.state();
                    state.current = Some(target.clone());
                    state.history.push(target.clone());
                    return Ok(target);
                }
                GuardDecision::Redirect(next) => {
                    debug!("guard redirected {} -> {}", target.name, next.name);
                    target = next;
                }
            }
        }

        Err(AppError::Navigation(format!(
            "navigation to {} did not settle after {} redirects",
            requested, MAX_REDIRECTS
        )))
    }
}

impl Navigator for Router {
    fn current(&self) -> Option<RouteName> {
        self.state().current.as_ref().map(|l| l.name)
    }

    fn push(&self, to: Location) {
        debug!("navigation requested: {}", to);
        self.state().pending.push_back(to);
    }
}
