//! Ephemeral UI notifications with timed self-removal.
//!
//! Each toast with a non-zero timeout owns a Tokio timer task that removes it when the
//! delay elapses. Removing a toast early cancels its timer; a timer that fires for an id
//! already gone does nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic, never reused.
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    /// Zero means the toast stays until removed.
    pub timeout: Duration,
}

#[derive(Debug, Default)]
struct ToastState {
    toasts: Vec<Toast>,
    next_id: u64,
    timers: HashMap<u64, JoinHandle<()>>,
}

/// Insertion-ordered toast queue. Clones share the same queue.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    inner: Arc<Mutex<ToastState>>,
    default_timeout: Duration,
}

fn lock(inner: &Mutex<ToastState>) -> MutexGuard<'_, ToastState> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ToastQueue {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ToastState::default())),
            default_timeout,
        }
    }

    /// Appends a toast and returns its id. `timeout` falls back to the queue default.
    ///
    /// A non-zero timeout spawns a timer, so this must run inside a Tokio runtime.
    pub fn add(
        &self,
        message: impl Into<String>,
        kind: ToastKind,
        timeout: Option<Duration>,
    ) -> u64 {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let mut state = lock(&self.inner);

        let id = state.next_id;
        state.next_id += 1;
        state.toasts.push(Toast {
            id,
            message: message.into(),
            kind,
            timeout,
        });

        if !timeout.is_zero() {
            let inner = Arc::clone(&self.inner);
            let timer = tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let mut state = lock(&inner);
                state.toasts.retain(|t| t.id != id);
                state.timers.remove(&id);
            });
            state.timers.insert(id, timer);
        }

        id
    }

    pub fn success(&self, message: impl Into<String>, timeout: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Success, timeout)
    }

    pub fn error(&self, message: impl Into<String>, timeout: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Error, timeout)
    }

    pub fn warning(&self, message: impl Into<String>, timeout: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Warning, timeout)
    }

    pub fn info(&self, message: impl Into<String>, timeout: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Info, timeout)
    }

    /// Removes the toast with `id`; a no-op if it is already gone.
    pub fn remove(&self, id: u64) {
        let mut state = lock(&self.inner);
        state.toasts.retain(|t| t.id != id);
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
    }

    /// Drops every toast and cancels every pending timer.
    pub fn clear_all(&self) {
        let mut state = lock(&self.inner);
        state.toasts.clear();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
    }

    /// Cancels every pending timer; the toasts themselves stay until removed.
    pub fn shutdown(&self) {
        let mut state = lock(&self.inner);
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
    }

    /// Current toasts in insertion order.
    pub fn toasts(&self) -> Vec<Toast> {
        lock(&self.inner).toasts.clone()
    }
}
