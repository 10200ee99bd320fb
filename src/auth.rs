//! Route-level authorization gate.
//!
//! The gate never talks to an identity provider itself. It only observes
//! [`SessionStatus`] values reported by one and decides whether protected
//! content may render.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

/// What the identity provider currently knows about the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    /// `false` until the provider has finished its session check.
    pub resolved: bool,
    /// Meaningful only once `resolved` is `true`.
    pub signed_in: bool,
}

impl SessionStatus {
    pub const PENDING: SessionStatus = SessionStatus {
        resolved: false,
        signed_in: false,
    };

    pub fn signed_in() -> Self {
        Self {
            resolved: true,
            signed_in: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            resolved: true,
            signed_in: false,
        }
    }
}

/// Side effect the gate may trigger when access is denied.
pub trait Navigator: Send + Sync {
    fn redirect_to_sign_in(&self, path: &str);
}

/// Logs redirects. Used where the caller turns the gate state into its own
/// response, as the HTTP layer does.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn redirect_to_sign_in(&self, path: &str) {
        info!(path, "session signed out, redirecting to sign-in");
    }
}

/// Counts redirects and remembers the last target.
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    count: Arc<AtomicUsize>,
    last: Arc<parking_lot::Mutex<Option<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn last_target(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_sign_in(&self, path: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(path.to_string());
    }
}

/// Gate state. Starts `Unknown` and never returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// What the gate lets through for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<T> {
    /// Session not resolved yet; show a neutral placeholder.
    Loading,
    /// Signed in; the protected content.
    Content(T),
    /// Signed out; a redirect has been issued and nothing renders.
    Redirected,
}

/// Authorization gate wrapping one protected route.
#[derive(Debug, Clone)]
pub struct AuthGate {
    state: GateState,
    sign_in_path: String,
}

impl AuthGate {
    pub fn new(sign_in_path: impl Into<String>) -> Self {
        Self {
            state: GateState::Unknown,
            sign_in_path: sign_in_path.into(),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Re-evaluates the gate against a fresh provider report.
    ///
    /// An unresolved report never moves the gate (in particular it does not
    /// go back to `Unknown`). Entering `Unauthenticated` issues exactly one
    /// redirect; repeating the same report is a no-op.
    pub fn observe(&mut self, status: SessionStatus, navigator: &dyn Navigator) -> GateState {
        if !status.resolved {
            return self.state;
        }
        let next = if status.signed_in {
            GateState::Authenticated
        } else {
            GateState::Unauthenticated
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "auth gate transition");
            self.state = next;
            if next == GateState::Unauthenticated {
                navigator.redirect_to_sign_in(&self.sign_in_path);
            }
        }
        self.state
    }

    /// Renders the protected child only when authenticated.
    pub fn render<T>(&self, child: impl FnOnce() -> T) -> GateView<T> {
        match self.state {
            GateState::Unknown => GateView::Loading,
            GateState::Authenticated => GateView::Content(child()),
            GateState::Unauthenticated => GateView::Redirected,
        }
    }

    /// Follows a provider channel until it closes, re-evaluating on every
    /// change.
    pub async fn follow(
        &mut self,
        mut sessions: watch::Receiver<SessionStatus>,
        navigator: &dyn Navigator,
    ) -> GateState {
        loop {
            let status = *sessions.borrow_and_update();
            self.observe(status, navigator);
            if sessions.changed().await.is_err() {
                return self.state;
            }
        }
    }
}

/// Stand-in identity provider publishing session reports on a watch channel.
#[derive(Debug)]
pub struct SimulatedIdentity {
    tx: watch::Sender<SessionStatus>,
}

impl Default for SimulatedIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedIdentity {
    /// Starts with an unresolved session.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionStatus::PENDING);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> SessionStatus {
        *self.tx.borrow()
    }

    pub fn sign_in(&self) {
        self.tx.send_replace(SessionStatus::signed_in());
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(SessionStatus::signed_out());
    }

    /// Resolves the session to `signed_in` after `after` on the runtime.
    pub fn resolve_after(self: &Arc<Self>, after: Duration, signed_in: bool) {
        let identity = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if signed_in {
                identity.sign_in();
            } else {
                identity.sign_out();
            }
        });
    }
}
