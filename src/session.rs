//! Session and role state, broadcast to every interested view.
//!
//! A single [`SessionManager`] instance is the source of truth for "is a user
//! logged in" and "is that user an admin". It is constructed once at the
//! composition root and handed to components; `Clone` is cheap and all clones
//! share state. Broadcasts use [`tokio::sync::watch`], so a new subscriber
//! immediately observes the latest value rather than waiting for the next
//! change.
//!
//! Logout is a two-phase handshake: [`request_logout`](SessionManager::request_logout)
//! only publishes a farewell message (message present = confirmation modal
//! visible), and [`confirm_logout`](SessionManager::confirm_logout) is the
//! only operation that actually clears session data.

use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tokio::sync::watch;

use crate::token::{ProfileStore, TokenStore};

/// Role string that grants admin-only UI.
const ADMIN_ROLE: &str = "ADMIN";

/// Coarse navigation target published when the session decides a view change.
///
/// Stands in for router wiring: views watch this channel and render the
/// matching screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Public landing page; where a confirmed logout lands.
    Landing,
    /// Main authenticated dashboard.
    Dashboard,
}

/// Observable session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token held.
    Anonymous,
    /// Token held, no logout in flight.
    Authenticated,
    /// Token still held, logout confirmation modal showing.
    LogoutPending,
}

/// Extract the role string from a JWT's payload segment, failing closed.
///
/// The payload is the second base64url segment, decoded as JSON, field
/// `roles`. Any failure along the way (wrong segment count, bad base64url,
/// bad JSON, missing field) yields `None` with a warning -- never an error to
/// the caller. A non-string `roles` value is coerced to its string form, as
/// the backend has been observed sending both.
pub fn role_from_token(token: &str) -> Option<String> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload_b64 = match segments.next() {
        Some(p) => p,
        None => {
            tracing::warn!("token has no payload segment, treating as no role");
            return None;
        }
    };

    let payload_bytes = match URL_SAFE_NO_PAD.decode(payload_b64) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "token payload is not base64url, treating as no role");
            return None;
        }
    };

    let payload: serde_json::Value = match serde_json::from_slice(&payload_bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "token payload is not JSON, treating as no role");
            return None;
        }
    };

    match payload.get("roles") {
        Some(serde_json::Value::String(role)) => Some(role.clone()),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

/// Mutable session fields guarded by one lock so a transition is atomic from
/// a subscriber's point of view.
#[derive(Debug)]
struct Inner {
    /// Whether a refresh has confirmed a live token.
    logged_in: bool,
    /// In-memory mirror of the display username, cleared on confirmed logout.
    display_name: Option<String>,
}

/// Process-wide session/role state with broadcast channels.
///
/// Only the login flow and [`confirm_logout`](SessionManager::confirm_logout)
/// mutate session data; every other component just reads or subscribes.
#[derive(Clone)]
pub struct SessionManager {
    tokens: TokenStore,
    profile: ProfileStore,
    inner: Arc<Mutex<Inner>>,
    admin_tx: Arc<watch::Sender<bool>>,
    logout_tx: Arc<watch::Sender<Option<String>>>,
    route_tx: Arc<watch::Sender<Route>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("is_admin", &self.is_admin())
            .field("state", &self.state())
            .finish()
    }
}

impl SessionManager {
    /// Build the manager over shared token and profile stores.
    ///
    /// The initial admin flag is derived from whatever token the store
    /// already holds, so a subscriber attached before the first
    /// [`refresh`](SessionManager::refresh) still sees a correct value.
    pub fn new(tokens: TokenStore, profile: ProfileStore) -> Self {
        let initial_admin = tokens
            .get()
            .and_then(|t| role_from_token(&t))
            .is_some_and(|role| role == ADMIN_ROLE);
        let logged_in = tokens.get().is_some();
        let display_name = profile.username();

        let (admin_tx, _) = watch::channel(initial_admin);
        let (logout_tx, _) = watch::channel(None);
        let (route_tx, _) = watch::channel(Route::Landing);

        Self {
            tokens,
            profile,
            inner: Arc::new(Mutex::new(Inner {
                logged_in,
                display_name,
            })),
            admin_tx: Arc::new(admin_tx),
            logout_tx: Arc::new(logout_tx),
            route_tx: Arc::new(route_tx),
        }
    }

    /// Subscribe to the admin flag. The receiver immediately holds the
    /// current value.
    pub fn watch_admin(&self) -> watch::Receiver<bool> {
        self.admin_tx.subscribe()
    }

    /// Subscribe to the logout confirmation channel. `Some(message)` means
    /// the confirmation modal should show; `None` means hide it.
    pub fn watch_logout_message(&self) -> watch::Receiver<Option<String>> {
        self.logout_tx.subscribe()
    }

    /// Subscribe to navigation decisions.
    pub fn watch_route(&self) -> watch::Receiver<Route> {
        self.route_tx.subscribe()
    }

    /// Current admin flag without subscribing.
    pub fn is_admin(&self) -> bool {
        *self.admin_tx.borrow()
    }

    /// Whether a user is currently logged in.
    ///
    /// A held token counts even before [`refresh`](SessionManager::refresh)
    /// runs, so UI gating reacts to login without waiting for the broadcast.
    pub fn is_logged_in(&self) -> bool {
        self.tokens.get().is_some() || self.inner.lock().expect("session lock poisoned").logged_in
    }

    /// The display username mirror, if known.
    pub fn display_name(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .display_name
            .clone()
    }

    /// Record the display username after a successful login.
    ///
    /// Updates the in-memory mirror and persists it to the longer-lived
    /// profile store; a disk failure is logged, not surfaced, since the
    /// session itself is unaffected.
    pub fn set_display_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.inner.lock().expect("session lock poisoned").display_name = Some(name.clone());
        if let Err(e) = self.profile.set_username(Some(name)) {
            tracing::warn!(error = %e, "failed to persist display username");
        }
    }

    /// Re-derive login and admin state from the token store and broadcast it.
    ///
    /// Must be called after every token mutation (login success, logout);
    /// skipping it leaves subscribers stale. The role mirror in the token
    /// store is updated as a side effect. A malformed or missing token fails
    /// closed to non-admin.
    pub fn refresh(&self) {
        let mut inner = self.inner.lock().expect("session lock poisoned");

        let token = self.tokens.get();
        inner.logged_in = token.is_some();

        let role = token.as_deref().and_then(role_from_token);
        let is_admin = role.as_deref() == Some(ADMIN_ROLE);
        self.tokens.set_role(role);

        tracing::debug!(is_admin, logged_in = inner.logged_in, "session refreshed");
        self.admin_tx.send_replace(is_admin);
    }

    /// Publish the destination a view flow decided on (e.g. the dashboard
    /// after login).
    pub fn navigate(&self, route: Route) {
        self.route_tx.send_replace(route);
    }

    /// Begin the logout handshake by publishing a farewell message.
    ///
    /// Side-effect-free with respect to session data: the token, role, and
    /// admin flag all stay as they are until
    /// [`confirm_logout`](SessionManager::confirm_logout).
    pub fn request_logout(&self) {
        let inner = self.inner.lock().expect("session lock poisoned");
        let name = inner.display_name.clone().unwrap_or_else(|| "User".to_string());
        tracing::debug!(user = %name, "logout confirmation requested");
        self.logout_tx.send_replace(Some(format!("Thanks for your service, {name}")));
    }

    /// Abandon a pending logout, returning to the authenticated state.
    ///
    /// Clears the pending message (hiding the modal) without touching any
    /// session data. A no-op when no logout is pending.
    pub fn cancel_logout(&self) {
        self.logout_tx.send_replace(None);
    }

    /// Perform the actual logout.
    ///
    /// Clears the token, role mirror, and display-name mirror, drops the
    /// logged-in flag, publishes `is_admin = false`, clears the pending
    /// message (hiding the modal), and navigates to the landing view. The
    /// whole transition happens under the session lock, so no subscriber
    /// observes a partially cleared session.
    pub fn confirm_logout(&self) {
        let mut inner = self.inner.lock().expect("session lock poisoned");

        self.tokens.clear();
        inner.logged_in = false;
        inner.display_name = None;

        self.admin_tx.send_replace(false);
        self.logout_tx.send_replace(None);
        self.route_tx.send_replace(Route::Landing);
        tracing::debug!("session cleared");
    }

    /// The coarse lifecycle state, derived from held data.
    pub fn state(&self) -> SessionState {
        if self.logout_tx.borrow().is_some() {
            return SessionState::LogoutPending;
        }
        if self.is_logged_in() {
            return SessionState::Authenticated;
        }
        SessionState::Anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a structurally valid JWT with the given payload claims.
    /// Header and signature segments are not inspected by the decoder.
    fn fake_token(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.sig")
    }

    fn manager() -> (SessionManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new();
        let profile = ProfileStore::open(dir.path()).unwrap();
        (SessionManager::new(tokens.clone(), profile), dir)
    }

    fn manager_with_tokens() -> (SessionManager, TokenStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new();
        let profile = ProfileStore::open(dir.path()).unwrap();
        (
            SessionManager::new(tokens.clone(), profile),
            tokens,
            dir,
        )
    }

    // --- role_from_token tests ---

    #[test]
    fn admin_role_decodes_from_payload() {
        let token = fake_token(serde_json::json!({"sub": "meera", "roles": "ADMIN"}));
        assert_eq!(role_from_token(&token).as_deref(), Some("ADMIN"));
    }

    #[test]
    fn non_string_roles_value_is_coerced() {
        let token = fake_token(serde_json::json!({"roles": 7}));
        assert_eq!(role_from_token(&token).as_deref(), Some("7"));
    }

    #[test]
    fn malformed_tokens_fail_closed_without_panicking() {
        for bad in [
            "",
            "garbage",
            "only-one-segment",
            "a.###not-base64###.c",
            // Valid base64url but not JSON.
            &format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"not json")),
        ] {
            assert_eq!(role_from_token(bad), None, "token {bad:?} should yield no role");
        }

        // JSON payload without a roles claim.
        let token = fake_token(serde_json::json!({"sub": "x"}));
        assert_eq!(role_from_token(&token), None);
    }

    // --- refresh tests ---

    #[test]
    fn refresh_publishes_admin_to_subscribers() {
        let (session, tokens, _dir) = manager_with_tokens();
        let rx = session.watch_admin();
        assert!(!*rx.borrow());

        tokens.set(fake_token(serde_json::json!({"roles": "ADMIN"})));
        session.refresh();

        assert!(*rx.borrow());
        assert!(session.is_admin());
        assert!(session.is_logged_in());
        // Role mirror updated as a side effect.
        assert_eq!(tokens.role().as_deref(), Some("ADMIN"));
    }

    #[test]
    fn refresh_with_user_role_is_not_admin() {
        let (session, tokens, _dir) = manager_with_tokens();
        tokens.set(fake_token(serde_json::json!({"roles": "USER"})));
        session.refresh();
        assert!(!session.is_admin());
        assert!(session.is_logged_in());
    }

    #[test]
    fn refresh_with_malformed_token_fails_closed() {
        let (session, tokens, _dir) = manager_with_tokens();
        tokens.set("definitely-not-a-jwt");
        session.refresh();
        assert!(!session.is_admin());
        // Token presence still means logged in; the server is the judge of
        // validity on the next API call.
        assert!(session.is_logged_in());
    }

    #[test]
    fn late_subscriber_sees_current_value_immediately() {
        let (session, tokens, _dir) = manager_with_tokens();
        tokens.set(fake_token(serde_json::json!({"roles": "ADMIN"})));
        session.refresh();

        // Subscribed after the broadcast, still observes it.
        let rx = session.watch_admin();
        assert!(*rx.borrow());
    }

    // --- logout handshake tests ---

    #[test]
    fn request_logout_publishes_message_without_clearing() {
        let (session, tokens, _dir) = manager_with_tokens();
        tokens.set(fake_token(serde_json::json!({"roles": "ADMIN"})));
        session.refresh();
        session.set_display_name("meera");

        session.request_logout();

        let message = session.watch_logout_message().borrow().clone();
        assert_eq!(message.as_deref(), Some("Thanks for your service, meera"));
        assert_eq!(session.state(), SessionState::LogoutPending);

        // Nothing cleared yet.
        assert!(tokens.get().is_some());
        assert!(session.is_admin());
    }

    #[test]
    fn request_logout_without_display_name_uses_placeholder() {
        let (session, _dir) = manager();
        session.request_logout();
        let message = session.watch_logout_message().borrow().clone();
        assert_eq!(message.as_deref(), Some("Thanks for your service, User"));
    }

    #[test]
    fn confirm_logout_clears_everything_and_navigates_landing() {
        let (session, tokens, _dir) = manager_with_tokens();
        tokens.set(fake_token(serde_json::json!({"roles": "ADMIN"})));
        session.refresh();
        session.set_display_name("meera");
        session.navigate(Route::Dashboard);
        session.request_logout();

        session.confirm_logout();

        assert_eq!(tokens.get(), None);
        assert_eq!(tokens.role(), None);
        assert!(!session.is_admin());
        assert!(!session.is_logged_in());
        assert_eq!(session.display_name(), None);
        assert_eq!(*session.watch_logout_message().borrow(), None);
        assert_eq!(*session.watch_route().borrow(), Route::Landing);
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[test]
    fn cancel_logout_returns_to_authenticated() {
        let (session, tokens, _dir) = manager_with_tokens();
        tokens.set(fake_token(serde_json::json!({"roles": "USER"})));
        session.refresh();
        session.request_logout();
        assert_eq!(session.state(), SessionState::LogoutPending);

        session.cancel_logout();

        assert_eq!(session.state(), SessionState::Authenticated);
        assert!(tokens.get().is_some());
        assert_eq!(*session.watch_logout_message().borrow(), None);
    }

    #[test]
    fn state_machine_cycles_anonymous_to_authenticated_and_back() {
        let (session, tokens, _dir) = manager_with_tokens();
        assert_eq!(session.state(), SessionState::Anonymous);

        tokens.set(fake_token(serde_json::json!({"roles": "USER"})));
        session.refresh();
        assert_eq!(session.state(), SessionState::Authenticated);

        session.request_logout();
        session.confirm_logout();
        assert_eq!(session.state(), SessionState::Anonymous);

        // The cycle can run again: no terminal state.
        tokens.set(fake_token(serde_json::json!({"roles": "USER"})));
        session.refresh();
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    #[test]
    fn display_name_persists_across_sessions_but_not_logout_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new();
        let profile = ProfileStore::open(dir.path()).unwrap();
        let session = SessionManager::new(tokens.clone(), profile);

        session.set_display_name("sam");
        session.request_logout();
        session.confirm_logout();
        // The in-memory mirror is cleared by the logout...
        assert_eq!(session.display_name(), None);

        // ...but the long-lived profile still knows the name for next time.
        let profile = ProfileStore::open(dir.path()).unwrap();
        assert_eq!(profile.username().as_deref(), Some("sam"));
        let restored = SessionManager::new(tokens, profile);
        assert_eq!(restored.display_name().as_deref(), Some("sam"));
    }
}
