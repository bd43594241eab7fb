//! Composition root wiring stores, session state, and gateway services.
//!
//! Nothing in this crate is a global: [`AppContextBuilder`] constructs one
//! [`AppContext`] and the application passes it (or the pieces it needs) down
//! to views. `Clone` is cheap everywhere, so handing a component its own copy
//! of a service is the normal pattern.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::feed::{DEFAULT_POLL_INTERVAL, FeedHandle, NotificationFeed};
use crate::model::{AuthRequest, RegisterRequest};
use crate::services::{
    AuthService, MetricsService, NotificationService, StockService, TransactionService,
    VendorService, ZoneService,
};
use crate::session::{Route, SessionManager};
use crate::token::{ProfileStore, TokenStore};

/// Backend base URL used when neither the builder nor the environment
/// provides one.
const DEFAULT_BASE_URL: &str = "http://localhost:9090";

/// Environment variable overriding the backend base URL.
const ENV_BASE_URL: &str = "STOCKLENS_API_URL";

/// Environment variable overriding the profile directory.
const ENV_DATA_DIR: &str = "STOCKLENS_DATA_DIR";

/// Read an environment override, falling back to a default.
fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            tracing::debug!(key, default, "environment variable not set, using default");
            default.to_string()
        }
    }
}

/// Builder for [`AppContext`].
///
/// # Examples
///
/// ```no_run
/// # fn example() -> std::io::Result<()> {
/// use stocklens::AppContextBuilder;
///
/// let app = AppContextBuilder::new()
///     .base_url("http://inventory.internal:9090")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppContextBuilder {
    base_url: Option<String>,
    profile_dir: Option<PathBuf>,
    poll_interval: Option<Duration>,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend base URL (scheme + host + port). Falls back to the
    /// `STOCKLENS_API_URL` environment variable, then to localhost:9090.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Directory for the longer-lived display profile. Falls back to the
    /// `STOCKLENS_DATA_DIR` environment variable, then to `.stocklens`.
    pub fn profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(dir.into());
        self
    }

    /// Interval for the notification poll loop started by
    /// [`AppContext::start_notification_polling`].
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Wire everything together.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if the profile store cannot be opened (read
    /// failures other than file-not-found).
    pub fn build(self) -> io::Result<AppContext> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| env_or(ENV_BASE_URL, DEFAULT_BASE_URL));
        let profile_dir = self
            .profile_dir
            .unwrap_or_else(|| PathBuf::from(env_or(ENV_DATA_DIR, ".stocklens")));
        let poll_interval = self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);

        let tokens = TokenStore::new();
        let profile = ProfileStore::open(&profile_dir)?;
        let session = SessionManager::new(tokens.clone(), profile);

        let api = ApiClient::new(base_url, tokens.clone());
        let notifications = NotificationService::new(api.clone());
        let feed = NotificationFeed::new(notifications.clone());

        Ok(AppContext {
            tokens,
            session,
            auth: AuthService::new(api.clone()),
            zones: ZoneService::new(api.clone()),
            vendors: VendorService::new(api.clone()),
            stock: StockService::new(api.clone()),
            transactions: TransactionService::new(api.clone()),
            notifications,
            metrics: MetricsService::new(api),
            feed,
            poll_interval,
        })
    }
}

/// The wired application: shared stores, session state, and one gateway per
/// entity. `Clone` is cheap -- all fields are Arc-backed.
#[derive(Clone)]
pub struct AppContext {
    pub tokens: TokenStore,
    pub session: SessionManager,
    pub auth: AuthService,
    pub zones: ZoneService,
    pub vendors: VendorService,
    pub stock: StockService,
    pub transactions: TransactionService,
    pub notifications: NotificationService,
    pub metrics: MetricsService,
    pub feed: NotificationFeed,
    poll_interval: Duration,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .finish()
    }
}

impl AppContext {
    /// Run the full login flow: authenticate, store the issued token,
    /// refresh the session broadcast, and navigate to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`ApiError`] with session state untouched; the
    /// caller shows `display_message()` and the user retries.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let credentials = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token = self.auth.login(&credentials).await?;

        self.tokens.set(token);
        self.session.set_display_name(username);
        // The broadcast, not the token write, is what flips subscribers.
        self.session.refresh();
        self.session.navigate(Route::Dashboard);
        Ok(())
    }

    /// Register a new account; returns the backend's acknowledgment text.
    /// Registration does not log the user in.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<String, ApiError> {
        self.auth.register(registration).await
    }

    /// Start the background notification poll with the configured interval.
    pub fn start_notification_polling(&self) -> FeedHandle {
        self.feed.start_polling(self.poll_interval)
    }
}
