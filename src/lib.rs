//! Typed async client and view-state layer for an inventory-management REST
//! backend: session/role broadcasts, in-memory list pipelines, chart-ready
//! summaries, and one thin gateway service per entity.

mod client;
pub use client::ApiClient;
mod context;
pub use context::{AppContext, AppContextBuilder};
mod error;
pub use error::{ApiError, ErrorMessage, MessageKind};
mod feed;
pub use feed::{DEFAULT_POLL_INTERVAL, FeedHandle, NotificationFeed};
pub mod model;
mod query;
pub use query::{DateRange, ListQuery, Page, Searchable, id_matches, latest_first, price_in_range};
mod services;
pub use services::{
    AuthService, MetricsService, NotificationService, StockService, TransactionService,
    VendorService, ZoneService,
};
mod session;
pub use session::{Route, SessionManager, SessionState, role_from_token};
mod status;
pub use status::{DEFAULT_DISMISS_AFTER, StatusMessages};
mod summary;
pub use summary::{CapacityOverview, Totals, TransactionSummary, TrendSeries, ZoneUtilizationRow};
mod token;
pub use token::{ProfileStore, TokenStore};
