//! Wire-level records for the inventory backend's JSON API.
//!
//! Field names are serde-renamed to the backend's camelCase convention.
//! Relationships are by numeric id only; a dangling id resolves to a fallback
//! label rather than an error (see [`TransactionLog::zone_label`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction direction tag for inbound stock movements.
pub const TYPE_INBOUND: &str = "inbound";
/// Transaction direction tag for outbound stock movements.
pub const TYPE_OUTBOUND: &str = "outbound";

/// Label shown when a stock row references a zone that no longer exists.
pub const UNKNOWN_ZONE: &str = "Unknown Zone";
/// Label shown when a transaction references a zone that no longer exists.
pub const ZONE_DELETED: &str = "Zone Deleted";
/// Label shown when a record references a vendor that no longer exists.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
/// Label shown when a transaction references a stock item that was removed.
pub const STOCK_DELETED: &str = "Stock Deleted";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub zone_id: i64,
    pub zone_name: String,
    pub total_capacity: i64,
    pub stored_capacity: i64,
}

/// Occupancy band a zone falls into, used as a tab filter in the zones view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageBand {
    All,
    Low,
    Moderate,
    High,
}

impl Zone {
    /// Fraction of this zone's capacity currently in use, in `[0, 1]` for
    /// well-formed data. Zero-capacity zones report 0 rather than dividing.
    pub fn utilization(&self) -> f64 {
        if self.total_capacity == 0 {
            return 0.0;
        }
        self.stored_capacity as f64 / self.total_capacity as f64
    }

    /// Percentage of capacity still available; 0 for zero-capacity zones.
    pub fn available_percentage(&self) -> f64 {
        if self.total_capacity == 0 {
            return 0.0;
        }
        (self.total_capacity - self.stored_capacity) as f64 / self.total_capacity as f64 * 100.0
    }

    /// Percentage of capacity in use; 0 for zero-capacity zones.
    pub fn utilization_percentage(&self) -> f64 {
        self.utilization() * 100.0
    }

    /// Human-readable occupancy status.
    ///
    /// Zero-capacity zones are "Empty / No Capacity" when nothing is stored
    /// and "Error (Invalid Capacity)" when something is (stored units with no
    /// declared capacity is a data problem, not a render problem). Otherwise
    /// the ladder runs Empty, Optimal (< 50%), Moderate (< 80%), High,
    /// Full (exactly 100%), with anything past 100% reported as Unknown.
    pub fn status(&self) -> &'static str {
        if self.total_capacity == 0 {
            if self.stored_capacity == 0 {
                return "Empty / No Capacity";
            }
            return "Error (Invalid Capacity)";
        }
        let utilization = self.utilization();
        if self.stored_capacity == 0 {
            return "Empty";
        }
        if utilization < 0.5 {
            return "Optimal";
        }
        if utilization < 0.8 {
            return "Moderate";
        }
        if utilization <= 1.0 {
            if utilization == 1.0 {
                return "Full";
            }
            return "High";
        }
        "Unknown"
    }

    /// Whether this zone falls into the given usage band.
    pub fn in_band(&self, band: UsageBand) -> bool {
        let utilization = self.utilization();
        match band {
            UsageBand::All => true,
            UsageBand::Low => utilization < 0.5 && self.stored_capacity > 0,
            UsageBand::Moderate => (0.5..0.8).contains(&utilization),
            UsageBand::High => utilization >= 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub vendor_id: i64,
    pub vendor_name: String,
    pub contact_info: i64,
    pub vendor_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub stock_id: i64,
    pub stock_name: String,
    pub stock_category: String,
    pub stock_quantity: i64,
    pub zone_id: i64,
    pub vendor_id: i64,
}

impl Stock {
    /// Name of the zone this stock sits in, or [`UNKNOWN_ZONE`].
    pub fn zone_label<'a>(&self, zones: &'a [Zone]) -> &'a str {
        zones
            .iter()
            .find(|z| z.zone_id == self.zone_id)
            .map(|z| z.zone_name.as_str())
            .unwrap_or(UNKNOWN_ZONE)
    }

    /// Name of this stock's vendor, or [`UNKNOWN_VENDOR`].
    pub fn vendor_label<'a>(&self, vendors: &'a [Vendor]) -> &'a str {
        vendors
            .iter()
            .find(|v| v.vendor_id == self.vendor_id)
            .map(|v| v.vendor_name.as_str())
            .unwrap_or(UNKNOWN_VENDOR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLog {
    pub transaction_id: i64,
    pub stock_id: i64,
    pub user_id: i64,
    pub zone_id: i64,
    pub quantity: i64,
    /// Direction tag. Open set: unknown strings are carried through and
    /// counted dynamically by the summary engine.
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl TransactionLog {
    /// Name of the zone this transaction touched, or [`ZONE_DELETED`] when
    /// the zone has since been removed.
    pub fn zone_label<'a>(&self, zones: &'a [Zone]) -> &'a str {
        zones
            .iter()
            .find(|z| z.zone_id == self.zone_id)
            .map(|z| z.zone_name.as_str())
            .unwrap_or(ZONE_DELETED)
    }

    /// Name of the stock item moved, or [`STOCK_DELETED`].
    pub fn stock_label<'a>(&self, stocks: &'a [Stock]) -> &'a str {
        stocks
            .iter()
            .find(|s| s.stock_id == self.stock_id)
            .map(|s| s.stock_name.as_str())
            .unwrap_or(STOCK_DELETED)
    }

    /// Monetary value of this movement (price times quantity).
    pub fn value(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminNotification {
    pub id: i64,
    pub body: String,
    pub vendor_id: i64,
    pub vendor_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub metric_id: i64,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Credentials for `POST /auth/authenticate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Payload for `POST /auth/new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roles: String,
}

/// Payload for `POST /notifications/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub vendor_id: i64,
    pub vendor_email: String,
    pub body: String,
}
