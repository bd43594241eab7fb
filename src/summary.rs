//! Derived read models for the summary cards and chart consumers.
//!
//! Everything here is recomputed wholesale from the exact filtered list the
//! view currently shows: no incremental updates, no staleness. Computations
//! are deterministic folds, so recomputing over the same input always yields
//! the same model, and the totals always equal the sums over the input list.
//! Chart consumers receive plain vectors; rendering stays outside the crate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{TYPE_INBOUND, TYPE_OUTBOUND, TransactionLog, Zone};

/// Quantity, value, and per-type counts over a set of transactions.
///
/// The same shape serves both the overall summary and each per-day bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of quantities over `type == "inbound"` records.
    pub total_inbound: i64,
    /// Sum of quantities over `type == "outbound"` records.
    pub total_outbound: i64,
    /// Sum of `price * quantity` over ALL records, regardless of type.
    pub total_value: f64,
    /// Count of records per type string. The type set is open: unknown
    /// strings get their own entry rather than being dropped.
    #[serde(rename = "transactionsByType")]
    pub by_type: BTreeMap<String, u64>,
}

impl Totals {
    fn absorb(&mut self, tx: &TransactionLog) {
        if tx.transaction_type == TYPE_INBOUND {
            self.total_inbound += tx.quantity;
        } else if tx.transaction_type == TYPE_OUTBOUND {
            self.total_outbound += tx.quantity;
        }
        self.total_value += tx.value();
        *self.by_type.entry(tx.transaction_type.clone()).or_insert(0) += 1;
    }
}

/// Day labels with aligned inbound/outbound quantity series, ascending by
/// date, ready for a trend chart's x-axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    /// ISO dates, ascending.
    pub labels: Vec<String>,
    pub inbound: Vec<i64>,
    pub outbound: Vec<i64>,
}

/// Summary over one filtered transaction list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    /// Overall totals across the whole list.
    #[serde(flatten)]
    pub totals: Totals,
    /// Number of records folded in.
    pub transaction_count: usize,
    /// Per-day buckets keyed by the UTC calendar date of each timestamp.
    days: BTreeMap<NaiveDate, Totals>,
}

impl TransactionSummary {
    /// Fold a filtered list into a fresh summary.
    ///
    /// Called again from scratch on every filter change. Unknown transaction
    /// type strings are accepted and counted dynamically.
    pub fn compute(transactions: &[TransactionLog]) -> Self {
        let mut summary = Self {
            transaction_count: transactions.len(),
            ..Self::default()
        };
        for tx in transactions {
            summary.totals.absorb(tx);
            summary
                .days
                .entry(tx.timestamp.date_naive())
                .or_default()
                .absorb(tx);
        }
        summary
    }

    /// Day buckets newest first, for the summary listing.
    pub fn days_desc(&self) -> Vec<(NaiveDate, &Totals)> {
        self.days.iter().rev().map(|(date, totals)| (*date, totals)).collect()
    }

    /// Day buckets oldest first, for trend x-axes.
    pub fn days_asc(&self) -> Vec<(NaiveDate, &Totals)> {
        self.days.iter().map(|(date, totals)| (*date, totals)).collect()
    }

    /// The bucket for one calendar date, if any transaction fell on it.
    pub fn day(&self, date: NaiveDate) -> Option<&Totals> {
        self.days.get(&date)
    }

    /// Project the day buckets into aligned chart series, ascending.
    pub fn trend(&self) -> TrendSeries {
        let mut series = TrendSeries::default();
        for (date, totals) in &self.days {
            series.labels.push(date.to_string());
            series.inbound.push(totals.total_inbound);
            series.outbound.push(totals.total_outbound);
        }
        series
    }
}

/// One row of the per-zone utilization chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneUtilizationRow {
    pub zone_name: String,
    pub utilization_percentage: f64,
}

/// System-wide capacity figures for the zone charts view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityOverview {
    pub total_capacity: i64,
    pub stored_capacity: i64,
    pub available_capacity: i64,
    /// Per-zone utilization, in the order the zones arrived.
    pub zones: Vec<ZoneUtilizationRow>,
}

impl CapacityOverview {
    /// Fold a zone list into the capacity overview.
    pub fn compute(zones: &[Zone]) -> Self {
        let total_capacity: i64 = zones.iter().map(|z| z.total_capacity).sum();
        let stored_capacity: i64 = zones.iter().map(|z| z.stored_capacity).sum();
        Self {
            total_capacity,
            stored_capacity,
            available_capacity: total_capacity - stored_capacity,
            zones: zones
                .iter()
                .map(|z| ZoneUtilizationRow {
                    zone_name: z.zone_name.clone(),
                    utilization_percentage: z.utilization_percentage(),
                })
                .collect(),
        }
    }
}
