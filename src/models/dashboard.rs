//! Dashboard analytics records: KPI snapshots, revenue, orders, users, traffic.

use serde::{Deserialize, Serialize};

/// Direction of a KPI relative to its previous value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// `Up` when the current value is at least the previous one.
    pub fn between(value: f64, previous: f64) -> Self {
        if value >= previous {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

/// A single KPI with its comparison baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiValue {
    pub value: f64,
    pub previous_value: f64,
    pub change_percent: f64,
    pub trend: Trend,
}

/// The four headline KPIs shown on the dashboard overview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_revenue: KpiValue,
    pub total_users: KpiValue,
    pub orders: KpiValue,
    pub conversion_rate: KpiValue,
}

/// Precomputed, segment-agnostic KPI snapshot for one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub id: String,
    pub period: String,
    pub label: String,
    pub kpis: Kpis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueDataPoint {
    pub label: String,
    pub revenue: f64,
}

/// Revenue series for one (period, userType) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: String,
    pub period: String,
    pub user_type: String,
    pub data: Vec<RevenueDataPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDataPoint {
    pub label: String,
    pub orders: f64,
}

/// Order-count series for one (period, userType) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Orders {
    pub id: String,
    pub period: String,
    pub user_type: String,
    pub data: Vec<OrderDataPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSegment {
    pub segment: String,
    pub count: f64,
    #[serde(default)]
    pub color: String,
}

/// User counts per tier for one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDistribution {
    pub id: String,
    pub period: String,
    pub distribution: Vec<UserSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrafficSource {
    pub source: String,
    pub visitors: f64,
    pub percentage: f64,
}

/// Visitor breakdown by acquisition source for one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Traffic {
    pub id: String,
    pub period: String,
    pub sources: Vec<TrafficSource>,
}

/// Query parameters accepted by the analytics collection endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilters {
    pub period: Option<String>,
    pub user_type: Option<String>,
}

/// Normalize a userType filter: trimmed, lowercased, `None` when empty.
pub fn normalize_user_type(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}
