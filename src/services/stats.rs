//! KPI snapshot aggregation.
//!
//! Unsegmented requests return the stored baseline snapshot for a period.
//! Segmented requests recompute revenue, orders, users and conversion rate
//! for one user tier and compare them against the baseline's previous values.
//! Missing data degrades to zero; nothing here fails or mutates the dataset.

use crate::db::Dataset;
use crate::models::dashboard::{
    normalize_user_type, DashboardFilters, KpiValue, Kpis, Stats, Trend,
};

/// Segment name that means "no segmentation".
const ALL_SEGMENT: &str = "all";

/// Display label of a tier in the user-distribution records.
fn segment_label(user_type: &str) -> Option<&'static str> {
    match user_type {
        "free" => Some("Free"),
        "premium" => Some("Premium"),
        "enterprise" => Some("Enterprise"),
        _ => None,
    }
}

/// Fixed conversion rate (percent) per tier.
fn segment_conversion_rate(user_type: &str) -> Option<f64> {
    match user_type {
        "free" => Some(2.1),
        "premium" => Some(6.8),
        "enterprise" => Some(12.4),
        _ => None,
    }
}

/// Percentage change rounded to one decimal, half away from zero. Zero when there is no baseline.
pub fn change_percent(value: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (((value - previous) / previous) * 100.0 * 10.0).round() / 10.0
}

fn kpi(value: f64, previous: Option<&KpiValue>) -> KpiValue {
    let previous_value = previous.map_or(0.0, |k| k.previous_value);
    KpiValue {
        value,
        previous_value,
        change_percent: change_percent(value, previous_value),
        trend: Trend::between(value, previous_value),
    }
}

/// Stats for `period`, optionally recomputed for one user segment.
///
/// Returns zero or one snapshot.
pub fn aggregate(dataset: &Dataset, period: &str, user_type: Option<&str>) -> Vec<Stats> {
    let baseline = dataset.stats.iter().find(|s| s.period == period);

    let segment = match normalize_user_type(user_type) {
        Some(s) if s != ALL_SEGMENT => s,
        _ => return baseline.cloned().into_iter().collect(),
    };

    let total_revenue: f64 = dataset
        .revenue
        .iter()
        .filter(|r| r.period == period && r.user_type.to_lowercase() == segment)
        .flat_map(|r| r.data.iter())
        .map(|p| p.revenue)
        .sum();

    let total_orders: f64 = dataset
        .orders
        .iter()
        .filter(|o| o.period == period && o.user_type.to_lowercase() == segment)
        .flat_map(|o| o.data.iter())
        .map(|p| p.orders)
        .sum();

    let total_users = segment_label(&segment)
        .and_then(|label| {
            dataset
                .users
                .iter()
                .find(|u| u.period == period)?
                .distribution
                .iter()
                .find(|d| d.segment == label)
                .map(|d| d.count)
        })
        .unwrap_or(0.0);

    let conversion_rate = segment_conversion_rate(&segment)
        .or_else(|| baseline.map(|b| b.kpis.conversion_rate.value))
        .unwrap_or(0.0);

    let base_kpis = baseline.map(|b| &b.kpis);
    let kpis = Kpis {
        total_revenue: kpi(total_revenue, base_kpis.map(|k| &k.total_revenue)),
        total_users: kpi(total_users, base_kpis.map(|k| &k.total_users)),
        orders: kpi(total_orders, base_kpis.map(|k| &k.orders)),
        conversion_rate: kpi(conversion_rate, base_kpis.map(|k| &k.conversion_rate)),
    };

    tracing::debug!(
        period = %period,
        user_type = %segment,
        total_revenue,
        total_orders,
        total_users,
        has_baseline = baseline.is_some(),
        "Computed segmented stats"
    );

    vec![Stats {
        id: baseline.map_or_else(|| format!("{period}-{segment}"), |b| b.id.clone()),
        period: period.to_string(),
        label: baseline.map_or_else(|| format!("Filtered {period}"), |b| b.label.clone()),
        kpis,
    }]
}

/// Stats for the request filters.
///
/// With a period this is [`aggregate`]. Without one every stored snapshot is
/// returned, recomputed for the segment when a segment is given.
pub fn list(dataset: &Dataset, filters: &DashboardFilters) -> Vec<Stats> {
    let user_type = filters.user_type.as_deref();
    if let Some(period) = filters
        .period
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        return aggregate(dataset, period, user_type);
    }

    match normalize_user_type(user_type) {
        Some(s) if s != ALL_SEGMENT => dataset
            .stats
            .iter()
            .flat_map(|baseline| aggregate(dataset, &baseline.period, user_type))
            .collect(),
        _ => dataset.stats.clone(),
    }
}
