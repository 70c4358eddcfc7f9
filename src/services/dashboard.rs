//! Filtered reads over the analytics collections.

use crate::db::Dataset;
use crate::models::dashboard::{
    normalize_user_type, DashboardFilters, Orders, Revenue, Traffic, UserDistribution,
};

fn period_matches(filters: &DashboardFilters, period: &str) -> bool {
    filters
        .period
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map_or(true, |p| p == period)
}

fn user_type_matches(filters: &DashboardFilters, user_type: &str) -> bool {
    normalize_user_type(filters.user_type.as_deref())
        .map_or(true, |wanted| user_type.to_lowercase() == wanted)
}

/// Revenue series matching the period and userType filters.
pub fn list_revenue(dataset: &Dataset, filters: &DashboardFilters) -> Vec<Revenue> {
    dataset
        .revenue
        .iter()
        .filter(|r| period_matches(filters, &r.period) && user_type_matches(filters, &r.user_type))
        .cloned()
        .collect()
}

/// Order series matching the period and userType filters.
pub fn list_orders(dataset: &Dataset, filters: &DashboardFilters) -> Vec<Orders> {
    dataset
        .orders
        .iter()
        .filter(|o| period_matches(filters, &o.period) && user_type_matches(filters, &o.user_type))
        .cloned()
        .collect()
}

/// User distributions matching the period filter. userType is ignored.
pub fn list_users(dataset: &Dataset, filters: &DashboardFilters) -> Vec<UserDistribution> {
    dataset
        .users
        .iter()
        .filter(|u| period_matches(filters, &u.period))
        .cloned()
        .collect()
}

/// Traffic breakdowns matching the period filter. userType is ignored.
pub fn list_traffic(dataset: &Dataset, filters: &DashboardFilters) -> Vec<Traffic> {
    dataset
        .traffic
        .iter()
        .filter(|t| period_matches(filters, &t.period))
        .cloned()
        .collect()
}
