//! CSV report export for the dashboard pages.

use std::str::FromStr;

use crate::db::Dataset;
use crate::errors::AppError;
use crate::models::dashboard::{normalize_user_type, DashboardFilters};
use crate::models::user::Role;
use crate::services::dashboard as dashboard_service;

const DEFAULT_PERIOD: &str = "30d";
const DEFAULT_USER_TYPE: &str = "all";

/// Exportable report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Revenue,
    Orders,
    Dashboard,
    Users,
    Traffic,
}

impl Report {
    pub fn as_str(&self) -> &'static str {
        match self {
            Report::Revenue => "revenue",
            Report::Orders => "orders",
            Report::Dashboard => "dashboard",
            Report::Users => "users",
            Report::Traffic => "traffic",
        }
    }
}

impl FromStr for Report {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(Report::Revenue),
            "orders" => Ok(Report::Orders),
            "dashboard" => Ok(Report::Dashboard),
            "users" => Ok(Report::Users),
            "traffic" => Ok(Report::Traffic),
            other => Err(AppError::NotFound(format!("Unknown report: {other}"))),
        }
    }
}

/// Rendered CSV file.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: Vec<u8>,
}

/// `admin_revenue_report.csv`, `manager_traffic_report.csv`, ...
pub fn filename(role: Role, report: Report) -> String {
    format!("{}_{}_report.csv", role.as_str().to_lowercase(), report.as_str())
}

fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Render `report` for the given filters. Missing data yields a header-only file.
pub fn export(
    dataset: &Dataset,
    report: Report,
    role: Role,
    filters: &DashboardFilters,
) -> Result<CsvExport, AppError> {
    let period = filters
        .period
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PERIOD)
        .to_string();
    let user_type = normalize_user_type(filters.user_type.as_deref())
        .unwrap_or_else(|| DEFAULT_USER_TYPE.to_string());
    let scoped = DashboardFilters {
        period: Some(period.clone()),
        user_type: Some(user_type.clone()),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| AppError::Internal(format!("CSV write failed: {e}"));

    match report {
        Report::Revenue => {
            writer
                .write_record(["Period", "Revenue", "UserType", "DateRange"])
                .map_err(csv_err)?;
            if let Some(series) = dashboard_service::list_revenue(dataset, &scoped).first() {
                for point in &series.data {
                    writer
                        .write_record([&point.label, &fmt_number(point.revenue), &user_type, &period])
                        .map_err(csv_err)?;
                }
            }
        }
        Report::Orders => {
            writer
                .write_record(["Period", "Orders", "UserType", "DateRange"])
                .map_err(csv_err)?;
            if let Some(series) = dashboard_service::list_orders(dataset, &scoped).first() {
                for point in &series.data {
                    writer
                        .write_record([&point.label, &fmt_number(point.orders), &user_type, &period])
                        .map_err(csv_err)?;
                }
            }
        }
        Report::Dashboard => {
            writer
                .write_record(["Period", "Revenue", "Orders", "UserType", "DateRange"])
                .map_err(csv_err)?;
            let orders = dashboard_service::list_orders(dataset, &scoped);
            let order_points = orders.first().map(|o| o.data.as_slice()).unwrap_or_default();
            if let Some(series) = dashboard_service::list_revenue(dataset, &scoped).first() {
                for point in &series.data {
                    let order_count = order_points
                        .iter()
                        .find(|o| o.label == point.label)
                        .map_or(0.0, |o| o.orders);
                    writer
                        .write_record([
                            &point.label,
                            &fmt_number(point.revenue),
                            &fmt_number(order_count),
                            &user_type,
                            &period,
                        ])
                        .map_err(csv_err)?;
                }
            }
        }
        Report::Users => {
            writer
                .write_record(["Segment", "Count", "DateRange"])
                .map_err(csv_err)?;
            if let Some(record) = dashboard_service::list_users(dataset, &scoped).first() {
                for segment in &record.distribution {
                    writer
                        .write_record([&segment.segment, &fmt_number(segment.count), &period])
                        .map_err(csv_err)?;
                }
            }
        }
        Report::Traffic => {
            writer
                .write_record(["Source", "Sessions", "DateRange"])
                .map_err(csv_err)?;
            if let Some(record) = dashboard_service::list_traffic(dataset, &scoped).first() {
                for source in &record.sources {
                    writer
                        .write_record([&source.source, &fmt_number(source.visitors), &period])
                        .map_err(csv_err)?;
                }
            }
        }
    }

    let body = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {e}")))?;

    tracing::debug!(report = report.as_str(), period = %period, user_type = %user_type, bytes = body.len(), "CSV export rendered");

    Ok(CsvExport {
        filename: filename(role, report),
        body,
    })
}
