//! Sidebar navigation entries filtered by role.

use serde::Serialize;

use crate::models::user::Role;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavItem {
    pub title: String,
    pub href: String,
    pub icon: String,
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<NavItem>,
}

/// Owner of a page path, used by the route gate.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteOwner {
    Admin,
    Manager,
    Common,
}

/// Outcome of gating a page request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum GateDecision {
    Allow,
    Redirect { location: String },
}
