//! Page-level access rules: route ownership, redirects and role navigation.

use crate::models::navigation::{GateDecision, NavItem, NavSection, RouteOwner};
use crate::models::user::Role;

/// Pages reachable without a session.
const PUBLIC_ROUTES: &[&str] = &["/login", "/register"];

/// Which role, if any, owns a page path. `None` means public.
pub fn route_owner(path: &str) -> Option<RouteOwner> {
    if path.starts_with("/admin") {
        Some(RouteOwner::Admin)
    } else if path.starts_with("/manager") {
        Some(RouteOwner::Manager)
    } else if path == "/" {
        Some(RouteOwner::Common)
    } else {
        None
    }
}

fn owned_by(owner: RouteOwner, role: Role) -> bool {
    matches!(
        (owner, role),
        (RouteOwner::Common, _) | (RouteOwner::Admin, Role::Admin) | (RouteOwner::Manager, Role::Manager)
    )
}

/// Landing page after login for a role.
pub fn default_dashboard_route(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin/dashboard",
        Role::Manager => "/manager/dashboard",
    }
}

/// Whether a post-login redirect target is reachable by `role`.
pub fn is_valid_redirect_for_role(path: &str, role: Role) -> bool {
    route_owner(path).map_or(true, |owner| owned_by(owner, role))
}

/// Resolve where a freshly logged-in user should land.
pub fn login_redirect(requested: Option<&str>, role: Role) -> String {
    match requested.map(str::trim).filter(|p| p.starts_with('/')) {
        Some(path) if is_valid_redirect_for_role(path, role) => path.to_string(),
        _ => default_dashboard_route(role).to_string(),
    }
}

/// Gate a page request the way the session proxy does.
pub fn gate(path: &str, role: Option<Role>) -> GateDecision {
    let redirect = |location: String| GateDecision::Redirect { location };

    if PUBLIC_ROUTES.contains(&path) {
        if let Some(role) = role {
            return redirect(default_dashboard_route(role).to_string());
        }
    }

    let Some(owner) = route_owner(path) else {
        return GateDecision::Allow;
    };

    let Some(role) = role else {
        return redirect(format!("/login?redirect={}", urlencoding::encode(path)));
    };

    if owned_by(owner, role) {
        GateDecision::Allow
    } else {
        redirect(default_dashboard_route(role).to_string())
    }
}

fn item(title: &str, href: String, icon: &str, role: Role, badge: Option<&str>) -> NavItem {
    NavItem {
        title: title.to_string(),
        href,
        icon: icon.to_string(),
        roles: vec![role],
        badge: badge.map(str::to_string),
    }
}

/// Sidebar sections visible to `role`.
pub fn nav_items(role: Role) -> Vec<NavSection> {
    let common = NavSection {
        title: None,
        items: vec![NavItem {
            title: "Dashboard".to_string(),
            href: default_dashboard_route(role).to_string(),
            icon: "LayoutDashboard".to_string(),
            roles: vec![Role::Admin, Role::Manager],
            badge: None,
        }],
    };

    let base = default_dashboard_route(role);
    // Admins get a "new" badge on orders.
    let orders_badge = (role == Role::Admin).then_some("new");
    let analytics = NavSection {
        title: Some("Analytics".to_string()),
        items: vec![
            item("Revenue", format!("{base}/revenue"), "DollarSign", role, None),
            item("Orders", format!("{base}/orders"), "ShoppingCart", role, orders_badge),
            item("Users", format!("{base}/users"), "Users", role, None),
            item("Traffic", format!("{base}/traffic"), "Globe", role, None),
        ],
    };

    vec![common, analytics]
}
