use axum::Extension;
use serde::Serialize;

use crate::middleware::ApiResponse;

use crate::schema::EntityKind;
use crate::types::{AuthenticatedSession, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub route: String,
}

fn entry(label: &'static str, route: impl Into<String>) -> NavEntry {
    NavEntry {
        label,
        route: route.into(),
    }
}

fn page(label: &'static str, kind: EntityKind) -> NavEntry {
    entry(label, kind.schema().list_route())
}

/// Sidebar entries shown to a role
pub fn navigation(role: Role) -> Vec<NavEntry> {
    match role {
        Role::Admin => vec![entry("Overview", "/admin"), page("Manage Staffs", EntityKind::Staff)],
        Role::Staff => vec![
            entry("Overview", "/staff"),
            page("Manage News", EntityKind::NewsItem),
            page("Manage Areas", EntityKind::Area),
            page("Manage Cage", EntityKind::Cage),
            page("Manage Trainer Account", EntityKind::TrainerAccount),
        ],
        Role::Trainer => vec![entry("Overview", "/trainer")],
    }
}

#[derive(Debug, Serialize)]
pub struct OverviewView {
    pub section: &'static str,
    pub title: &'static str,
    pub role: Option<Role>,
    pub subject: Option<String>,
    pub navigation: Vec<NavEntry>,
}

fn overview(section: &'static str, session: AuthenticatedSession) -> ApiResponse<OverviewView> {
    ApiResponse::success(OverviewView {
        section,
        title: "Overview",
        role: session.role,
        navigation: session.role.map(navigation).unwrap_or_default(),
        subject: session.subject,
    })
}

/// GET /admin
pub async fn admin(Extension(session): Extension<AuthenticatedSession>) -> ApiResponse<OverviewView> {
    overview("/admin", session)
}

/// GET /staff
pub async fn staff(Extension(session): Extension<AuthenticatedSession>) -> ApiResponse<OverviewView> {
    overview("/staff", session)
}

/// GET /trainer
pub async fn trainer(Extension(session): Extension<AuthenticatedSession>) -> ApiResponse<OverviewView> {
    overview("/trainer", session)
}
