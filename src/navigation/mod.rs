//! Sidebar navigation tree
//!
//! A static tree of links; `GET /navigation` returns the part of it the
//! caller's role may see. Groups left without visible children are dropped.

use crate::auth::{Auth, SessionHook};
use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::error::BackofficeResult;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

/// A link or a group of links in the sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<&'static str>,
    pub icon: &'static str,
    /// Roles allowed to see the item; empty means every signed-in user
    #[serde(skip_serializing_if = "no_roles")]
    pub roles: &'static [&'static str],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

fn no_roles(roles: &&'static [&'static str]) -> bool {
    roles.is_empty()
}

impl NavItem {
    fn link(key: &'static str, label: &'static str, href: &'static str, icon: &'static str) -> Self {
        Self {
            key,
            label,
            href: Some(href),
            icon,
            roles: &[],
            children: Vec::new(),
        }
    }

    fn group(key: &'static str, label: &'static str, icon: &'static str, children: Vec<NavItem>) -> Self {
        Self {
            key,
            label,
            href: None,
            icon,
            roles: &[],
            children,
        }
    }

    fn roles(mut self, roles: &'static [&'static str]) -> Self {
        self.roles = roles;
        self
    }

    fn is_group(&self) -> bool {
        self.href.is_none()
    }

    fn visible_to(&self, context: &AuthContext) -> bool {
        self.roles.is_empty()
            || context
                .role()
                .is_some_and(|role| self.roles.iter().any(|r| *r == role))
    }
}

/// The complete sidebar
pub fn navigation_tree() -> Vec<NavItem> {
    vec![
        NavItem::link("dashboard", "Dashboard", "/", "home"),
        NavItem::group(
            "registries",
            "Registries",
            "folder",
            vec![
                NavItem::link("clients", "Clients", "/clients", "users"),
                NavItem::link("products", "Products", "/products", "package"),
                NavItem::link("carriers", "Carriers", "/carriers", "truck"),
                NavItem::link("suppliers", "Suppliers", "/suppliers", "factory"),
            ],
        ),
        NavItem::link("entries", "Entries", "/entries", "clipboard"),
        NavItem::group(
            "administration",
            "Administration",
            "settings",
            vec![NavItem::link("users", "Users", "/users", "user-cog").roles(&["admin"])],
        ),
    ]
}

/// Items of `items` visible in `context`
pub fn visible_items(items: Vec<NavItem>, context: &AuthContext) -> Vec<NavItem> {
    items
        .into_iter()
        .filter(|item| item.visible_to(context))
        .filter_map(|mut item| {
            if item.is_group() {
                item.children = visible_items(item.children, context);
                (!item.children.is_empty()).then_some(item)
            } else {
                Some(item)
            }
        })
        .collect()
}

pub async fn navigation(auth: Auth) -> BackofficeResult<Json<Vec<NavItem>>> {
    auth.require(&AuthPolicy::Authenticated, "view the navigation")?;
    Ok(Json(visible_items(navigation_tree(), &auth.context)))
}

pub fn routes(sessions: SessionHook) -> Router {
    Router::new()
        .route("/navigation", get(navigation))
        .with_state(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: &str) -> AuthContext {
        AuthContext::User {
            user_id: Uuid::new_v4(),
            email: format!("{role}@empresa.com"),
            name: role.to_string(),
            role: role.to_string(),
        }
    }

    fn keys(items: &[NavItem]) -> Vec<&'static str> {
        items.iter().map(|i| i.key).collect()
    }

    #[test]
    fn test_admin_sees_everything() {
        let items = visible_items(navigation_tree(), &user("admin"));
        assert_eq!(
            keys(&items),
            vec!["dashboard", "registries", "entries", "administration"]
        );
        assert_eq!(keys(&items[1].children), vec!["clients", "products", "carriers", "suppliers"]);
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let items = visible_items(navigation_tree(), &user("operator"));
        assert_eq!(keys(&items), vec!["dashboard", "registries", "entries"]);
    }

    #[test]
    fn test_serialization_skips_empty_parts() {
        let json = serde_json::to_value(NavItem::link("entries", "Entries", "/entries", "clipboard")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "entries", "label": "Entries", "href": "/entries", "icon": "clipboard"})
        );
    }
}
