use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::gate::Gate;
use crate::core::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Login,
    Register,
    ForgotPassword,
    Admin,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub page: Page,
    pub gate: Gate,
}

impl Route {
    pub fn new(path: impl Into<String>, page: Page, gate: Gate) -> Self {
        let path: String = path.into();
        Self {
            path: normalize(&path).to_owned(),
            page,
            gate,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let gate = match &self.gate {
            Gate::PublicOnly => "public only".to_owned(),
            Gate::Protected {
                required_role: Some(role),
            } => format!("requires {}", role),
            Gate::Protected {
                required_role: None,
            } => "requires sign in".to_owned(),
        };
        write!(f, "{:<18} {:<16} {}", self.path, format!("{:?}", self.page), gate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        RouteTable::new(vec![
            Route::new("/", Page::Login, Gate::public_only()),
            Route::new("/register", Page::Register, Gate::public_only()),
            Route::new("/forgot-password", Page::ForgotPassword, Gate::public_only()),
            Route::new(
                "/admin",
                Page::Admin,
                Gate::protected(Some(Role::from(Role::ADMIN))),
            ),
            Route::new("/profile", Page::Profile, Gate::protected(None)),
        ])
    }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        let routes = routes
            .into_iter()
            .map(|route| Route {
                path: normalize(&route.path).to_owned(),
                ..route
            })
            .collect();
        Self { routes }
    }

    pub fn lookup(&self, path: &str) -> Option<&Route> {
        let path = normalize(path);
        self.routes.iter().find(|route| route.path == path)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

// Trailing slashes are ignored except for the root.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
