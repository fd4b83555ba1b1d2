//! Access tokens and route permissions.

use crate::error::{Error, Result};
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission granted on a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutePermission {
    Read,
    Write,
}

impl RoutePermission {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(Error::InvalidToken(format!("unknown permission: {s}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    /// Write implies read.
    pub fn implies(&self, other: Self) -> bool {
        match self {
            Self::Write => true,
            Self::Read => matches!(other, Self::Read),
        }
    }
}

impl fmt::Display for RoutePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A path prefix paired with the permission granted under it.
///
/// The path covers `{repository}/{gav}` space, so `releases` grants the
/// whole `releases` repository and `releases/com/example` a subtree of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: Location,
    pub permission: RoutePermission,
}

impl Route {
    pub fn new(path: Location, permission: RoutePermission) -> Self {
        Self { path, permission }
    }

    /// Whether this route grants `permission` on `path`.
    pub fn grants(&self, path: &Location, permission: RoutePermission) -> bool {
        self.permission.implies(permission) && path.starts_with(&self.path)
    }
}

/// A resolved access token: a name and the routes it may touch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub name: String,
    pub routes: Vec<Route>,
}

impl AccessToken {
    pub fn new(name: &str, routes: Vec<Route>) -> Self {
        Self {
            name: name.to_string(),
            routes,
        }
    }

    pub fn can_read(&self, path: &Location) -> bool {
        self.has_permission(path, RoutePermission::Read)
    }

    pub fn can_write(&self, path: &Location) -> bool {
        self.has_permission(path, RoutePermission::Write)
    }

    fn has_permission(&self, path: &Location, permission: RoutePermission) -> bool {
        self.routes
            .iter()
            .any(|route| route.grants(path, permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn token(path: &str, permission: RoutePermission) -> AccessToken {
        AccessToken::new("tester", vec![Route::new(location(path), permission)])
    }

    #[test]
    fn read_route_grants_read_under_prefix() {
        let token = token("releases", RoutePermission::Read);
        assert!(token.can_read(&location("releases/com/example/app/1.0.0/app.jar")));
        assert!(token.can_read(&location("releases")));
        assert!(!token.can_read(&location("snapshots/com/example")));
        assert!(!token.can_write(&location("releases/com/example")));
    }

    #[test]
    fn write_implies_read() {
        let token = token("releases/com/example", RoutePermission::Write);
        assert!(token.can_write(&location("releases/com/example/app")));
        assert!(token.can_read(&location("releases/com/example/app")));
        assert!(!token.can_write(&location("releases/com/other")));
    }

    #[test]
    fn prefix_matches_on_segment_boundary() {
        let token = token("releases/com/app", RoutePermission::Read);
        assert!(!token.can_read(&location("releases/com/application")));
    }
}
