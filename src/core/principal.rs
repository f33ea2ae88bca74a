use std::fmt;

use serde::{Deserialize, Serialize};

/// Authenticated identity handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

impl Principal {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Role label stored on a profile document.
///
/// The set of labels is open ended and compared as exact strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "Admin";
    pub const EMPLOYEE: &'static str = "Employee";

    pub fn new(label: impl Into<String>) -> Self {
        Role(label.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Role {
    fn from(label: &str) -> Self {
        Role::new(label)
    }
}

impl From<String> for Role {
    fn from(label: String) -> Self {
        Role(label)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
