use std::fmt;

use serde::Serialize;

use crate::core::route::Page;
use crate::hr::{Employee, Summary};

pub(crate) struct Navigate {
    pub(crate) path: String,
    // Filled in once the route has been admitted.
    pub(crate) page: Option<Page>,
}

impl fmt::Display for Navigate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Navigate {}", self.path)
    }
}

/// Rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "page", content = "data")]
pub enum View {
    Login,
    Register,
    ForgotPassword,
    Admin(Summary),
    Profile(Option<Employee>),
}
