use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::core;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub app: core::Config,
    pub seed: Seed,
}

/// Initial content of the in-memory identity provider and document store.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Seed {
    pub accounts: Vec<Account>,
    /// Collection name to document id to document.
    pub documents: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

#[derive(Deserialize, Clone)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Account")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .finish()
    }
}
