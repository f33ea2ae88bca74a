use serde::Deserialize;

use crate::core::gate::GatePolicy;
use crate::core::route::Route;
use crate::core::session::ResolveOrdering;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub gate: GatePolicy,
    /// Replaces the built-in route table when present.
    pub routes: Option<Vec<Route>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ordering: ResolveOrdering,
}

impl Config {
    pub(crate) fn set_ordering(&mut self, ordering: &mut Option<ResolveOrdering>) {
        if let Some(ordering) = ordering.take() {
            self.session.ordering = ordering;
        }
    }

    pub(crate) fn set_case_insensitive_roles(&mut self, case_insensitive: &mut Option<bool>) {
        if let Some(case_insensitive) = case_insensitive.take() {
            self.gate = self.gate.clone().with_case_insensitive_roles(case_insensitive);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.session.ordering, ResolveOrdering::Overlapping);
        assert_eq!(config.gate, GatePolicy::default());
        assert!(config.routes.is_none());
    }

    #[test]
    fn overrides_replace_loaded_values() {
        let mut config: Config = serde_yaml::from_str(
            r#"
session:
  ordering: overlapping
gate:
  entry_point: /signin
  landing:
    Admin: /admin
"#,
        )
        .unwrap();

        config.set_ordering(&mut Some(ResolveOrdering::Serialized));
        config.set_case_insensitive_roles(&mut Some(true));

        assert_eq!(config.session.ordering, ResolveOrdering::Serialized);
        assert_eq!(config.gate.entry_point(), "/signin");
        assert_eq!(
            config.gate.landing_for(&Role::from("ADMIN")),
            Some("/admin")
        );
    }
}
