//! Route admission.
//!
//! A [`Gate`] decides, from the published session, whether a page is rendered
//! or the visitor is sent elsewhere. Both variants report
//! [`Admission::Resolving`] until the session has resolved.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::common::debug;
use crate::core::session::SessionHandle;
use crate::core::{Role, Session};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Only visitors without a session are admitted. Signed-in visitors are
    /// sent to the landing location of their role, if it has one.
    PublicOnly,
    /// Only signed-in visitors holding `required_role` (any role when unset)
    /// are admitted. Everyone else is sent to the entry point.
    Protected {
        #[serde(default)]
        required_role: Option<Role>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    Resolving,
    Admitted,
    Redirecting(String),
}

/// Redirect targets used by the gates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatePolicy {
    entry_point: String,
    // Role label to landing location for the public-only gate.
    landing: BTreeMap<String, String>,
    case_insensitive_roles: bool,
}

impl Default for GatePolicy {
    fn default() -> Self {
        let landing = [("admin", "/admin"), ("employee", "/employee"), ("manager", "/manager")]
            .iter()
            .map(|(role, location)| (role.to_string(), location.to_string()))
            .collect();

        Self {
            entry_point: GatePolicy::DEFAULT_ENTRY_POINT.to_owned(),
            landing,
            case_insensitive_roles: false,
        }
    }
}

impl GatePolicy {
    const DEFAULT_ENTRY_POINT: &'static str = "/";

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn with_landing(mut self, role: impl Into<String>, location: impl Into<String>) -> Self {
        self.landing.insert(role.into(), location.into());
        self
    }

    pub fn with_case_insensitive_roles(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive_roles = case_insensitive;
        self
    }

    pub fn landing_for(&self, role: &Role) -> Option<&str> {
        if let Some(location) = self.landing.get(role.as_str()) {
            return Some(location.as_str());
        }
        if self.case_insensitive_roles {
            return self
                .landing
                .iter()
                .find(|(label, _)| label.eq_ignore_ascii_case(role.as_str()))
                .map(|(_, location)| location.as_str());
        }
        None
    }
}

impl Gate {
    pub fn public_only() -> Self {
        Gate::PublicOnly
    }

    pub fn protected(required_role: Option<Role>) -> Self {
        Gate::Protected { required_role }
    }

    pub fn evaluate(&self, session: &Session, policy: &GatePolicy) -> Admission {
        if session.is_resolving() {
            return Admission::Resolving;
        }

        match self {
            Gate::PublicOnly => {
                if session.identity().is_none() {
                    return Admission::Admitted;
                }
                match session.role().and_then(|role| policy.landing_for(role)) {
                    Some(location) => Admission::Redirecting(location.to_owned()),
                    None => {
                        debug!(role=?session.role(), "No landing location for role");
                        Admission::Admitted
                    }
                }
            }
            Gate::Protected { required_role } => {
                let role_matches = match required_role {
                    Some(required) => session.role() == Some(required),
                    None => true,
                };
                if session.identity().is_some() && role_matches {
                    Admission::Admitted
                } else {
                    Admission::Redirecting(policy.entry_point().to_owned())
                }
            }
        }
    }
}

/// Tracks the admission of one gated view as the session changes.
pub struct Guard {
    gate: Gate,
    policy: Arc<GatePolicy>,
    session: SessionHandle,
    state: Admission,
}

impl Guard {
    pub fn new(gate: Gate, policy: Arc<GatePolicy>, session: SessionHandle) -> Self {
        let state = gate.evaluate(&session.current(), &policy);
        Self {
            gate,
            policy,
            session,
            state,
        }
    }

    pub fn state(&self) -> &Admission {
        &self.state
    }

    /// Wait for the session to resolve and evaluate the gate.
    pub async fn settle(&mut self) -> Admission {
        if let Some(session) = self.session.resolved().await {
            self.state = self.gate.evaluate(&session, &self.policy);
        }
        self.state.clone()
    }

    /// Wait for the next session change and re-evaluate.
    pub async fn changed(&mut self) -> Option<Admission> {
        let session = self.session.changed().await?;
        self.state = self.gate.evaluate(&session, &self.policy);
        Some(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{IdentityProvider, MemoryIdentityProvider};
    use crate::core::session::SessionResolver;
    use crate::core::store::MemoryStore;
    use crate::core::testing::seed_profile;
    use crate::core::Principal;

    fn signed_in(role: Option<&str>) -> Session {
        Session::resolved(
            Some(Principal::new("u1", "alice@example.com")),
            role.map(Role::from),
        )
    }

    fn admin_only() -> Gate {
        Gate::protected(Some(Role::from("Admin")))
    }

    fn employee_only() -> Gate {
        Gate::protected(Some(Role::from("Employee")))
    }

    #[test]
    fn resolving_session_shows_loading() {
        let policy = GatePolicy::default();
        let session = Session::resolving();

        assert_eq!(Gate::public_only().evaluate(&session, &policy), Admission::Resolving);
        assert_eq!(admin_only().evaluate(&session, &policy), Admission::Resolving);
    }

    #[test]
    fn admin_session() {
        let policy = GatePolicy::default().with_landing("Admin", "/admin");
        let session = signed_in(Some("Admin"));

        assert_eq!(
            Gate::public_only().evaluate(&session, &policy),
            Admission::Redirecting("/admin".into())
        );
        assert_eq!(admin_only().evaluate(&session, &policy), Admission::Admitted);
        assert_eq!(
            employee_only().evaluate(&session, &policy),
            Admission::Redirecting("/".into())
        );
        assert_eq!(
            Gate::protected(None).evaluate(&session, &policy),
            Admission::Admitted
        );
    }

    #[test]
    fn signed_out_session() {
        let policy = GatePolicy::default();
        let session = Session::signed_out();

        assert_eq!(Gate::public_only().evaluate(&session, &policy), Admission::Admitted);
        assert_eq!(
            admin_only().evaluate(&session, &policy),
            Admission::Redirecting("/".into())
        );
        assert_eq!(
            Gate::protected(None).evaluate(&session, &policy),
            Admission::Redirecting("/".into())
        );
    }

    #[test]
    fn default_landing_table_does_not_match_capitalised_roles() {
        let policy = GatePolicy::default();

        assert_eq!(
            Gate::public_only().evaluate(&signed_in(Some("Admin")), &policy),
            Admission::Admitted
        );
        assert_eq!(
            Gate::public_only().evaluate(&signed_in(Some("admin")), &policy),
            Admission::Redirecting("/admin".into())
        );

        let policy = policy.with_case_insensitive_roles(true);
        assert_eq!(
            Gate::public_only().evaluate(&signed_in(Some("Employee")), &policy),
            Admission::Redirecting("/employee".into())
        );
    }

    #[test]
    fn unknown_or_missing_role_is_admitted_by_public_gate() {
        let policy = GatePolicy::default();

        assert_eq!(
            Gate::public_only().evaluate(&signed_in(Some("Contractor")), &policy),
            Admission::Admitted
        );
        assert_eq!(
            Gate::public_only().evaluate(&signed_in(None), &policy),
            Admission::Admitted
        );
        assert_eq!(
            admin_only().evaluate(&signed_in(None), &policy),
            Admission::Redirecting("/".into())
        );
    }

    #[test]
    fn entry_point_is_configurable() {
        let policy = GatePolicy::default().with_entry_point("/login");
        assert_eq!(
            admin_only().evaluate(&Session::signed_out(), &policy),
            Admission::Redirecting("/login".into())
        );
    }

    #[test]
    fn gate_from_yaml() {
        let gates: Vec<Gate> = serde_yaml::from_str(
            "- public_only\n- protected:\n    required_role: Admin\n- protected: {}\n",
        )
        .unwrap();
        assert_eq!(gates, vec![Gate::public_only(), admin_only(), Gate::protected(None)]);
    }

    #[test]
    fn admitted_view_redirects_after_sign_out() {
        tokio_test::block_on(async move {
            let provider = MemoryIdentityProvider::new();
            provider.add_account("u1", "alice@example.com", "secret1");
            provider.sign_in("alice@example.com", "secret1").await.unwrap();
            let store = MemoryStore::new();
            seed_profile(&store, "u1", "Admin").await;

            let mounted =
                SessionResolver::new(Arc::new(provider.clone()), Arc::new(store)).mount();
            let mut guard = Guard::new(
                admin_only(),
                Arc::new(GatePolicy::default()),
                mounted.handle(),
            );
            assert_eq!(guard.state(), &Admission::Resolving);

            assert_eq!(guard.settle().await, Admission::Admitted);

            provider.sign_out().await.unwrap();
            assert_eq!(
                guard.changed().await,
                Some(Admission::Redirecting("/".into()))
            );
        })
    }
}
