use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::common::{ErrorKind, Result};
use crate::core::identity::IdentityProvider;
use crate::core::middleware::Middleware;
use crate::core::route::Page;
use crate::core::store::DocumentStore;
use crate::core::uow::{Action, Outcome, Reply, View};
use crate::core::{Principal, Session, UnitOfWork};
use crate::hr::{audit, department, employee, overview, registration, role};
use crate::HrkitError;

/// Last stage of the pipeline. Renders admitted pages and runs admitted
/// actions against the HR services.
pub(crate) struct Dispatcher {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn IdentityProvider>,
}

impl Dispatcher {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { store, provider }
    }

    async fn render(&self, session: &Session, page: Page) -> crate::Result<View> {
        let store = self.store.as_ref();
        let view = match page {
            Page::Login => View::Login,
            Page::Register => View::Register,
            Page::ForgotPassword => View::ForgotPassword,
            Page::Admin => View::Admin(overview::summary(store, Utc::now()).await?),
            Page::Profile => View::Profile(employee::profile(store, &actor(session)?.uid).await?),
        };
        Ok(view)
    }

    async fn act(&self, session: &Session, action: &Action) -> crate::Result<Reply> {
        let store = self.store.as_ref();
        let reply = match action {
            Action::SignIn { email, password } => {
                Reply::SignedIn(self.provider.sign_in(email, password).await?)
            }
            Action::Register(form) => {
                Reply::Registered(registration::register(self.provider.as_ref(), store, form).await?)
            }
            Action::SignOut => {
                self.provider.sign_out().await?;
                Reply::SignedOut
            }
            Action::AddEmployee(new_employee) => Reply::Created {
                id: employee::add(store, actor(session)?, new_employee).await?,
            },
            Action::ListEmployees { search } => {
                Reply::Employees(employee::list(store, search.as_deref()).await?)
            }
            Action::DeleteEmployee { id } => {
                employee::delete(store, actor(session)?, id).await?;
                Reply::Deleted
            }
            Action::UpdateProfile { changes } => {
                employee::update_own_profile(store, actor(session)?, changes).await?;
                Reply::Updated
            }
            Action::EditEmployee { id, changes } => {
                employee::update_profile(store, actor(session)?, id, changes).await?;
                Reply::Updated
            }
            Action::AddDepartment(new_department) => Reply::Created {
                id: department::add(store, actor(session)?, new_department).await?,
            },
            Action::ListDepartments => Reply::Departments(department::list(store).await?),
            Action::DepartmentPositions { department: name } => {
                Reply::Positions(department::positions(store, name).await?)
            }
            Action::AddRole(new_role) => Reply::Created {
                id: role::add(store, actor(session)?, new_role).await?,
            },
            Action::ListRoles => Reply::Roles(role::list(store).await?),
            Action::AuditLogs => Reply::AuditLogs(audit::list(store).await?),
            Action::Overview => Reply::Overview(overview::summary(store, Utc::now()).await?),
        };
        Ok(reply)
    }
}

fn actor(session: &Session) -> crate::Result<&Principal> {
    session.identity().ok_or(HrkitError::Unauthenticated)
}

#[async_trait]
impl Middleware for Dispatcher {
    async fn apply(&mut self, uow: UnitOfWork) -> Result<()> {
        match uow {
            UnitOfWork::Navigate(mut navigate) => {
                let page = navigate
                    .request
                    .page
                    .ok_or_else(|| ErrorKind::Internal("navigate without admitted page".into()))?;
                let response = self
                    .render(&navigate.session, page)
                    .await
                    .map(Outcome::Admitted);
                navigate.send_response(response)
            }
            UnitOfWork::Act(mut act) => {
                let response = self
                    .act(&act.session, &act.request)
                    .await
                    .map(Outcome::Admitted);
                act.send_response(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::MemoryIdentityProvider;
    use crate::core::store::MemoryStore;
    use crate::core::testing::seed_profile;
    use crate::core::Role;

    fn dispatcher(store: &MemoryStore) -> Dispatcher {
        Dispatcher::new(
            Arc::new(store.clone()),
            Arc::new(MemoryIdentityProvider::new()),
        )
    }

    #[test]
    fn mutations_require_identity() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let dispatcher = dispatcher(&store);

            let err = dispatcher
                .act(&Session::signed_out(), &Action::DeleteEmployee { id: "u2".into() })
                .await
                .unwrap_err();
            assert!(matches!(err, HrkitError::Unauthenticated));
        })
    }

    #[test]
    fn profile_view_reads_own_document() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            seed_profile(&store, "u1", "Employee").await;
            let dispatcher = dispatcher(&store);

            let session = Session::resolved(
                Some(Principal::new("u1", "u1@example.com")),
                Some(Role::from(Role::EMPLOYEE)),
            );
            let view = dispatcher.render(&session, Page::Profile).await.unwrap();
            match view {
                View::Profile(Some(employee)) => assert_eq!(employee.id, "u1"),
                other => panic!("unexpected view {:?}", other),
            }
        })
    }
}
