//! In-process client of a running [`App`](crate::core::App).

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::core::{
    Action, GatePolicy, Guard, Outcome, Principal, Reply, Route, RouteTable, Session,
    SessionHandle, UnitOfWork, View,
};
use crate::hr::{
    AuditRecord, Department, Employee, NewDepartment, NewEmployee, NewRole, ProfileUpdate,
    Registered, Registration, RoleRecord, Summary,
};
use crate::{HrkitError, Result};

/// Submits navigations and form actions on behalf of the visitor.
///
/// Every request carries the session the client observes at submission time.
#[derive(Clone)]
pub struct Client {
    request_sender: mpsc::Sender<UnitOfWork>,
    session: SessionHandle,
    routes: Arc<RouteTable>,
    policy: Arc<GatePolicy>,
}

impl Client {
    pub(crate) fn new(
        request_sender: mpsc::Sender<UnitOfWork>,
        session: SessionHandle,
        routes: Arc<RouteTable>,
        policy: Arc<GatePolicy>,
    ) -> Self {
        Self {
            request_sender,
            session,
            routes,
            policy,
        }
    }

    pub fn session(&self) -> Session {
        self.session.current()
    }

    /// Wait until the session has resolved.
    pub async fn resolved(&self) -> Result<Session> {
        self.session.clone().resolved().await.ok_or_else(closed)
    }

    pub fn routes(&self) -> &[Route] {
        self.routes.routes()
    }

    /// Guard watching the gate of the route at `path`.
    pub fn guard(&self, path: &str) -> Option<Guard> {
        let route = self.routes.lookup(path)?;
        Some(Guard::new(
            route.gate.clone(),
            Arc::clone(&self.policy),
            self.session.clone(),
        ))
    }

    pub async fn navigate(&self, path: impl Into<String>) -> Result<Outcome<View>> {
        let (uow, rx) = UnitOfWork::new_navigate(self.session(), path.into());
        self.submit(uow, rx).await
    }

    pub async fn act(&self, action: Action) -> Result<Outcome<Reply>> {
        let (uow, rx) = UnitOfWork::new_act(self.session(), action);
        self.submit(uow, rx).await
    }

    async fn submit<T>(&self, uow: UnitOfWork, rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        self.request_sender.send(uow).await.map_err(|_| closed())?;
        rx.await.map_err(|_| closed())?
    }

    /// Sign in and wait for the session resolved from the new authentication
    /// state. A user without a profile document ends up signed out.
    pub async fn sign_in(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Outcome<Principal>> {
        let mut session = self.session.clone();
        session.mark_seen();

        let outcome = self
            .act(Action::SignIn {
                email: email.into(),
                password: password.into(),
            })
            .await?;
        let outcome = expect_reply(outcome, |reply| match reply {
            Reply::SignedIn(principal) => Some(principal),
            _ => None,
        })?;

        if let Outcome::Admitted(_) = outcome {
            session.changed().await.ok_or_else(closed)?;
        }
        Ok(outcome)
    }

    /// Sign out and wait until the signed-out session is published.
    pub async fn sign_out(&self) -> Result<Outcome<()>> {
        let mut session = self.session.clone();
        session.mark_seen();

        let outcome = self.act(Action::SignOut).await?;
        let outcome = expect_reply(outcome, |reply| match reply {
            Reply::SignedOut => Some(()),
            _ => None,
        })?;

        if let Outcome::Admitted(()) = outcome {
            session.changed().await.ok_or_else(closed)?;
        }
        Ok(outcome)
    }

    /// Register and, for a new account, wait for the session resolved from
    /// its sign-in.
    pub async fn register(&self, registration: Registration) -> Result<Outcome<Registered>> {
        let mut session = self.session.clone();
        session.mark_seen();

        let outcome = self.act(Action::Register(registration)).await?;
        let outcome = expect_reply(outcome, |reply| match reply {
            Reply::Registered(registered) => Some(registered),
            _ => None,
        })?;

        if let Outcome::Admitted(Registered::Created { .. }) = outcome {
            session.changed().await.ok_or_else(closed)?;
        }
        Ok(outcome)
    }

    pub async fn add_employee(&self, employee: NewEmployee) -> Result<Outcome<String>> {
        let outcome = self.act(Action::AddEmployee(employee)).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Created { id } => Some(id),
            _ => None,
        })
    }

    pub async fn list_employees(&self, search: Option<String>) -> Result<Outcome<Vec<Employee>>> {
        let outcome = self.act(Action::ListEmployees { search }).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Employees(employees) => Some(employees),
            _ => None,
        })
    }

    pub async fn delete_employee(&self, id: impl Into<String>) -> Result<Outcome<()>> {
        let outcome = self.act(Action::DeleteEmployee { id: id.into() }).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Deleted => Some(()),
            _ => None,
        })
    }

    /// Edit the signed-in user's own profile.
    pub async fn update_profile(&self, changes: ProfileUpdate) -> Result<Outcome<()>> {
        let outcome = self.act(Action::UpdateProfile { changes }).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Updated => Some(()),
            _ => None,
        })
    }

    pub async fn edit_employee(
        &self,
        id: impl Into<String>,
        changes: ProfileUpdate,
    ) -> Result<Outcome<()>> {
        let outcome = self
            .act(Action::EditEmployee {
                id: id.into(),
                changes,
            })
            .await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Updated => Some(()),
            _ => None,
        })
    }

    pub async fn add_department(&self, department: NewDepartment) -> Result<Outcome<String>> {
        let outcome = self.act(Action::AddDepartment(department)).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Created { id } => Some(id),
            _ => None,
        })
    }

    pub async fn departments(&self) -> Result<Outcome<Vec<Department>>> {
        let outcome = self.act(Action::ListDepartments).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Departments(departments) => Some(departments),
            _ => None,
        })
    }

    pub async fn positions(&self, department: impl Into<String>) -> Result<Outcome<Vec<String>>> {
        let outcome = self
            .act(Action::DepartmentPositions {
                department: department.into(),
            })
            .await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Positions(positions) => Some(positions),
            _ => None,
        })
    }

    pub async fn add_role(&self, role: NewRole) -> Result<Outcome<String>> {
        let outcome = self.act(Action::AddRole(role)).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Created { id } => Some(id),
            _ => None,
        })
    }

    pub async fn roles(&self) -> Result<Outcome<Vec<RoleRecord>>> {
        let outcome = self.act(Action::ListRoles).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Roles(roles) => Some(roles),
            _ => None,
        })
    }

    pub async fn audit_logs(&self) -> Result<Outcome<Vec<AuditRecord>>> {
        let outcome = self.act(Action::AuditLogs).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::AuditLogs(records) => Some(records),
            _ => None,
        })
    }

    pub async fn overview(&self) -> Result<Outcome<Summary>> {
        let outcome = self.act(Action::Overview).await?;
        expect_reply(outcome, |reply| match reply {
            Reply::Overview(summary) => Some(summary),
            _ => None,
        })
    }
}

fn closed() -> HrkitError {
    HrkitError::Internal("app is not running".to_owned())
}

fn expect_reply<T>(
    outcome: Outcome<Reply>,
    extract: impl FnOnce(Reply) -> Option<T>,
) -> Result<Outcome<T>> {
    match outcome {
        Outcome::Admitted(reply) => {
            let shown = format!("{:?}", reply);
            extract(reply)
                .map(Outcome::Admitted)
                .ok_or_else(|| HrkitError::Internal(format!("unexpected reply {}", shown)))
        }
        Outcome::Loading => Ok(Outcome::Loading),
        Outcome::Redirect(location) => Ok(Outcome::Redirect(location)),
        Outcome::NotFound => Ok(Outcome::NotFound),
    }
}
