use std::fmt;

use serde::Serialize;

use crate::core::Principal;
use crate::hr::{
    AuditRecord, Department, Employee, NewDepartment, NewEmployee, NewRole, ProfileUpdate,
    Registered, Registration, RoleRecord, Summary,
};

/// Form submission.
///
/// Each action belongs to the page whose form submits it and is admitted by
/// that page's gate.
#[derive(Clone)]
pub enum Action {
    SignIn { email: String, password: String },
    Register(Registration),
    SignOut,
    AddEmployee(NewEmployee),
    ListEmployees { search: Option<String> },
    DeleteEmployee { id: String },
    /// Edit the signed-in user's own profile.
    UpdateProfile { changes: ProfileUpdate },
    /// Edit any employee's profile.
    EditEmployee { id: String, changes: ProfileUpdate },
    AddDepartment(NewDepartment),
    ListDepartments,
    DepartmentPositions { department: String },
    AddRole(NewRole),
    ListRoles,
    AuditLogs,
    Overview,
}

impl Action {
    /// Path of the page the action is submitted from.
    pub fn route(&self) -> &'static str {
        match self {
            Action::SignIn { .. } => "/",
            Action::Register(_) => "/register",
            Action::SignOut | Action::UpdateProfile { .. } => "/profile",
            _ => "/admin",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Action::SignIn { .. } => "SignIn",
            Action::Register(_) => "Register",
            Action::SignOut => "SignOut",
            Action::AddEmployee(_) => "AddEmployee",
            Action::ListEmployees { .. } => "ListEmployees",
            Action::DeleteEmployee { .. } => "DeleteEmployee",
            Action::UpdateProfile { .. } => "UpdateProfile",
            Action::EditEmployee { .. } => "EditEmployee",
            Action::AddDepartment(_) => "AddDepartment",
            Action::ListDepartments => "ListDepartments",
            Action::DepartmentPositions { .. } => "DepartmentPositions",
            Action::AddRole(_) => "AddRole",
            Action::ListRoles => "ListRoles",
            Action::AuditLogs => "AuditLogs",
            Action::Overview => "Overview",
        }
    }
}

// Credentials stay out of logs.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Act {} on {}", self.name(), self.route())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reply", content = "data")]
pub enum Reply {
    SignedIn(Principal),
    Registered(Registered),
    SignedOut,
    Created { id: String },
    Updated,
    Deleted,
    Employees(Vec<Employee>),
    Departments(Vec<Department>),
    Positions(Vec<String>),
    Roles(Vec<RoleRecord>),
    AuditLogs(Vec<AuditRecord>),
    Overview(Summary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_hides_credentials() {
        let action = Action::SignIn {
            email: "alice@example.com".into(),
            password: "hunter22".into(),
        };
        let shown = format!("{:?}", action);
        assert_eq!(shown, "Act SignIn on /");
        assert!(!shown.contains("hunter22"));
    }

    #[test]
    fn admin_forms_submit_on_admin_page() {
        assert_eq!(Action::AuditLogs.route(), "/admin");
        assert_eq!(
            Action::DeleteEmployee { id: "x".into() }.route(),
            "/admin"
        );
        assert_eq!(Action::SignOut.route(), "/profile");
        assert_eq!(
            Action::UpdateProfile {
                changes: ProfileUpdate::default(),
            }
            .route(),
            "/profile"
        );
        assert_eq!(
            Action::EditEmployee {
                id: "u1".into(),
                changes: ProfileUpdate::default(),
            }
            .route(),
            "/admin"
        );
    }
}
