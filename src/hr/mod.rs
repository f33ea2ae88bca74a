//! HR record services.
//!
//! Thin operations over the document store. Every mutation is paired with an
//! entry in the audit log naming the acting principal.

pub mod audit;
pub mod department;
pub mod employee;
pub mod overview;
pub mod registration;
pub mod role;

pub use self::audit::AuditRecord;
pub use self::department::{Department, NewDepartment};
pub use self::employee::{Employee, NewEmployee, ProfileUpdate};
pub use self::overview::Summary;
pub use self::registration::{Registered, Registration};
pub use self::role::{NewRole, RoleRecord};
