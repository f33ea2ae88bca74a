//! Session, gates, and the request pipeline.

mod principal;
pub use self::principal::{Principal, Role};

pub mod identity;
pub mod store;

pub mod session;
pub use self::session::{ResolveOrdering, Session, SessionHandle};

pub mod gate;
pub use self::gate::{Admission, Gate, GatePolicy, Guard};

pub mod route;
pub use self::route::{Page, Route, RouteTable};

mod uow;
pub(crate) use self::uow::UnitOfWork;
pub use self::uow::{Action, Outcome, Reply, View};

mod middleware;

mod app;
pub use self::app::{App, Builder};

mod config;
pub use self::config::{Config, SessionConfig};

#[cfg(test)]
mod testing;
