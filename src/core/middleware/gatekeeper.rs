use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{debug, Result};
use crate::core::gate::{Admission, GatePolicy};
use crate::core::middleware::Middleware;
use crate::core::route::RouteTable;
use crate::core::uow::Refusal;
use crate::core::UnitOfWork;

/// Evaluates the gate of the requested route against the session the request
/// was submitted with. Only admitted requests reach the next stage.
pub(crate) struct Gatekeeper<MW> {
    routes: Arc<RouteTable>,
    policy: Arc<GatePolicy>,
    next: MW,
}

impl<MW> Gatekeeper<MW> {
    pub(crate) fn new(routes: Arc<RouteTable>, policy: Arc<GatePolicy>, next: MW) -> Self {
        Self {
            routes,
            policy,
            next,
        }
    }
}

#[async_trait]
impl<MW> Middleware for Gatekeeper<MW>
where
    MW: Middleware + Send + 'static,
{
    async fn apply(&mut self, mut uow: UnitOfWork) -> Result<()> {
        let route = match self.routes.lookup(uow.path()) {
            Some(route) => route,
            None => {
                debug!(path=%uow.path(), "No route");
                return uow.refuse(Refusal::NotFound);
            }
        };

        match route.gate.evaluate(uow.session(), &self.policy) {
            Admission::Resolving => uow.refuse(Refusal::Loading),
            Admission::Redirecting(location) => {
                debug!(path=%route.path, %location, "Redirect");
                uow.refuse(Refusal::Redirect(location))
            }
            Admission::Admitted => {
                if let UnitOfWork::Navigate(ref mut navigate) = uow {
                    navigate.request.page = Some(route.page);
                }
                self.next.apply(uow).await
            }
        }
    }
}
