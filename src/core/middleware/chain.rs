use std::sync::Arc;

use crate::common::Result;
use crate::core::gate::GatePolicy;
use crate::core::middleware::{Dispatcher, Gatekeeper, Logger, Middleware};
use crate::core::route::RouteTable;
use crate::core::UnitOfWork;

pub(crate) struct MiddlewareChain {
    root: Logger<Gatekeeper<Dispatcher>>,
}

impl MiddlewareChain {
    pub(crate) fn new(
        routes: Arc<RouteTable>,
        policy: Arc<GatePolicy>,
        dispatcher: Dispatcher,
    ) -> Self {
        let gatekeeper = Gatekeeper::new(routes, policy, dispatcher);

        let logger = Logger::new(gatekeeper);

        Self { root: logger }
    }

    pub(crate) async fn apply(&mut self, uow: UnitOfWork) -> Result<()> {
        self.root.apply(uow).await
    }
}
