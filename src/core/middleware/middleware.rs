use async_trait::async_trait;

use crate::common::Result;
use crate::core::UnitOfWork;

/// Stage of the request pipeline.
///
/// A stage either answers the unit of work itself or hands it to the next
/// stage. Errors returned here are pipeline failures; errors of the request
/// itself travel back through the response channel.
#[async_trait]
pub(crate) trait Middleware {
    async fn apply(&mut self, uow: UnitOfWork) -> Result<()>;
}
