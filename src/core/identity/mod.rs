//! Identity provider seam.
//!
//! The hosted authentication service is reached through [`IdentityProvider`].
//! Authentication state changes are observed through a [`Subscription`],
//! which always yields the state current at subscription time first.

mod memory;
pub use self::memory::MemoryIdentityProvider;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::Principal;
use crate::Result;

/// Authentication state delivered to subscribers. `None` means signed out.
pub type AuthState = Option<Principal>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal>;
    async fn sign_out(&self) -> Result<()>;
    fn current(&self) -> Option<Principal>;
    fn subscribe(&self) -> Subscription;
}

/// Registered listener on an identity provider.
///
/// The listener is deregistered on `unsubscribe` or when the value is dropped.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<AuthState>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<AuthState>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    /// Wait for the next state change. `None` once the provider has gone away.
    pub async fn next(&mut self) -> Option<AuthState> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
