use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::common::{debug, info};
use crate::core::identity::{AuthState, IdentityProvider, Subscription};
use crate::core::Principal;
use crate::{HrkitError, Result};

const MIN_PASSWORD_LEN: usize = 6;

/// Identity provider kept in process memory.
///
/// Stands in for the hosted authentication service in tests and local runs.
/// Clones share the same accounts and sign-in state.
#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    // Keyed by email.
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<AuthState>,
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<AuthState>>>,
    next_listener: AtomicU64,
}

struct Account {
    uid: String,
    password: String,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account without signing it in.
    pub fn add_account(
        &self,
        uid: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Principal {
        let principal = Principal::new(uid, email);
        self.inner.accounts.lock().insert(
            principal.email.clone(),
            Account {
                uid: principal.uid.clone(),
                password: password.into(),
            },
        );
        principal
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn transition(&self, state: AuthState) {
        let mut current = self.inner.current.lock();
        *current = state.clone();

        self.inner
            .listeners
            .lock()
            .retain(|_, listener| listener.send(state.clone()).is_ok());
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal> {
        if email.trim().is_empty() {
            return Err(HrkitError::InvalidInput("email is required".to_owned()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(HrkitError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let principal = {
            let mut accounts = self.inner.accounts.lock();
            if accounts.contains_key(email) {
                return Err(HrkitError::EmailAlreadyInUse {
                    email: email.to_owned(),
                });
            }
            let uid = uuid::Uuid::new_v4().simple().to_string();
            accounts.insert(
                email.to_owned(),
                Account {
                    uid: uid.clone(),
                    password: password.to_owned(),
                },
            );
            Principal::new(uid, email)
        };

        info!(uid=%principal.uid, email=%principal.email, "Account created");
        self.transition(Some(principal.clone()));

        Ok(principal)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal> {
        let principal = {
            let accounts = self.inner.accounts.lock();
            match accounts.get(email) {
                Some(account) if account.password == password => {
                    Principal::new(account.uid.clone(), email)
                }
                _ => {
                    return Err(HrkitError::InvalidCredentials {
                        email: email.to_owned(),
                    })
                }
            }
        };

        info!(uid=%principal.uid, "Signed in");
        self.transition(Some(principal.clone()));

        Ok(principal)
    }

    async fn sign_out(&self) -> Result<()> {
        debug!("Signed out");
        self.transition(None);
        Ok(())
    }

    fn current(&self) -> Option<Principal> {
        self.inner.current.lock().clone()
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);

        {
            // Hold the state lock so no transition slips between the initial
            // delivery and the registration.
            let current = self.inner.current.lock();
            let _ = tx.send(current.clone());
            self.inner.listeners.lock().insert(id, tx);
        }
        debug!(listener = id, "Subscribed to auth state");

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(rx, move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.lock().remove(&id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_delivers_current_state_first() {
        tokio_test::block_on(async move {
            let provider = MemoryIdentityProvider::new();
            let alice = provider.add_account("u1", "alice@example.com", "secret1");

            let mut signed_out = provider.subscribe();
            assert_eq!(signed_out.next().await, Some(None));

            provider.sign_in("alice@example.com", "secret1").await.unwrap();
            assert_eq!(signed_out.next().await, Some(Some(alice.clone())));

            let mut late = provider.subscribe();
            assert_eq!(late.next().await, Some(Some(alice)));
        })
    }

    #[test]
    fn sign_in_rejects_wrong_password() {
        tokio_test::block_on(async move {
            let provider = MemoryIdentityProvider::new();
            provider.add_account("u1", "alice@example.com", "secret1");

            let err = provider
                .sign_in("alice@example.com", "nope")
                .await
                .unwrap_err();
            assert!(matches!(err, HrkitError::InvalidCredentials { .. }));
            assert_eq!(provider.current(), None);
        })
    }

    #[test]
    fn sign_up_signs_in_and_rejects_duplicates() {
        tokio_test::block_on(async move {
            let provider = MemoryIdentityProvider::new();
            let principal = provider.sign_up("bob@example.com", "secret1").await.unwrap();
            assert_eq!(provider.current(), Some(principal));

            let err = provider
                .sign_up("bob@example.com", "secret2")
                .await
                .unwrap_err();
            assert!(matches!(err, HrkitError::EmailAlreadyInUse { .. }));

            let err = provider.sign_up("carol@example.com", "123").await.unwrap_err();
            assert!(matches!(err, HrkitError::InvalidInput(_)));
        })
    }

    #[test]
    fn resubscribe_does_not_duplicate_listeners() {
        let provider = MemoryIdentityProvider::new();

        let first = provider.subscribe();
        assert_eq!(provider.listener_count(), 1);
        first.unsubscribe();
        assert_eq!(provider.listener_count(), 0);

        let second = provider.subscribe();
        assert_eq!(provider.listener_count(), 1);
        drop(second);
        assert_eq!(provider.listener_count(), 0);
    }
}
