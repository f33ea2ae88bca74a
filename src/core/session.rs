//! Session resolution.
//!
//! A [`SessionResolver`] subscribes to the identity provider and turns every
//! authentication change into a [`Session`] by reading the signed-in user's
//! profile document. The resolved session is published through a watch
//! channel whose only writer is the resolver; everything else reads it through
//! a [`SessionHandle`].

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::common::{debug, error, info, warn};
use crate::core::identity::{AuthState, IdentityProvider, Subscription};
use crate::core::store::{collection, Document, DocumentStore};
use crate::core::{Principal, Role};

/// Profile document field holding the role label.
pub const ROLE_FIELD: &str = "role";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<Principal>,
    role: Option<Role>,
    is_resolving: bool,
}

impl Session {
    pub fn resolving() -> Self {
        Self {
            identity: None,
            role: None,
            is_resolving: true,
        }
    }

    pub fn resolved(identity: Option<Principal>, role: Option<Role>) -> Self {
        Self {
            identity,
            role,
            is_resolving: false,
        }
    }

    pub fn signed_out() -> Self {
        Session::resolved(None, None)
    }

    pub fn identity(&self) -> Option<&Principal> {
        self.identity.as_ref()
    }

    /// Role of the signed-in user. Always `None` while resolving or signed out.
    pub fn role(&self) -> Option<&Role> {
        if self.is_resolving || self.identity.is_none() {
            None
        } else {
            self.role.as_ref()
        }
    }

    pub fn is_resolving(&self) -> bool {
        self.is_resolving
    }

    pub fn is_signed_in(&self) -> bool {
        !self.is_resolving && self.identity.is_some()
    }
}

/// How auth-state events are turned into profile reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOrdering {
    /// Every event reads its profile concurrently and publishes when the read
    /// settles. A slow read for an earlier sign-in can overwrite the result of
    /// a later sign-out.
    #[default]
    Overlapping,
    /// Events are resolved one at a time in delivery order.
    Serialized,
}

#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    ordering: ResolveOrdering,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            provider,
            store,
            ordering: ResolveOrdering::default(),
        }
    }

    pub fn with_ordering(mut self, ordering: ResolveOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Subscribe to the identity provider and start resolving.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) -> MountedSession {
        let (sender, _) = watch::channel(Session::resolving());
        let shared = Arc::new(Shared {
            sender,
            mounted: AtomicBool::new(true),
        });

        let subscription = self.provider.subscribe();
        let task = tokio::spawn(listen(
            subscription,
            Arc::clone(&shared),
            Arc::clone(&self.store),
            self.ordering,
        ));

        info!(ordering=?self.ordering, "Session mounted");

        MountedSession {
            shared,
            task: Some(task),
        }
    }
}

struct Shared {
    sender: watch::Sender<Session>,
    mounted: AtomicBool,
}

impl Shared {
    fn publish(&self, session: Session) {
        if !self.mounted.load(AtomicOrdering::Acquire) {
            debug!(?session, "Discard session update after unmount");
            return;
        }
        debug!(?session, "Session resolved");
        self.sender.send_replace(session);
    }
}

async fn listen(
    mut subscription: Subscription,
    shared: Arc<Shared>,
    store: Arc<dyn DocumentStore>,
    ordering: ResolveOrdering,
) {
    while let Some(state) = subscription.next().await {
        debug!(signed_in = state.is_some(), "Auth state changed");
        match ordering {
            ResolveOrdering::Serialized => resolve(&shared, store.as_ref(), state).await,
            ResolveOrdering::Overlapping => {
                let shared = Arc::clone(&shared);
                let store = Arc::clone(&store);
                tokio::spawn(async move { resolve(&shared, store.as_ref(), state).await });
            }
        }
    }
    debug!("Auth state subscription closed");
}

async fn resolve(shared: &Shared, store: &dyn DocumentStore, state: AuthState) {
    let session = match state {
        Some(principal) => match load_profile(store, &principal).await {
            Some(profile) => {
                let role = role_of(&profile);
                Session::resolved(Some(principal), role)
            }
            None => Session::signed_out(),
        },
        None => Session::signed_out(),
    };
    shared.publish(session);
}

// Missing documents and read failures both count as "no profile".
async fn load_profile(store: &dyn DocumentStore, principal: &Principal) -> Option<Document> {
    match store.get(collection::USERS, &principal.uid).await {
        Ok(Some(document)) => Some(document),
        Ok(None) => {
            error!(uid=%principal.uid, "No profile document for signed-in user");
            None
        }
        Err(err) => {
            error!(uid=%principal.uid, %err, "Profile read failed");
            None
        }
    }
}

fn role_of(profile: &Document) -> Option<Role> {
    match profile.get(ROLE_FIELD) {
        Some(Value::String(label)) => Some(Role::new(label.clone())),
        Some(other) => {
            warn!(role=%other, "Profile role is not a string");
            None
        }
        None => None,
    }
}

/// Live session for one mount of the application.
///
/// Dropping it releases the identity provider subscription.
pub struct MountedSession {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl MountedSession {
    pub fn session(&self) -> Session {
        self.shared.sender.borrow().clone()
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            receiver: self.shared.sender.subscribe(),
        }
    }

    /// Run `render` with the current session unless it is still resolving.
    pub fn render_children<T>(&self, render: impl FnOnce(&Session) -> T) -> Option<T> {
        let session = self.shared.sender.borrow();
        if session.is_resolving() {
            None
        } else {
            Some(render(&session))
        }
    }

    /// Release the subscription and wait until the listener has stopped.
    pub async fn unmount(mut self) {
        self.shared.mounted.store(false, AtomicOrdering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        info!("Session unmounted");
    }
}

impl Drop for MountedSession {
    fn drop(&mut self) {
        self.shared.mounted.store(false, AtomicOrdering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Read-only view of the published session.
#[derive(Clone)]
pub struct SessionHandle {
    receiver: watch::Receiver<Session>,
}

impl SessionHandle {
    pub fn current(&self) -> Session {
        self.receiver.borrow().clone()
    }

    /// Treat the current value as observed so `changed` waits for the next one.
    pub fn mark_seen(&mut self) {
        let _ = self.receiver.borrow_and_update();
    }

    /// Wait for the next published session. `None` once the resolver is gone.
    pub async fn changed(&mut self) -> Option<Session> {
        self.receiver.changed().await.ok()?;
        let session = self.receiver.borrow_and_update().clone();
        Some(session)
    }

    /// Wait until the session satisfies `condition`.
    pub async fn wait_until(
        &mut self,
        condition: impl FnMut(&Session) -> bool,
    ) -> Option<Session> {
        self.receiver
            .wait_for(condition)
            .await
            .ok()
            .map(|session| Session::clone(&session))
    }

    pub async fn resolved(&mut self) -> Option<Session> {
        self.wait_until(|session| !session.is_resolving()).await
    }
}
