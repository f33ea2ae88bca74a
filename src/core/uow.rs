mod navigate;
pub(crate) use self::navigate::Navigate;
pub use self::navigate::View;

mod act;
pub use self::act::{Action, Reply};

use std::fmt;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::common::{ErrorKind, Result};
use crate::core::Session;

/// Result of a gated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The session has not resolved yet.
    Loading,
    Redirect(String),
    NotFound,
    Admitted(T),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Loading => Outcome::Loading,
            Outcome::Redirect(location) => Outcome::Redirect(location),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Admitted(value) => Outcome::Admitted(f(value)),
        }
    }

    pub fn admitted(self) -> Option<T> {
        match self {
            Outcome::Admitted(value) => Some(value),
            _ => None,
        }
    }
}

/// Outcomes produced without running the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Refusal {
    Loading,
    Redirect(String),
    NotFound,
}

impl Refusal {
    fn into_outcome<T>(self) -> Outcome<T> {
        match self {
            Refusal::Loading => Outcome::Loading,
            Refusal::Redirect(location) => Outcome::Redirect(location),
            Refusal::NotFound => Outcome::NotFound,
        }
    }
}

pub(crate) enum UnitOfWork {
    Navigate(Work<Navigate, Outcome<View>>),
    Act(Work<Action, Outcome<Reply>>),
}

pub(crate) struct Work<Req, Res> {
    // Session observed when the request was submitted.
    pub(crate) session: Session,
    pub(crate) request: Req,
    // Wrap with option so that response can be sent via mut reference.
    pub(crate) response_sender: Option<oneshot::Sender<crate::Result<Res>>>,
}

impl<Req, Res> Work<Req, Res> {
    pub(crate) fn send_response(&mut self, response: crate::Result<Res>) -> Result<()> {
        self.response_sender
            .take()
            .ok_or_else(|| ErrorKind::Internal("response already sent".to_owned()))?
            .send(response)
            .map_err(|_| ErrorKind::Internal("send response".to_owned()).into())
    }
}

impl UnitOfWork {
    pub(crate) fn new_navigate(
        session: Session,
        path: String,
    ) -> (UnitOfWork, oneshot::Receiver<crate::Result<Outcome<View>>>) {
        let (tx, rx) = oneshot::channel();
        (
            UnitOfWork::Navigate(Work {
                session,
                request: Navigate { path, page: None },
                response_sender: Some(tx),
            }),
            rx,
        )
    }

    pub(crate) fn new_act(
        session: Session,
        action: Action,
    ) -> (UnitOfWork, oneshot::Receiver<crate::Result<Outcome<Reply>>>) {
        let (tx, rx) = oneshot::channel();
        (
            UnitOfWork::Act(Work {
                session,
                request: action,
                response_sender: Some(tx),
            }),
            rx,
        )
    }

    pub(crate) fn session(&self) -> &Session {
        match self {
            UnitOfWork::Navigate(work) => &work.session,
            UnitOfWork::Act(work) => &work.session,
        }
    }

    pub(crate) fn refuse(self, refusal: Refusal) -> Result<()> {
        match self {
            UnitOfWork::Navigate(mut work) => work.send_response(Ok(refusal.into_outcome())),
            UnitOfWork::Act(mut work) => work.send_response(Ok(refusal.into_outcome())),
        }
    }

    /// Path of the page the request is gated by.
    pub(crate) fn path(&self) -> &str {
        match self {
            UnitOfWork::Navigate(work) => &work.request.path,
            UnitOfWork::Act(work) => work.request.route(),
        }
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnitOfWork::Navigate(navigate) => write!(f, "{}", navigate.request),
            UnitOfWork::Act(act) => write!(f, "{}", act.request),
        }
    }
}
