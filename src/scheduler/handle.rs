//! UpdateHandle - completion signal for one coalesced update.
//!
//! A handle is shared by every request that joined the same coalescing
//! window. It settles once, after the template was computed and handed to
//! the renderer, with the outcome of that render.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot::{self, Canceled};
use futures::future::{FutureExt, Map, Shared};

use crate::error::{ComponentError, Result};

/// Settling side of an [`UpdateHandle`].
///
/// Dropping it unsent rejects the handle with [`ComponentError::Dropped`],
/// so awaiters never hang on a lost task.
pub(crate) type Completer = oneshot::Sender<Result<()>>;

type Received = std::result::Result<Result<()>, Canceled>;
type Completion = Shared<Map<oneshot::Receiver<Result<()>>, fn(Received) -> Result<()>>>;

/// Awaitable outcome of a pending update.
///
/// Cloning is cheap and keeps identity: use [`UpdateHandle::ptr_eq`] to
/// check whether two requests were coalesced into the same render.
#[derive(Clone)]
pub struct UpdateHandle {
    completion: Completion,
}

impl UpdateHandle {
    /// Create an unsettled handle and the sender that settles it.
    pub(crate) fn pending() -> (Self, Completer) {
        let (sender, receiver) = oneshot::channel();
        let completion = receiver.map(flatten_canceled as fn(Received) -> Result<()>).shared();
        (Self { completion }, sender)
    }

    /// A handle that is already settled with `outcome`.
    pub fn settled(outcome: Result<()>) -> Self {
        let (handle, completer) = Self::pending();
        let _ = completer.send(outcome);
        handle
    }

    /// Whether both handles belong to the same update.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.completion.ptr_eq(&other.completion)
    }

    pub fn is_settled(&self) -> bool {
        self.peek().is_some()
    }

    /// The outcome, if the update has settled. Does not register interest.
    pub fn peek(&self) -> Option<Result<()>> {
        if let Some(outcome) = self.completion.peek() {
            return Some(outcome.clone());
        }
        // Nobody has polled the shared future since the sender fired
        self.completion.clone().now_or_never()
    }
}

fn flatten_canceled(received: Received) -> Result<()> {
    received.unwrap_or(Err(ComponentError::Dropped))
}

impl Future for UpdateHandle {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.completion.poll_unpin(cx)
    }
}

impl fmt::Debug for UpdateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateHandle")
            .field("outcome", &self.completion.peek())
            .finish()
    }
}
