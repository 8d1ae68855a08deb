//! StateCell - whole-value store that schedules an update on every write.
//!
//! There is no equality check: writing a value identical to the current
//! one still schedules a render. Callers that want to skip redundant
//! renders compare before writing.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ComponentError;
use crate::scheduler::UpdateHandle;
use crate::types::UpdateReason;

/// Receiver of update requests from a [`StateCell`].
///
/// Implemented by the element that owns the cell.
pub(crate) trait Notify {
    fn notify(self: Rc<Self>, reason: UpdateReason) -> UpdateHandle;
}

/// A `props` or `state` slot of an element.
///
/// The value sits behind an `Rc` so readers never hold a borrow while user
/// code runs: a closure passed to [`with`](StateCell::with) or
/// [`update`](StateCell::update) may read or write the same cell.
pub struct StateCell<T> {
    value: RefCell<Rc<T>>,
    reason: UpdateReason,
    sink: Weak<dyn Notify>,
}

impl<T> StateCell<T> {
    pub(crate) fn new(value: T, reason: UpdateReason, sink: Weak<dyn Notify>) -> Self {
        Self {
            value: RefCell::new(Rc::new(value)),
            reason,
            sink,
        }
    }

    /// Read the current value without cloning it.
    ///
    /// `f` sees a snapshot: writes made inside it land in the cell but not
    /// in the reference `f` was given.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let snapshot = Rc::clone(&self.value.borrow());
        f(&snapshot)
    }

    /// Replace the whole value, then request an update.
    pub fn set(&self, value: T) -> UpdateHandle {
        *self.value.borrow_mut() = Rc::new(value);
        self.notify()
    }

    /// Which update reason writes to this cell report.
    pub fn reason(&self) -> UpdateReason {
        self.reason
    }

    fn notify(&self) -> UpdateHandle {
        match self.sink.upgrade() {
            Some(sink) => sink.notify(self.reason),
            None => UpdateHandle::settled(Err(ComponentError::Dropped)),
        }
    }
}

impl<T: Clone> StateCell<T> {
    /// Current value. No side effects.
    pub fn get(&self) -> T {
        (**self.value.borrow()).clone()
    }

    /// Patch a copy of the value, store it, then request an update.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> UpdateHandle {
        let mut value = self.get();
        f(&mut value);
        self.set(value)
    }
}

impl<T: Clone + Default> StateCell<T> {
    /// Move the value out, leaving `T::default()`. Does not schedule.
    pub fn take(&self) -> T {
        let value = std::mem::take(&mut *self.value.borrow_mut());
        Rc::unwrap_or_clone(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &**self.value.borrow())
            .field("reason", &self.reason)
            .finish()
    }
}
