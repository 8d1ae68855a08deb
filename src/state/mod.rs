//! State Module - the mutable `props`/`state` container.
//!
//! Every element owns two [`StateCell`]s. Writes replace (or patch) the
//! stored value synchronously and then ask the owning element for an
//! update, which the scheduler coalesces per turn.

mod cell;

pub use cell::StateCell;
pub(crate) use cell::Notify;
