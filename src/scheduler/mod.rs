//! Microtask Scheduler - the cooperative queue every element defers to.
//!
//! Each thread owns one [`LocalPool`]. Scheduled work is queued with
//! [`queue_microtask`] and runs only when the owner of the thread ends its
//! turn by calling [`flush`] (run until stalled) or [`block_on`]. Anything
//! that happens synchronously before that point lands in the same turn,
//! which is what lets elements coalesce bursts of writes into one render.
//!
//! # Example
//!
//! ```ignore
//! use spark_component::scheduler;
//!
//! el.set_state(State { counter: 1 });
//! el.set_state(State { counter: 2 });
//!
//! // End the turn: one render runs with counter = 2
//! scheduler::flush()?;
//! ```

mod handle;

#[cfg(test)]
use std::cell::Cell;
use std::cell::RefCell;
use std::future::Future;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

use crate::error::{ComponentError, Result};

pub use handle::UpdateHandle;

// =============================================================================
// Thread State
// =============================================================================

struct Queue {
    /// The executor driving all scheduled work on this thread.
    pool: RefCell<LocalPool>,
    /// Spawner handle, usable while the pool is running.
    spawner: LocalSpawner,
}

thread_local! {
    static QUEUE: Queue = {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Queue {
            pool: RefCell::new(pool),
            spawner,
        }
    };
}

#[cfg(test)]
thread_local! {
    static REFUSE: Cell<bool> = const { Cell::new(false) };
}

/// Make [`queue_microtask`] fail on this thread until switched back.
#[cfg(test)]
pub(crate) fn refuse_tasks(refuse: bool) {
    REFUSE.with(|flag| flag.set(refuse));
}

// =============================================================================
// Queueing
// =============================================================================

/// Queue a task to run at the end of the current turn.
///
/// Tasks queued from inside a running task are picked up by the same
/// [`flush`] call.
pub fn queue_microtask(task: impl Future<Output = ()> + 'static) -> Result<()> {
    #[cfg(test)]
    if REFUSE.with(Cell::get) {
        return Err(ComponentError::scheduler("queue is refusing tasks"));
    }

    QUEUE
        .with(|queue| queue.spawner.spawn_local(task))
        .map_err(|err| ComponentError::scheduler(err.to_string()))
}

// =============================================================================
// Driving
// =============================================================================

/// End the current turn: run queued tasks until none can make progress.
///
/// Tasks waiting on something external (an async `prepare_template` that
/// awaits a channel, for instance) stay queued until a later flush.
///
/// Returns an error when called from inside a scheduled task.
pub fn flush() -> Result<()> {
    QUEUE.with(|queue| {
        let mut pool = queue
            .pool
            .try_borrow_mut()
            .map_err(|_| ComponentError::scheduler("flush called from inside a scheduled task"))?;
        pool.run_until_stalled();
        Ok(())
    })
}

/// Drive the queue until `future` completes and return its output.
///
/// Typical use is awaiting an [`UpdateHandle`] from synchronous code:
/// `scheduler::block_on(el.request_update())??`.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    QUEUE.with(|queue| {
        let mut pool = queue
            .pool
            .try_borrow_mut()
            .map_err(|_| ComponentError::scheduler("block_on called from inside a scheduled task"))?;
        Ok(pool.run_until(future))
    })
}
