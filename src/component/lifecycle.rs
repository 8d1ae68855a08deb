//! Lifecycle - the attach/detach state machine.
//!
//! Hosts drive two transitions:
//! - [`Element::attach`] upgrades props, requests the first render and
//!   queues the mount; `component_did_mount` runs once that render settled
//! - [`Element::detach`] runs `component_did_unmount` right away
//!
//! Pending renders are never cancelled by a detach. A mount whose
//! attachment was superseded (detached, or detached and re-attached before
//! the first render settled) is skipped.

use spark_signals::Signal;
use tracing::{debug, warn};

use super::{Component, Element};
use crate::error::{ComponentError, Result};
use crate::scheduler::{self, UpdateHandle};
use crate::types::{Lifecycle, UpdateReason};

impl<C: Component> Element<C> {
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lifecycle.get()
    }

    /// The lifecycle as a reactive signal.
    ///
    /// Deriveds and effects that read it re-run on every transition.
    pub fn lifecycle_signal(&self) -> Signal<Lifecycle> {
        self.inner.lifecycle.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle() == Lifecycle::Mounted
    }

    /// Insert the element into the host.
    ///
    /// Valid from `Unattached` or `Unmounted`. Returns the handle of the
    /// first render; `component_did_mount` runs after it resolves.
    pub fn attach(&self) -> Result<UpdateHandle> {
        let from = self.lifecycle();
        if from.is_attached() {
            return Err(ComponentError::lifecycle(from, "attach"));
        }

        self.upgrade_props();
        let first_render = self.schedule(UpdateReason::ATTACH);

        // Queue the mount before touching the lifecycle so a refused task
        // leaves the element as it was.
        let attachment = self.inner.attachment.get() + 1;
        let element = self.clone();
        let render = first_render.clone();
        scheduler::queue_microtask(async move {
            match render.await {
                Ok(()) => element.finish_mount(attachment),
                Err(err) => {
                    warn!(element = %element.name(), %err, "first render failed, skipping mount");
                }
            }
        })?;

        self.inner.attachment.set(attachment);
        self.transition(Lifecycle::Attaching);
        Ok(first_render)
    }

    /// Remove the element from the host.
    ///
    /// Valid from `Attaching` or `Mounted`. Runs `component_did_unmount`
    /// before returning.
    pub fn detach(&self) -> Result<()> {
        let from = self.lifecycle();
        if !from.is_attached() {
            return Err(ComponentError::lifecycle(from, "detach"));
        }

        self.transition(Lifecycle::Unmounted);
        self.inner.component.component_did_unmount(self);
        Ok(())
    }

    /// Host entry point for insertion. Same as [`attach`](Element::attach).
    pub fn connected_callback(&self) -> Result<UpdateHandle> {
        self.attach()
    }

    /// Host entry point for removal. Same as [`detach`](Element::detach).
    pub fn disconnected_callback(&self) -> Result<()> {
        self.detach()
    }

    /// Re-apply props written before attachment through the reactive
    /// setter, so the value survives and joins the attach window.
    fn upgrade_props(&self) -> UpdateHandle {
        let value = self.inner.props.take();
        self.inner.props.set(value)
    }

    fn finish_mount(&self, attachment: u64) {
        if self.inner.attachment.get() != attachment || self.lifecycle() != Lifecycle::Attaching {
            debug!(element = %self.name(), "attachment superseded, skipping mount");
            return;
        }

        self.transition(Lifecycle::Mounted);
        self.inner.component.component_did_mount(self);
    }

    fn transition(&self, to: Lifecycle) {
        let from = self.lifecycle();
        self.inner.lifecycle.set(to);
        debug!(element = %self.name(), %from, %to, "lifecycle transition");
    }
}
