//! Component Module - the behaviour trait and the element that drives it.
//!
//! A [`Component`] describes *what* to render: its props/state types and a
//! `template()` computed from them, plus optional lifecycle hooks. An
//! [`Element`] is a live instance: it owns the props/state cells, the
//! render root, the renderer and the pending-update slot, and it calls
//! back into the component at each step.
//!
//! # Update Pipeline
//!
//! ```text
//! set_props / set_state / request_update
//!        │
//!        ▼
//! pending slot empty? ──no──▶ return existing UpdateHandle
//!        │ yes
//!        ▼
//! new UpdateHandle, queue task ──▶ (end of turn) clear slot
//!                                        │
//!                                        ▼
//!                               prepare_template().await
//!                                        │
//!                                        ▼
//!                               render_template() ──▶ Renderer
//!                                        │
//!                                        ▼
//!                                 settle handle
//! ```
//!
//! # Lifecycle
//!
//! Hosts call [`Element::attach`] and [`Element::detach`]. The first render
//! after attaching fires `component_did_mount`; detaching fires
//! `component_did_unmount`. See [`Lifecycle`](crate::Lifecycle).

mod element;
mod lifecycle;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::Result;
use crate::renderer::RenderRoot;

pub use element::{Element, ElementOptions, WeakElement};

/// Behaviour of a component kind.
///
/// Only [`template`](Component::template) is required. Every other method
/// is an override point with a documented default.
pub trait Component: Sized + 'static {
    /// Externally settable input. `Default` is the value before any write.
    type Props: Clone + Default + 'static;
    /// Internal state. `Default` is the value before any write.
    type State: Clone + Default + 'static;
    /// Value handed to the renderer.
    type Template: 'static;

    /// Compute the template from the element's current props and state.
    ///
    /// Writes made from here land in the next update window, since the
    /// pending slot is already clear when this runs.
    fn template(&self, element: &Element<Self>) -> Result<Self::Template>;

    /// Produce the template for one render.
    ///
    /// The default calls [`template`](Component::template) synchronously.
    /// Override to await data first; the returned future must compute the
    /// template exactly once.
    fn prepare_template(&self, element: &Element<Self>) -> LocalBoxFuture<'static, Result<Self::Template>> {
        future::ready(self.template(element)).boxed_local()
    }

    /// Apply a prepared template. The default hands it to the element's
    /// renderer with the render root and the element as event context.
    fn render_template(&self, element: &Element<Self>, template: Self::Template) -> Result<()> {
        element
            .renderer()
            .render(template, element.render_root(), element)
    }

    /// Create the attachment point, once, at construction.
    /// Defaults to an open shadow root.
    fn create_render_root(&self) -> RenderRoot {
        RenderRoot::default()
    }

    /// Runs once per attachment, after the first render settled.
    fn component_did_mount(&self, _element: &Element<Self>) {}

    /// Runs once per detachment.
    fn component_did_unmount(&self, _element: &Element<Self>) {}
}
