//! # spark-component
//!
//! Reactive component base with coalesced, awaitable updates.
//!
//! Components hold `props` and `state`, re-render a template when either is
//! written, and collapse every write made in the same turn into a single
//! render. Each render is exposed as an [`UpdateHandle`] that can be awaited
//! or polled.
//!
//! ## Architecture
//!
//! ```text
//! StateCell write ──▶ Element::schedule ──▶ microtask queue
//!                         (coalesce)              │
//!                                                 ▼
//!        UpdateHandle ◀── Renderer ◀── prepare_template()
//! ```
//!
//! Scheduling is single-threaded and cooperative: queued work runs when the
//! thread ends its turn with [`scheduler::flush`] or [`scheduler::block_on`].
//!
//! ## Modules
//!
//! - [`types`] - Lifecycle states and update reasons
//! - [`state`] - `props`/`state` cells that schedule on every write
//! - [`scheduler`] - The per-thread microtask queue and update handles
//! - [`component`] - The `Component` trait, `Element` and its lifecycle
//! - [`renderer`] - Renderer contract, render roots, markup templates
//!
//! ## Example
//!
//! ```ignore
//! use spark_component::{scheduler, tag, Component, DomRenderer, Element, Markup, Result};
//!
//! #[derive(Clone, Default)]
//! struct Counter { counter: i32 }
//!
//! struct HelloWorld;
//!
//! impl Component for HelloWorld {
//!     type Props = ();
//!     type State = Counter;
//!     type Template = Markup<Self>;
//!
//!     fn template(&self, el: &Element<Self>) -> Result<Markup<Self>> {
//!         Ok(tag("h2").text(format!("Nr. {}!", el.state().counter)).into())
//!     }
//! }
//!
//! let el = Element::new(HelloWorld, DomRenderer);
//! el.attach()?;
//! scheduler::flush()?;
//! assert_eq!(el.render_root().query_text("h2").as_deref(), Some("Nr. 0!"));
//! ```

pub mod component;
pub mod error;
pub mod renderer;
pub mod scheduler;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{ComponentError, Result};

pub use component::{Component, Element, ElementOptions, WeakElement};

pub use renderer::{
    tag, DomRenderer, ElementNode, Listener, Markup, Node, RenderRoot, Renderer, RootMode, Tag,
    TextRenderer,
};

pub use scheduler::{block_on, flush, queue_microtask, UpdateHandle};

pub use state::StateCell;
