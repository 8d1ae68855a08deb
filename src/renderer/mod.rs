//! Renderer - applies template values to an element's render root.
//!
//! The scheduler never touches the root itself. Once a template has been
//! prepared it goes through `Component::render_template`, whose default
//! hands it to the element's [`Renderer`] together with the root and the
//! element as event context.
//!
//! Two renderers ship with the crate:
//! - [`DomRenderer`] - [`Markup`] trees with attributes and bound listeners
//! - [`TextRenderer`] - any `Display` template, committed as one text node
//!
//! Renderers are assumed synchronous and idempotent: applying an
//! equivalent template twice leaves equivalent output.

mod dom;
mod markup;
mod root;

use std::fmt;

use crate::component::{Component, Element};
use crate::error::Result;

pub use dom::DomRenderer;
pub use markup::{tag, Listener, Markup, Tag};
pub use root::{BoundListener, ElementNode, Node, RenderRoot, RootMode};

/// Applies a component's template to a render root.
pub trait Renderer<C: Component> {
    /// Apply `template` to `root`, binding inline event handlers to
    /// `event_context`. Errors propagate to the update's handle.
    fn render(&self, template: C::Template, root: &RenderRoot, event_context: &Element<C>) -> Result<()>;
}

/// Renderer for `Display` templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl<C> Renderer<C> for TextRenderer
where
    C: Component,
    C::Template: fmt::Display,
{
    fn render(&self, template: C::Template, root: &RenderRoot, _event_context: &Element<C>) -> Result<()> {
        root.commit(vec![Node::Text(template.to_string())]);
        Ok(())
    }
}
