//! Markup - declarative template values for the DOM renderer.
//!
//! A template is a tree of text, elements and fragments. Elements carry
//! attributes and event listeners; listeners receive the element they
//! were rendered for as their event context.
//!
//! ```ignore
//! fn template(&self, el: &Element<Self>) -> Result<Markup<Self>> {
//!     let state = el.state();
//!     Ok(Markup::fragment([
//!         tag("h2").text(format!("Nr. {}!", state.counter)).into(),
//!         tag("button")
//!             .text("increment")
//!             .on("click", |el: &Element<Self>| {
//!                 el.update_state(|s| s.counter += 1);
//!             })
//!             .into(),
//!     ]))
//! }
//! ```

use std::rc::Rc;

use crate::component::{Component, Element};

/// Event handler receiving its event context.
pub type Listener<C> = Rc<dyn Fn(&Element<C>)>;

/// A template value.
pub enum Markup<C: Component> {
    Text(String),
    Element(Tag<C>),
    Fragment(Vec<Markup<C>>),
}

impl<C: Component> Markup<C> {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn fragment(items: impl IntoIterator<Item = Markup<C>>) -> Self {
        Self::Fragment(items.into_iter().collect())
    }

    /// Renders nothing.
    pub fn empty() -> Self {
        Self::Fragment(Vec::new())
    }
}

impl<C: Component> From<Tag<C>> for Markup<C> {
    fn from(tag: Tag<C>) -> Self {
        Self::Element(tag)
    }
}

impl<C: Component> From<String> for Markup<C> {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<C: Component> From<&str> for Markup<C> {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// An element under construction.
pub struct Tag<C: Component> {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<Markup<C>>,
    pub(crate) listeners: Vec<(String, Listener<C>)>,
}

/// Start an element named `name`.
pub fn tag<C: Component>(name: impl Into<String>) -> Tag<C> {
    Tag {
        name: name.into(),
        attributes: Vec::new(),
        children: Vec::new(),
        listeners: Vec::new(),
    }
}

impl<C: Component> Tag<C> {
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: impl Into<Markup<C>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Shorthand for a text child.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::Text(text.into()))
    }

    /// Listen for `event`. The handler is bound to the rendering element.
    pub fn on(mut self, event: impl Into<String>, handler: impl Fn(&Element<C>) + 'static) -> Self {
        let listener: Listener<C> = Rc::new(handler);
        self.listeners.push((event.into(), listener));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
