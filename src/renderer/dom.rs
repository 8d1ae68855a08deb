//! DomRenderer - applies [`Markup`] templates to a [`RenderRoot`].
//!
//! Every render rebuilds the root's node list from the template and binds
//! listeners to a weak reference to the event context, so committed nodes
//! never keep their element alive. Rendering an unchanged template again
//! produces an equivalent tree.

use std::rc::Rc;

use super::markup::{Listener, Markup};
use super::root::{BoundListener, ElementNode, Node, RenderRoot};
use super::Renderer;
use crate::component::{Component, Element, WeakElement};
use crate::error::{ComponentError, Result};

/// Renderer for components whose template is [`Markup`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DomRenderer;

impl<C> Renderer<C> for DomRenderer
where
    C: Component<Template = Markup<C>>,
{
    fn render(&self, template: Markup<C>, root: &RenderRoot, event_context: &Element<C>) -> Result<()> {
        let context = event_context.downgrade();
        let mut nodes = Vec::new();
        materialize(template, &context, &mut nodes)?;
        root.commit(nodes);
        Ok(())
    }
}

fn materialize<C: Component>(
    markup: Markup<C>,
    context: &WeakElement<C>,
    out: &mut Vec<Node>,
) -> Result<()> {
    match markup {
        Markup::Text(text) => out.push(Node::Text(text)),
        Markup::Fragment(items) => {
            for item in items {
                materialize(item, context, out)?;
            }
        }
        Markup::Element(tag) => {
            validate_tag_name(&tag.name)?;

            let mut children = Vec::with_capacity(tag.children.len());
            for child in tag.children {
                materialize(child, context, &mut children)?;
            }

            let listeners = tag
                .listeners
                .into_iter()
                .map(|(event, handler)| (event, bind(handler, context.clone())))
                .collect();

            out.push(Node::Element(ElementNode {
                tag: tag.name,
                attributes: tag.attributes,
                children,
                listeners,
            }));
        }
    }
    Ok(())
}

fn bind<C: Component>(handler: Listener<C>, context: WeakElement<C>) -> BoundListener {
    Rc::new(move || {
        if let Some(element) = context.upgrade() {
            handler(&element);
        }
    })
}

fn validate_tag_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ComponentError::render(format!("invalid tag name `{name}`")))
    }
}
