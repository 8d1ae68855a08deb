//! Element - a live component instance and its update scheduler.
//!
//! Each element keeps a single-slot coalescing token: the first update
//! request in a turn fills the slot and queues one task; later requests
//! find the slot filled and share its [`UpdateHandle`]. The task clears
//! the slot before computing the template, so requests made while a
//! render is still in flight open a new window.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, error, trace};

use super::Component;
use crate::error::Result;
use crate::renderer::{RenderRoot, Renderer, RootMode};
use crate::scheduler::{self, UpdateHandle};
use crate::state::{Notify, StateCell};
use crate::types::{Lifecycle, UpdateReason};

// =============================================================================
// Options
// =============================================================================

/// Construction options for an [`Element`].
pub struct ElementOptions<C: Component> {
    name: Option<String>,
    props: C::Props,
    state: C::State,
}

impl<C: Component> ElementOptions<C> {
    pub fn new() -> Self {
        Self {
            name: None,
            props: C::Props::default(),
            state: C::State::default(),
        }
    }

    /// Name used in log fields. Defaults to the component's type name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Initial props. Does not schedule an update.
    pub fn props(mut self, props: C::Props) -> Self {
        self.props = props;
        self
    }

    /// Initial state. Does not schedule an update.
    pub fn state(mut self, state: C::State) -> Self {
        self.state = state;
        self
    }
}

impl<C: Component> Default for ElementOptions<C> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Element
// =============================================================================

pub(super) struct Inner<C: Component> {
    pub(super) name: String,
    pub(super) component: C,
    pub(super) props: StateCell<C::Props>,
    pub(super) state: StateCell<C::State>,
    pub(super) root: RenderRoot,
    pub(super) renderer: Box<dyn Renderer<C>>,
    /// Coalescing token: `Some` while an update is queued but not started.
    pub(super) pending: RefCell<Option<UpdateHandle>>,
    pub(super) reasons: Cell<UpdateReason>,
    pub(super) last_reasons: Cell<UpdateReason>,
    pub(super) renders: Cell<u64>,
    pub(super) lifecycle: Signal<Lifecycle>,
    /// Bumped on every attach so stale mount tasks can tell they lost.
    pub(super) attachment: Cell<u64>,
}

/// A live component instance.
///
/// Cloning yields another handle to the same instance.
pub struct Element<C: Component> {
    pub(super) inner: Rc<Inner<C>>,
}

/// Non-owning handle to an [`Element`].
pub struct WeakElement<C: Component> {
    inner: Weak<Inner<C>>,
}

impl<C: Component> Element<C> {
    /// Construct an element with default props and state.
    pub fn new(component: C, renderer: impl Renderer<C> + 'static) -> Self {
        Self::with_options(component, renderer, ElementOptions::new())
    }

    pub fn with_options(
        component: C,
        renderer: impl Renderer<C> + 'static,
        options: ElementOptions<C>,
    ) -> Self {
        let root = component.create_render_root();
        let name = options.name.unwrap_or_else(default_name::<C>);

        let inner = Rc::new_cyclic(|weak: &Weak<Inner<C>>| {
            let sink: Weak<dyn Notify> = weak.clone();
            Inner {
                name,
                component,
                props: StateCell::new(options.props, UpdateReason::PROPS, sink.clone()),
                state: StateCell::new(options.state, UpdateReason::STATE, sink),
                root,
                renderer: Box::new(renderer),
                pending: RefCell::new(None),
                reasons: Cell::new(UpdateReason::empty()),
                last_reasons: Cell::new(UpdateReason::empty()),
                renders: Cell::new(0),
                lifecycle: signal(Lifecycle::Unattached),
                attachment: Cell::new(0),
            }
        });

        debug!(element = %inner.name, mode = ?inner.root.mode(), "element constructed");
        Self { inner }
    }

    pub fn component(&self) -> &C {
        &self.inner.component
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // -------------------------------------------------------------------------
    // Props / State
    // -------------------------------------------------------------------------

    pub fn props(&self) -> C::Props {
        self.inner.props.get()
    }

    /// Replace props and request an update.
    pub fn set_props(&self, props: C::Props) -> UpdateHandle {
        self.inner.props.set(props)
    }

    pub fn update_props(&self, f: impl FnOnce(&mut C::Props)) -> UpdateHandle {
        self.inner.props.update(f)
    }

    pub fn props_cell(&self) -> &StateCell<C::Props> {
        &self.inner.props
    }

    pub fn state(&self) -> C::State {
        self.inner.state.get()
    }

    /// Replace state and request an update.
    pub fn set_state(&self, state: C::State) -> UpdateHandle {
        self.inner.state.set(state)
    }

    pub fn update_state(&self, f: impl FnOnce(&mut C::State)) -> UpdateHandle {
        self.inner.state.update(f)
    }

    pub fn state_cell(&self) -> &StateCell<C::State> {
        &self.inner.state
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// The attachment point, whatever its mode.
    pub fn render_root(&self) -> &RenderRoot {
        &self.inner.root
    }

    /// The render root if it is an open shadow root.
    pub fn shadow_root(&self) -> Option<&RenderRoot> {
        match self.inner.root.mode() {
            RootMode::Shadow { open: true } => Some(&self.inner.root),
            _ => None,
        }
    }

    pub fn renderer(&self) -> &dyn Renderer<C> {
        self.inner.renderer.as_ref()
    }

    /// Request a render at the end of the current turn.
    ///
    /// Requests made before the queued task starts return the same handle;
    /// the handle settles after the template reached the renderer.
    pub fn request_update(&self) -> UpdateHandle {
        self.schedule(UpdateReason::REQUESTED)
    }

    /// Whether an update is queued and has not started yet.
    pub fn has_pending_update(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    /// Number of renders that reached the renderer successfully.
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    /// Reasons carried by the most recent successful render.
    pub fn last_update_reasons(&self) -> UpdateReason {
        self.inner.last_reasons.get()
    }

    pub fn downgrade(&self) -> WeakElement<C> {
        WeakElement {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -------------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------------

    pub(super) fn schedule(&self, reason: UpdateReason) -> UpdateHandle {
        let inner = &self.inner;
        inner.reasons.set(inner.reasons.get() | reason);

        if let Some(handle) = inner.pending.borrow().as_ref() {
            trace!(element = %inner.name, ?reason, "joined pending update");
            return handle.clone();
        }

        let (handle, completer) = UpdateHandle::pending();
        *inner.pending.borrow_mut() = Some(handle.clone());
        trace!(element = %inner.name, ?reason, "opened update window");

        let element = self.clone();
        let queued = scheduler::queue_microtask(async move {
            let name = element.name().to_string();
            let outcome = element.perform_update().await;
            if let Err(err) = &outcome {
                debug!(element = %name, %err, "update failed");
            }
            // Fails only when every handle was dropped
            let _ = completer.send(outcome);
        });

        // A refused task drops its completer, which rejects the handle.
        if let Err(err) = queued {
            error!(element = %inner.name, %err, "could not queue update");
            inner.pending.borrow_mut().take();
            inner.reasons.set(UpdateReason::empty());
        }
        handle
    }

    #[tracing::instrument(level = "trace", skip_all, fields(element = %self.inner.name))]
    async fn perform_update(self) -> Result<()> {
        let inner = &self.inner;
        inner.pending.borrow_mut().take();
        let reasons = inner.reasons.replace(UpdateReason::empty());

        let template = inner.component.prepare_template(&self).await?;
        inner.component.render_template(&self, template)?;

        inner.renders.set(inner.renders.get() + 1);
        inner.last_reasons.set(reasons);
        debug!(?reasons, renders = inner.renders.get(), "update rendered");
        Ok(())
    }
}

impl<C: Component> Notify for Inner<C> {
    fn notify(self: Rc<Self>, reason: UpdateReason) -> UpdateHandle {
        Element { inner: self }.schedule(reason)
    }
}

impl<C: Component> Clone for Element<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Component> fmt::Debug for Element<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.inner.name)
            .field("lifecycle", &self.lifecycle())
            .field("pending", &self.has_pending_update())
            .field("renders", &self.inner.renders.get())
            .finish()
    }
}

impl<C: Component> WeakElement<C> {
    pub fn upgrade(&self) -> Option<Element<C>> {
        self.inner.upgrade().map(|inner| Element { inner })
    }
}

impl<C: Component> Clone for WeakElement<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

fn default_name<C>() -> String {
    let full = std::any::type_name::<C>();
    if full.contains('<') {
        return full.to_string();
    }
    full.rsplit("::").next().unwrap_or(full).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComponentError;
    use crate::renderer::TextRenderer;
    use futures::channel::oneshot;
    use futures::future::{FutureExt, LocalBoxFuture};

    #[derive(Clone, Default, Debug, PartialEq)]
    struct Counter {
        counter: i32,
    }

    /// Renders "Nr. {counter}!" and counts template calls.
    #[derive(Default)]
    struct Numbered {
        templates: Cell<u32>,
    }

    impl Component for Numbered {
        type Props = ();
        type State = Counter;
        type Template = String;

        fn template(&self, el: &Element<Self>) -> Result<String> {
            self.templates.set(self.templates.get() + 1);
            Ok(format!("Nr. {}!", el.state().counter))
        }
    }

    fn numbered() -> Element<Numbered> {
        Element::new(Numbered::default(), TextRenderer)
    }

    #[test]
    fn test_defaults_before_any_write() {
        let el = numbered();
        assert_eq!(el.state(), Counter::default());
        assert!(!el.has_pending_update());
        assert_eq!(el.render_count(), 0);
        assert!(el.render_root().is_empty());
    }

    #[test]
    fn test_writes_in_one_turn_render_once_with_final_value() {
        let el = numbered();
        el.set_state(Counter { counter: 1 });
        el.set_state(Counter { counter: 2 });
        el.set_state(Counter { counter: 3 });

        // Nothing rendered until the turn ends
        assert_eq!(el.component().templates.get(), 0);
        assert!(el.has_pending_update());

        scheduler::flush().unwrap();

        assert_eq!(el.component().templates.get(), 1);
        assert_eq!(el.render_count(), 1);
        assert_eq!(el.render_root().text_content(), "Nr. 3!");
        assert!(!el.has_pending_update());
    }

    #[test]
    fn test_requests_before_clearing_share_handle() {
        let el = numbered();
        let a = el.request_update();
        let b = el.request_update();
        let c = el.set_state(Counter { counter: 9 });

        assert!(a.ptr_eq(&b));
        assert!(a.ptr_eq(&c));

        scheduler::flush().unwrap();
        let d = el.request_update();
        assert!(!a.ptr_eq(&d));
    }

    #[test]
    fn test_handle_settles_after_render() {
        let el = numbered();
        let handle = el.request_update();
        assert!(!handle.is_settled());

        scheduler::flush().unwrap();
        assert_eq!(handle.peek(), Some(Ok(())));
        assert_eq!(el.render_root().text_content(), "Nr. 0!");
    }

    #[test]
    fn test_sequential_requests_render_twice() {
        let el = numbered();
        let first = el.request_update();
        scheduler::block_on(first.clone()).unwrap().unwrap();
        let second = el.request_update();
        scheduler::block_on(second.clone()).unwrap().unwrap();

        assert!(!first.ptr_eq(&second));
        assert_eq!(el.render_count(), 2);
        assert_eq!(el.component().templates.get(), 2);
    }

    #[test]
    fn test_identical_state_still_rerenders() {
        let el = numbered();
        el.set_state(Counter { counter: 1 });
        scheduler::flush().unwrap();
        el.set_state(Counter { counter: 1 });
        scheduler::flush().unwrap();

        assert_eq!(el.render_count(), 2);
    }

    #[test]
    fn test_update_state_can_read_current_state() {
        let el = numbered();
        el.update_state(|s| s.counter = el.state().counter + 1);
        el.update_state(|s| s.counter = el.state().counter + 1);
        let seen = el.state_cell().with(|s| {
            el.set_state(Counter { counter: s.counter * 10 });
            s.counter
        });
        scheduler::flush().unwrap();

        assert_eq!(seen, 2);
        assert_eq!(el.state().counter, 20);
        assert_eq!(el.render_count(), 1);
        assert_eq!(el.render_root().text_content(), "Nr. 20!");
    }

    #[test]
    fn test_refused_task_rejects_handle_and_clears_slot() {
        let el = numbered();
        scheduler::refuse_tasks(true);
        let lost = el.set_state(Counter { counter: 4 });
        scheduler::refuse_tasks(false);

        assert_eq!(lost.peek(), Some(Err(ComponentError::Dropped)));
        assert!(!el.has_pending_update());

        let retry = el.request_update();
        scheduler::flush().unwrap();
        assert_eq!(retry.peek(), Some(Ok(())));
        assert_eq!(el.render_root().text_content(), "Nr. 4!");
        assert_eq!(el.last_update_reasons(), UpdateReason::REQUESTED);
    }

    #[test]
    fn test_update_reasons_accumulate_per_window() {
        let el = numbered();
        el.set_state(Counter { counter: 1 });
        el.set_props(());
        scheduler::flush().unwrap();
        assert_eq!(el.last_update_reasons(), UpdateReason::STATE | UpdateReason::PROPS);

        el.request_update();
        scheduler::flush().unwrap();
        assert_eq!(el.last_update_reasons(), UpdateReason::REQUESTED);
    }

    #[test]
    fn test_shadow_root_visibility() {
        struct Closed;
        impl Component for Closed {
            type Props = ();
            type State = ();
            type Template = String;
            fn template(&self, _el: &Element<Self>) -> Result<String> {
                Ok(String::new())
            }
            fn create_render_root(&self) -> RenderRoot {
                RenderRoot::new(RootMode::Shadow { open: false })
            }
        }

        struct Light;
        impl Component for Light {
            type Props = ();
            type State = ();
            type Template = String;
            fn template(&self, _el: &Element<Self>) -> Result<String> {
                Ok("light".into())
            }
            fn create_render_root(&self) -> RenderRoot {
                RenderRoot::new(RootMode::Light)
            }
        }

        assert!(numbered().shadow_root().is_some());
        assert!(Element::new(Closed, TextRenderer).shadow_root().is_none());

        let light = Element::new(Light, TextRenderer);
        assert!(light.shadow_root().is_none());
        assert_eq!(light.render_root().mode(), RootMode::Light);
        light.request_update();
        scheduler::flush().unwrap();
        assert_eq!(light.render_root().text_content(), "light");
    }

    #[test]
    fn test_options_seed_without_scheduling() {
        let el = Element::with_options(
            Numbered::default(),
            TextRenderer,
            ElementOptions::new().name("seeded").state(Counter { counter: 5 }),
        );

        assert_eq!(el.name(), "seeded");
        assert_eq!(el.state().counter, 5);
        assert!(!el.has_pending_update());
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert_eq!(numbered().name(), "Numbered");
    }

    // -------------------------------------------------------------------------
    // Failures
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct Flaky {
        fail: Cell<bool>,
    }

    impl Component for Flaky {
        type Props = ();
        type State = Counter;
        type Template = String;

        fn template(&self, el: &Element<Self>) -> Result<String> {
            if self.fail.get() {
                return Err(ComponentError::template("no data"));
            }
            Ok(format!("ok {}", el.state().counter))
        }
    }

    #[test]
    fn test_template_error_rejects_and_next_request_opens_new_window() {
        let el = Element::new(Flaky::default(), TextRenderer);
        el.set_state(Counter { counter: 1 });
        scheduler::flush().unwrap();
        assert_eq!(el.render_root().text_content(), "ok 1");

        el.component().fail.set(true);
        let failed = el.set_state(Counter { counter: 2 });
        scheduler::flush().unwrap();

        assert_eq!(failed.peek(), Some(Err(ComponentError::template("no data"))));
        assert!(!el.has_pending_update());
        // Stale output stays
        assert_eq!(el.render_root().text_content(), "ok 1");

        el.component().fail.set(false);
        let retry = el.request_update();
        assert!(!retry.ptr_eq(&failed));
        scheduler::flush().unwrap();

        assert_eq!(retry.peek(), Some(Ok(())));
        assert_eq!(el.render_root().text_content(), "ok 2");
    }

    // -------------------------------------------------------------------------
    // Async preparation
    // -------------------------------------------------------------------------

    /// Waits for a value from a channel before building its template.
    #[derive(Default)]
    struct Fetching {
        gates: RefCell<Vec<oneshot::Receiver<String>>>,
    }

    impl Component for Fetching {
        type Props = ();
        type State = ();
        type Template = String;

        fn template(&self, _el: &Element<Self>) -> Result<String> {
            Ok("sync".into())
        }

        fn prepare_template(&self, _el: &Element<Self>) -> LocalBoxFuture<'static, Result<String>> {
            let gate = self.gates.borrow_mut().remove(0);
            async move {
                gate.await
                    .map_err(|_| ComponentError::template("fetch cancelled"))
            }
            .boxed_local()
        }
    }

    #[test]
    fn test_handle_waits_for_async_preparation() {
        let (tx, rx) = oneshot::channel();
        let el = Element::new(Fetching::default(), TextRenderer);
        el.component().gates.borrow_mut().push(rx);

        let handle = el.request_update();
        scheduler::flush().unwrap();

        // Slot cleared, render still in flight
        assert!(!el.has_pending_update());
        assert!(!handle.is_settled());
        assert!(el.render_root().is_empty());

        tx.send("fetched".to_string()).unwrap();
        scheduler::flush().unwrap();

        assert_eq!(handle.peek(), Some(Ok(())));
        assert_eq!(el.render_root().text_content(), "fetched");
    }

    #[test]
    fn test_request_during_inflight_render_opens_new_window() {
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let el = Element::new(Fetching::default(), TextRenderer);
        el.component().gates.borrow_mut().extend([rx1, rx2]);

        let first = el.request_update();
        scheduler::flush().unwrap();
        let second = el.request_update();
        assert!(!first.ptr_eq(&second));
        scheduler::flush().unwrap();

        // Second finishes first: overlapping renders are not serialized
        tx2.send("second".to_string()).unwrap();
        scheduler::flush().unwrap();
        assert!(second.is_settled());
        assert!(!first.is_settled());
        assert_eq!(el.render_root().text_content(), "second");

        tx1.send("first".to_string()).unwrap();
        scheduler::flush().unwrap();
        assert!(first.is_settled());
        assert_eq!(el.render_root().text_content(), "first");
        assert_eq!(el.render_count(), 2);
    }

    #[test]
    fn test_dropped_preparation_rejects() {
        let (tx, rx) = oneshot::channel::<String>();
        let el = Element::new(Fetching::default(), TextRenderer);
        el.component().gates.borrow_mut().push(rx);

        let handle = el.request_update();
        scheduler::flush().unwrap();
        drop(tx);
        scheduler::flush().unwrap();

        assert_eq!(handle.peek(), Some(Err(ComponentError::template("fetch cancelled"))));
    }

    // -------------------------------------------------------------------------
    // Writes from inside template()
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct SelfWriting;

    impl Component for SelfWriting {
        type Props = ();
        type State = Counter;
        type Template = String;

        fn template(&self, el: &Element<Self>) -> Result<String> {
            let counter = el.state().counter;
            if counter < 2 {
                el.set_state(Counter { counter: counter + 1 });
            }
            Ok(counter.to_string())
        }
    }

    #[test]
    fn test_write_inside_template_schedules_next_window() {
        let el = Element::new(SelfWriting, TextRenderer);
        let first = el.request_update();
        scheduler::flush().unwrap();

        assert_eq!(first.peek(), Some(Ok(())));
        assert_eq!(el.render_count(), 3);
        assert_eq!(el.render_root().text_content(), "2");
    }
}
