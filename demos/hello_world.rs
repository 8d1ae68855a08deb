//! Hello World Example - a counter component
//!
//! This example demonstrates the update scheduler:
//! - Attaching an element and waiting for its first render
//! - Clicking a bound button and seeing one coalesced re-render
//! - Several writes in one turn producing a single render
//!
//! Run with: cargo run --example hello_world

use spark_component::{
    scheduler, tag, Component, DomRenderer, Element, ElementOptions, Markup, Result,
};

#[derive(Clone, Default)]
struct Props {
    title: Option<String>,
}

#[derive(Clone, Default)]
struct State {
    counter: i32,
}

struct HelloWorld;

impl HelloWorld {
    fn increment(el: &Element<Self>) {
        el.update_state(|state| state.counter += 1);
    }
}

impl Component for HelloWorld {
    type Props = Props;
    type State = State;
    type Template = Markup<Self>;

    fn template(&self, el: &Element<Self>) -> Result<Markup<Self>> {
        let heading = match el.props().title {
            Some(title) => format!("{title} Nr. {}!", el.state().counter),
            None => format!("Nr. {}!", el.state().counter),
        };

        Ok(Markup::fragment([
            tag("h2").text(heading).into(),
            tag("button")
                .text("increment")
                .on("click", HelloWorld::increment)
                .into(),
        ]))
    }

    fn component_did_mount(&self, el: &Element<Self>) {
        println!("mounted after {} render(s)", el.render_count());
    }

    fn component_did_unmount(&self, _el: &Element<Self>) {
        println!("unmounted");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== spark-component Hello World ===\n");

    let el = Element::with_options(
        HelloWorld,
        DomRenderer,
        ElementOptions::new().name("hello-world"),
    );
    el.set_props(Props {
        title: Some("Hey, there!".to_string()),
    });

    // Attach and end the turn: one render, then the mount hook
    el.connected_callback()?;
    scheduler::flush()?;
    println!("h2: {:?}", el.render_root().query_text("h2"));

    // Click twice in one turn: both writes coalesce
    let root = el.render_root();
    root.dispatch("button", "click");
    root.dispatch("button", "click");
    let handle = el.request_update();
    scheduler::block_on(handle)??;
    println!("h2: {:?} (renders: {})", root.query_text("h2"), el.render_count());

    // Burst of writes
    el.set_state(State { counter: 10 });
    el.set_state(State { counter: 20 });
    el.set_state(State { counter: 30 });
    scheduler::flush()?;
    println!("h2: {:?} (renders: {})", root.query_text("h2"), el.render_count());

    el.disconnected_callback()?;
    Ok(())
}
