//! Demo: a small component tree driven against the headless host.
//!
//! Mounts a counter app with a color-flipping child and a controlled
//! input, clicks the color block, types into the input, and prints the
//! final committed tree plus the host op journal.

use std::any::TypeId;
use std::error::Error;
use std::sync::Arc;

use element::{
    Children, Component, ComponentType, Element, EventKind, HostEvent, LifecycleCtx, Listener,
    Props, RenderCtx, Rendered, StateMap, Value,
};
use host_headless::{HeadlessHost, RootContainer, UnlimitedBudget};
use reconciler::Engine;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

struct ColorTextType;

impl ComponentType for ColorTextType {
    fn name(&self) -> &str {
        "ColorText"
    }

    fn instantiate(&self, _props: &Props) -> Box<dyn Component> {
        Box::new(ColorText)
    }

    fn type_token(&self) -> TypeId {
        TypeId::of::<ColorTextType>()
    }
}

struct ColorText;

const PALETTE: [&str; 2] = ["red", "blue"];

impl Component for ColorText {
    fn initial_state(&self) -> StateMap {
        StateMap::new().with("color_index", Value::number(0.0))
    }

    fn render(&self, ctx: &RenderCtx, props: &Props, state: &StateMap) -> Rendered {
        let index = state.number("color_index").unwrap_or(0.0) as usize % PALETTE.len();
        let updater = ctx.updater();
        let on_click = Listener::new(EventKind::Click, move |_event, scope| {
            let next = ((index + 1) % PALETTE.len()) as f64;
            scope.request_state_change(
                updater,
                StateMap::new().with("color_index", Value::number(next)),
            );
        });
        Rendered::Ready(Children::one(Element::host(
            "div",
            Props::new()
                .attr("class", Value::text("color-flip"))
                .attr("style", Value::text(format!("color: {}", PALETTE[index])))
                .on(on_click)
                .children(props.child_spec().clone()),
        )))
    }
}

struct AppType;

impl ComponentType for AppType {
    fn name(&self) -> &str {
        "App"
    }

    fn instantiate(&self, _props: &Props) -> Box<dyn Component> {
        Box::new(App)
    }

    fn type_token(&self) -> TypeId {
        TypeId::of::<AppType>()
    }
}

struct App;

impl Component for App {
    fn initial_state(&self) -> StateMap {
        StateMap::new()
            .with("counter", Value::number(0.0))
            .with("value", Value::text(""))
    }

    fn render(&self, ctx: &RenderCtx, _props: &Props, state: &StateMap) -> Rendered {
        let counter = state.number("counter").unwrap_or(0.0);
        let value = state.text("value").unwrap_or("").to_string();
        let updater = ctx.updater();
        let on_input = Listener::new(EventKind::Input, move |event, scope| {
            let typed = event.value.as_deref().unwrap_or("");
            scope.request_state_change(
                updater,
                StateMap::new().with("value", Value::text(typed)),
            );
            scope.mark_controlled();
        });
        Rendered::Ready(Children::list(vec![Element::host(
            "div",
            Props::new()
                .attr("class", Value::text("app"))
                .children(Children::list(vec![
                    Element::host(
                        "h1",
                        Props::new().children(Children::text(format!("count: {counter}"))),
                    ),
                    Element::component(
                        Arc::new(ColorTextType),
                        Props::new().children(Children::text("flip me")),
                    ),
                    Element::host(
                        "input",
                        Props::new().attr("value", Value::text(value)).on(on_input),
                    ),
                ])),
        )]))
    }

    fn on_mount(&mut self, ctx: &mut LifecycleCtx<'_>) {
        ctx.request_state_change(StateMap::new().with("counter", Value::number(1.0)));
    }
}

fn pump(engine: &mut Engine<HeadlessHost>, host: &HeadlessHost) -> Result<(), Box<dyn Error>> {
    for _ in 0..8 {
        if host.take_scheduled_callbacks().is_empty() {
            break;
        }
        host.advance_clock(16);
        engine.perform_deferred_work(&UnlimitedBudget)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);

    engine.update_container(Element::component(Arc::new(AppType), Props::new()))?;
    pump(&mut engine, &host)?;

    if let Some(target) = engine.find_host(|_, props| {
        props.get("class").and_then(Value::as_text) == Some("color-flip")
    }) {
        engine.dispatch_event(target, &HostEvent::new(EventKind::Click))?;
        pump(&mut engine, &host)?;
    }

    if let Some(input) = engine.find_host_by_tag("input") {
        engine.dispatch_event(input, &HostEvent::with_value(EventKind::Input, "weft"))?;
        pump(&mut engine, &host)?;
    }

    println!("committed tree:\n{}", host.snapshot_json());
    println!("\nhost journal:");
    for op in host.journal() {
        println!("  {op:?}");
    }
    Ok(())
}
