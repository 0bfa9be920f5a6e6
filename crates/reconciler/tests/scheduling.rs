mod common;

use std::rc::Rc;
use std::sync::Arc;

use common::{Log, ViewType, pump};
use element::{
    Children, Element, EventKind, HostEvent, Listener, Props, Rendered, StateMap, Value,
};
use host_headless::{CountdownBudget, HeadlessHost, HostOp, RootContainer, UnlimitedBudget};
use reconciler::Engine;

fn wide_list(log: &Log, width: usize) -> Arc<ViewType> {
    Arc::new(ViewType {
        name: "wide",
        initial: StateMap::new().with("value", Value::text("")),
        log: log.clone(),
        render_with: Rc::new(move |ctx, _props, state| {
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
            let mut items: Vec<Element> = (0..width)
                .map(|index| {
                    Element::host(
                        "li",
                        Props::new().children(Children::text(format!("{value}-{index}"))),
                    )
                })
                .collect();
            items.push(Element::host(
                "input",
                Props::new().attr("value", Value::text(value)).on(on_input),
            ));
            Rendered::Ready(Children::list(items))
        }),
    })
}

#[test]
fn a_yielded_pass_preserves_its_cursor_and_resumes() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    engine
        .update_container(Element::component(wide_list(&log, 24), Props::new()))
        .expect("mount request");

    assert_eq!(host.take_scheduled_callbacks().len(), 1);
    // A starved budget: the pass yields mid-traversal without committing.
    engine
        .perform_deferred_work(&CountdownBudget::new(4))
        .expect("partial pass");
    assert!(host.snapshot().is_empty(), "no commit under a spent budget");
    // The engine re-requested a callback to finish later.
    assert_eq!(host.take_scheduled_callbacks().len(), 1);

    // The resumed pass completes and commits the whole list once.
    engine
        .perform_deferred_work(&UnlimitedBudget)
        .expect("resumed pass");
    let snapshot = host.snapshot();
    assert_eq!(snapshot.len(), 25);
    // The yielded attempt did not double-render committed output.
    let appends = host
        .journal()
        .into_iter()
        .filter(|op| matches!(op, HostOp::AppendToContainer { .. }))
        .count();
    assert_eq!(appends, 25);
}

#[test]
fn sync_flush_commits_before_the_pending_deferred_callback_fires() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    engine
        .update_container(Element::component(wide_list(&log, 2), Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");
    log.take();
    host.take_journal();

    // A default-priority update, left scheduled but not yet performed.
    let wide = engine.find_component_by_name("wide").expect("wide node");
    engine
        .apply_state_change(wide, StateMap::new().with("pending", Value::bool(true)))
        .expect("default-priority change");
    assert_eq!(host.scheduled_callbacks().len(), 1);
    assert_eq!(log.entries(), Vec::<String>::new());

    // A controlled input event forces a synchronous flush first.
    let input = engine.find_host_by_tag("input").expect("input node");
    engine
        .dispatch_event(input, &HostEvent::with_value(EventKind::Input, "now"))
        .expect("dispatch");

    // The sync flush ran to commit inside the dispatch, and it did not
    // lose the pending default update: both fold into the committed
    // state.
    assert_eq!(log.entries(), ["render:wide"]);
    let key = engine
        .host_instance_at(engine.find_host_by_tag("li").expect("li"))
        .expect("li instance");
    assert_eq!(host.text_of(key).as_deref(), Some("now-0"));

    // The earlier deferred callback is still registered; firing it later
    // finds no work and commits nothing further.
    host.take_journal();
    pump(&mut engine, &host).expect("drained callback");
    let mutations = host
        .journal()
        .into_iter()
        .filter(|op| !matches!(op, HostOp::ScheduleCallback { .. }))
        .count();
    assert_eq!(mutations, 0);
    assert_eq!(log.entries(), ["render:wide"]);
}

#[test]
fn an_expired_root_flushes_without_yielding() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    engine
        .update_container(Element::component(wide_list(&log, 12), Props::new()))
        .expect("mount request");
    host.take_scheduled_callbacks();

    // Move the clock past the async horizon: the root has expired, so
    // even a spent budget must not stop the flush.
    host.advance_clock(6_000);
    engine
        .perform_deferred_work(&CountdownBudget::new(0))
        .expect("expired pass");
    assert_eq!(host.snapshot().len(), 13);
}
