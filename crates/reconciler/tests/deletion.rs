mod common;

use std::rc::Rc;
use std::sync::Arc;

use common::{Log, ProbeType, ViewType, pump};
use element::{Children, Element, Props, Rendered, StateMap, Value};
use host_headless::{HeadlessHost, HostOp, RootContainer};
use reconciler::Engine;

/// A toggled subtree with stateful nodes at two depths:
/// section > Probe(outer) > div > Probe(inner) > span.
fn toggled(log: &Log) -> Arc<ViewType> {
    let outer = log.clone();
    Arc::new(ViewType {
        name: "toggle",
        initial: StateMap::new().with("show", Value::bool(true)),
        log: log.clone(),
        render_with: Rc::new(move |_ctx, _props, state| {
            let show = state.get("show") == Some(&Value::bool(true));
            let children = if show {
                Children::one(Element::host(
                    "section",
                    Props::new().children(Children::one(Element::component(
                        Arc::new(ProbeType {
                            name: "outer",
                            log: outer.clone(),
                        }),
                        Props::new().children(Children::one(Element::host(
                            "div",
                            Props::new().children(Children::one(Element::component(
                                Arc::new(ProbeType {
                                    name: "inner",
                                    log: outer.clone(),
                                }),
                                Props::new().children(Children::one(Element::host(
                                    "span",
                                    Props::new().children(Children::text("leaf")),
                                ))),
                            ))),
                        ))),
                    ))),
                ))
            } else {
                Children::None
            };
            Rendered::Ready(children)
        }),
    })
}

#[test]
fn deleting_a_subtree_unmounts_each_stateful_node_once_then_detaches() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    engine
        .update_container(Element::component(toggled(&log), Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");
    log.take();
    host.take_journal();

    let toggle = engine.find_component_by_name("toggle").expect("toggle");
    engine
        .apply_state_change(toggle, StateMap::new().with("show", Value::bool(false)))
        .expect("state change");
    pump(&mut engine, &host).expect("deletion pass");

    assert!(host.snapshot().is_empty());

    // Teardown ran top-down, each unmount exactly once.
    let entries = log.entries();
    let unmounts: Vec<&str> = entries
        .iter()
        .filter(|entry| entry.starts_with("unmount:"))
        .map(String::as_str)
        .collect();
    assert_eq!(unmounts, ["unmount:outer", "unmount:inner"]);

    // One detach of the topmost host node covers the whole subtree.
    let journal = host.journal();
    let removals: Vec<&HostOp> = journal
        .iter()
        .filter(|op| {
            matches!(
                op,
                HostOp::RemoveChild { .. } | HostOp::RemoveFromContainer { .. }
            )
        })
        .collect();
    assert_eq!(removals.len(), 1);
    assert!(matches!(removals[0], HostOp::RemoveFromContainer { .. }));
}

#[test]
fn remounting_after_deletion_creates_fresh_instances() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    engine
        .update_container(Element::component(toggled(&log), Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");

    let toggle = engine.find_component_by_name("toggle").expect("toggle");
    engine
        .apply_state_change(toggle, StateMap::new().with("show", Value::bool(false)))
        .expect("hide");
    pump(&mut engine, &host).expect("deletion pass");
    log.take();
    host.take_journal();

    engine
        .apply_state_change(toggle, StateMap::new().with("show", Value::bool(true)))
        .expect("show again");
    pump(&mut engine, &host).expect("remount pass");

    let snapshot = host.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].tag, "section");
    let entries = log.entries();
    assert_eq!(entries.iter().filter(|e| *e == &"mount:outer".to_string()).count(), 1);
    assert_eq!(entries.iter().filter(|e| *e == &"mount:inner".to_string()).count(), 1);
}
