mod common;

use std::rc::Rc;
use std::sync::Arc;

use common::{Log, ViewType, pump};
use element::{Children, Element, Props, Rendered, StateMap, Value};
use host_headless::{HeadlessHost, HostOp, RootContainer};
use reconciler::Engine;

/// A view whose children are three labeled items, shrinking to two when
/// state `shrink` is set, and swapping the head for a different tag when
/// state `swap` is set.
fn item_list(log: &Log) -> Arc<ViewType> {
    Arc::new(ViewType {
        name: "list",
        initial: StateMap::new(),
        log: log.clone(),
        render_with: Rc::new(|_ctx, _props, state| {
            let shrink = state.get("shrink").is_some();
            let swap = state.get("swap").is_some();
            let mut items = Vec::new();
            if swap {
                items.push(Element::host(
                    "p",
                    Props::new().children(Children::text("x")),
                ));
            } else {
                items.push(Element::host(
                    "span",
                    Props::new().children(Children::text("a")),
                ));
            }
            items.push(Element::host(
                "li",
                Props::new().children(Children::text("b")),
            ));
            if !shrink {
                items.push(Element::host(
                    "li",
                    Props::new().children(Children::text("c")),
                ));
            }
            Rendered::Ready(Children::one(Element::host(
                "ul",
                Props::new().children(Children::list(items)),
            )))
        }),
    })
}

fn mounted(log: &Log) -> (Engine<HeadlessHost>, HeadlessHost) {
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    engine
        .update_container(Element::component(item_list(log), Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");
    (engine, host)
}

#[test]
fn surplus_previous_siblings_are_all_deleted() {
    let log = Log::new();
    let (mut engine, host) = mounted(&log);
    host.take_journal();

    let list = engine.find_component_by_name("list").expect("list node");
    engine
        .apply_state_change(list, StateMap::new().with("shrink", Value::bool(true)))
        .expect("state change");
    pump(&mut engine, &host).expect("update pass");

    let snapshot = host.snapshot();
    let tags: Vec<&str> = snapshot[0]
        .children
        .iter()
        .map(|child| child.tag.as_str())
        .collect();
    assert_eq!(tags, ["span", "li"]);

    // Exactly one removal and no creations: the two surviving positions
    // were reused in place.
    let journal = host.journal();
    let removals = journal
        .iter()
        .filter(|op| matches!(op, HostOp::RemoveChild { .. }))
        .count();
    assert_eq!(removals, 1);
    assert!(
        !journal
            .iter()
            .any(|op| matches!(op, HostOp::CreateInstance { .. }))
    );
}

#[test]
fn type_mismatch_at_a_position_deletes_then_places() {
    let log = Log::new();
    let (mut engine, host) = mounted(&log);
    host.take_journal();

    let list = engine.find_component_by_name("list").expect("list node");
    engine
        .apply_state_change(list, StateMap::new().with("swap", Value::bool(true)))
        .expect("state change");
    pump(&mut engine, &host).expect("update pass");

    let snapshot = host.snapshot();
    let tags: Vec<&str> = snapshot[0]
        .children
        .iter()
        .map(|child| child.tag.as_str())
        .collect();
    assert_eq!(tags, ["li", "li", "p"]);

    // The old head is removed before the replacement is attached, so the
    // position never holds two nodes at once.
    let journal = host.journal();
    let removal_at = journal
        .iter()
        .position(|op| matches!(op, HostOp::RemoveChild { .. }))
        .expect("removal recorded");
    let append_at = journal
        .iter()
        .position(|op| matches!(op, HostOp::AppendChild { .. }))
        .expect("placement recorded");
    assert!(removal_at < append_at, "deletion must precede placement");

    let created: Vec<&str> = journal
        .iter()
        .filter_map(|op| match op {
            HostOp::CreateInstance { tag, .. } => Some(tag.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(created, ["p"]);
}

#[test]
fn positional_reuse_carries_new_text_through_updates() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    let ty = Arc::new(ViewType {
        name: "labels",
        initial: StateMap::new().with("suffix", Value::text("one")),
        log: log.clone(),
        render_with: Rc::new(|_ctx, _props, state| {
            let suffix = state.text("suffix").unwrap_or("").to_string();
            Rendered::Ready(Children::list(vec![
                Element::host(
                    "p",
                    Props::new().children(Children::text(format!("first-{suffix}"))),
                ),
                Element::host(
                    "p",
                    Props::new().children(Children::text(format!("second-{suffix}"))),
                ),
            ]))
        }),
    });
    engine
        .update_container(Element::component(ty, Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");
    host.take_journal();

    let labels = engine.find_component_by_name("labels").expect("labels");
    engine
        .apply_state_change(labels, StateMap::new().with("suffix", Value::text("two")))
        .expect("state change");
    pump(&mut engine, &host).expect("update pass");

    let snapshot = host.snapshot();
    let texts: Vec<Option<&str>> = snapshot.iter().map(|node| node.text.as_deref()).collect();
    assert_eq!(texts, [Some("first-two"), Some("second-two")]);

    // Both updates applied to the reused instances.
    let updates = host
        .journal()
        .into_iter()
        .filter(|op| matches!(op, HostOp::CommitUpdate { .. }))
        .count();
    assert_eq!(updates, 2);
}
