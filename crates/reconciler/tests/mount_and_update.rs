mod common;

use std::rc::Rc;
use std::sync::Arc;

use common::{Log, ViewType, pump};
use element::{Children, Element, Props, Rendered, StateMap, Value};
use host_headless::{HeadlessHost, HostOp, RootContainer};
use reconciler::Engine;

fn list_view(log: &Log, initial: StateMap) -> Arc<ViewType> {
    Arc::new(ViewType {
        name: "view",
        initial,
        log: log.clone(),
        render_with: Rc::new(|_ctx, _props, state| {
            let class = state.text("class").unwrap_or("plain").to_string();
            Rendered::Ready(Children::one(Element::host(
                "div",
                Props::new()
                    .attr("class", Value::text(class))
                    .children(Children::list(vec![
                        Element::host(
                            "h1",
                            Props::new().children(Children::text("hello")),
                        ),
                        Element::host(
                            "p",
                            Props::new().children(Children::text("body")),
                        ),
                    ])),
            )))
        }),
    })
}

#[test]
fn initial_mount_builds_the_host_tree_bottom_up() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);

    let ty = list_view(&log, StateMap::new());
    engine
        .update_container(Element::component(ty, Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");

    let snapshot = host.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].tag, "div");
    assert_eq!(snapshot[0].attrs, vec![("class".to_string(), "plain".to_string())]);
    let children: Vec<&str> = snapshot[0]
        .children
        .iter()
        .map(|child| child.tag.as_str())
        .collect();
    assert_eq!(children, ["h1", "p"]);
    // Scalar children took the text fast path: no text nodes, only text
    // content.
    assert_eq!(snapshot[0].children[0].text.as_deref(), Some("hello"));

    let serialized: serde_json::Value =
        serde_json::from_str(&host.snapshot_json()).expect("valid snapshot json");
    assert_eq!(serialized[0]["children"][1]["text"], "body");

    // Children are created and finalized before their parent attaches
    // them, and the single container append comes last.
    let journal = host.journal();
    let create_order: Vec<&str> = journal
        .iter()
        .filter_map(|op| match op {
            HostOp::CreateInstance { tag, .. } => Some(tag.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(create_order, ["h1", "p", "div"]);
    let appends_to_container = journal
        .iter()
        .filter(|op| matches!(op, HostOp::AppendToContainer { .. }))
        .count();
    assert_eq!(appends_to_container, 1);
}

#[test]
fn state_change_commits_a_precomputed_property_patch() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);

    let ty = list_view(&log, StateMap::new());
    engine
        .update_container(Element::component(ty, Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");
    host.take_journal();
    log.take();

    let view = engine.find_component_by_name("view").expect("view node");
    engine
        .apply_state_change(view, StateMap::new().with("class", Value::text("wide")))
        .expect("state change");
    pump(&mut engine, &host).expect("update pass");

    let div = engine.find_host_by_tag("div").expect("div node");
    let key = engine.host_instance_at(div).expect("div instance");
    assert_eq!(host.attr_of(key, "class").as_deref(), Some("wide"));

    // One re-render, one host update, nothing recreated.
    assert_eq!(log.entries(), ["render:view"]);
    let journal = host.journal();
    assert!(journal.iter().any(|op| matches!(op, HostOp::CommitUpdate { key: k } if *k == key)));
    assert!(
        !journal
            .iter()
            .any(|op| matches!(op, HostOp::CreateInstance { .. }))
    );
}

#[test]
fn identical_state_bails_out_without_host_traffic() {
    let log = Log::new();
    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);

    let ty = list_view(&log, StateMap::new().with("class", Value::text("fixed")));
    engine
        .update_container(Element::component(ty, Props::new()))
        .expect("mount request");
    pump(&mut engine, &host).expect("mount pass");
    host.take_journal();
    log.take();

    let view = engine.find_component_by_name("view").expect("view node");
    engine
        .apply_state_change(view, StateMap::new().with("class", Value::text("fixed")))
        .expect("state change");
    pump(&mut engine, &host).expect("update pass");

    // The folded state is unchanged, so the component bails out and no
    // host mutation is committed.
    assert_eq!(log.entries(), Vec::<String>::new());
    let mutations = host
        .journal()
        .into_iter()
        .filter(|op| {
            !matches!(op, HostOp::ScheduleCallback { .. })
        })
        .count();
    assert_eq!(mutations, 0);
}
