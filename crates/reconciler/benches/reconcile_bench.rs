use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use element::{Children, Element, Props, Rendered, StateMap, Value};
use host_headless::{HeadlessHost, RootContainer, UnlimitedBudget};
use reconciler::Engine;

const WIDE: usize = 200;

mod fixtures {
    use super::*;
    use element::{Component, ComponentType, RenderCtx};
    use std::any::TypeId;

    pub struct RowsType;

    impl ComponentType for RowsType {
        fn name(&self) -> &str {
            "Rows"
        }

        fn instantiate(&self, _props: &Props) -> Box<dyn Component> {
            Box::new(Rows)
        }

        fn type_token(&self) -> TypeId {
            TypeId::of::<RowsType>()
        }
    }

    pub struct Rows;

    impl Component for Rows {
        fn initial_state(&self) -> StateMap {
            StateMap::new().with("generation", Value::number(0.0))
        }

        fn render(&self, _ctx: &RenderCtx, _props: &Props, state: &StateMap) -> Rendered {
            let generation = state.number("generation").unwrap_or(0.0);
            let rows: Vec<Element> = (0..WIDE)
                .map(|index| {
                    Element::host(
                        "li",
                        Props::new()
                            .attr("class", Value::text(format!("row-{}", index % 4)))
                            .children(Children::text(format!("{generation}-{index}"))),
                    )
                })
                .collect();
            Rendered::Ready(Children::one(Element::host(
                "ul",
                Props::new().children(Children::list(rows)),
            )))
        }
    }
}

fn pump(engine: &mut Engine<HeadlessHost>, host: &HeadlessHost) {
    for _ in 0..4 {
        if host.take_scheduled_callbacks().is_empty() {
            break;
        }
        let _ = engine.perform_deferred_work(&UnlimitedBudget);
    }
}

fn bench_initial_mount(c: &mut Criterion) {
    c.bench_function("bench_initial_mount_wide_list", |b| {
        b.iter(|| {
            let host = HeadlessHost::new();
            let mut engine = Engine::new(host.clone(), RootContainer);
            let _ = engine.update_container(Element::component(
                Arc::new(fixtures::RowsType),
                Props::new(),
            ));
            pump(&mut engine, &host);
            black_box(host.snapshot().len());
        });
    });
}

fn bench_rerender_in_place(c: &mut Criterion) {
    c.bench_function("bench_rerender_wide_list", |b| {
        let host = HeadlessHost::new();
        let mut engine = Engine::new(host.clone(), RootContainer);
        let _ = engine.update_container(Element::component(
            Arc::new(fixtures::RowsType),
            Props::new(),
        ));
        pump(&mut engine, &host);
        let rows = engine
            .find_component_by_name("Rows")
            .expect("rows component");
        let mut generation = 0.0;
        b.iter(|| {
            generation += 1.0;
            let _ = engine.apply_state_change(
                rows,
                StateMap::new().with("generation", Value::number(generation)),
            );
            pump(&mut engine, &host);
            black_box(host.journal().len());
        });
    });
}

criterion_group!(benches, bench_initial_mount, bench_rerender_in_place);
criterion_main!(benches);
