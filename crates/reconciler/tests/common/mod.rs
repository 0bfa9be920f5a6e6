#![allow(dead_code)]

use std::any::TypeId;
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use element::{
    Children, Component, ComponentType, LifecycleCtx, Props, RenderCtx, Rendered, StateMap, Value,
};
use host_headless::{HeadlessHost, UnlimitedBudget};
use reconciler::Engine;

/// Shared event log for lifecycle assertions.
#[derive(Clone, Default)]
pub struct Log {
    entries: Rc<RefCell<Vec<String>>>,
}

impl Log {
    pub fn new() -> Log {
        Log::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut self.entries.borrow_mut())
    }

    pub fn count_of(&self, entry: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|existing| existing.as_str() == entry)
            .count()
    }
}

/// A pass-through component that logs every lifecycle step. All probes
/// share one type token, so probes match each other positionally.
pub struct ProbeType {
    pub name: &'static str,
    pub log: Log,
}

impl ComponentType for ProbeType {
    fn name(&self) -> &str {
        self.name
    }

    fn instantiate(&self, _props: &Props) -> Box<dyn Component> {
        Box::new(Probe {
            name: self.name,
            log: self.log.clone(),
        })
    }

    fn type_token(&self) -> TypeId {
        TypeId::of::<ProbeType>()
    }
}

pub struct Probe {
    name: &'static str,
    log: Log,
}

impl Component for Probe {
    fn render(&self, _ctx: &RenderCtx, props: &Props, _state: &StateMap) -> Rendered {
        self.log.push(format!("render:{}", self.name));
        Rendered::Ready(props.child_spec().clone())
    }

    fn before_update(&self, _prev_props: &Props, _prev_state: &StateMap) -> Option<Value> {
        self.log.push(format!("snapshot:{}", self.name));
        Some(Value::text(self.name))
    }

    fn on_mount(&mut self, _ctx: &mut LifecycleCtx<'_>) {
        self.log.push(format!("mount:{}", self.name));
    }

    fn on_update(
        &mut self,
        _prev_props: &Props,
        _prev_state: &StateMap,
        snapshot: Option<Value>,
        _ctx: &mut LifecycleCtx<'_>,
    ) {
        match snapshot {
            Some(value) => self.log.push(format!(
                "update:{}:{}",
                self.name,
                value.as_text().unwrap_or("")
            )),
            None => self.log.push(format!("update:{}", self.name)),
        }
    }

    fn on_unmount(&mut self) {
        self.log.push(format!("unmount:{}", self.name));
    }
}

/// A stateful component rendering whatever `render_with` produces for
/// its current state; the workhorse for state-driven tests.
pub struct ViewType {
    pub name: &'static str,
    pub initial: StateMap,
    pub render_with: Rc<dyn Fn(&RenderCtx, &Props, &StateMap) -> Rendered>,
    pub log: Log,
}

impl ComponentType for ViewType {
    fn name(&self) -> &str {
        self.name
    }

    fn instantiate(&self, _props: &Props) -> Box<dyn Component> {
        Box::new(View {
            name: self.name,
            initial: self.initial.clone(),
            render_with: Rc::clone(&self.render_with),
            log: self.log.clone(),
        })
    }

    fn type_token(&self) -> TypeId {
        TypeId::of::<ViewType>()
    }
}

pub struct View {
    name: &'static str,
    initial: StateMap,
    render_with: Rc<dyn Fn(&RenderCtx, &Props, &StateMap) -> Rendered>,
    log: Log,
}

impl Component for View {
    fn initial_state(&self) -> StateMap {
        self.initial.clone()
    }

    fn render(&self, ctx: &RenderCtx, props: &Props, state: &StateMap) -> Rendered {
        self.log.push(format!("render:{}", self.name));
        (self.render_with)(ctx, props, state)
    }

    fn on_unmount(&mut self) {
        self.log.push(format!("unmount:{}", self.name));
    }
}

/// Fire every deferred callback the engine has requested, to quiescence.
pub fn pump(engine: &mut Engine<HeadlessHost>, host: &HeadlessHost) -> Result<(), Box<dyn Error>> {
    for _ in 0..16 {
        if host.take_scheduled_callbacks().is_empty() {
            return Ok(());
        }
        host.advance_clock(16);
        engine.perform_deferred_work(&UnlimitedBudget)?;
    }
    Ok(())
}

pub fn text_child(text: &str) -> Children {
    Children::text(text.to_string())
}
