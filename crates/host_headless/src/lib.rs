//! A headless host adapter: an arena-backed document, an op journal, a
//! manual clock, and a deferred-callback queue.
//!
//! The host is a cheap-clone handle over shared interior state, so a
//! test can keep a view of the document after handing the adapter to the
//! engine.

mod deferred;
mod journal;
mod snapshot;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use element::{Props, Value};
use host_api::HostAdapter;

pub use crate::deferred::{CountdownBudget, Deferred};
pub use crate::journal::{HostOp, HostPatch};
pub use crate::snapshot::NodeSnapshot;
pub use host_api::UnlimitedBudget;

/// Stable identity of one host node within the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostKey(pub u32);

pub(crate) struct HostNode {
    pub tag: Arc<str>,
    pub attrs: Vec<(Arc<str>, String)>,
    pub text: Option<String>,
    pub children: Vec<HostKey>,
}

#[derive(Default)]
pub(crate) struct Doc {
    pub now_ms: u64,
    pub nodes: Vec<HostNode>,
    pub container: Vec<HostKey>,
    pub journal: Vec<HostOp>,
    pub scheduled: Vec<u64>,
}

/// The mount container handle; the document root's children live behind
/// the shared host state.
pub struct RootContainer;

#[derive(Clone, Default)]
pub struct HeadlessHost {
    doc: Rc<RefCell<Doc>>,
}

impl HeadlessHost {
    pub fn new() -> HeadlessHost {
        HeadlessHost::default()
    }

    pub fn advance_clock(&self, ms: u64) {
        self.doc.borrow_mut().now_ms += ms;
    }

    pub fn journal(&self) -> Vec<HostOp> {
        self.doc.borrow().journal.clone()
    }

    pub fn take_journal(&self) -> Vec<HostOp> {
        std::mem::take(&mut self.doc.borrow_mut().journal)
    }

    /// Timeouts of deferred callbacks the engine has requested and the
    /// test has not yet fired.
    pub fn scheduled_callbacks(&self) -> Vec<u64> {
        self.doc.borrow().scheduled.clone()
    }

    pub fn take_scheduled_callbacks(&self) -> Vec<u64> {
        std::mem::take(&mut self.doc.borrow_mut().scheduled)
    }

    pub fn tag_of(&self, key: HostKey) -> Option<Arc<str>> {
        self.doc
            .borrow()
            .nodes
            .get(key.0 as usize)
            .map(|node| Arc::clone(&node.tag))
    }

    pub fn text_of(&self, key: HostKey) -> Option<String> {
        self.doc
            .borrow()
            .nodes
            .get(key.0 as usize)
            .and_then(|node| node.text.clone())
    }

    pub fn attr_of(&self, key: HostKey, name: &str) -> Option<String> {
        self.doc.borrow().nodes.get(key.0 as usize).and_then(|node| {
            node.attrs
                .iter()
                .find(|(attr, _)| &**attr == name)
                .map(|(_, value)| value.clone())
        })
    }

    pub fn container_children(&self) -> Vec<HostKey> {
        self.doc.borrow().container.clone()
    }

    fn apply_props(&self, key: HostKey, props: &Props) {
        let mut doc = self.doc.borrow_mut();
        let Some(node) = doc.nodes.get_mut(key.0 as usize) else {
            return;
        };
        node.attrs = props
            .entries()
            .iter()
            .map(|(name, value)| (Arc::clone(name), render_value(value)))
            .collect();
        node.text = props.child_text().map(String::from);
    }
}

pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Text(text) => text.to_string(),
        Value::Number(number) => {
            if number.fract() == 0.0 && number.is_finite() {
                format!("{}", *number as i64)
            } else {
                format!("{number}")
            }
        }
        Value::Bool(flag) => flag.to_string(),
    }
}

impl HostAdapter for HeadlessHost {
    type Instance = HostKey;
    type Container = RootContainer;
    type Patch = HostPatch;

    fn now_ms(&self) -> u64 {
        self.doc.borrow().now_ms
    }

    fn should_set_text_content(&self, _tag: &str, props: &Props) -> bool {
        props.child_text().is_some()
    }

    fn create_instance(&mut self, tag: &str, _props: &Props) -> HostKey {
        let mut doc = self.doc.borrow_mut();
        let key = HostKey(doc.nodes.len() as u32);
        doc.nodes.push(HostNode {
            tag: tag.into(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        });
        doc.journal.push(HostOp::CreateInstance {
            key,
            tag: tag.to_string(),
        });
        key
    }

    fn append_initial_child(&mut self, parent: &HostKey, child: &HostKey) {
        let mut doc = self.doc.borrow_mut();
        if let Some(node) = doc.nodes.get_mut(parent.0 as usize) {
            node.children.push(*child);
        }
        doc.journal.push(HostOp::AppendInitialChild {
            parent: *parent,
            child: *child,
        });
    }

    fn finalize_initial_children(&mut self, instance: &HostKey, props: &Props) {
        self.apply_props(*instance, props);
        self.doc
            .borrow_mut()
            .journal
            .push(HostOp::FinalizeInitialChildren { key: *instance });
    }

    fn prepare_update(&self, old_props: &Props, new_props: &Props) -> Option<HostPatch> {
        let mut patch = HostPatch::default();
        for (name, value) in new_props.entries() {
            if old_props.get(name) != Some(value) {
                patch.set.push((Arc::clone(name), render_value(value)));
            }
        }
        for (name, _) in old_props.entries() {
            if new_props.get(name).is_none() {
                patch.removed.push(Arc::clone(name));
            }
        }
        let old_text = old_props.child_text();
        let new_text = new_props.child_text();
        if old_text != new_text {
            patch.text = Some(new_text.map(String::from));
        }
        if patch.is_empty() { None } else { Some(patch) }
    }

    fn commit_update(&mut self, instance: &HostKey, patch: &HostPatch) {
        let mut doc = self.doc.borrow_mut();
        if let Some(node) = doc.nodes.get_mut(instance.0 as usize) {
            for (name, value) in &patch.set {
                match node.attrs.iter_mut().find(|(attr, _)| attr == name) {
                    Some(entry) => entry.1 = value.clone(),
                    None => node.attrs.push((Arc::clone(name), value.clone())),
                }
            }
            for name in &patch.removed {
                node.attrs.retain(|(attr, _)| attr != name);
            }
            if let Some(text) = &patch.text {
                node.text = text.clone();
            }
        }
        doc.journal.push(HostOp::CommitUpdate { key: *instance });
    }

    fn append_child(&mut self, parent: &HostKey, child: &HostKey) {
        let mut doc = self.doc.borrow_mut();
        if let Some(node) = doc.nodes.get_mut(parent.0 as usize) {
            node.children.push(*child);
        }
        doc.journal.push(HostOp::AppendChild {
            parent: *parent,
            child: *child,
        });
    }

    fn append_child_to_container(&mut self, _container: &RootContainer, child: &HostKey) {
        let mut doc = self.doc.borrow_mut();
        doc.container.push(*child);
        doc.journal.push(HostOp::AppendToContainer { child: *child });
    }

    fn remove_child(&mut self, parent: &HostKey, child: &HostKey) {
        let mut doc = self.doc.borrow_mut();
        if let Some(node) = doc.nodes.get_mut(parent.0 as usize) {
            node.children.retain(|existing| existing != child);
        }
        doc.journal.push(HostOp::RemoveChild {
            parent: *parent,
            child: *child,
        });
    }

    fn remove_child_from_container(&mut self, _container: &RootContainer, child: &HostKey) {
        let mut doc = self.doc.borrow_mut();
        doc.container.retain(|existing| existing != child);
        doc.journal.push(HostOp::RemoveFromContainer { child: *child });
    }

    fn schedule_deferred_callback(&mut self, timeout: Duration) {
        let mut doc = self.doc.borrow_mut();
        let timeout_ms = timeout.as_millis() as u64;
        doc.scheduled.push(timeout_ms);
        doc.journal.push(HostOp::ScheduleCallback { timeout_ms });
    }
}
