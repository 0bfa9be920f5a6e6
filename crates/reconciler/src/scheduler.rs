//! The scheduler and work loop.
//!
//! State machine per root: Idle -> Rendering -> (Yielded | Completed) ->
//! Committing -> Idle.
//!
//! Invariants:
//! - All tree mutation is serialized through `&mut Engine`; while a pass
//!   or commit is active, new update requests only adjust priorities and
//!   queues and become visible on the next turn of the loop.
//! - The budget poll inside the work loop is the engine's sole suspension
//!   point.
//! - A synchronous request discards an in-flight lower-priority cursor by
//!   restarting from the root at the higher priority.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use element::{Component, Element, StateMap, UpdateSink, Updater};
use host_api::{HostAdapter, RenderBudget};

use crate::begin::BeginOutcome;
use crate::clock::{ExpirationTime, compute_async_expiration, compute_interactive_expiration};
use crate::node::{EffectTag, NodeArena, NodeId, NodeKind, QueueId, WorkNode};
use crate::update_queue::{NodeState, Update, UpdateQueue};

#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    /// A render step reported `Suspended` with no boundary up the chain.
    UnhandledSuspension,
    /// The targeted node handle does not name a live work node.
    UnknownNode(u32),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnhandledSuspension => {
                write!(f, "suspension signal with no boundary above it")
            }
            EngineError::UnknownNode(id) => write!(f, "unknown work node handle {id}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Tunables for the work loop.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Budget floor below which a yieldy pass stops and preserves its
    /// cursor (the time heuristic for one unit of work).
    pub yield_threshold: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            yield_threshold: Duration::from_millis(1),
        }
    }
}

/// All mutable scheduler state, one explicit object.
pub(crate) struct SchedulerState {
    pub is_rendering: bool,
    pub is_working: bool,
    pub is_committing: bool,
    pub is_batching_updates: bool,
    pub is_batching_interactive: bool,
    pub deadline_did_expire: bool,
    pub work_scheduled: bool,

    pub start_ms: u64,
    pub current_renderer_time: ExpirationTime,
    pub current_scheduler_time: ExpirationTime,

    pub next_unit_of_work: Option<NodeId>,
    pub next_render_expiration: ExpirationTime,
}

impl SchedulerState {
    fn new(start_ms: u64) -> SchedulerState {
        SchedulerState {
            is_rendering: false,
            is_working: false,
            is_committing: false,
            is_batching_updates: false,
            is_batching_interactive: false,
            deadline_did_expire: false,
            work_scheduled: false,
            start_ms,
            current_renderer_time: ExpirationTime::from_ms(0),
            current_scheduler_time: ExpirationTime::from_ms(0),
            next_unit_of_work: None,
            next_render_expiration: ExpirationTime::NONE,
        }
    }
}

/// The single active root.
pub(crate) struct RootState<H: HostAdapter> {
    pub container: H::Container,
    /// The current host-root node; flipped to the finished tree at commit.
    pub node: NodeId,
    /// A completed but not yet committed work-in-progress tree.
    pub finished_work: Option<NodeId>,
    pub expiration_time: ExpirationTime,
}

pub struct Engine<H: HostAdapter> {
    pub(crate) host: H,
    pub(crate) config: EngineConfig,
    pub(crate) arena: NodeArena<H>,
    pub(crate) queues: Vec<Option<UpdateQueue>>,
    pub(crate) instances: Vec<Option<Box<dyn Component>>>,
    pub(crate) root: RootState<H>,
    pub(crate) sched: SchedulerState,
    /// Boundaries whose awaited value has settled, awaiting re-request.
    pub(crate) retry_inbox: Rc<RefCell<Vec<NodeId>>>,
}

impl<H: HostAdapter> Engine<H> {
    pub fn new(host: H, container: H::Container) -> Engine<H> {
        Engine::with_config(host, container, EngineConfig::default())
    }

    pub fn with_config(host: H, container: H::Container, config: EngineConfig) -> Engine<H> {
        let start_ms = host.now_ms();
        let mut arena = NodeArena::new();
        let mut root_node = WorkNode::new(NodeKind::Root, element::Props::default());
        root_node.memoized_state = NodeState::Root { element: None };
        let node = arena.alloc(root_node);
        Engine {
            host,
            config,
            arena,
            queues: Vec::new(),
            instances: Vec::new(),
            root: RootState {
                container,
                node,
                finished_work: None,
                expiration_time: ExpirationTime::NONE,
            },
            sched: SchedulerState::new(start_ms),
            retry_inbox: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Schedule `element` as the root's rendered tree and request work at
    /// the currently computed priority.
    pub fn update_container(&mut self, element: Element) -> Result<ExpirationTime, EngineError> {
        let current_time = self.request_current_time();
        let expiration = self.compute_expiration_for_update(current_time);
        let root_node = self.root.node;
        self.enqueue_update(root_node, Update::root_element(Rc::new(element)));
        self.schedule_work(root_node, expiration)?;
        Ok(expiration)
    }

    /// Entry point for the host's deferred callback.
    pub fn perform_deferred_work(&mut self, budget: &dyn RenderBudget) -> Result<(), EngineError> {
        self.perform_work(Some(budget))
    }

    /// Re-request work for every boundary whose awaited value settled.
    /// Hosts call this after settling awaitables; deferred passes also
    /// drain on entry.
    pub fn flush_settled(&mut self) -> Result<(), EngineError> {
        self.drain_retry_inbox()
    }

    /// Enqueue a partial-state update for `target`'s component and request
    /// work at the currently computed priority.
    pub fn apply_state_change(
        &mut self,
        target: Updater,
        partial: StateMap,
    ) -> Result<(), EngineError> {
        let node = NodeId(target.0);
        if !self.arena.contains(node) {
            return Err(EngineError::UnknownNode(target.0));
        }
        let current_time = self.request_current_time();
        let expiration = self.compute_expiration_for_update(current_time);
        log::trace!(
            target: "weft.schedule",
            "state change for node {} at expiration {:?}",
            target.0,
            expiration
        );
        self.enqueue_update(node, Update::state(partial));
        self.schedule_work(node, expiration)
    }

    // ---- time ----

    pub(crate) fn recompute_renderer_time(&mut self) {
        let elapsed = self.host.now_ms().saturating_sub(self.sched.start_ms);
        self.sched.current_renderer_time = ExpirationTime::from_ms(elapsed);
    }

    /// Lazily queried current time; frozen while a pass is rendering so
    /// updates issued in one synchronous scope agree on priority.
    pub(crate) fn request_current_time(&mut self) -> ExpirationTime {
        if self.sched.is_rendering {
            return self.sched.current_scheduler_time;
        }
        if !self.sched.work_scheduled {
            self.recompute_renderer_time();
            self.sched.current_scheduler_time = self.sched.current_renderer_time;
        }
        self.sched.current_scheduler_time
    }

    pub(crate) fn compute_expiration_for_update(
        &self,
        current_time: ExpirationTime,
    ) -> ExpirationTime {
        if self.sched.is_working {
            if self.sched.is_committing {
                // Updates raised from commit-phase lifecycle hooks run
                // synchronously on the next turn.
                ExpirationTime::SYNC
            } else {
                self.sched.next_render_expiration
            }
        } else if self.sched.is_batching_interactive {
            compute_interactive_expiration(current_time)
        } else {
            compute_async_expiration(current_time)
        }
    }

    // ---- update plumbing ----

    pub(crate) fn enqueue_update(&mut self, node: NodeId, update: Update) {
        let queue_id = match self.arena.node(node).queue {
            Some(queue_id) => queue_id,
            None => {
                let base = self.arena.node(node).memoized_state.clone();
                let queue_id = QueueId(self.queues.len() as u32);
                self.queues.push(Some(UpdateQueue::new(base)));
                self.arena.node_mut(node).queue = Some(queue_id);
                let alternate = self.arena.node(node).alternate;
                if let Some(alternate) = alternate {
                    self.arena.node_mut(alternate).queue = Some(queue_id);
                }
                queue_id
            }
        };
        if let Some(queue) = self.queues[queue_id.index()].as_mut() {
            queue.append(update);
        }
    }

    /// Fold `node`'s queue (if any) into its memoized state and reset its
    /// outstanding priority.
    pub(crate) fn process_update_queue(&mut self, node: NodeId) {
        let Some(queue_id) = self.arena.node(node).queue else {
            return;
        };
        let Some(queue) = self.queues[queue_id.index()].as_mut() else {
            return;
        };
        let result = queue.process();
        let work_node = self.arena.node_mut(node);
        work_node.memoized_state = result;
        work_node.expiration_time = ExpirationTime::NONE;
    }

    /// Lower the stored priority of `node`, its alternate, and the root,
    /// then ask the scheduler to run.
    pub(crate) fn schedule_work(
        &mut self,
        node: NodeId,
        expiration: ExpirationTime,
    ) -> Result<(), EngineError> {
        self.arena.node_mut(node).expiration_time.bump(expiration);
        let alternate = self.arena.node(node).alternate;
        if let Some(alternate) = alternate {
            self.arena
                .node_mut(alternate)
                .expiration_time
                .bump(expiration);
        }
        self.root.expiration_time.bump(expiration);
        self.request_work(self.root.expiration_time)
    }

    fn request_work(&mut self, expiration: ExpirationTime) -> Result<(), EngineError> {
        self.sched.work_scheduled = true;
        if self.sched.is_rendering {
            return Ok(());
        }
        if self.sched.is_batching_updates {
            return Ok(());
        }
        if expiration == ExpirationTime::SYNC {
            self.perform_sync_work()
        } else {
            self.schedule_callback_for(expiration);
            Ok(())
        }
    }

    pub(crate) fn schedule_callback_for(&mut self, expiration: ExpirationTime) {
        let elapsed = self.host.now_ms().saturating_sub(self.sched.start_ms);
        let timeout_ms = expiration.to_ms().saturating_sub(elapsed);
        log::trace!(
            target: "weft.schedule",
            "deferred callback requested in {timeout_ms} ms"
        );
        self.host
            .schedule_deferred_callback(Duration::from_millis(timeout_ms));
    }

    pub(crate) fn perform_sync_work(&mut self) -> Result<(), EngineError> {
        self.perform_work(None)
    }

    fn drain_retry_inbox(&mut self) -> Result<(), EngineError> {
        loop {
            let pending: Vec<NodeId> = self.retry_inbox.borrow_mut().drain(..).collect();
            if pending.is_empty() {
                return Ok(());
            }
            for boundary in pending {
                let current_time = self.request_current_time();
                let expiration = self.compute_expiration_for_update(current_time);
                log::trace!(
                    target: "weft.schedule",
                    "retrying boundary {} at expiration {:?}",
                    boundary.0,
                    expiration
                );
                self.schedule_work(boundary, expiration)?;
            }
        }
    }

    // ---- the work loop ----

    fn perform_work(&mut self, budget: Option<&dyn RenderBudget>) -> Result<(), EngineError> {
        self.drain_retry_inbox()?;
        if budget.is_some() {
            self.recompute_renderer_time();
            self.sched.current_scheduler_time = self.sched.current_renderer_time;
            while self.sched.work_scheduled
                && (!self.sched.deadline_did_expire || self.root_has_expired())
            {
                let expired = self.root_has_expired();
                self.perform_work_on_root(expired, budget)?;
                self.recompute_renderer_time();
                self.sched.current_scheduler_time = self.sched.current_renderer_time;
            }
        } else {
            while self.sched.work_scheduled {
                self.perform_work_on_root(true, None)?;
            }
        }
        if self.sched.work_scheduled {
            self.schedule_callback_for(self.root.expiration_time);
        }
        self.sched.deadline_did_expire = false;
        Ok(())
    }

    fn root_has_expired(&self) -> bool {
        self.root
            .expiration_time
            .has_expired_at(self.sched.current_renderer_time)
    }

    fn perform_work_on_root(
        &mut self,
        expired: bool,
        budget: Option<&dyn RenderBudget>,
    ) -> Result<(), EngineError> {
        self.sched.is_rendering = true;
        let result = self.perform_work_on_root_inner(expired, budget);
        self.sched.is_rendering = false;
        result
    }

    fn perform_work_on_root_inner(
        &mut self,
        expired: bool,
        budget: Option<&dyn RenderBudget>,
    ) -> Result<(), EngineError> {
        if let Some(finished) = self.root.finished_work {
            // A previous yieldy pass finished but did not commit.
            self.complete_root(finished);
            return Ok(());
        }
        if expired {
            self.render_root(false, budget)?;
            if let Some(finished) = self.root.finished_work {
                self.complete_root(finished);
            }
        } else {
            self.render_root(true, budget)?;
            if let Some(finished) = self.root.finished_work {
                if self.should_yield(budget) {
                    // Out of budget: leave the finished tree pending for
                    // the next scheduling slot.
                    log::trace!(target: "weft.schedule", "finished tree held for next slot");
                } else {
                    self.complete_root(finished);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn should_yield(&mut self, budget: Option<&dyn RenderBudget>) -> bool {
        if self.sched.deadline_did_expire {
            return true;
        }
        let Some(budget) = budget else {
            return false;
        };
        if budget.remaining() > self.config.yield_threshold {
            return false;
        }
        self.sched.deadline_did_expire = true;
        true
    }

    fn render_root(
        &mut self,
        yieldy: bool,
        budget: Option<&dyn RenderBudget>,
    ) -> Result<(), EngineError> {
        self.sched.is_working = true;
        let expiration = self.root.expiration_time;
        if expiration != self.sched.next_render_expiration
            || self.sched.next_unit_of_work.is_none()
        {
            // Fresh pass; an in-flight cursor at another priority is
            // abandoned along with its partial tree.
            self.sched.next_render_expiration = expiration;
            let root_wip = self.create_work_in_progress(self.root.node, None, expiration);
            self.sched.next_unit_of_work = Some(root_wip);
            log::debug!(
                target: "weft.schedule",
                "render pass started at expiration {:?} (yieldy: {yieldy})",
                expiration
            );
        }
        let result = self.work_loop(yieldy, budget);
        self.sched.is_working = false;
        result?;
        if self.sched.next_unit_of_work.is_some() {
            // Yielded; the cursor resumes on the next slot.
            return Ok(());
        }
        self.root.finished_work = self.arena.node(self.root.node).alternate;
        Ok(())
    }

    fn work_loop(
        &mut self,
        yieldy: bool,
        budget: Option<&dyn RenderBudget>,
    ) -> Result<(), EngineError> {
        while let Some(unit) = self.sched.next_unit_of_work {
            if yieldy && self.should_yield(budget) {
                break;
            }
            self.sched.next_unit_of_work = self.perform_unit_of_work(unit)?;
        }
        Ok(())
    }

    fn perform_unit_of_work(&mut self, unit: NodeId) -> Result<Option<NodeId>, EngineError> {
        let next = match self.begin_work(unit)? {
            BeginOutcome::Next(next) => next,
            BeginOutcome::Suspended(awaitable) => {
                self.raise_suspension(unit, awaitable)?;
                None
            }
        };
        match next {
            Some(child) => Ok(Some(child)),
            None => self.complete_unit_of_work(unit),
        }
    }

    // ---- double buffering ----

    /// Create (or reuse) the work-in-progress alternate of `current`.
    ///
    /// `pending_props: None` carries the current side's pending props and
    /// expiration; `Some(props)` installs the new snapshot and stamps the
    /// render expiration.
    pub(crate) fn create_work_in_progress(
        &mut self,
        current: NodeId,
        pending_props: Option<element::Props>,
        expiration: ExpirationTime,
    ) -> NodeId {
        let wip = match self.arena.node(current).alternate {
            Some(existing) => {
                let node = self.arena.node_mut(existing);
                node.effect_tag = EffectTag::empty();
                node.next_effect = None;
                node.first_effect = None;
                node.last_effect = None;
                node.host_patch = None;
                node.snapshot = None;
                existing
            }
            None => {
                let kind = self.arena.node(current).kind.clone();
                let fresh: WorkNode<H> = WorkNode::new(kind, element::Props::default());
                let id = self.arena.alloc(fresh);
                self.arena.node_mut(id).alternate = Some(current);
                self.arena.node_mut(current).alternate = Some(id);
                id
            }
        };

        // Slots shared by the pair may have moved since the pair was
        // created; mirror them from the current side.
        let (instance, queue, host_instance) = {
            let cur = self.arena.node(current);
            (cur.instance, cur.queue, cur.host_instance.clone())
        };
        let (carried_props, carried_expiration) = {
            let cur = self.arena.node(current);
            (cur.pending_props.clone(), cur.expiration_time)
        };
        let (child, sibling, memo_props, memo_state) = {
            let cur = self.arena.node(current);
            (
                cur.child,
                cur.sibling,
                cur.memoized_props.clone(),
                cur.memoized_state.clone(),
            )
        };

        let node = self.arena.node_mut(wip);
        node.instance = instance;
        node.queue = queue;
        node.host_instance = host_instance;
        match pending_props {
            Some(props) => {
                node.pending_props = props;
                node.expiration_time = expiration;
            }
            None => {
                node.pending_props = carried_props;
                node.expiration_time = carried_expiration;
            }
        }
        node.child = child;
        node.sibling = sibling;
        node.memoized_props = memo_props;
        node.memoized_state = memo_state;
        wip
    }

    /// Bailout path: clone the current children under `wip` unchanged.
    pub(crate) fn clone_child_nodes(&mut self, wip: NodeId) {
        let Some(first) = self.arena.node(wip).child else {
            return;
        };
        let expiration = self.sched.next_render_expiration;
        let mut current_child = first;
        let mut new_child = self.create_work_in_progress(current_child, None, expiration);
        self.arena.node_mut(wip).child = Some(new_child);
        self.arena.node_mut(new_child).parent = Some(wip);
        while let Some(sibling) = self.arena.node(current_child).sibling {
            current_child = sibling;
            let cloned = self.create_work_in_progress(sibling, None, expiration);
            self.arena.node_mut(new_child).sibling = Some(cloned);
            self.arena.node_mut(cloned).parent = Some(wip);
            new_child = cloned;
        }
        self.arena.node_mut(new_child).sibling = None;
    }
}

impl<H: HostAdapter> UpdateSink for Engine<H> {
    fn request_state_change(&mut self, updater: Updater, partial: StateMap) {
        // Lifecycle hooks reach this while a pass or commit is active, so
        // the request can only adjust priorities and queues; errors are
        // impossible on that path.
        if let Err(err) = self.apply_state_change(updater, partial) {
            log::error!(target: "weft.schedule", "dropped state change: {err}");
        }
    }
}
