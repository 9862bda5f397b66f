use std::collections::BTreeSet;

use tracing::{debug, trace};

use abt_core::{AbtError, Bindings, ComputedRegistry, FactRef, Value, WorkingMemory};
use abt_lang::{BehaviorLibrary, ExecutionMode, Param, Step, StepKind, StepModifier};

use crate::executor::{ActionExecutor, ActionInvocation, ActionOutcome};
use crate::matcher;
use crate::tree::{
    ActionState, BehaviorState, ComputedActState, GoalState, ModifierState, NodeId, NodeKind,
    NodeStatus, Tree, WaitState,
};

/// Name of the implicit root goal planted at construction.
pub const INITIAL_GOAL: &str = "init_tree";

/// A reactive agent: behavior library, working memory, computed-function
/// registry, and the live execution tree, driven one decision cycle at a
/// time.
///
/// The agent is single-threaded and cooperative. Long-running work is
/// expressed purely as node status: an executing action is skipped by the
/// scheduler until the executor resolves it out-of-band. Note that a goal
/// whose candidate behaviors are exhausted stays open forever without
/// producing children; callers must ensure some behavior eventually
/// succeeds or retire the goal externally.
pub struct Agent<X: ActionExecutor> {
    library: BehaviorLibrary,
    wm: WorkingMemory,
    registry: ComputedRegistry,
    tree: Tree,
    executor: X,
}

impl<X: ActionExecutor> std::fmt::Debug for Agent<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent").finish_non_exhaustive()
    }
}

/// Expansion dispatch tag, detached from the node borrow.
enum Expandable {
    Goal,
    Sequential,
    Parallel,
    Action,
    Modifier,
    Wait,
    ComputedAct,
    Never,
}

impl<X: ActionExecutor> Agent<X> {
    /// Validates the library and plants the initial root goal.
    pub fn new(library: BehaviorLibrary, executor: X) -> Result<Self, AbtError> {
        library.validate()?;
        let mut tree = Tree::new();
        tree.insert(
            None,
            0,
            NodeStatus::Open,
            NodeKind::Goal(GoalState {
                name: INITIAL_GOAL,
                params: Vec::new(),
                attempted: BTreeSet::new(),
                spawned: false,
            }),
        );
        Ok(Self {
            library,
            wm: WorkingMemory::new(),
            registry: ComputedRegistry::new(),
            tree,
            executor,
        })
    }

    pub fn working_memory(&self) -> &WorkingMemory {
        &self.wm
    }

    pub fn add_fact(&mut self, fact: FactRef) {
        self.wm.add(fact);
    }

    pub fn remove_fact(&mut self, fact: &FactRef) {
        self.wm.remove(fact);
    }

    pub fn registry_mut(&mut self) -> &mut ComputedRegistry {
        &mut self.registry
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut X {
        &mut self.executor
    }

    /// Read-only view of the execution tree for external tooling.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// True once the root set is empty: there is nothing left to pursue.
    pub fn is_done(&self) -> bool {
        self.tree.roots().is_empty()
    }

    /// Out-of-band completion path for the executor. Returns false if the
    /// node was already discarded (e.g. pruned), in which case the report
    /// is simply dropped.
    pub fn resolve_action(&mut self, id: NodeId, outcome: ActionOutcome) -> bool {
        match self.tree.node_mut(id) {
            Some(node)
                if matches!(node.kind(), NodeKind::Action(_))
                    && node.status() == NodeStatus::Executing =>
            {
                node.set_status(terminal_status(outcome == ActionOutcome::Success));
                true
            }
            _ => false,
        }
    }

    /// Runs one decision cycle. Returns whether the tree changed.
    ///
    /// Configuration errors propagate out and terminate the cycle; the tree
    /// is left in its last consistent state, safe to inspect.
    pub fn tick(&mut self) -> Result<bool, AbtError> {
        if self.tree.roots().is_empty() {
            return Ok(false);
        }

        let mut changed = self.sweep_conditions()?;
        changed |= self.prune();
        changed |= self.collapse();

        if self.tree.roots().is_empty() {
            debug!("root set empty, agent is done");
            return Ok(changed);
        }

        for id in self.collect_open() {
            if self.expand(id)? {
                changed = true;
                break;
            }
        }
        Ok(changed)
    }

    /// The full update loop: ticks until one cycle reports no change, so
    /// structural cascades complete within a single external time-step.
    pub fn update(&mut self) -> Result<(), AbtError> {
        while self.tick()? {}
        Ok(())
    }

    /// Step 1: evaluate success/context conditions of executing behaviors.
    /// Success is checked first and wins if both would apply.
    fn sweep_conditions(&mut self) -> Result<bool, AbtError> {
        let mut changed = false;
        for id in self.tree.dfs_ids() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            if node.status() != NodeStatus::Executing {
                continue;
            }
            let NodeKind::Behavior(state) = node.kind() else {
                continue;
            };

            let mut forced = None;
            if !state.success_conditions.is_empty()
                && matcher::check(
                    &self.wm,
                    &mut self.registry,
                    &state.success_conditions,
                    &state.vars,
                )?
            {
                forced = Some(NodeStatus::Success);
            } else if !state.context_conditions.is_empty()
                && !matcher::check(
                    &self.wm,
                    &mut self.registry,
                    &state.context_conditions,
                    &state.vars,
                )?
            {
                forced = Some(NodeStatus::Failure);
            }

            if let Some(status) = forced {
                debug!(node = %id, ?status, "condition sweep forced behavior status");
                if let Some(node) = self.tree.node_mut(id) {
                    node.set_status(status);
                }
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Step 2: completed nodes shed their subtrees; every executing action
    /// underneath is reported to the executor as aborted.
    fn prune(&mut self) -> bool {
        let mut changed = false;
        for id in self.tree.dfs_ids() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            if !node.is_completed() || node.children().is_empty() {
                continue;
            }
            debug!(node = %id, "pruning subtree under completed node");
            let removed = self.tree.remove_descendants(id);
            for node in &removed {
                if node.status() != NodeStatus::Executing {
                    continue;
                }
                if let NodeKind::Action(state) = node.kind() {
                    if let Some(bound) = &state.bound {
                        self.executor.abort(&ActionInvocation {
                            node: node.id(),
                            name: state.name,
                            params: bound.clone(),
                        });
                    }
                }
            }
            changed = true;
        }
        changed
    }

    /// Step 3: childless completed nodes leave the tree; roots leave the
    /// root set, everything else reports to its parent's completion handler.
    fn collapse(&mut self) -> bool {
        let mut changed = false;
        for id in self.tree.dfs_ids() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            if !node.is_completed() || !node.children().is_empty() {
                continue;
            }
            let Some(node) = self.tree.remove(id) else {
                continue;
            };
            changed = true;
            match node.parent() {
                None => {
                    trace!(node = %id, "root completed");
                    if self.tree.roots().is_empty() {
                        break;
                    }
                }
                Some(parent) => {
                    self.child_completed(parent, node.status() == NodeStatus::Success)
                }
            }
        }
        changed
    }

    /// Step 4: open nodes, depth-first, skipping completed subtrees, ranked
    /// by descending priority with creation order breaking ties.
    fn collect_open(&self) -> Vec<NodeId> {
        let mut open = Vec::new();
        for &root in self.tree.roots() {
            self.collect_open_from(root, &mut open);
        }
        open.sort_by(|&a, &b| {
            let pa = self.tree.node(a).map(|n| n.priority()).unwrap_or(0);
            let pb = self.tree.node(b).map(|n| n.priority()).unwrap_or(0);
            pb.cmp(&pa).then(a.cmp(&b))
        });
        open
    }

    fn collect_open_from(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.tree.node(id) else {
            return;
        };
        if node.is_completed() {
            return;
        }
        if node.is_open() {
            out.push(id);
        }
        for &child in node.children() {
            self.collect_open_from(child, out);
        }
    }

    /// Step 5: attempt to expand one node. Returns whether it expanded.
    fn expand(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let tag = match self.tree.node(id) {
            Some(node) if node.is_open() => match node.kind() {
                NodeKind::Goal(_) => Expandable::Goal,
                NodeKind::Behavior(state) => match state.mode {
                    ExecutionMode::Sequential => Expandable::Sequential,
                    ExecutionMode::Parallel => Expandable::Parallel,
                },
                NodeKind::Action(_) => Expandable::Action,
                NodeKind::Modifier(_) => Expandable::Modifier,
                NodeKind::Wait(_) => Expandable::Wait,
                NodeKind::ComputedAct(_) => Expandable::ComputedAct,
                NodeKind::Succeed | NodeKind::Fail => Expandable::Never,
            },
            _ => return Ok(false),
        };

        match tag {
            Expandable::Goal => self.expand_goal(id),
            Expandable::Sequential => self.expand_sequential(id),
            Expandable::Parallel => self.expand_parallel(id),
            Expandable::Action => self.expand_action(id),
            Expandable::Modifier => self.expand_modifier(id),
            Expandable::Wait => self.expand_wait(id),
            Expandable::ComputedAct => self.expand_computed_act(id),
            Expandable::Never => Ok(false),
        }
    }

    /// Behavior selection: signature-matching templates minus the ones this
    /// goal already attempted, in specificity order; the first template
    /// whose preconditions hold is instantiated as the goal's only child.
    fn expand_goal(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let (name, params, attempted, priority) = {
            let Some(node) = self.tree.node(id) else {
                return Ok(false);
            };
            let NodeKind::Goal(state) = node.kind() else {
                return Ok(false);
            };
            (
                state.name,
                state.params.clone(),
                state.attempted.clone(),
                node.priority(),
            )
        };

        let actuals = self.resolve_in_scope(id, &params)?;

        for index in self.library.matching(name, &actuals) {
            if attempted.contains(&index) {
                continue;
            }
            let template = &self.library.behaviors()[index];

            let mut env = template.bind_parameters(&actuals);
            trace!(goal = name, template = index, "checking preconditions");
            if !matcher::satisfy(
                &self.wm,
                &mut self.registry,
                &template.preconditions,
                &mut env,
            )? {
                continue;
            }

            debug!(
                goal = name,
                template = index,
                specificity = template.specificity,
                "expanding goal"
            );
            let state = BehaviorState {
                goal: template.goal,
                mode: template.mode,
                vars: env,
                remaining: template.steps.clone(),
                context_conditions: template.context_conditions.clone(),
                success_conditions: template.success_conditions.clone(),
                needed: template.needed_for_success.unwrap_or(template.steps.len()),
                completed: 0,
            };
            self.tree
                .insert(Some(id), priority, NodeStatus::Open, NodeKind::Behavior(state));
            if let Some(node) = self.tree.node_mut(id) {
                if let NodeKind::Goal(goal) = &mut node.kind {
                    goal.attempted.insert(index);
                }
                node.set_status(NodeStatus::Executing);
            }
            return Ok(true);
        }

        // No eligible template this tick. The goal stays open: it may become
        // expandable later if a fresh template's preconditions start holding.
        trace!(goal = name, "no eligible behavior");
        Ok(false)
    }

    fn expand_sequential(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let (step, priority) = {
            let Some(node) = self.tree.node(id) else {
                return Ok(false);
            };
            let NodeKind::Behavior(state) = node.kind() else {
                return Ok(false);
            };
            let Some(step) = state.remaining.first() else {
                return Ok(false);
            };
            (step.clone(), node.priority())
        };
        self.set_status(id, NodeStatus::Executing);
        self.schedule_step(id, step, priority)?;
        Ok(true)
    }

    fn expand_parallel(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let (steps, priority) = {
            let Some(node) = self.tree.node_mut(id) else {
                return Ok(false);
            };
            let priority = node.priority();
            let NodeKind::Behavior(state) = &mut node.kind else {
                return Ok(false);
            };
            (std::mem::take(&mut state.remaining), priority)
        };
        self.set_status(id, NodeStatus::Executing);
        for step in steps {
            self.schedule_step(id, step, priority)?;
        }
        Ok(true)
    }

    fn expand_action(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let (name, params) = {
            let Some(node) = self.tree.node(id) else {
                return Ok(false);
            };
            let NodeKind::Action(state) = node.kind() else {
                return Ok(false);
            };
            (state.name, state.params.clone())
        };
        let bound = self.resolve_in_scope(id, &params)?;
        if let Some(node) = self.tree.node_mut(id) {
            if let NodeKind::Action(state) = &mut node.kind {
                state.bound = Some(bound.clone());
            }
            node.set_status(NodeStatus::Executing);
        }
        debug!(action = name, node = %id, "dispatching action");
        let status = self.executor.execute(&ActionInvocation {
            node: id,
            name,
            params: bound,
        });
        if let Some(outcome) = status.outcome() {
            self.set_status(id, terminal_status(outcome == ActionOutcome::Success));
        }
        Ok(true)
    }

    fn expand_modifier(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let (kind, priority) = {
            let Some(node) = self.tree.node(id) else {
                return Ok(false);
            };
            let NodeKind::Modifier(state) = node.kind() else {
                return Ok(false);
            };
            // The wrapped step's own modifier is ignored: no double-wrapping.
            (state.step.kind.clone(), node.priority())
        };
        self.set_status(id, NodeStatus::Executing);
        self.instantiate_step(id, kind, priority)?;
        Ok(true)
    }

    fn expand_wait(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let conditions = {
            let Some(node) = self.tree.node(id) else {
                return Ok(false);
            };
            let NodeKind::Wait(state) = node.kind() else {
                return Ok(false);
            };
            state.conditions.clone()
        };
        let env = self.scope_env(id).cloned().unwrap_or_default();
        if matcher::check(&self.wm, &mut self.registry, &conditions, &env)? {
            self.set_status(id, NodeStatus::Success);
            Ok(true)
        } else {
            // Not satisfied: stays open, the ranker moves on.
            Ok(false)
        }
    }

    fn expand_computed_act(&mut self, id: NodeId) -> Result<bool, AbtError> {
        let (name, params, bind_result) = {
            let Some(node) = self.tree.node(id) else {
                return Ok(false);
            };
            let NodeKind::ComputedAct(state) = node.kind() else {
                return Ok(false);
            };
            (state.name, state.params.clone(), state.bind_result)
        };
        let args = self.resolve_in_scope(id, &params)?;
        let result = self.registry.invoke(name, &args)?;
        if let Some(variable) = bind_result {
            let behavior = self
                .tree
                .enclosing_behavior(id)
                .ok_or(AbtError::NoEnclosingBehavior { variable })?;
            if let Some(node) = self.tree.node_mut(behavior) {
                if let NodeKind::Behavior(state) = &mut node.kind {
                    state.vars.insert(variable, result);
                }
            }
        }
        self.set_status(id, NodeStatus::Success);
        Ok(true)
    }

    /// Instantiates one step under a behavior, wrapping it in a modifier
    /// node when the template carries one.
    fn schedule_step(
        &mut self,
        parent: NodeId,
        step: Step,
        parent_priority: i32,
    ) -> Result<(), AbtError> {
        let priority = step.priority.unwrap_or(parent_priority);
        if step.modifier != StepModifier::None {
            let modifier = step.modifier;
            self.tree.insert(
                Some(parent),
                priority,
                NodeStatus::Open,
                NodeKind::Modifier(ModifierState { step, modifier }),
            );
            return Ok(());
        }
        self.instantiate_step(parent, step.kind, priority)
    }

    /// Creates the tree node for a step kind, modifier already stripped.
    fn instantiate_step(
        &mut self,
        parent: NodeId,
        kind: StepKind,
        priority: i32,
    ) -> Result<(), AbtError> {
        match kind {
            StepKind::Act { name, params } => {
                self.tree.insert(
                    Some(parent),
                    priority,
                    NodeStatus::Open,
                    NodeKind::Action(ActionState {
                        name,
                        params,
                        bound: None,
                    }),
                );
            }
            StepKind::Subgoal { goal, params } => {
                self.tree.insert(
                    Some(parent),
                    priority,
                    NodeStatus::Open,
                    NodeKind::Goal(GoalState {
                        name: goal,
                        params,
                        attempted: BTreeSet::new(),
                        spawned: false,
                    }),
                );
            }
            StepKind::Spawngoal { goal, params } => {
                // Spawned goals have no parent behavior to resolve variables
                // in later, so their parameters are bound here and now.
                let actuals = self.resolve_in_scope(parent, &params)?;
                let literals = actuals.into_iter().map(Param::Literal).collect();
                debug!(goal, "spawning root goal");
                self.tree.insert(
                    None,
                    priority,
                    NodeStatus::Open,
                    NodeKind::Goal(GoalState {
                        name: goal,
                        params: literals,
                        attempted: BTreeSet::new(),
                        spawned: true,
                    }),
                );
                // A spawn step never blocks its behavior: report it complete
                // immediately.
                self.child_completed(parent, true);
            }
            StepKind::Wait { conditions } => {
                self.tree.insert(
                    Some(parent),
                    priority,
                    NodeStatus::Open,
                    NodeKind::Wait(WaitState { conditions }),
                );
            }
            StepKind::Succeed => {
                self.tree
                    .insert(Some(parent), priority, NodeStatus::Success, NodeKind::Succeed);
            }
            StepKind::Fail => {
                self.tree
                    .insert(Some(parent), priority, NodeStatus::Failure, NodeKind::Fail);
            }
            StepKind::ComputedAct {
                name,
                params,
                bind_result,
            } => {
                self.tree.insert(
                    Some(parent),
                    priority,
                    NodeStatus::Open,
                    NodeKind::ComputedAct(ComputedActState {
                        name,
                        params,
                        bind_result,
                    }),
                );
            }
        }
        Ok(())
    }

    /// Completion handler: a (detached) child finished with the given
    /// outcome; the parent re-derives its own status. Parents that are
    /// already terminal ignore stragglers.
    fn child_completed(&mut self, parent_id: NodeId, child_success: bool) {
        let Some(parent) = self.tree.node_mut(parent_id) else {
            return;
        };
        if parent.is_completed() {
            return;
        }

        let next = match &mut parent.kind {
            NodeKind::Goal(_) => {
                // Later-revision rule: a failed behavior re-opens the goal so
                // fresh templates can be tried; attempted ones stay excluded.
                Some(if child_success {
                    NodeStatus::Success
                } else {
                    NodeStatus::Open
                })
            }
            NodeKind::Behavior(state) => match state.mode {
                ExecutionMode::Sequential => {
                    if !child_success {
                        Some(NodeStatus::Failure)
                    } else {
                        if !state.remaining.is_empty() {
                            state.remaining.remove(0);
                        }
                        if state.remaining.is_empty() {
                            Some(NodeStatus::Success)
                        } else {
                            Some(NodeStatus::Open)
                        }
                    }
                }
                ExecutionMode::Parallel => {
                    if !child_success {
                        Some(NodeStatus::Failure)
                    } else {
                        state.completed += 1;
                        if state.completed >= state.needed {
                            Some(NodeStatus::Success)
                        } else {
                            None
                        }
                    }
                }
            },
            NodeKind::Modifier(state) => Some(match state.modifier {
                StepModifier::Persistent => NodeStatus::Open,
                StepModifier::IgnoreFailure => NodeStatus::Success,
                StepModifier::PersistentWhenFails => {
                    if child_success {
                        NodeStatus::Success
                    } else {
                        NodeStatus::Open
                    }
                }
                StepModifier::PersistentWhenSucceeds => {
                    if child_success {
                        NodeStatus::Open
                    } else {
                        NodeStatus::Failure
                    }
                }
                StepModifier::None => terminal_status(child_success),
            }),
            _ => None,
        };

        if let Some(status) = next {
            parent.set_status(status);
        }
    }

    /// Resolves step parameters against the nearest enclosing behavior's
    /// environment. Nodes outside any behavior (root goals) must already
    /// hold literals.
    fn resolve_in_scope(&self, id: NodeId, params: &[Param]) -> Result<Vec<Value>, AbtError> {
        match self.scope_env(id) {
            Some(env) => matcher::resolve_params(params, env),
            None => params
                .iter()
                .map(|param| match param {
                    Param::Literal(value) => Ok(value.clone()),
                    Param::Var(name) => Err(AbtError::NoEnclosingBehavior { variable: *name }),
                })
                .collect(),
        }
    }

    fn scope_env(&self, id: NodeId) -> Option<&Bindings> {
        let behavior = self.tree.enclosing_behavior(id)?;
        match self.tree.node(behavior)?.kind() {
            NodeKind::Behavior(state) => Some(&state.vars),
            _ => None,
        }
    }

    fn set_status(&mut self, id: NodeId, status: NodeStatus) {
        if let Some(node) = self.tree.node_mut(id) {
            node.set_status(status);
        }
    }
}

fn terminal_status(success: bool) -> NodeStatus {
    if success {
        NodeStatus::Success
    } else {
        NodeStatus::Failure
    }
}
