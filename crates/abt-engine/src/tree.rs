use core::fmt;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use abt_core::{Bindings, Value};
use abt_lang::{Condition, ExecutionMode, Param, Step, StepModifier};

/// Opaque id of a tree node. Ids are handed out in creation order and never
/// reused, which doubles as the deterministic tiebreak when priorities are
/// equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Available for expansion.
    Open,
    /// Expanded and waiting on children or the executor.
    Executing,
    Success,
    Failure,
}

impl NodeStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, NodeStatus::Success | NodeStatus::Failure)
    }
}

/// A goal waiting for (or being served by) a behavior.
#[derive(Debug, Clone)]
pub struct GoalState {
    pub name: &'static str,
    pub params: Vec<Param>,
    /// Library indices already instantiated for this goal; never retried.
    pub attempted: BTreeSet<usize>,
    /// True for spawned goals, which always live in the root set.
    pub spawned: bool,
}

/// A behavior instance: the live copy of a template, plus its variable
/// environment and condition snapshots.
#[derive(Debug, Clone)]
pub struct BehaviorState {
    pub goal: &'static str,
    pub mode: ExecutionMode,
    pub vars: Bindings,
    /// Steps not yet scheduled (sequential) or not yet drained (parallel).
    pub remaining: Vec<Step>,
    pub context_conditions: Vec<Condition>,
    pub success_conditions: Vec<Condition>,
    /// Parallel: successes required. Sequential behaviors ignore this.
    pub needed: usize,
    /// Parallel: successes observed so far.
    pub completed: usize,
}

#[derive(Debug, Clone)]
pub struct ActionState {
    pub name: &'static str,
    pub params: Vec<Param>,
    /// Parameters resolved at dispatch; present once the action executes.
    pub bound: Option<Vec<Value>>,
}

#[derive(Debug, Clone)]
pub struct ModifierState {
    /// The wrapped step template; its modifier is ignored when the child is
    /// instantiated to avoid double-wrapping.
    pub step: Step,
    pub modifier: StepModifier,
}

#[derive(Debug, Clone)]
pub struct WaitState {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone)]
pub struct ComputedActState {
    pub name: &'static str,
    pub params: Vec<Param>,
    pub bind_result: Option<&'static str>,
}

/// Tagged union over the node kinds of the execution tree.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Goal(GoalState),
    Behavior(BehaviorState),
    Action(ActionState),
    Modifier(ModifierState),
    Wait(WaitState),
    Succeed,
    Fail,
    ComputedAct(ComputedActState),
}

/// One node of the live execution tree.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    status: NodeStatus,
    priority: i32,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// Priority is fixed at creation and immutable for the node's lifetime.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_open(&self) -> bool {
        self.status == NodeStatus::Open
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub(crate) fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }

    fn label(&self) -> String {
        match &self.kind {
            NodeKind::Goal(g) if g.spawned => format!("SpawnGoal: {}", g.name),
            NodeKind::Goal(g) => format!("Goal: {}", g.name),
            NodeKind::Behavior(b) => match b.mode {
                ExecutionMode::Sequential => format!("Sequential: {}", b.goal),
                ExecutionMode::Parallel => format!("Parallel: {}", b.goal),
            },
            NodeKind::Action(a) => format!("Action: {}", a.name),
            NodeKind::Modifier(m) => format!("Modifier: {:?}", m.modifier),
            NodeKind::Wait(_) => "Wait".to_string(),
            NodeKind::Succeed => "Succeed".to_string(),
            NodeKind::Fail => "Fail".to_string(),
            NodeKind::ComputedAct(c) => format!("ComputedAct: {}", c.name),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}) prio={} {}",
            self.label(),
            self.status,
            self.priority,
            self.id
        )
    }
}

/// Arena-backed forest of execution nodes. Parent links are ids, not owning
/// references; the root set is an ordered list of top-level goals.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next: u64,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, attaching it to `parent`'s child list or to the root
    /// set when `parent` is `None`.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        priority: i32,
        status: NodeStatus,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                parent,
                children: Vec::new(),
                status,
                priority,
                kind,
            },
        );
        match parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order ids over the whole forest, in root order.
    pub fn dfs_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.collect_dfs(root, &mut out);
        }
        out
    }

    fn collect_dfs(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        out.push(id);
        for &child in &node.children {
            self.collect_dfs(child, out);
        }
    }

    /// The nearest enclosing behavior node, starting at `id` itself.
    pub fn enclosing_behavior(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.nodes.get(&current)?;
            if matches!(node.kind, NodeKind::Behavior(_)) {
                return Some(current);
            }
            cursor = node.parent;
        }
        None
    }

    /// Detaches and removes every descendant of `id` (but not `id` itself),
    /// returning the removed nodes in pre-order.
    pub(crate) fn remove_descendants(&mut self, id: NodeId) -> Vec<Node> {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return Vec::new(),
        };
        let mut removed = Vec::new();
        let mut stack: Vec<NodeId> = children.into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.iter().rev().copied());
                removed.push(node);
            }
        }
        removed
    }

    /// Detaches a childless node from its parent (or the root set) and
    /// removes it from the arena.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        match node.parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        Some(node)
    }

    /// Indented dump of the forest for debuggers and visualizers.
    pub fn render(&self) -> String {
        if self.roots.is_empty() {
            return "tree is empty\n".to_string();
        }
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(root, 0, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let _ = writeln!(out, "{:indent$}- {node}", "", indent = depth * 2);
        for &child in &node.children {
            self.render_node(child, depth + 1, out);
        }
    }
}
