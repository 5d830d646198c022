use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use super::{
    Insert, Interaction, InteractionLayer, NodeId, NodeSpec, RenderSurface, TransitionId,
    TransitionStatus,
};

const ROOT_SELECTOR: &str = "body";

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub name: String,
    pub duration: Duration,
    pub easing: String,
}

/// A transition that still owes its completion signal.
#[derive(Clone, Debug, PartialEq)]
pub struct RunningTransition {
    pub id: TransitionId,
    pub node: NodeId,
    pub transition: Transition,
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub spec: NodeSpec,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transition: Option<Transition>,
    pub progress: Option<f64>,
    pub listeners: Vec<Interaction>,
}

impl Node {
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.spec.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.spec
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// In-memory node tree with a single `body` root.
///
/// Transitions either settle at once (`instant`) or stay running until the
/// driver collects them with [`HeadlessSurface::take_running`].
#[derive(Debug)]
pub struct HeadlessSurface {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    focused: Option<NodeId>,
    instant: bool,
    next_transition: u64,
    running: Vec<RunningTransition>,
}

impl HeadlessSurface {
    /// Surface whose transitions wait for an explicit completion signal.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::default());
        Self {
            nodes,
            root,
            next_id: 0,
            focused: None,
            instant: false,
            next_transition: 0,
            running: Vec::new(),
        }
    }

    /// Surface on which every transition completes as soon as it starts.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            instant: true,
            ..Self::new()
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// True when `id` hangs from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.nodes.get(&node).and_then(|n| n.parent);
        }
        false
    }

    pub fn focus(&mut self, id: NodeId) {
        self.focused = Some(id);
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// First child of `parent` carrying `class`.
    #[must_use]
    pub fn child_with_class(&self, parent: NodeId, class: &str) -> Option<NodeId> {
        self.nodes
            .get(&parent)?
            .children
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).is_some_and(|n| n.has_class(class)))
    }

    /// Transitions started since the last call, oldest first.
    pub fn take_running(&mut self) -> Vec<RunningTransition> {
        std::mem::take(&mut self.running)
    }

    #[must_use]
    pub fn running(&self) -> &[RunningTransition] {
        &self.running
    }

    /// Nodes still held, attached or not (the root included).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn matches_id(&self, node: NodeId, id: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|n| n.spec.id.as_deref() == Some(id))
    }

    fn descendants(&self, from: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                if let Some(n) = self.nodes.get(&node) {
                    stack.extend(n.children.iter().copied());
                }
            }
        }
        seen
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for HeadlessSurface {
    fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.matches_id(*node, id))
            .min()
    }

    fn find_target(&self, selector: &str) -> Option<NodeId> {
        if selector == ROOT_SELECTOR {
            return Some(self.root);
        }
        selector
            .strip_prefix('#')
            .and_then(|id| self.find_by_id(id))
    }

    fn create(&mut self, spec: NodeSpec) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                spec,
                ..Node::default()
            },
        );
        id
    }

    fn insert(&mut self, parent: NodeId, child: NodeId, at: Insert) {
        self.detach(child);
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        match at {
            Insert::Front => parent_node.children.insert(0, child),
            Insert::Back => parent_node.children.push(child),
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| *child != node);
        }
    }

    fn destroy(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.detach(node);
        let doomed = self.descendants(node);
        self.nodes.retain(|id, _| !doomed.contains(id));
        self.running.retain(|running| !doomed.contains(&running.node));
        if self.focused.is_some_and(|focused| doomed.contains(&focused)) {
            self.focused = None;
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn contains_focus(&self, node: NodeId) -> bool {
        self.focused
            .is_some_and(|focused| self.descendants(node).contains(&focused))
    }

    fn start_transition(
        &mut self,
        node: NodeId,
        name: &str,
        duration: Duration,
        easing: &str,
    ) -> TransitionStatus {
        let transition = Transition {
            name: name.to_string(),
            duration,
            easing: easing.to_string(),
        };
        if let Some(n) = self.nodes.get_mut(&node) {
            n.transition = Some(transition.clone());
        }
        if self.instant {
            return TransitionStatus::Finished;
        }
        self.next_transition += 1;
        let id = TransitionId(self.next_transition);
        self.running.push(RunningTransition {
            id,
            node,
            transition,
        });
        TransitionStatus::Running(id)
    }

    fn set_progress(&mut self, node: NodeId, percent: f64) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.progress = Some(percent);
        }
    }
}

impl InteractionLayer for HeadlessSurface {
    fn listen(&mut self, node: NodeId, interactions: &[Interaction]) {
        if let Some(n) = self.nodes.get_mut(&node) {
            for interaction in interactions {
                if !n.listeners.contains(interaction) {
                    n.listeners.push(*interaction);
                }
            }
        }
    }

    fn unlisten(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.listeners.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HeadlessSurface;
    use crate::surface::{Insert, NodeSpec, RenderSurface};
    use std::time::Duration;

    #[test]
    fn insert_front_and_back_order_children() {
        let mut surface = HeadlessSurface::new();
        let root = surface.root();
        let first = surface.create(NodeSpec::default());
        let second = surface.create(NodeSpec::default());
        let third = surface.create(NodeSpec::default());
        surface.insert(root, first, Insert::Back);
        surface.insert(root, second, Insert::Back);
        surface.insert(root, third, Insert::Front);
        assert_eq!(surface.children(root), vec![third, first, second]);
    }

    #[test]
    fn focus_inside_a_subtree_counts_for_the_ancestor() {
        let mut surface = HeadlessSurface::new();
        let root = surface.root();
        let toast = surface.create(NodeSpec::default());
        let button = surface.create(NodeSpec::default());
        surface.insert(root, toast, Insert::Back);
        surface.insert(toast, button, Insert::Back);

        surface.focus(button);
        assert!(surface.contains_focus(toast));
        surface.blur();
        assert!(!surface.contains_focus(toast));
    }

    #[test]
    fn detached_nodes_are_no_longer_found() {
        let mut surface = HeadlessSurface::new();
        let root = surface.root();
        let container = surface.create(NodeSpec {
            id: Some("toast-container".to_string()),
            ..NodeSpec::default()
        });
        surface.insert(root, container, Insert::Back);
        assert_eq!(surface.find_by_id("toast-container"), Some(container));
        assert_eq!(surface.find_target("#toast-container"), Some(container));

        surface.detach(container);
        assert!(!surface.is_attached(container));
        assert_eq!(surface.find_by_id("toast-container"), None);
    }

    #[test]
    fn destroy_drops_the_subtree_and_its_transitions() {
        let mut surface = HeadlessSurface::new();
        let root = surface.root();
        let toast = surface.create(NodeSpec::default());
        let button = surface.create(NodeSpec::default());
        surface.insert(root, toast, Insert::Back);
        surface.insert(toast, button, Insert::Back);
        surface.start_transition(toast, "fadeIn", Duration::from_millis(300), "swing");
        surface.focus(button);

        surface.destroy(toast);
        assert_eq!(surface.node_count(), 1);
        assert!(surface.node(button).is_none());
        assert!(surface.running().is_empty());
        assert!(surface.children(root).is_empty());
        assert!(!surface.contains_focus(root));
    }

    #[test]
    fn each_running_transition_gets_its_own_id() {
        let mut surface = HeadlessSurface::new();
        let node = surface.create(NodeSpec::default());
        let show = surface.start_transition(node, "fadeIn", Duration::from_millis(1000), "swing");
        let hide = surface.start_transition(node, "fadeOut", Duration::from_millis(150), "linear");
        assert_ne!(show, hide);

        let running = surface.take_running();
        let durations: Vec<_> = running.iter().map(|r| r.transition.duration).collect();
        assert_eq!(
            durations,
            vec![Duration::from_millis(1000), Duration::from_millis(150)]
        );
    }
}
