//! Collaborators the notification service renders through.
//!
//! [`RenderSurface`] owns the visual nodes; [`InteractionLayer`] routes
//! pointer input to them. Both are implemented by [`headless::HeadlessSurface`],
//! an in-memory tree used by tests and the demo binary.

use std::time::Duration;

use serde::Serialize;

pub mod headless;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// Where a child lands among its new siblings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Insert {
    Front,
    Back,
}

/// Description of a node to create.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeSpec {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    /// Markup inserted verbatim (close control template).
    pub markup: Option<String>,
    pub attributes: Vec<(String, String)>,
}

impl NodeSpec {
    #[must_use]
    pub fn with_class(class: impl Into<String>) -> Self {
        Self {
            classes: vec![class.into()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

/// Names one started transition. Completion signals carry it back.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TransitionId(pub u64);

/// Whether a transition still owes a completion signal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransitionStatus {
    Running(TransitionId),
    Finished,
}

pub trait RenderSurface {
    /// Node carrying the given identifier, if it is attached.
    fn find_by_id(&self, id: &str) -> Option<NodeId>;

    /// Node matched by a target selector such as `body` or `#main`.
    fn find_target(&self, selector: &str) -> Option<NodeId>;

    fn create(&mut self, spec: NodeSpec) -> NodeId;

    fn insert(&mut self, parent: NodeId, child: NodeId, at: Insert);

    /// Detach `node` (and its subtree) from its parent.
    fn detach(&mut self, node: NodeId);

    /// Drop `node` and its subtree for good. Ids of destroyed nodes are
    /// never handed out again.
    fn destroy(&mut self, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// True when `node` or one of its descendants holds input focus.
    fn contains_focus(&self, node: NodeId) -> bool;

    /// Tag `node` with a named transition. A surface that has nothing to
    /// animate may report the transition as already finished; otherwise it
    /// later reports completion with the returned id.
    fn start_transition(
        &mut self,
        node: NodeId,
        name: &str,
        duration: Duration,
        easing: &str,
    ) -> TransitionStatus;

    /// Width of a progress indicator, in percent.
    fn set_progress(&mut self, node: NodeId, percent: f64);
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interaction {
    HoverEnter,
    HoverLeave,
    Click,
}

/// Whether a click keeps bubbling to the ancestors of its node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Propagation {
    Continue,
    Stop,
}

pub trait InteractionLayer {
    fn listen(&mut self, node: NodeId, interactions: &[Interaction]);

    fn unlisten(&mut self, node: NodeId);
}

/// Everything the notification service needs from its environment.
pub trait Backend: RenderSurface + InteractionLayer {}

impl<T: RenderSurface + InteractionLayer> Backend for T {}
