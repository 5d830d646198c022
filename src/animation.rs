//! Runs named transitions on surface nodes and hands back their continuation
//! exactly once.
//!
//! A zero (or non-finite) duration completes inside [`Animator::animate`]
//! without touching the node. Otherwise the node is tagged with the
//! transition and the continuation is parked under the surface's
//! [`TransitionId`] until completion is reported through
//! [`Animator::complete`]. Transitions on the same node run side by side;
//! each signal resolves only its own transition.

use std::collections::HashMap;
use std::time::Duration;

use crate::surface::{NodeId, RenderSurface, TransitionId, TransitionStatus};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSpec<'a> {
    pub name: &'a str,
    pub duration_ms: f64,
    pub easing: &'a str,
}

impl<'a> TransitionSpec<'a> {
    #[must_use]
    pub fn new(name: &'a str, duration: Duration, easing: &'a str) -> Self {
        Self {
            name,
            duration_ms: duration.as_secs_f64() * 1000.0,
            easing,
        }
    }

    /// Duration to hand to the surface, `None` for the instant path.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn surface_duration(&self) -> Option<Duration> {
        (self.duration_ms.is_finite() && self.duration_ms > 0.0)
            .then(|| Duration::from_nanos((self.duration_ms * 1_000_000.0).round() as u64))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Animation<K> {
    /// Completed before `animate` returned; run the continuation now.
    Finished(K),
    /// Waiting for the surface's completion signal.
    Running(TransitionId),
}

#[derive(Debug)]
pub struct Animator<K> {
    pending: HashMap<TransitionId, (NodeId, K)>,
}

impl<K> Default for Animator<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<K> Animator<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animate<S>(
        &mut self,
        surface: &mut S,
        node: NodeId,
        spec: TransitionSpec<'_>,
        on_complete: K,
    ) -> Animation<K>
    where
        S: RenderSurface + ?Sized,
    {
        let Some(duration) = spec.surface_duration() else {
            return Animation::Finished(on_complete);
        };
        match surface.start_transition(node, spec.name, duration, spec.easing) {
            TransitionStatus::Finished => Animation::Finished(on_complete),
            TransitionStatus::Running(id) => {
                self.pending.insert(id, (node, on_complete));
                Animation::Running(id)
            }
        }
    }

    /// Resolve the transition `id`. Unknown, repeated or forgotten ids
    /// return `None`.
    pub fn complete(&mut self, id: TransitionId) -> Option<K> {
        self.pending.remove(&id).map(|(_, continuation)| continuation)
    }

    /// Drop every continuation parked for `node`.
    pub fn forget(&mut self, node: NodeId) {
        self.pending.retain(|_, (parked, _)| *parked != node);
    }

    #[must_use]
    pub fn is_running(&self, node: NodeId) -> bool {
        self.pending.values().any(|(parked, _)| *parked == node)
    }
}
