//! The notification service: one explicit context object owning the
//! service-wide settings layer, the duplicate memory, the event subscriber
//! and every live toast.
//!
//! Nothing here waits. The service advances when it receives one of three
//! inputs: [`NotificationService::tick`] (timers against the injected clock),
//! [`NotificationService::animation_complete`] (surface completion signal)
//! and [`NotificationService::interact`] (pointer input). Each input runs its
//! transition to completion before returning.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::animation::{Animation, Animator, TransitionSpec};
use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, SettingsOverrides};
use crate::container;
use crate::dedup::DuplicateFilter;
use crate::events::{EventPublisher, ToastEvent, Visibility};
use crate::surface::{Backend, Insert, Interaction, NodeId, Propagation, TransitionId};
use crate::timers::TimerQueue;
use crate::toast::{Countdown, Part, Toast, ToastRequest, build_nodes};
use crate::types::{ToastId, ToastKind, ToastState};

/// Returned by [`NotificationService::notify`]. `node` is `None` when the
/// toast was suppressed as a duplicate or no container could be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ToastHandle {
    pub id: ToastId,
    pub node: Option<NodeId>,
}

impl ToastHandle {
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.node.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ClearOptions {
    /// Hide even toasts holding input focus.
    pub force: bool,
}

impl ClearOptions {
    #[must_use]
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Continuation {
    Shown(ToastId),
    Hidden(ToastId),
}

pub struct NotificationService<B, C = SystemClock> {
    backend: B,
    clock: C,
    options: SettingsOverrides,
    toasts: BTreeMap<ToastId, Toast>,
    routes: HashMap<NodeId, (ToastId, Part)>,
    timers: TimerQueue<ToastId>,
    animator: Animator<Continuation>,
    duplicates: DuplicateFilter,
    events: EventPublisher,
    last_id: u64,
}

impl<B: Backend> NotificationService<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, SystemClock)
    }
}

impl<B: Backend, C: Clock> NotificationService<B, C> {
    pub fn with_clock(backend: B, clock: C) -> Self {
        Self {
            backend,
            clock,
            options: SettingsOverrides::default(),
            toasts: BTreeMap::new(),
            routes: HashMap::new(),
            timers: TimerQueue::new(),
            animator: Animator::new(),
            duplicates: DuplicateFilter::new(),
            events: EventPublisher::new(),
            last_id: 0,
        }
    }

    /// Replace the service-wide settings layer.
    pub fn configure(&mut self, overrides: SettingsOverrides) {
        self.options = overrides;
    }

    #[must_use]
    pub const fn options(&self) -> &SettingsOverrides {
        &self.options
    }

    /// Install the event subscriber, replacing any previous one.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ToastEvent) + 'static) {
        self.events.subscribe(subscriber);
    }

    pub fn info(&mut self, message: &str, title: Option<&str>) -> ToastHandle {
        self.notify(ToastKind::Info, Some(message), title, None)
    }

    pub fn success(&mut self, message: &str, title: Option<&str>) -> ToastHandle {
        self.notify(ToastKind::Success, Some(message), title, None)
    }

    pub fn warning(&mut self, message: &str, title: Option<&str>) -> ToastHandle {
        self.notify(ToastKind::Warning, Some(message), title, None)
    }

    pub fn error(&mut self, message: &str, title: Option<&str>) -> ToastHandle {
        self.notify(ToastKind::Error, Some(message), title, None)
    }

    /// Create, insert and start showing a toast.
    ///
    /// The identifier is allocated before the duplicate check, so suppressed
    /// requests still consume one.
    pub fn notify(
        &mut self,
        kind: ToastKind,
        message: Option<&str>,
        title: Option<&str>,
        overrides: Option<SettingsOverrides>,
    ) -> ToastHandle {
        self.last_id += 1;
        let id = ToastId(self.last_id);
        let settings = Settings::resolve(kind, Some(&self.options), overrides.as_ref());
        let mut request = ToastRequest::new(kind, message, title);
        request.icon_class = Some(settings.icon_class.clone());

        if self
            .duplicates
            .should_suppress(message, settings.prevent_duplicates)
        {
            debug!(toast_id = %id, "duplicate toast suppressed");
            return ToastHandle { id, node: None };
        }

        let Some(container) = container::get(&mut self.backend, &settings, true) else {
            return ToastHandle { id, node: None };
        };

        let now = self.clock.now();
        let nodes = build_nodes(&mut self.backend, &settings, &request);
        let mut toast = Toast::new(id, now, settings, request, container, nodes);

        for (node, interactions) in toast.listeners() {
            self.backend.listen(node, &interactions);
        }
        self.routes.insert(nodes.root, (id, Part::Body));
        if let Some(close) = nodes.close_button {
            self.routes.insert(close, (id, Part::CloseButton));
        }

        let at = if toast.settings.newest_on_top {
            Insert::Front
        } else {
            Insert::Back
        };
        self.backend.insert(container, nodes.root, at);
        toast.mark_visible();
        self.events.publish(&toast.event(Visibility::Visible));

        let settings = &toast.settings;
        if !settings.timeout.is_zero() {
            toast.timer = Some(self.timers.arm(now, settings.timeout, id));
            if settings.progress_bar {
                toast.countdown = Some(Countdown::starting(now, settings.timeout));
            }
        }
        if let Some(progress) = nodes.progress {
            self.backend.set_progress(progress, 100.0);
        }

        let show = TransitionSpec::new(
            &settings.show_method,
            settings.show_duration,
            &settings.show_easing,
        );
        let outcome =
            self.animator
                .animate(&mut self.backend, nodes.root, show, Continuation::Shown(id));
        self.toasts.insert(id, toast);
        if let Animation::Finished(continuation) = outcome {
            self.resume(continuation);
        }

        ToastHandle {
            id,
            node: Some(nodes.root),
        }
    }

    /// Hide one toast, or every toast of the configured container when no
    /// toast is given or the given one refuses because it holds focus.
    pub fn clear(&mut self, toast: Option<&ToastHandle>, options: ClearOptions) {
        if let Some(handle) = toast.filter(|handle| handle.is_displayed()) {
            if self.hide(handle.id, options.force) {
                return;
            }
        }
        for id in self.container_toasts() {
            self.hide(id, options.force);
        }
    }

    /// Remove without animation. A given toast is removed unless it holds
    /// focus; with no toast the whole configured container goes away.
    pub fn remove(&mut self, toast: Option<&ToastHandle>) {
        if let Some(handle) = toast.filter(|handle| handle.is_displayed()) {
            let focused = self
                .toasts
                .get(&handle.id)
                .is_some_and(|t| self.backend.contains_focus(t.nodes.root));
            if !focused {
                self.finish(handle.id);
            }
            return;
        }

        let settings = Settings::merged(Some(&self.options), None);
        let Some(container) = container::get(&mut self.backend, &settings, false) else {
            return;
        };
        for id in self.container_toasts() {
            self.finish(id);
        }
        if self.backend.parent(container).is_some() {
            self.backend.destroy(container);
            self.duplicates.forget();
        }
    }

    /// Container for the service-wide settings, optionally overlaid.
    pub fn get_container(
        &mut self,
        overrides: Option<&SettingsOverrides>,
        create_if_missing: bool,
    ) -> Option<NodeId> {
        let settings = Settings::merged(Some(&self.options), overrides);
        container::get(&mut self.backend, &settings, create_if_missing)
    }

    /// Fire every dismissal timer due at the clock's current time and refresh
    /// progress indicators.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        while let Some((timer, id)) = self.timers.pop_due(now) {
            if let Some(toast) = self.toasts.get_mut(&id) {
                if toast.timer == Some(timer) {
                    toast.timer = None;
                }
            }
            debug!(toast_id = %id, "dismissal timer fired");
            self.hide(id, false);
        }
        self.refresh_progress(now);
    }

    /// Completion signal for one transition. Signals for transitions that
    /// already resolved, or whose toast is gone, are ignored.
    pub fn animation_complete(&mut self, transition: TransitionId) {
        if let Some(continuation) = self.animator.complete(transition) {
            self.resume(continuation);
        }
    }

    /// Deliver pointer input. Clicks bubble from `node` through its
    /// ancestors until a handler stops them.
    pub fn interact(&mut self, node: NodeId, interaction: Interaction) -> Propagation {
        match interaction {
            Interaction::HoverEnter => {
                if let Some(&(id, Part::Body)) = self.routes.get(&node) {
                    self.hover_enter(id);
                }
                Propagation::Continue
            }
            Interaction::HoverLeave => {
                if let Some(&(id, Part::Body)) = self.routes.get(&node) {
                    self.hover_leave(id);
                }
                Propagation::Continue
            }
            Interaction::Click => {
                let mut current = Some(node);
                while let Some(target) = current {
                    current = self.backend.parent(target);
                    if let Some(&(id, part)) = self.routes.get(&target) {
                        if self.click(id, part) == Propagation::Stop {
                            return Propagation::Stop;
                        }
                    }
                }
                Propagation::Continue
            }
        }
    }

    /// Start hiding a toast. Returns `false` only when the toast holds focus
    /// and the hide is not forced.
    pub fn hide(&mut self, id: ToastId, forced: bool) -> bool {
        let Some(toast) = self.toasts.get_mut(&id) else {
            return true;
        };
        let root = toast.nodes.root;
        if !forced && self.backend.contains_focus(root) {
            debug!(toast_id = %id, "hide refused: toast holds focus");
            return false;
        }
        if !toast.begin_hiding() {
            return true;
        }
        if let Some(countdown) = toast.countdown.as_mut() {
            countdown.hide_eta = None;
        }

        let (method, duration, easing) = toast.settings.hide_transition(forced);
        let spec = TransitionSpec::new(method, duration, easing);
        let outcome =
            self.animator
                .animate(&mut self.backend, root, spec, Continuation::Hidden(id));
        if let Animation::Finished(continuation) = outcome {
            self.resume(continuation);
        }
        true
    }

    #[must_use]
    pub fn toast(&self, id: ToastId) -> Option<&Toast> {
        self.toasts.get(&id)
    }

    /// Toasts not yet removed, by identifier.
    pub fn active_toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.values()
    }

    #[must_use]
    pub fn previous_message(&self) -> Option<&str> {
        self.duplicates.previous()
    }

    /// When the next dismissal timer is due, for event-loop integration.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn resume(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::Shown(id) => {
                let hook = self
                    .toasts
                    .get(&id)
                    .and_then(|toast| toast.settings.hooks.on_shown.clone());
                if let Some(hook) = hook {
                    hook(id);
                }
            }
            Continuation::Hidden(id) => self.finish(id),
        }
    }

    /// Detach and destroy a toast, drop its timer and pending transitions,
    /// and publish `hidden`. Tears the container down when this empties it.
    fn finish(&mut self, id: ToastId) {
        let Some(mut toast) = self.toasts.remove(&id) else {
            return;
        };
        let nodes = toast.nodes;
        for node in [Some(nodes.root), nodes.close_button].into_iter().flatten() {
            self.backend.unlisten(node);
            self.routes.remove(&node);
        }
        self.animator.forget(nodes.root);
        if container::remove_child(&mut self.backend, toast.container, nodes.root) {
            debug!(toast_id = %id, "last toast removed, container destroyed");
            self.duplicates.forget();
        }
        self.backend.destroy(nodes.root);
        if let Some(timer) = toast.timer.take() {
            self.timers.cancel(timer);
        }

        if toast.mark_removed(self.clock.now()) {
            if let Some(hook) = toast.settings.hooks.on_hidden.clone() {
                hook(id);
            }
            self.events.publish(&toast.event(Visibility::Hidden));
        }
    }

    fn hover_enter(&mut self, id: ToastId) {
        let Some(toast) = self.toasts.get_mut(&id) else {
            return;
        };
        if !toast.settings.close_on_hover || toast.state != ToastState::Visible {
            return;
        }
        if let Some(timer) = toast.timer.take() {
            self.timers.cancel(timer);
        }
        if let Some(countdown) = toast.countdown.as_mut() {
            countdown.hide_eta = None;
        }
    }

    fn hover_leave(&mut self, id: ToastId) {
        let Some(toast) = self.toasts.get_mut(&id) else {
            return;
        };
        if toast.state != ToastState::Visible {
            return;
        }
        if toast.settings.close_on_hover {
            self.hide(id, false);
            return;
        }
        let settings = &toast.settings;
        if settings.timeout.is_zero() && settings.extended_timeout.is_zero() {
            return;
        }

        let now = self.clock.now();
        let extended = settings.extended_timeout;
        if let Some(timer) = toast.timer.take() {
            self.timers.cancel(timer);
        }
        toast.timer = Some(self.timers.arm(now, extended, id));
        if let Some(progress) = toast.nodes.progress {
            toast.countdown = Some(Countdown::starting(now, extended));
            self.backend.set_progress(progress, 100.0);
        }
    }

    fn click(&mut self, id: ToastId, part: Part) -> Propagation {
        let Some(toast) = self.toasts.get(&id) else {
            return Propagation::Continue;
        };
        let hooks = toast.settings.hooks.clone();
        match part {
            Part::CloseButton => {
                if !toast.settings.close_button {
                    return Propagation::Continue;
                }
                if let Some(hook) = hooks.on_close_click {
                    hook(id);
                }
                self.hide(id, true);
                Propagation::Stop
            }
            Part::Body => {
                if let Some(hook) = hooks.on_click {
                    hook(id);
                    self.hide(id, false);
                } else if toast.settings.tap_to_dismiss {
                    self.hide(id, false);
                }
                Propagation::Continue
            }
        }
    }

    /// Toasts of this service sitting in the configured container, in
    /// on-screen order.
    fn container_toasts(&mut self) -> Vec<ToastId> {
        let settings = Settings::merged(Some(&self.options), None);
        let Some(container) = container::get(&mut self.backend, &settings, false) else {
            return Vec::new();
        };
        self.backend
            .children(container)
            .into_iter()
            .filter_map(|node| match self.routes.get(&node) {
                Some(&(id, Part::Body)) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn refresh_progress(&mut self, now: DateTime<Utc>) {
        for toast in self.toasts.values() {
            let (Some(progress), Some(countdown)) = (toast.nodes.progress, toast.countdown) else {
                continue;
            };
            if let Some(percent) = countdown.percent(now) {
                self.backend.set_progress(progress, percent);
            }
        }
    }
}
