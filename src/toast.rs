//! One notification instance: its request, resolved settings, nodes and
//! lifecycle state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Settings;
use crate::events::{ToastEvent, Visibility};
use crate::surface::{Insert, Interaction, NodeId, NodeSpec, RenderSurface};
use crate::timers::TimerId;
use crate::types::{ToastId, ToastKind, ToastState};

const RTL_CLASS: &str = "rtl";

/// What the caller asked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToastRequest {
    pub kind: ToastKind,
    pub title: Option<String>,
    pub message: Option<String>,
    pub icon_class: Option<String>,
}

impl ToastRequest {
    #[must_use]
    pub fn new(kind: ToastKind, message: Option<&str>, title: Option<&str>) -> Self {
        Self {
            kind,
            title: title.map(str::to_string),
            message: message.map(str::to_string),
            icon_class: None,
        }
    }
}

/// Which sub-node of a toast received an interaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Part {
    Body,
    CloseButton,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ToastNodes {
    pub root: NodeId,
    pub title: Option<NodeId>,
    pub message: Option<NodeId>,
    pub close_button: Option<NodeId>,
    pub progress: Option<NodeId>,
}

/// Countdown shown by the progress indicator. A missing `hide_eta` means
/// the countdown is frozen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    pub max_hide_time: Duration,
    pub hide_eta: Option<DateTime<Utc>>,
}

impl Countdown {
    #[must_use]
    pub fn starting(now: DateTime<Utc>, length: Duration) -> Self {
        let hide_eta = chrono::Duration::from_std(length)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta));
        Self {
            max_hide_time: length,
            hide_eta,
        }
    }

    /// Remaining share of the countdown, from 100 down to 0.
    #[must_use]
    pub fn percent(&self, now: DateTime<Utc>) -> Option<f64> {
        let eta = self.hide_eta?;
        if self.max_hide_time.is_zero() {
            return Some(0.0);
        }
        let remaining = (eta - now).to_std().unwrap_or_default();
        let ratio = remaining.as_secs_f64() / self.max_hide_time.as_secs_f64();
        Some((ratio * 100.0).clamp(0.0, 100.0))
    }
}

#[derive(Debug)]
pub struct Toast {
    pub(crate) id: ToastId,
    pub(crate) state: ToastState,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) ended_at: Option<DateTime<Utc>>,
    pub(crate) settings: Settings,
    pub(crate) request: ToastRequest,
    pub(crate) container: NodeId,
    pub(crate) nodes: ToastNodes,
    pub(crate) timer: Option<TimerId>,
    pub(crate) countdown: Option<Countdown>,
    pub(crate) hidden_published: bool,
}

impl Toast {
    pub(crate) fn new(
        id: ToastId,
        now: DateTime<Utc>,
        settings: Settings,
        request: ToastRequest,
        container: NodeId,
        nodes: ToastNodes,
    ) -> Self {
        Self {
            id,
            state: ToastState::Pending,
            created_at: now,
            ended_at: None,
            settings,
            request,
            container,
            nodes,
            timer: None,
            countdown: None,
            hidden_published: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ToastId {
        self.id
    }

    #[must_use]
    pub const fn state(&self) -> ToastState {
        self.state
    }

    #[must_use]
    pub const fn nodes(&self) -> &ToastNodes {
        &self.nodes
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn request(&self) -> &ToastRequest {
        &self.request
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    #[must_use]
    pub const fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// `pending -> visible`, once the node sits in its container.
    pub(crate) fn mark_visible(&mut self) {
        if self.state == ToastState::Pending {
            self.state = ToastState::Visible;
        }
    }

    /// `visible -> hiding`. Returns `false` when the toast is past that point.
    pub(crate) fn begin_hiding(&mut self) -> bool {
        if self.state != ToastState::Visible {
            return false;
        }
        self.state = ToastState::Hiding;
        true
    }

    /// Enter the terminal state. Returns `true` only for the first call,
    /// which is the one allowed to run `on_hidden` and publish.
    pub(crate) fn mark_removed(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == ToastState::Removed || self.hidden_published {
            return false;
        }
        self.state = ToastState::Removed;
        self.ended_at = Some(now);
        self.hidden_published = true;
        true
    }

    pub(crate) fn event(&self, state: Visibility) -> ToastEvent {
        let end_time = match state {
            Visibility::Visible => self.created_at,
            Visibility::Hidden => self.ended_at.unwrap_or(self.created_at),
        };
        ToastEvent {
            toast_id: self.id,
            state,
            start_time: self.created_at,
            end_time,
            settings: self.settings.clone(),
            request: self.request.clone(),
        }
    }

    /// Interactions each of the toast's nodes listens for.
    pub(crate) fn listeners(&self) -> Vec<(NodeId, Vec<Interaction>)> {
        let settings = &self.settings;
        let mut body = Vec::new();
        if settings.close_on_hover {
            body.extend([Interaction::HoverEnter, Interaction::HoverLeave]);
        } else if !settings.timeout.is_zero() || !settings.extended_timeout.is_zero() {
            body.push(Interaction::HoverLeave);
        }
        if settings.tap_to_dismiss || settings.hooks.on_click.is_some() {
            body.push(Interaction::Click);
        }

        let mut listeners = vec![(self.nodes.root, body)];
        if let Some(close) = self.nodes.close_button {
            listeners.push((close, vec![Interaction::Click]));
        }
        listeners
    }
}

/// Create the toast's nodes. Nothing is attached to the container yet.
pub(crate) fn build_nodes<S>(
    surface: &mut S,
    settings: &Settings,
    request: &ToastRequest,
) -> ToastNodes
where
    S: RenderSurface + ?Sized,
{
    let mut root_spec = NodeSpec::with_class(settings.toast_class.clone())
        .attribute("aria-live", request.kind.live_region());
    if let Some(icon) = &request.icon_class {
        root_spec = root_spec.class(icon.clone());
    }
    if settings.rtl {
        root_spec = root_spec.class(RTL_CLASS).attribute("dir", RTL_CLASS);
    }
    let root = surface.create(root_spec);

    let text = |content: &str| {
        if settings.escape_html {
            escape_html(content)
        } else {
            content.to_string()
        }
    };

    let title = request.title.as_deref().map(|title| {
        let node = surface.create(NodeSpec::with_class(settings.title_class.clone()).text(text(title)));
        surface.insert(root, node, Insert::Back);
        node
    });
    let message = request.message.as_deref().map(|message| {
        let node = surface
            .create(NodeSpec::with_class(settings.message_class.clone()).text(text(message)));
        surface.insert(root, node, Insert::Back);
        node
    });
    let close_button = settings.close_button.then(|| {
        let node = surface.create(NodeSpec {
            classes: vec![settings.close_class.clone()],
            markup: Some(settings.close_html.clone()),
            attributes: vec![("role".to_string(), "button".to_string())],
            ..NodeSpec::default()
        });
        surface.insert(root, node, Insert::Front);
        node
    });
    let progress = settings.progress_bar.then(|| {
        let node = surface.create(NodeSpec::with_class(settings.progress_class.clone()));
        surface.insert(root, node, Insert::Front);
        node
    });

    ToastNodes {
        root,
        title,
        message,
        close_button,
        progress,
    }
}

/// Replace the five HTML-significant characters with entities.
#[must_use]
pub fn escape_html(source: &str) -> String {
    let mut escaped = String::with_capacity(source.len());
    for ch in source.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{Countdown, ToastRequest, build_nodes, escape_html};
    use crate::config::Settings;
    use crate::surface::RenderSurface;
    use crate::surface::headless::HeadlessSurface;
    use crate::types::ToastKind;
    use chrono::DateTime;
    use std::time::Duration;

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn optional_parts_follow_content_and_flags() {
        let mut surface = HeadlessSurface::new();
        let request = ToastRequest::new(ToastKind::Error, Some("disk full"), None);
        let nodes = build_nodes(&mut surface, &Settings::default(), &request);
        assert!(nodes.title.is_none());
        assert!(nodes.message.is_some());
        assert!(nodes.close_button.is_none());
        assert!(nodes.progress.is_none());
        assert_eq!(
            surface
                .node(nodes.root)
                .and_then(|n| n.attribute("aria-live")),
            Some("assertive")
        );

        let settings = Settings {
            close_button: true,
            progress_bar: true,
            ..Settings::default()
        };
        let request = ToastRequest::new(ToastKind::Info, Some("body"), Some("head"));
        let nodes = build_nodes(&mut surface, &settings, &request);
        let (Some(close), Some(progress), Some(title), Some(message)) =
            (nodes.close_button, nodes.progress, nodes.title, nodes.message)
        else {
            panic!("every part should be built: {nodes:?}");
        };
        assert_eq!(
            surface.children(nodes.root),
            vec![progress, close, title, message]
        );
    }

    #[test]
    fn escaping_applies_to_title_and_message() {
        let mut surface = HeadlessSurface::new();
        let settings = Settings {
            escape_html: true,
            ..Settings::default()
        };
        let request = ToastRequest::new(ToastKind::Info, Some("<i>hi</i>"), Some("a&b"));
        let nodes = build_nodes(&mut surface, &settings, &request);
        let text = |node| surface.node(node).and_then(|n| n.spec.text.clone());
        assert_eq!(nodes.title.and_then(text), Some("a&amp;b".to_string()));
        assert_eq!(
            nodes.message.and_then(text),
            Some("&lt;i&gt;hi&lt;/i&gt;".to_string())
        );
    }

    #[test]
    fn right_to_left_marks_the_root() {
        let mut surface = HeadlessSurface::new();
        let request = ToastRequest::new(ToastKind::Warning, Some("attention"), None);

        let plain = build_nodes(&mut surface, &Settings::default(), &request);
        let root = surface.node(plain.root);
        assert!(root.is_some_and(|n| !n.has_class("rtl") && n.attribute("dir").is_none()));

        let settings = Settings {
            rtl: true,
            ..Settings::default()
        };
        let mirrored = build_nodes(&mut surface, &settings, &request);
        let root = surface.node(mirrored.root);
        assert!(root.is_some_and(|n| n.has_class("rtl") && n.has_class("toast")));
        assert_eq!(root.and_then(|n| n.attribute("dir")), Some("rtl"));
    }

    #[test]
    fn countdown_depletes_and_clamps() {
        let start = DateTime::UNIX_EPOCH;
        let countdown = Countdown::starting(start, Duration::from_secs(4));
        assert_eq!(countdown.percent(start), Some(100.0));
        let halfway = start + chrono::Duration::seconds(2);
        assert_eq!(countdown.percent(halfway), Some(50.0));
        let late = start + chrono::Duration::seconds(10);
        assert_eq!(countdown.percent(late), Some(0.0));

        let frozen = Countdown {
            hide_eta: None,
            ..countdown
        };
        assert_eq!(frozen.percent(late), None);
    }
}
