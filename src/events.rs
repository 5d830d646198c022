use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Settings;
use crate::toast::ToastRequest;
use crate::types::ToastId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Payload delivered to the subscriber on every visibility change.
#[derive(Clone, Debug, Serialize)]
pub struct ToastEvent {
    pub toast_id: ToastId,
    pub state: Visibility,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub settings: Settings,
    pub request: ToastRequest,
}

pub type Subscriber = Box<dyn FnMut(&ToastEvent)>;

/// Holds at most one subscriber; installing another replaces it.
#[derive(Default)]
pub struct EventPublisher {
    subscriber: Option<Subscriber>,
}

impl EventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ToastEvent) + 'static) {
        self.subscriber = Some(Box::new(subscriber));
    }

    pub fn publish(&mut self, event: &ToastEvent) {
        if event.settings.debug {
            match serde_json::to_string(event) {
                Ok(json) => tracing::debug!(toast_id = %event.toast_id, event = %json, "toast event"),
                Err(err) => tracing::debug!(toast_id = %event.toast_id, error = %err, "toast event"),
            }
        }
        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber(event);
        }
    }

    #[must_use]
    pub const fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("subscribed", &self.subscriber.is_some())
            .finish()
    }
}
