#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod animation;
pub mod clock;
pub mod config;
pub mod container;
pub mod dedup;
pub mod error;
pub mod events;
pub mod service;
pub mod surface;
pub mod telemetry;
pub mod timers;
pub mod toast;
pub mod types;

pub use config::{Settings, SettingsOverrides};
pub use events::ToastEvent;
pub use service::{ClearOptions, NotificationService, ToastHandle};
pub use types::{ToastId, ToastKind, ToastState};

pub type Result<T> = std::result::Result<T, error::Error>;
