//! Per-toast settings and the three-layer resolver.
//!
//! A toast's effective [`Settings`] are built from the built-in defaults,
//! overlaid by the service-wide [`SettingsOverrides`], overlaid by the
//! overrides passed with the individual request.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ::serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::serde_as;

use crate::Result;
use crate::types::{ToastId, ToastKind};

mod defaults;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

/// Callback invoked with the id of the toast it concerns.
pub type Hook = Arc<dyn Fn(ToastId) + Send + Sync>;

/// Lifecycle callbacks. Never serialised.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_shown: Option<Hook>,
    pub on_hidden: Option<Hook>,
    pub on_click: Option<Hook>,
    pub on_close_click: Option<Hook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_shown", &self.on_shown.is_some())
            .field("on_hidden", &self.on_hidden.is_some())
            .field("on_click", &self.on_click.is_some())
            .field("on_close_click", &self.on_close_click.is_some())
            .finish()
    }
}

#[allow(clippy::struct_excessive_bools)]
#[serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub tap_to_dismiss: bool,
    pub toast_class: String,
    pub container_id: String,
    pub debug: bool,

    pub show_method: String,
    #[serde_as(as = "HumantimeDuration")]
    pub show_duration: Duration,
    pub show_easing: String,
    pub hide_method: String,
    #[serde_as(as = "HumantimeDuration")]
    pub hide_duration: Duration,
    pub hide_easing: String,
    pub close_method: Option<String>,
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub close_duration: Option<Duration>,
    pub close_easing: Option<String>,

    pub close_on_hover: bool,
    #[serde_as(as = "HumantimeDuration")]
    pub extended_timeout: Duration,
    #[serde_as(as = "HumantimeDuration")]
    pub timeout: Duration,

    pub icon_classes: BTreeMap<ToastKind, String>,
    pub icon_class: String,
    pub position_class: String,
    pub title_class: String,
    pub message_class: String,
    pub escape_html: bool,
    pub target: String,
    pub close_html: String,
    pub close_class: String,
    pub close_button: bool,
    pub newest_on_top: bool,
    pub prevent_duplicates: bool,
    pub progress_bar: bool,
    pub progress_class: String,
    pub rtl: bool,

    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub hooks: Hooks,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tap_to_dismiss: true,
            toast_class: defaults::TOAST_CLASS.to_string(),
            container_id: defaults::CONTAINER_ID.to_string(),
            debug: false,
            show_method: defaults::SHOW_METHOD.to_string(),
            show_duration: defaults::SHOW_DURATION,
            show_easing: defaults::EASING.to_string(),
            hide_method: defaults::HIDE_METHOD.to_string(),
            hide_duration: defaults::HIDE_DURATION,
            hide_easing: defaults::EASING.to_string(),
            close_method: None,
            close_duration: None,
            close_easing: None,
            close_on_hover: true,
            extended_timeout: defaults::EXTENDED_TIMEOUT,
            timeout: defaults::TIMEOUT,
            icon_classes: defaults::icon_classes(),
            icon_class: defaults::ICON_CLASS.to_string(),
            position_class: defaults::POSITION_CLASS.to_string(),
            title_class: defaults::TITLE_CLASS.to_string(),
            message_class: defaults::MESSAGE_CLASS.to_string(),
            escape_html: false,
            target: defaults::TARGET.to_string(),
            close_html: defaults::CLOSE_HTML.to_string(),
            close_class: defaults::CLOSE_CLASS.to_string(),
            close_button: false,
            newest_on_top: true,
            prevent_duplicates: false,
            progress_bar: false,
            progress_class: defaults::PROGRESS_CLASS.to_string(),
            rtl: false,
            extra: Map::new(),
            hooks: Hooks::default(),
        }
    }
}

/// Sparse settings layer. Unset fields leave the layer below untouched.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub tap_to_dismiss: Option<bool>,
    pub toast_class: Option<String>,
    pub container_id: Option<String>,
    pub debug: Option<bool>,

    pub show_method: Option<String>,
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub show_duration: Option<Duration>,
    pub show_easing: Option<String>,
    pub hide_method: Option<String>,
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub hide_duration: Option<Duration>,
    pub hide_easing: Option<String>,
    pub close_method: Option<String>,
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub close_duration: Option<Duration>,
    pub close_easing: Option<String>,

    pub close_on_hover: Option<bool>,
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub extended_timeout: Option<Duration>,
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub timeout: Option<Duration>,

    pub icon_classes: Option<BTreeMap<ToastKind, String>>,
    pub icon_class: Option<String>,
    pub position_class: Option<String>,
    pub title_class: Option<String>,
    pub message_class: Option<String>,
    pub escape_html: Option<bool>,
    pub target: Option<String>,
    pub close_html: Option<String>,
    pub close_class: Option<String>,
    pub close_button: Option<bool>,
    pub newest_on_top: Option<bool>,
    pub prevent_duplicates: Option<bool>,
    pub progress_bar: Option<bool>,
    pub progress_class: Option<String>,
    pub rtl: Option<bool>,

    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub hooks: Hooks,
}

macro_rules! overlay {
    ($target:expr, $layer:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$layer.$field {
                $target.$field = value.clone();
            }
        )+
    };
}

macro_rules! overlay_optional {
    ($target:expr, $layer:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$layer.$field {
                $target.$field = Some(value.clone());
            }
        )+
    };
}

impl Settings {
    /// Settings for a toast of `kind`: defaults < `global` < `per_call`.
    ///
    /// The icon class is the per-call `icon_class` if one was given, else the
    /// class registered for `kind`, else the layered `icon_class`.
    #[must_use]
    pub fn resolve(
        kind: ToastKind,
        global: Option<&SettingsOverrides>,
        per_call: Option<&SettingsOverrides>,
    ) -> Self {
        let mut settings = Self::merged(global, per_call);
        settings.icon_class = per_call
            .and_then(|layer| layer.icon_class.clone())
            .or_else(|| settings.icon_classes.get(&kind).cloned())
            .unwrap_or_else(|| settings.icon_class.clone());
        settings
    }

    /// Plain field-by-field overlay, with no per-kind icon selection.
    #[must_use]
    pub fn merged(global: Option<&SettingsOverrides>, per_call: Option<&SettingsOverrides>) -> Self {
        let mut settings = Self::default();
        for layer in [global, per_call].into_iter().flatten() {
            settings.apply(layer);
        }
        settings
    }

    fn apply(&mut self, layer: &SettingsOverrides) {
        overlay!(self, layer;
            tap_to_dismiss, toast_class, container_id, debug,
            show_method, show_duration, show_easing,
            hide_method, hide_duration, hide_easing,
            close_on_hover, extended_timeout, timeout,
            icon_classes, icon_class, position_class, title_class, message_class,
            escape_html, target, close_html, close_class, close_button,
            newest_on_top, prevent_duplicates, progress_bar, progress_class, rtl,
        );
        overlay_optional!(self, layer; close_method, close_duration, close_easing);
        overlay_optional!(self.hooks, layer.hooks; on_shown, on_hidden, on_click, on_close_click);
        for (key, value) in &layer.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Transition used to hide; forced hides prefer the close variants.
    #[must_use]
    pub fn hide_transition(&self, forced: bool) -> (&str, Duration, &str) {
        if !forced {
            return (&self.hide_method, self.hide_duration, &self.hide_easing);
        }
        let method = self.close_method.as_deref().unwrap_or(&self.hide_method);
        let duration = self
            .close_duration
            .filter(|duration| !duration.is_zero())
            .unwrap_or(self.hide_duration);
        let easing = self.close_easing.as_deref().unwrap_or(&self.hide_easing);
        (method, duration, easing)
    }
}

impl SettingsOverrides {
    /// Load a service-wide layer from a TOML file and `TOASTER__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an explicitly named file cannot be read, when the
    /// sources cannot be parsed, or when the container identifier or target is
    /// blank.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        raw::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsOverrides};
    use crate::types::ToastKind;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn per_call_layer_wins_over_global_layer() {
        let global = SettingsOverrides {
            timeout: Some(Duration::from_secs(9)),
            close_button: Some(true),
            ..SettingsOverrides::default()
        };
        let per_call = SettingsOverrides {
            timeout: Some(Duration::ZERO),
            ..SettingsOverrides::default()
        };

        let settings = Settings::resolve(ToastKind::Info, Some(&global), Some(&per_call));
        assert_eq!(settings.timeout, Duration::ZERO);
        assert!(settings.close_button);
        assert_eq!(settings.hide_duration, Duration::from_millis(1000));
    }

    #[test]
    fn icon_class_prefers_per_call_then_kind_then_global() {
        let global = SettingsOverrides {
            icon_class: Some("global-icon".to_string()),
            ..SettingsOverrides::default()
        };
        let settings = Settings::resolve(ToastKind::Warning, Some(&global), None);
        assert_eq!(settings.icon_class, "toast-warning");

        let per_call = SettingsOverrides {
            icon_class: Some("custom".to_string()),
            ..SettingsOverrides::default()
        };
        let settings = Settings::resolve(ToastKind::Warning, Some(&global), Some(&per_call));
        assert_eq!(settings.icon_class, "custom");

        let no_kinds = SettingsOverrides {
            icon_classes: Some(std::collections::BTreeMap::new()),
            ..global
        };
        let settings = Settings::resolve(ToastKind::Error, Some(&no_kinds), None);
        assert_eq!(settings.icon_class, "global-icon");
    }

    #[test]
    fn extra_maps_merge_key_by_key() {
        let mut global = SettingsOverrides::default();
        global.extra.insert("theme".to_string(), json!("dark"));
        global.extra.insert("source".to_string(), json!("global"));
        let mut per_call = SettingsOverrides::default();
        per_call.extra.insert("source".to_string(), json!("call"));

        let settings = Settings::resolve(ToastKind::Info, Some(&global), Some(&per_call));
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));
        assert_eq!(settings.extra.get("source"), Some(&json!("call")));
    }

    #[test]
    fn forced_hide_uses_close_duration_only_when_non_zero() {
        let mut settings = Settings::default();
        assert_eq!(settings.hide_transition(true).1, Duration::from_millis(1000));

        settings.close_duration = Some(Duration::ZERO);
        assert_eq!(settings.hide_transition(true).1, Duration::from_millis(1000));

        settings.close_duration = Some(Duration::from_millis(50));
        settings.close_method = Some("slideUp".to_string());
        assert_eq!(
            settings.hide_transition(true),
            ("slideUp", Duration::from_millis(50), "swing")
        );
        assert_eq!(
            settings.hide_transition(false),
            ("fadeOut", Duration::from_millis(1000), "swing")
        );
    }
}
