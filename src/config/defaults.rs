use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::ToastKind;

pub(super) const SHOW_DURATION: Duration = Duration::from_millis(300);
pub(super) const HIDE_DURATION: Duration = Duration::from_millis(1000);
pub(super) const EXTENDED_TIMEOUT: Duration = Duration::from_millis(1000);
pub(super) const TIMEOUT: Duration = Duration::from_millis(5000);

pub(super) const SHOW_METHOD: &str = "fadeIn";
pub(super) const HIDE_METHOD: &str = "fadeOut";
pub(super) const EASING: &str = "swing";

pub(super) const TOAST_CLASS: &str = "toast";
pub(super) const CONTAINER_ID: &str = "toast-container";
pub(super) const ICON_CLASS: &str = "toast-info";
pub(super) const POSITION_CLASS: &str = "toast-top-right";
pub(super) const TITLE_CLASS: &str = "toast-title";
pub(super) const MESSAGE_CLASS: &str = "toast-message";
pub(super) const TARGET: &str = "body";
pub(super) const CLOSE_HTML: &str = r#"<button type="button">&times;</button>"#;
pub(super) const CLOSE_CLASS: &str = "toast-close-button";
pub(super) const PROGRESS_CLASS: &str = "toast-progress";

pub(super) fn icon_classes() -> BTreeMap<ToastKind, String> {
    ToastKind::ALL
        .into_iter()
        .map(|kind| (kind, format!("toast-{kind}")))
        .collect()
}
