use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Process-wide toast identifier. The first toast of a service gets `1`.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct ToastId(pub u64);

impl ToastId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Error,
    Info,
    Success,
    Warning,
}

impl ToastKind {
    pub const ALL: [Self; 4] = [Self::Error, Self::Info, Self::Success, Self::Warning];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
        }
    }

    /// Value of the `aria-live` hint placed on the toast node.
    #[must_use]
    pub const fn live_region(self) -> &'static str {
        match self {
            Self::Error => "assertive",
            Self::Info | Self::Success | Self::Warning => "polite",
        }
    }
}

impl Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" | "err" => Ok(Self::Error),
            "info" | "information" => Ok(Self::Info),
            "success" | "ok" => Ok(Self::Success),
            "warning" | "warn" => Ok(Self::Warning),
            other => Err(format!("unknown toast kind: {other}")),
        }
    }
}

/// Lifecycle of a single toast. Transitions only move forward.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastState {
    Pending,
    Visible,
    Hiding,
    Removed,
}

impl ToastState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Visible => "visible",
            Self::Hiding => "hiding",
            Self::Removed => "removed",
        }
    }
}

impl Display for ToastState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ToastKind, ToastState};
    use std::str::FromStr;

    #[test]
    fn toast_kind_from_str_accepts_variants() {
        assert_eq!(ToastKind::from_str("WARN"), Ok(ToastKind::Warning));
        assert_eq!(ToastKind::from_str("error"), Ok(ToastKind::Error));
        assert_eq!(ToastKind::from_str("ok"), Ok(ToastKind::Success));
        assert!(ToastKind::from_str("fatal").is_err());
    }

    #[test]
    fn only_errors_are_assertive() {
        for kind in ToastKind::ALL {
            let expected = if kind == ToastKind::Error {
                "assertive"
            } else {
                "polite"
            };
            assert_eq!(kind.live_region(), expected);
        }
    }

    #[test]
    fn states_are_ordered_forward() {
        assert!(ToastState::Pending < ToastState::Visible);
        assert!(ToastState::Visible < ToastState::Hiding);
        assert!(ToastState::Hiding < ToastState::Removed);
    }
}
