use serde::{Deserialize, Serialize};

/// Notifications a session emits for its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SessionEvent {
    ChangeIndexChange { index: usize },
    ScrollLockChange { enabled: bool },
    ComparisonSidebarVisibilityChange { visible: bool },
}

/// Capacity of the notification channel
pub const EVENT_CAPACITY: usize = 64;
