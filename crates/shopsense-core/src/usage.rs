use serde::{Deserialize, Serialize};

/// Free analyses granted before payment is required.
pub const DEFAULT_FREE_LIMIT: u32 = 5;

/// Snapshot of the persisted usage counters, read once per advice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageState {
    pub used: u32,
    pub free_limit: u32,
    pub has_paid: bool,
}

impl Default for UsageState {
    /// The fail-open default used when storage is unreadable.
    fn default() -> Self {
        UsageState {
            used: 0,
            free_limit: DEFAULT_FREE_LIMIT,
            has_paid: false,
        }
    }
}

impl UsageState {
    #[must_use]
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            used: self.used,
            free_limit: self.free_limit,
            remaining_free_uses: self.free_limit.saturating_sub(self.used),
        }
    }
}

/// The usage view reported back to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub used: u32,
    pub free_limit: u32,
    pub remaining_free_uses: u32,
}
