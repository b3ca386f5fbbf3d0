//! Free-usage admission check.

use shopsense_core::UsageState;

/// Whether an advice request may go out under the current usage state.
///
/// Pure and side-effect-free; the counter is only mutated by the
/// orchestrator after a confirmed success.
#[must_use]
pub fn admit(state: &UsageState) -> bool {
    state.has_paid || state.used < state.free_limit
}
