//! Hover-triggered advisory sessions.
//!
//! The hover state machine debounces pointer activity into at most one live
//! session, the orchestrator runs the advice flow with quota gating and
//! fallback, and the preference store persists the free-usage counter
//! between sessions.

mod hover;
mod orchestrator;
pub mod quota;
mod store;

pub use hover::{
    AnchorBounds, HoverAction, HoverEvent, HoverMachine, HoverState, Overlay, PointerEvent,
    ProductSource, SessionDriver, DEBOUNCE, OVERLAY_GRACE, SOURCE_GRACE,
};
pub use orchestrator::{AdviceOutcome, FallbackReason, Orchestrator};
pub use store::{MemoryPrefStore, PrefStore, StoreError};
