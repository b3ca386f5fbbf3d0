//! Hover session lifecycle.
//!
//! [`HoverMachine`] is the pure state machine: it consumes pointer and timer
//! events and emits actions, never touching timers or the page itself.
//! [`SessionDriver`] owns the side effects: the single timer slot, the
//! overlay, product sensing, and the in-flight advice call.
//!
//! Timers are a single owned slot: arming replaces any previous deadline and
//! every transition that leaves a timed state clears it, so no callback can
//! outlive the state that armed it.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use shopsense_core::ProductRecord;
use tokio::sync::mpsc;
use tokio::time::Sleep;

use crate::orchestrator::{AdviceOutcome, Orchestrator};
use crate::store::PrefStore;

/// Dwell before a hover is considered intentional.
pub const DEBOUNCE: Duration = Duration::from_millis(500);
/// Grace after leaving the source element, long enough to reach the overlay.
pub const SOURCE_GRACE: Duration = Duration::from_millis(100);
/// Grace after leaving the overlay itself.
pub const OVERLAY_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    Debouncing,
    Active,
    Closing,
}

/// Inputs to the state machine. `T` is the hover target handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverEvent<T> {
    PointerEnter(T),
    PointerLeave,
    PointerEnterOverlay,
    PointerLeaveOverlay,
    TimerFired,
    /// Sensing produced a product (driver feedback to a `Sense` action).
    SenseSucceeded,
    /// Sensing found nothing worth showing.
    SenseFailed,
}

/// Effects the driver must perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverAction<T> {
    /// Replace the timer slot with a new deadline.
    ArmTimer(Duration),
    /// Clear the timer slot.
    CancelTimer,
    /// Classify and extract at the target; report back with
    /// `SenseSucceeded` / `SenseFailed`.
    Sense(T),
    /// Show the overlay in its pending state for the sensed product.
    ShowOverlay,
    /// Remove the overlay if one exists.
    RemoveOverlay,
}

/// Pure hover state machine. At most one session is modeled; a new
/// `PointerEnter` supersedes whatever was in flight.
pub struct HoverMachine<T> {
    state: HoverState,
    target: Option<T>,
    pointer_over_overlay: bool,
}

impl<T: Clone> HoverMachine<T> {
    #[must_use]
    pub fn new() -> Self {
        HoverMachine {
            state: HoverState::Idle,
            target: None,
            pointer_over_overlay: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> HoverState {
        self.state
    }

    /// Advances the machine and returns the actions to perform, in order.
    pub fn handle(&mut self, event: HoverEvent<T>) -> Vec<HoverAction<T>> {
        match event {
            HoverEvent::PointerEnter(target) => self.supersede(target),
            HoverEvent::PointerLeave => self.pointer_left_source(),
            HoverEvent::PointerEnterOverlay => {
                self.pointer_over_overlay = true;
                if self.state == HoverState::Closing {
                    self.state = HoverState::Active;
                    vec![HoverAction::CancelTimer]
                } else {
                    Vec::new()
                }
            }
            HoverEvent::PointerLeaveOverlay => {
                self.pointer_over_overlay = false;
                if self.state == HoverState::Active {
                    self.state = HoverState::Closing;
                    vec![HoverAction::ArmTimer(OVERLAY_GRACE)]
                } else {
                    Vec::new()
                }
            }
            HoverEvent::TimerFired => self.timer_fired(),
            HoverEvent::SenseSucceeded => {
                if self.state == HoverState::Debouncing {
                    self.state = HoverState::Active;
                    vec![HoverAction::ShowOverlay]
                } else {
                    Vec::new()
                }
            }
            HoverEvent::SenseFailed => {
                if self.state == HoverState::Debouncing {
                    self.reset();
                }
                Vec::new()
            }
        }
    }

    /// Any existing session is torn down before the new one starts, so at
    /// most one overlay ever exists.
    fn supersede(&mut self, target: T) -> Vec<HoverAction<T>> {
        let mut actions = vec![HoverAction::CancelTimer];
        if matches!(self.state, HoverState::Active | HoverState::Closing) {
            actions.push(HoverAction::RemoveOverlay);
        }
        self.state = HoverState::Debouncing;
        self.target = Some(target);
        self.pointer_over_overlay = false;
        actions.push(HoverAction::ArmTimer(DEBOUNCE));
        actions
    }

    fn pointer_left_source(&mut self) -> Vec<HoverAction<T>> {
        match self.state {
            HoverState::Debouncing => {
                self.reset();
                vec![HoverAction::CancelTimer]
            }
            HoverState::Active if !self.pointer_over_overlay => {
                self.state = HoverState::Closing;
                vec![HoverAction::ArmTimer(SOURCE_GRACE)]
            }
            _ => Vec::new(),
        }
    }

    fn timer_fired(&mut self) -> Vec<HoverAction<T>> {
        match self.state {
            HoverState::Debouncing => match self.target.clone() {
                Some(target) => vec![HoverAction::Sense(target)],
                None => Vec::new(),
            },
            HoverState::Closing => {
                self.reset();
                vec![HoverAction::RemoveOverlay]
            }
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.state = HoverState::Idle;
        self.target = None;
        self.pointer_over_overlay = false;
    }
}

impl<T: Clone> Default for HoverMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pointer events fed to the driver from the page.
#[derive(Debug, Clone)]
pub enum PointerEvent<T> {
    Enter(T),
    Leave,
    EnterOverlay,
    LeaveOverlay,
}

/// Anchor geometry handed to the overlay so it can place itself without
/// obscuring the hovered element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Classifies and extracts a product at a hover target.
pub trait ProductSource: Send {
    type Target: Clone + Send + 'static;

    /// `None` when the page is not a product page or extraction failed; the
    /// session then ends silently with no overlay.
    fn sense(&mut self, target: &Self::Target) -> Option<(ProductRecord, AnchorBounds)>;
}

/// Presentation collaborator. Rendering is out of scope here; the driver
/// only guarantees call ordering and the single-overlay invariant.
pub trait Overlay: Send {
    fn show_pending(&mut self, bounds: &AnchorBounds);
    fn render(&mut self, outcome: &AdviceOutcome);
    fn remove(&mut self);
}

/// Owns the session side effects and runs the event loop.
pub struct SessionDriver<P: ProductSource, O, S> {
    machine: HoverMachine<P::Target>,
    source: P,
    overlay: O,
    orchestrator: Arc<Orchestrator<S>>,
    pending: Option<(ProductRecord, AnchorBounds)>,
    /// Monotonic overlay generation; advice arriving for an older
    /// generation is dropped instead of rendered into the wrong session.
    generation: u64,
}

impl<P, O, S> SessionDriver<P, O, S>
where
    P: ProductSource,
    O: Overlay,
    S: PrefStore + 'static,
{
    pub fn new(source: P, overlay: O, orchestrator: Arc<Orchestrator<S>>) -> Self {
        SessionDriver {
            machine: HoverMachine::new(),
            source,
            overlay,
            orchestrator,
            pending: None,
            generation: 0,
        }
    }

    /// Consumes pointer events until the channel closes. Each loop turn is
    /// one of: a pointer event, the armed timer firing, or an advice
    /// outcome arriving.
    pub async fn run(mut self, mut events: mpsc::Receiver<PointerEvent<P::Target>>) {
        let (advice_tx, mut advice_rx) = mpsc::channel::<(u64, AdviceOutcome)>(4);
        let mut timer: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let event = match event {
                        PointerEvent::Enter(target) => HoverEvent::PointerEnter(target),
                        PointerEvent::Leave => HoverEvent::PointerLeave,
                        PointerEvent::EnterOverlay => HoverEvent::PointerEnterOverlay,
                        PointerEvent::LeaveOverlay => HoverEvent::PointerLeaveOverlay,
                    };
                    self.apply(event, &mut timer, &advice_tx);
                }
                () = async {
                    match timer.as_mut() {
                        Some(sleep) => sleep.await,
                        None => std::future::pending().await,
                    }
                }, if timer.is_some() => {
                    timer = None;
                    self.apply(HoverEvent::TimerFired, &mut timer, &advice_tx);
                }
                Some((generation, outcome)) = advice_rx.recv() => {
                    self.deliver(generation, &outcome);
                }
            }
        }
        self.overlay.remove();
    }

    fn apply(
        &mut self,
        event: HoverEvent<P::Target>,
        timer: &mut Option<Pin<Box<Sleep>>>,
        advice_tx: &mpsc::Sender<(u64, AdviceOutcome)>,
    ) {
        let actions = self.machine.handle(event);
        for action in actions {
            match action {
                HoverAction::ArmTimer(duration) => {
                    *timer = Some(Box::pin(tokio::time::sleep(duration)));
                }
                HoverAction::CancelTimer => {
                    *timer = None;
                }
                HoverAction::Sense(target) => {
                    let feedback = match self.source.sense(&target) {
                        Some(sensed) => {
                            self.pending = Some(sensed);
                            HoverEvent::SenseSucceeded
                        }
                        None => HoverEvent::SenseFailed,
                    };
                    self.apply(feedback, timer, advice_tx);
                }
                HoverAction::ShowOverlay => self.show_overlay(advice_tx),
                HoverAction::RemoveOverlay => self.overlay.remove(),
            }
        }
    }

    fn show_overlay(&mut self, advice_tx: &mpsc::Sender<(u64, AdviceOutcome)>) {
        let Some((record, bounds)) = self.pending.take() else {
            return;
        };
        self.overlay.show_pending(&bounds);
        self.generation += 1;
        let generation = self.generation;
        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = advice_tx.clone();
        tokio::spawn(async move {
            let outcome = orchestrator.request_advice(&record).await;
            // The driver may have shut down; nothing to do then.
            let _ = tx.send((generation, outcome)).await;
        });
    }

    fn deliver(&mut self, generation: u64, outcome: &AdviceOutcome) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale advice");
            return;
        }
        if matches!(self.machine.state(), HoverState::Active | HoverState::Closing) {
            self.overlay.render(outcome);
        }
    }
}
