//! The state machine seam between decision logic and the runner.

use crate::{Action, Event};
use std::time::Duration;

/// Decision logic driven by decoded bus events.
///
/// Implementations hold all intersection state and never touch a socket, a
/// file or a timer. Each call to [`handle`](StateMachine::handle) commits a
/// transition and describes its side effects as [`Action`]s; the runner
/// performs them in order.
///
/// ```ignore
/// let mut controller = IntersectionController::new(ControllerConfig::default());
/// controller.set_time(wall_clock());
/// for action in controller.handle(Event::VehicleArrived) {
///     runner.execute(action);
/// }
/// ```
pub trait StateMachine {
    /// Apply one event and return the resulting side effects.
    ///
    /// Must not block. Identical state and event produce identical actions,
    /// which is what lets tests assert on the returned `Vec` directly.
    fn handle(&mut self, event: Event) -> Vec<Action>;

    /// Wall-clock time since the Unix epoch, used to stamp audit records.
    ///
    /// The runner sets it before every `handle()` and cycle step.
    fn set_time(&mut self, now: Duration);

    /// Time last passed to `set_time()`.
    fn now(&self) -> Duration;
}
