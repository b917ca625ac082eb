use std::time::Duration;

use crate::config::settings::GateTimings;
use crate::surface::CanvasEffect;

/// Lifecycle of the enter affordance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateState {
    /// Engine just started; the affordance is hidden.
    Idle,
    /// Reveal delay elapsed; passes straight through to `Armed`.
    WaitingToReveal,
    /// The affordance is interactive.
    Armed,
    /// Exit fade/scale is playing; input is ignored.
    Transitioning,
    /// Terminal; the host callback has run.
    Done,
}

/// Host-side state of the enter button.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affordance {
    /// Fade-in opacity in `[0, 1]`.
    pub opacity: f64,
    /// Whether a click is accepted.
    pub interactive: bool,
}

/// Callback run once when the gate reaches [`GateState::Done`].
pub type EntryCallback = Box<dyn FnOnce()>;

/// Time- and click-driven state machine in front of the host's "entry accepted" callback.
pub struct EntryGate {
    state: GateState,
    timings: GateTimings,
    in_state: Duration,
    on_entry_accepted: Option<EntryCallback>,
}

impl std::fmt::Debug for EntryGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryGate")
            .field("state", &self.state)
            .field("in_state", &self.in_state)
            .field("callback_pending", &self.on_entry_accepted.is_some())
            .finish()
    }
}

impl EntryGate {
    /// New gate in [`GateState::Idle`].
    pub fn new(timings: GateTimings, on_entry_accepted: EntryCallback) -> Self {
        Self {
            state: GateState::Idle,
            timings,
            in_state: Duration::ZERO,
            on_entry_accepted: Some(on_entry_accepted),
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Time spent in the current state.
    pub fn time_in_state(&self) -> Duration {
        self.in_state
    }

    /// Advance the wall clock by `dt`, stepping through any transitions that became due.
    pub fn tick(&mut self, dt: Duration) -> GateState {
        self.in_state = self.in_state.saturating_add(dt);
        loop {
            let next = match self.state {
                GateState::Idle if self.in_state >= self.reveal_delay() => {
                    GateState::WaitingToReveal
                }
                GateState::WaitingToReveal => GateState::Armed,
                GateState::Transitioning if self.in_state >= self.transition() => GateState::Done,
                _ => break,
            };
            // Timed steps carry the overshoot so the next phase starts on schedule.
            let carry = match self.state {
                GateState::Idle => self.in_state - self.reveal_delay(),
                GateState::Transitioning => self.in_state - self.transition(),
                _ => self.in_state,
            };
            self.enter(next, carry);
        }
        self.state
    }

    /// The enter click. Returns `true` when it started the exit transition.
    pub fn on_enter_requested(&mut self) -> bool {
        if self.state != GateState::Armed {
            tracing::debug!(state = ?self.state, "enter request ignored");
            return false;
        }
        self.enter(GateState::Transitioning, Duration::ZERO);
        true
    }

    fn enter(&mut self, next: GateState, carry: Duration) {
        tracing::debug!(from = ?self.state, to = ?next, "gate transition");
        self.state = next;
        self.in_state = carry;
        if next == GateState::Done
            && let Some(cb) = self.on_entry_accepted.take()
        {
            tracing::info!("entry accepted");
            cb();
        }
    }

    fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.timings.reveal_delay_ms)
    }

    fn transition(&self) -> Duration {
        Duration::from_millis(self.timings.transition_ms)
    }

    /// Eased exit progress: 0 before the transition, 1 once done.
    pub fn transition_progress(&self) -> f64 {
        match self.state {
            GateState::Transitioning => {
                let t = self.in_state.as_secs_f64() / self.transition().as_secs_f64().max(1e-9);
                self.timings.transition_ease.apply(t)
            }
            GateState::Done => 1.0,
            _ => 0.0,
        }
    }

    /// Whole-canvas fade/scale for the current exit progress.
    pub fn canvas_effect(&self) -> CanvasEffect {
        let p = self.transition_progress();
        CanvasEffect {
            opacity: 1.0 - p,
            scale: 1.0 + (self.timings.transition_scale - 1.0) * p,
        }
    }

    /// State of the enter button for the host.
    pub fn affordance(&self) -> Affordance {
        match self.state {
            GateState::Armed => {
                let fade = Duration::from_millis(self.timings.affordance_fade_ms);
                let opacity = if fade.is_zero() {
                    1.0
                } else {
                    (self.in_state.as_secs_f64() / fade.as_secs_f64()).min(1.0)
                };
                Affordance {
                    opacity,
                    interactive: true,
                }
            }
            _ => Affordance {
                opacity: 0.0,
                interactive: false,
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/gate.rs"]
mod tests;
