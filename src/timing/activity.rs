use std::time::Duration;

use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::timing::event_queue::{Event, TimerEventQueue};

/// Something an [`Activity`] drives: usually a transition wrapped by an animation node.
pub trait Animation {
    /// Called exactly once, before the first `perform`.
    fn start(&mut self);
    /// Apply the effect at simple time `t` in `[0, 1]` during repeat cycle `repeat`.
    fn perform(&mut self, t: f64, repeat: u32);
    /// Called exactly once after the last `perform`.
    fn end(&mut self);
    /// Release resources without running the end sequence.
    fn dispose(&mut self) {}
}

/// Timing parameters of one activity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivityParams {
    /// Simple duration of one cycle.
    pub duration: Duration,
    /// Number of cycles; `0` means indefinite (no natural end).
    pub repeat_count: f64,
    /// Fraction of the simple duration spent accelerating.
    pub acceleration: f64,
    /// Fraction of the simple duration spent decelerating.
    pub deceleration: f64,
    /// Play every cycle forward, then backward.
    pub auto_reverse: bool,
    /// Lag reported by [`Activity::calc_time_lag`] on the first tick.
    pub initial_lag: Duration,
}

impl Default for ActivityParams {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(2000),
            repeat_count: 1.0,
            acceleration: 0.0,
            deceleration: 0.0,
            auto_reverse: false,
            initial_lag: Duration::ZERO,
        }
    }
}

impl ActivityParams {
    /// Validate finite, non-negative values.
    ///
    /// Fractions above 1, alone or summed, are *not* an error; such activities use linear timing.
    pub fn validate(&self) -> SlideFxResult<()> {
        if !self.repeat_count.is_finite() || self.repeat_count < 0.0 {
            return Err(SlideFxError::animation(
                "repeat count must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SlideFxError::animation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Map raw simple time through an acceleration/deceleration profile.
///
/// The curve accelerates uniformly for the first `a` of the interval, runs at constant speed, then
/// decelerates uniformly for the last `d`; the result is renormalized so that `1` maps to `1`.
/// When `a + d > 1` the profile is ignored and `nt` is returned unchanged.
pub fn calc_accelerated_time(nt: f64, a: f64, d: f64) -> f64 {
    let nt = nt.clamp(0.0, 1.0);
    if a + d > 1.0 || a < 0.0 || d < 0.0 || (a == 0.0 && d == 0.0) {
        return nt;
    }

    let c = 1.0 - a / 2.0 - d / 2.0;
    let t = if nt < a {
        nt * nt / (2.0 * a)
    } else if nt <= 1.0 - d {
        a / 2.0 + (nt - a)
    } else {
        let r = nt - 1.0 + d;
        (1.0 - a - d) + a / 2.0 + r - r * r / (2.0 * d)
    };
    (t / c).clamp(0.0, 1.0)
}

/// One timed animation instance.
///
/// Lifecycle: [`activate`](Self::activate) → first [`perform`](Self::perform) starts the animation
/// → ticks advance time → ends once, naturally or through [`end`](Self::end) → dropped. Use
/// [`dispose`](Self::dispose) for teardown that must not announce completion.
pub struct Activity {
    params: ActivityParams,
    target: Option<String>,
    animation: Box<dyn Animation>,

    end_event: Option<Event>,
    active: bool,
    first_perform_call: bool,
    start_time: Duration,
    last_now: Duration,
    progress: f64,
}

impl std::fmt::Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activity")
            .field("params", &self.params)
            .field("target", &self.target)
            .field("active", &self.active)
            .field("first_perform_call", &self.first_perform_call)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl Activity {
    /// Create an inactive activity driving `animation`.
    pub fn new(
        params: ActivityParams,
        animation: Box<dyn Animation>,
        target: Option<String>,
    ) -> SlideFxResult<Self> {
        params.validate()?;
        let mut params = params;
        if params.acceleration + params.deceleration > 1.0 {
            tracing::warn!(
                acceleration = params.acceleration,
                deceleration = params.deceleration,
                "acceleration + deceleration exceeds 1, using linear timing"
            );
            params.acceleration = 0.0;
            params.deceleration = 0.0;
        }
        Ok(Self {
            params,
            target,
            animation,
            end_event: None,
            active: false,
            first_perform_call: true,
            start_time: Duration::ZERO,
            last_now: Duration::ZERO,
            progress: 0.0,
        })
    }

    /// Reset to "not yet started, active" and take ownership of the end event.
    pub fn activate(&mut self, end_event: Event) {
        self.end_event = Some(end_event);
        self.active = true;
        self.first_perform_call = true;
        self.progress = 0.0;
    }

    /// Return `true` while the activity still wants ticks.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Return `true` until the animation has been started.
    pub fn is_first_perform_call(&self) -> bool {
        self.first_perform_call
    }

    /// Element animated by this activity, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Effective timing parameters (accel/decel zeroed when they were ignored).
    pub fn params(&self) -> &ActivityParams {
        &self.params
    }

    /// Return `true` for any non-zero repeat count.
    pub fn is_repeat_count_valid(&self) -> bool {
        self.params.repeat_count != 0.0
    }

    /// Configured repeat count.
    pub fn repeat_count(&self) -> f64 {
        self.params.repeat_count
    }

    /// Whether each cycle plays backward after playing forward.
    pub fn is_auto_reverse(&self) -> bool {
        self.params.auto_reverse
    }

    /// Fraction of the whole active duration elapsed so far.
    ///
    /// Non-decreasing while active and always within `[0, 1]`. Indefinite activities report `0`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Start the animation on the first call and return the initial lag.
    pub fn calc_time_lag(&mut self) -> Duration {
        if self.first_perform_call {
            self.first_perform_call = false;
            self.start_animation();
        }
        self.params.initial_lag
    }

    /// Advance to `now`. Returns `false` once the activity is inactive.
    pub fn perform(&mut self, now: Duration, queue: &mut TimerEventQueue) -> bool {
        if !self.active {
            return false;
        }

        if self.first_perform_call {
            let lag = self.calc_time_lag();
            self.start_time = now.saturating_sub(lag);
            self.last_now = now;
        }

        // Host clocks may jitter backwards; time never does.
        let now = now.max(self.last_now);
        self.last_now = now;
        let elapsed = now.saturating_sub(self.start_time).as_nanos() as f64;

        let cycle_len = if self.params.auto_reverse { 2.0 } else { 1.0 };
        let simple = self.params.duration.as_nanos() as f64;
        let repeat_valid = self.is_repeat_count_valid();
        let total_cycles = self.params.repeat_count * cycle_len;

        let mut ending = false;
        let mut n_t = if simple > 0.0 {
            elapsed / simple
        } else {
            ending = repeat_valid;
            total_cycles
        };

        if repeat_valid {
            if n_t >= total_cycles {
                ending = true;
                n_t = total_cycles;
            }
            let progress = if total_cycles > 0.0 {
                (n_t / total_cycles).clamp(0.0, 1.0)
            } else {
                1.0
            };
            self.progress = self.progress.max(progress);
        }

        let (t, repeat) = simple_time(n_t, ending, self.params.auto_reverse);
        let t = calc_accelerated_time(t, self.params.acceleration, self.params.deceleration);
        self.animation.perform(t, repeat);

        if ending {
            self.end_animation();
            self.end_activity(now, queue);
            return false;
        }
        true
    }

    /// Force the activity to its final state, announcing completion exactly once.
    pub fn end(&mut self, now: Duration, queue: &mut TimerEventQueue) {
        if !self.active {
            return;
        }
        if self.first_perform_call {
            self.first_perform_call = false;
            self.start_animation();
        }
        self.perform_end();
        self.end_animation();
        self.end_activity(now, queue);
    }

    /// Deactivate and release the end event without enqueuing it.
    pub fn dispose(&mut self) {
        self.active = false;
        self.end_event = None;
        self.animation.dispose();
    }

    fn start_animation(&mut self) {
        self.animation.start();
    }

    fn perform_end(&mut self) {
        let t = if self.params.auto_reverse { 0.0 } else { 1.0 };
        let repeat = self.params.repeat_count.ceil().max(1.0) as u32 - 1;
        self.animation.perform(t, repeat);
    }

    fn end_animation(&mut self) {
        self.animation.end();
    }

    fn end_activity(&mut self, now: Duration, queue: &mut TimerEventQueue) {
        self.active = false;
        if self.is_repeat_count_valid() {
            self.progress = 1.0;
        }
        if let Some(event) = self.end_event.take() {
            queue.add_event(event, now);
        }
    }
}

/// Split cycle time into `(simple time, repeat index)`.
fn simple_time(n_t: f64, ending: bool, auto_reverse: bool) -> (f64, u32) {
    let mut repeats = n_t.floor();
    let mut rel = n_t - repeats;
    if ending && rel == 0.0 && repeats > 0.0 {
        rel = 1.0;
        repeats -= 1.0;
    }
    if auto_reverse {
        if (repeats as u64) % 2 == 1 {
            rel = 1.0 - rel;
        }
        repeats = (repeats / 2.0).floor();
    }
    (rel.clamp(0.0, 1.0), repeats.max(0.0) as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/activity.rs"]
mod tests;
