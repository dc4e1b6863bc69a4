//! Settle detection: has the rocket been at rest long enough to judge it?
//!
//! The timer only counts while every gate is open:
//!
//! - **control gate**: the player has issued at least one input this session;
//! - **motion gate**: the rocket has moved faster than the stopped threshold
//!   since that input, within the current segment.  A rocket that never left
//!   rest is never judged, even after a key press;
//! - **landed gate**: the rocket is touching something (opened on every
//!   touchdown, closed when the last contact ends).
//!
//! Accumulation uses tick deltas, never wall-clock time.  Any sample above the
//! stopped threshold restarts the countdown from zero.

/// Fired once when the confirmation window has been filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled;

#[derive(Debug, Clone)]
pub struct StabilityTimer {
    stopped_threshold: f32,
    confirmation_window: f32,
    elapsed: f32,
    control_seen: bool,
    motion_seen: bool,
    landed: bool,
}

impl StabilityTimer {
    pub fn new(stopped_threshold: f32, confirmation_window: f32) -> Self {
        Self {
            stopped_threshold,
            confirmation_window,
            elapsed: 0.0,
            control_seen: false,
            motion_seen: false,
            landed: false,
        }
    }

    /// Open the control gate.  Sticky for the rest of the session.
    pub fn note_control_input(&mut self) {
        self.control_seen = true;
    }

    /// Sample the current speed for the motion gate.  Ignored until control
    /// input has been seen.
    pub fn note_speed(&mut self, current_speed: f32) {
        if self.control_seen && current_speed > self.stopped_threshold {
            self.motion_seen = true;
        }
    }

    /// Segment history cleared: the next segment has to move again.
    pub fn forget_motion(&mut self) {
        self.motion_seen = false;
        self.elapsed = 0.0;
    }

    /// Touchdown: open the landed gate.  Re-arming while landed keeps `elapsed`.
    pub fn arm(&mut self) {
        self.landed = true;
    }

    /// Contact lost: close the landed gate and drop any partial countdown.
    pub fn disarm(&mut self) {
        self.landed = false;
        self.elapsed = 0.0;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.control_seen && self.motion_seen && self.landed
    }

    #[inline]
    pub fn control_seen(&self) -> bool {
        self.control_seen
    }

    #[inline]
    pub fn motion_seen(&self) -> bool {
        self.motion_seen
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance by one tick.  Feeds the motion gate, then counts.  Returns
    /// `Some(Settled)` on the tick the window fills.
    pub fn on_tick(&mut self, current_speed: f32, dt: f32) -> Option<Settled> {
        self.note_speed(current_speed);
        if !self.is_armed() {
            return None;
        }
        if current_speed <= self.stopped_threshold {
            self.elapsed += dt;
            if self.elapsed >= self.confirmation_window {
                self.elapsed = 0.0;
                return Some(Settled);
            }
        } else {
            self.elapsed = 0.0;
        }
        None
    }

    /// Back to a fresh session: every gate closed, countdown cleared.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.control_seen = false;
        self.motion_seen = false;
        self.landed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Window and dt are exact binary fractions so float sums land exactly.
    fn armed_timer() -> StabilityTimer {
        let mut t = StabilityTimer::new(0.1, 1.0);
        t.note_control_input();
        t.note_speed(2.0);
        t.arm();
        t
    }

    #[test]
    fn fires_once_window_is_filled() {
        let mut t = armed_timer();
        assert_eq!(t.on_tick(0.0, 0.25), None);
        assert_eq!(t.on_tick(0.05, 0.25), None);
        assert_eq!(t.on_tick(0.1, 0.25), None);
        assert_eq!(t.on_tick(0.0, 0.25), Some(Settled));
        assert_eq!(t.elapsed(), 0.0);
    }

    #[test]
    fn single_excursion_restarts_countdown() {
        let mut t = armed_timer();
        t.on_tick(0.0, 0.25);
        t.on_tick(0.0, 0.25);
        t.on_tick(0.0, 0.25);
        assert_eq!(t.elapsed(), 0.75);
        assert_eq!(t.on_tick(0.2, 0.25), None);
        assert_eq!(t.elapsed(), 0.0);
        for _ in 0..3 {
            assert_eq!(t.on_tick(0.0, 0.25), None);
        }
        assert_eq!(t.on_tick(0.0, 0.25), Some(Settled));
    }

    #[test]
    fn elapsed_is_non_decreasing_while_stopped() {
        let mut t = StabilityTimer::new(0.1, 100.0);
        t.note_control_input();
        t.note_speed(1.0);
        t.arm();
        let mut last = 0.0;
        for i in 0..50 {
            t.on_tick(if i % 2 == 0 { 0.0 } else { 0.1 }, 0.5);
            assert!(t.elapsed() >= last);
            last = t.elapsed();
        }
    }

    #[test]
    fn needs_control_input_before_counting() {
        let mut t = StabilityTimer::new(0.1, 1.0);
        t.arm();
        for _ in 0..10 {
            assert_eq!(t.on_tick(0.0, 0.25), None);
        }
        assert_eq!(t.elapsed(), 0.0);
        t.note_control_input();
        t.note_speed(0.5);
        assert!(t.is_armed());
    }

    #[test]
    fn stationary_rocket_is_never_judged() {
        let mut t = StabilityTimer::new(0.1, 1.0);
        t.note_control_input();
        t.arm();
        for _ in 0..40 {
            assert_eq!(t.on_tick(0.0, 0.25), None);
        }
        assert!(!t.motion_seen());
        assert_eq!(t.elapsed(), 0.0);
    }

    #[test]
    fn motion_before_control_input_does_not_count() {
        let mut t = StabilityTimer::new(0.1, 1.0);
        t.arm();
        t.on_tick(3.0, 0.25);
        t.note_control_input();
        assert!(!t.motion_seen());

        assert_eq!(t.on_tick(0.5, 0.25), None);
        assert!(t.motion_seen());
        for _ in 0..3 {
            assert_eq!(t.on_tick(0.0, 0.25), None);
        }
        assert_eq!(t.on_tick(0.0, 0.25), Some(Settled));
    }

    #[test]
    fn forgetting_motion_closes_the_gate_again() {
        let mut t = armed_timer();
        t.on_tick(0.0, 0.5);
        t.forget_motion();
        assert!(!t.is_armed());
        assert_eq!(t.elapsed(), 0.0);
        for _ in 0..10 {
            assert_eq!(t.on_tick(0.0, 0.25), None);
        }
        t.reset();
        assert!(!t.control_seen());
        assert!(!t.motion_seen());
    }

    #[test]
    fn disarm_drops_partial_countdown() {
        let mut t = armed_timer();
        t.on_tick(0.0, 0.5);
        t.disarm();
        assert_eq!(t.elapsed(), 0.0);
        assert_eq!(t.on_tick(0.0, 5.0), None, "disarmed timers never fire");
        t.arm();
        assert_eq!(t.on_tick(0.0, 0.5), None);
        assert_eq!(t.on_tick(0.0, 0.5), Some(Settled));
    }
}
