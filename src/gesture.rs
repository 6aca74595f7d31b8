//! Tap disambiguation for the step buttons.
//!
//! A first tap arms a window. A second tap on the same side inside the window
//! is a double tap; anything else re-arms the window for the new tap. The
//! window is closed by a scheduled reset which carries the generation it was
//! armed with, so a late or cancelled reset never touches a newer window.

use std::time::{Duration, Instant};

/// Which side of the player a gesture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Reset the host must schedule after a tap arms the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReset {
    pub generation: u64,
    pub after: Duration,
}

/// What a single tap did to the gesture window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tap {
    /// The tap opened a new window.
    Armed(PendingReset),
    /// The tap closed the window as a double tap on this side.
    Double(Side),
}

/// Result of registering a tap on the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// First tap of a possible double tap.
    Armed(PendingReset),
    /// Second tap on the same side inside the window. `target` is the clamped
    /// position the player seeked to.
    DoubleTap { side: Side, target: f64 },
    /// The player is unmounted.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapState {
    Idle,
    AwaitingSecondTap {
        side: Side,
        started_at: Instant,
        generation: u64,
    },
}

#[derive(Debug)]
pub struct TapGesture {
    window: Duration,
    state: TapState,
    next_generation: u64,
}

impl TapGesture {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: TapState::Idle,
            next_generation: 0,
        }
    }

    /// Register a tap. Either completes a double tap or arms the window and
    /// hands back the reset to schedule.
    pub fn tap(&mut self, side: Side, now: Instant) -> Tap {
        if let TapState::AwaitingSecondTap {
            side: armed,
            started_at,
            ..
        } = self.state
        {
            if armed == side && now.saturating_duration_since(started_at) < self.window {
                self.state = TapState::Idle;
                return Tap::Double(side);
            }
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.state = TapState::AwaitingSecondTap {
            side,
            started_at: now,
            generation,
        };
        Tap::Armed(PendingReset {
            generation,
            after: self.window,
        })
    }

    /// Close the window armed with `generation`. Returns whether it did.
    pub fn expire(&mut self, generation: u64) -> bool {
        match self.state {
            TapState::AwaitingSecondTap {
                generation: armed, ..
            } if armed == generation => {
                self.state = TapState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drop any armed window.
    pub fn cancel(&mut self) {
        self.state = TapState::Idle;
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, TapState::AwaitingSecondTap { .. })
    }

    /// Side waiting for its second tap, if any.
    pub fn armed_side(&self) -> Option<Side> {
        match self.state {
            TapState::AwaitingSecondTap { side, .. } => Some(side),
            TapState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    fn armed(tap: Tap) -> PendingReset {
        match tap {
            Tap::Armed(reset) => reset,
            Tap::Double(side) => panic!("unexpected double tap on {side:?}"),
        }
    }

    #[test]
    fn same_side_inside_window_is_double_tap() {
        let mut gesture = TapGesture::new(WINDOW);
        let t0 = Instant::now();

        armed(gesture.tap(Side::Right, t0));
        assert_eq!(
            gesture.tap(Side::Right, t0 + Duration::from_millis(120)),
            Tap::Double(Side::Right)
        );
        assert!(!gesture.is_awaiting());
    }

    #[test]
    fn taps_at_window_edge_do_not_pair() {
        let mut gesture = TapGesture::new(WINDOW);
        let t0 = Instant::now();

        armed(gesture.tap(Side::Left, t0));
        armed(gesture.tap(Side::Left, t0 + WINDOW));
        assert_eq!(gesture.armed_side(), Some(Side::Left));
    }

    #[test]
    fn opposite_sides_rearm_instead_of_pairing() {
        let mut gesture = TapGesture::new(WINDOW);
        let t0 = Instant::now();

        let first = armed(gesture.tap(Side::Left, t0));
        let second = armed(gesture.tap(Side::Right, t0 + Duration::from_millis(50)));

        assert_ne!(first.generation, second.generation);
        assert_eq!(gesture.armed_side(), Some(Side::Right));
    }

    #[test]
    fn stale_reset_is_ignored() {
        let mut gesture = TapGesture::new(WINDOW);
        let t0 = Instant::now();

        let first = armed(gesture.tap(Side::Left, t0));
        let second = armed(gesture.tap(Side::Right, t0 + Duration::from_millis(10)));

        assert!(!gesture.expire(first.generation));
        assert!(gesture.is_awaiting());
        assert!(gesture.expire(second.generation));
        assert!(!gesture.expire(second.generation));
    }

    #[test]
    fn expired_window_needs_two_fresh_taps() {
        let mut gesture = TapGesture::new(WINDOW);
        let t0 = Instant::now();

        let reset = armed(gesture.tap(Side::Right, t0));
        gesture.expire(reset.generation);

        armed(gesture.tap(Side::Right, t0 + Duration::from_millis(100)));
    }
}
