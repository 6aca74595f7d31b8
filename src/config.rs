use std::time::Duration;

/// Tunables for the player's gestures and signal cadence.
///
/// The defaults match common mobile player behaviour: double tap seeks back
/// 5 s and forward 10 s, holding right plays at 2×.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Maximum gap between two taps on the same side to count as a double tap.
    pub double_tap_window: Duration,
    /// Seconds a left double tap seeks back.
    pub back_step: f64,
    /// Seconds a right double tap seeks forward.
    pub forward_step: f64,
    /// Playback rate while holding the left scrub button.
    pub left_scrub_rate: f64,
    /// Playback rate while holding the right scrub button.
    pub right_scrub_rate: f64,
    /// One-off position nudge applied when a hold starts, in seconds.
    pub hold_nudge: f64,
    /// Rate restored when a hold ends.
    pub normal_rate: f64,
    /// Minimum spacing between two `TimeUpdate` signals from a [`crate::Video`].
    pub time_update_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            double_tap_window: Duration::from_millis(300),
            back_step: 5.0,
            forward_step: 10.0,
            left_scrub_rate: 1.0,
            right_scrub_rate: 2.0,
            hold_nudge: 1.0,
            normal_rate: 1.0,
            time_update_interval: Duration::from_millis(250),
        }
    }
}

impl PlayerConfig {
    pub fn with_double_tap_window(mut self, window: Duration) -> Self {
        self.double_tap_window = window;
        self
    }

    /// Set the back and forward double-tap seek steps, in seconds.
    pub fn with_seek_steps(mut self, back: f64, forward: f64) -> Self {
        self.back_step = back;
        self.forward_step = forward;
        self
    }

    /// Set the left and right hold-scrub playback rates.
    pub fn with_scrub_rates(mut self, left: f64, right: f64) -> Self {
        self.left_scrub_rate = left;
        self.right_scrub_rate = right;
        self
    }

    pub fn with_hold_nudge(mut self, seconds: f64) -> Self {
        self.hold_nudge = seconds;
        self
    }

    pub fn with_time_update_interval(mut self, interval: Duration) -> Self {
        self.time_update_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = PlayerConfig::default()
            .with_seek_steps(3.0, 30.0)
            .with_scrub_rates(0.5, 4.0)
            .with_double_tap_window(Duration::from_millis(500))
            .with_hold_nudge(2.0)
            .with_time_update_interval(Duration::from_millis(100));

        assert_eq!(config.back_step, 3.0);
        assert_eq!(config.forward_step, 30.0);
        assert_eq!(config.left_scrub_rate, 0.5);
        assert_eq!(config.right_scrub_rate, 4.0);
        assert_eq!(config.double_tap_window, Duration::from_millis(500));
        assert_eq!(config.hold_nudge, 2.0);
        assert_eq!(config.time_update_interval, Duration::from_millis(100));
        assert_eq!(config.normal_rate, 1.0);
    }
}
