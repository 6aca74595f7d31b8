/// Bounds and step of a slider control.
///
/// The slider is what keeps volume and seek input inside the valid range;
/// the player writes whatever value it produces straight to the primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// `0..=1` in hundredths.
    pub const fn volume() -> Self {
        Self::new(0.0, 1.0, 0.01)
    }

    /// `0..=duration` in whole seconds.
    pub fn seek(duration: f64) -> Self {
        Self::new(0.0, duration.max(0.0), 1.0)
    }

    /// Value under the pointer at `ratio` of the track width, snapped to the
    /// step and kept inside the range.
    pub fn value_at(&self, ratio: f32) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return self.min;
        }
        let raw = self.min + span * f64::from(ratio.clamp(0.0, 1.0));
        let snapped = if self.step > 0.0 {
            self.min + ((raw - self.min) / self.step).round() * self.step
        } else {
            raw
        };
        snapped.clamp(self.min, self.max)
    }

    /// Fraction of the track filled for `value`.
    pub fn ratio_of(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_snaps_to_hundredths() {
        let range = SliderRange::volume();
        assert!((range.value_at(0.333) - 0.33).abs() < 1e-9);
        assert_eq!(range.value_at(1.5), 1.0);
        assert_eq!(range.value_at(-0.2), 0.0);
    }

    #[test]
    fn seek_snaps_to_whole_seconds() {
        let range = SliderRange::seek(90.0);
        assert_eq!(range.value_at(0.5), 45.0);
        assert_eq!(range.value_at(0.504), 45.0);
        assert_eq!(range.value_at(1.0), 90.0);
    }

    #[test]
    fn unknown_duration_pins_to_zero() {
        let range = SliderRange::seek(0.0);
        assert_eq!(range.value_at(0.7), 0.0);
        assert_eq!(range.ratio_of(12.0), 0.0);
    }

    #[test]
    fn ratio_tracks_value() {
        let range = SliderRange::seek(200.0);
        assert_eq!(range.ratio_of(50.0), 0.25);
        assert_eq!(range.ratio_of(400.0), 1.0);
    }
}
