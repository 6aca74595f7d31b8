//! Player behaviour independent of any UI toolkit.
//!
//! [`PlayerController`] owns the gesture and play state, subscribes to the
//! handle's signals for as long as it is mounted, and turns user intents into
//! commands on the handle. The gpui view only forwards input and schedules
//! the tap-reset timer.

use crate::config::PlayerConfig;
use crate::gesture::{Side, Tap, TapGesture, TapOutcome};
use crate::handle::{MediaSignal, PlaybackHandle, Subscription};
use crate::slider::SliderRange;
use crate::state::{PlayState, UiState};
use crate::time::format_time;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// State written by signal listeners, possibly from the handle's worker thread.
#[derive(Debug, Default)]
struct Shared {
    ui: Mutex<UiState>,
    dirty: AtomicBool,
}

impl Shared {
    fn apply(&self, signal: &MediaSignal) {
        {
            let mut ui = self.ui.lock();
            match *signal {
                MediaSignal::MetadataReady { duration } => {
                    if ui.is_loading {
                        log::debug!("metadata ready, duration {duration:.3}s");
                    }
                    ui.is_loading = false;
                    ui.duration = duration;
                }
                MediaSignal::TimeUpdate { current_time } => {
                    ui.current_time = current_time;
                }
            }
        }
        self.dirty.store(true, Ordering::SeqCst);
    }

    fn update(&self, f: impl FnOnce(&mut UiState)) {
        f(&mut self.ui.lock());
        self.dirty.store(true, Ordering::SeqCst);
    }
}

/// Headless video player: play/pause, double-tap seek, hold-to-scrub,
/// volume and seek.
#[derive(Debug)]
pub struct PlayerController<H: PlaybackHandle> {
    handle: H,
    config: PlayerConfig,
    shared: Arc<Shared>,
    play_state: PlayState,
    taps: TapGesture,
    subscription: Option<Subscription>,
}

impl<H: PlaybackHandle> PlayerController<H> {
    /// Attach to `handle` and start mirroring its signals.
    pub fn mount(handle: H, config: PlayerConfig) -> Self {
        let shared = Arc::new(Shared::default());
        let shared_ref = Arc::clone(&shared);
        let subscription =
            handle.subscribe(Arc::new(move |signal: &MediaSignal| shared_ref.apply(signal)));

        Self {
            taps: TapGesture::new(config.double_tap_window),
            handle,
            config,
            shared,
            play_state: PlayState::Idle,
            subscription: Some(subscription),
        }
    }

    /// Detach from the handle and drop any armed tap window.
    ///
    /// Every command after this is ignored. Safe to call more than once.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            log::debug!("player unmounted");
        }
        self.taps.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Play when idle, explicitly paused, scrubbing or transiently paused;
    /// pause when playing.
    pub fn toggle_play_pause(&mut self) {
        if !self.is_mounted() {
            return;
        }

        let next = match self.play_state {
            PlayState::Playing if !self.handle.paused() => {
                self.handle.pause();
                PlayState::Paused
            }
            PlayState::Playing => {
                log::debug!("resuming after transient pause");
                self.handle.play();
                PlayState::Playing
            }
            PlayState::Idle | PlayState::Paused | PlayState::Scrubbing(_) => {
                self.handle.play();
                PlayState::Playing
            }
        };
        self.set_play_state(next);
    }

    pub fn register_tap_left(&mut self, now: Instant) -> TapOutcome {
        self.register_tap(Side::Left, now)
    }

    pub fn register_tap_right(&mut self, now: Instant) -> TapOutcome {
        self.register_tap(Side::Right, now)
    }

    /// Feed a tap on one of the step buttons.
    ///
    /// On [`TapOutcome::Armed`] the caller schedules
    /// [`fire_tap_reset`](Self::fire_tap_reset) after the returned delay.
    pub fn register_tap(&mut self, side: Side, now: Instant) -> TapOutcome {
        if !self.is_mounted() {
            return TapOutcome::Ignored;
        }

        match self.taps.tap(side, now) {
            Tap::Armed(reset) => TapOutcome::Armed(reset),
            Tap::Double(side) => {
                let delta = match side {
                    Side::Left => -self.config.back_step,
                    Side::Right => self.config.forward_step,
                };
                let target = self.seek_by(delta);
                log::debug!("double tap {side:?}, seek to {target:.3}s");
                TapOutcome::DoubleTap { side, target }
            }
        }
    }

    /// Close the tap window armed as `generation`. Stale or repeated resets
    /// are ignored.
    pub fn fire_tap_reset(&mut self, generation: u64) -> bool {
        self.taps.expire(generation)
    }

    /// Side waiting for its second tap.
    pub fn armed_tap(&self) -> Option<Side> {
        self.taps.armed_side()
    }

    pub fn begin_hold_left(&mut self) {
        self.begin_hold(Side::Left);
    }

    pub fn begin_hold_right(&mut self) {
        self.begin_hold(Side::Right);
    }

    /// Switch to the side's scrub rate and nudge the position once.
    pub fn begin_hold(&mut self, side: Side) {
        if !self.is_mounted() {
            return;
        }

        let (rate, nudge) = match side {
            Side::Left => (self.config.left_scrub_rate, -self.config.hold_nudge),
            Side::Right => (self.config.right_scrub_rate, self.config.hold_nudge),
        };
        self.handle.set_playback_rate(rate);
        self.seek_by(nudge);
        if self.handle.paused() {
            self.handle.play();
        }

        self.play_state = PlayState::Scrubbing(side);
        self.shared.update(|ui| {
            ui.is_playing = true;
            ui.playback_rate = rate;
        });
    }

    /// Restore the normal rate and resume playback. No-op outside a hold, so
    /// pointer-up and pointer-leave may both call it.
    pub fn end_hold(&mut self) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let PlayState::Scrubbing(side) = self.play_state else {
            return false;
        };

        log::debug!("hold {side:?} released");
        let rate = self.config.normal_rate;
        self.handle.set_playback_rate(rate);
        self.shared.update(|ui| ui.playback_rate = rate);
        self.toggle_play_pause();
        true
    }

    /// Write the volume through. Range is enforced by the slider.
    pub fn set_volume(&mut self, volume: f64) {
        if self.is_mounted() {
            self.handle.set_volume(volume);
        }
    }

    /// Seek to `seconds`. Range is enforced by the slider.
    pub fn seek_to(&mut self, seconds: f64) {
        if self.is_mounted() {
            self.handle.set_current_time(seconds);
        }
    }

    pub fn volume(&self) -> f64 {
        self.handle.volume()
    }

    pub fn ui_state(&self) -> UiState {
        self.shared.ui.lock().clone()
    }

    /// Whether UI state changed since the last call.
    pub fn take_dirty(&self) -> bool {
        self.shared.dirty.swap(false, Ordering::SeqCst)
    }

    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// `elapsed / duration` readout.
    pub fn elapsed_label(&self) -> String {
        let ui = self.shared.ui.lock();
        format!("{} / {}", format_time(ui.current_time), format_time(ui.duration))
    }

    pub fn seek_range(&self) -> SliderRange {
        SliderRange::seek(self.shared.ui.lock().duration)
    }

    fn set_play_state(&mut self, state: PlayState) {
        self.play_state = state;
        self.shared.update(|ui| ui.is_playing = state.is_playing());
    }

    /// Seek relative to the current position, clamped to the media bounds.
    fn seek_by(&self, delta: f64) -> f64 {
        let target = self.handle.current_time() + delta;
        let duration = self.handle.duration();
        let target = if duration.is_finite() && duration > 0.0 {
            target.clamp(0.0, duration)
        } else {
            target.max(0.0)
        };
        self.handle.set_current_time(target);
        target
    }
}

impl<H: PlaybackHandle> Drop for PlayerController<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
