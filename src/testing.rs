//! In-memory playback handle that records every command it receives.

use crate::handle::{Listener, MediaSignal, PlaybackHandle, SignalHub, Subscription};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Play,
    Pause,
    Seek(f64),
    Volume(f64),
    Rate(f64),
}

#[derive(Debug)]
struct MockState {
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    rate: f64,
}

#[derive(Debug)]
pub(crate) struct MockHandle {
    state: Mutex<MockState>,
    commands: Mutex<Vec<Command>>,
    pub(crate) hub: SignalHub,
}

impl MockHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                paused: true,
                current_time: 0.0,
                duration: 0.0,
                volume: 1.0,
                rate: 1.0,
            }),
            commands: Mutex::new(Vec::new()),
            hub: SignalHub::new(),
        }
    }

    /// Report metadata the way a freshly loaded primitive would.
    pub(crate) fn load(&self, duration: f64) {
        self.state.lock().duration = duration;
        self.hub.emit(MediaSignal::MetadataReady { duration });
    }

    /// Move the position without recording a command, as playback would.
    pub(crate) fn advance_to(&self, seconds: f64) {
        self.state.lock().current_time = seconds;
        self.hub.emit(MediaSignal::TimeUpdate {
            current_time: seconds,
        });
    }

    /// Flip the paused flag without a command, as end of stream would.
    pub(crate) fn force_paused(&self, paused: bool) {
        self.state.lock().paused = paused;
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    pub(crate) fn seeks(&self) -> Vec<f64> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                Command::Seek(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.commands.lock().clear();
    }
}

impl PlaybackHandle for MockHandle {
    fn paused(&self) -> bool {
        self.state.lock().paused
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.lock().current_time = seconds;
        self.commands.lock().push(Command::Seek(seconds));
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().volume = volume;
        self.commands.lock().push(Command::Volume(volume));
    }

    fn playback_rate(&self) -> f64 {
        self.state.lock().rate
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state.lock().rate = rate;
        self.commands.lock().push(Command::Rate(rate));
    }

    fn play(&self) {
        self.state.lock().paused = false;
        self.commands.lock().push(Command::Play);
    }

    fn pause(&self) {
        self.state.lock().paused = true;
        self.commands.lock().push(Command::Pause);
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.hub.subscribe(listener)
    }
}
