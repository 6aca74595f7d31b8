//! # GPUI Tap Player
//!
//! A touch-style video player widget for GPUI, using GStreamer for media
//! playback.
//!
//! ## Features
//!
//! - Play/pause from the control bar or by clicking the video
//! - Double-tap step buttons: back 5 s, forward 10 s
//! - Hold-to-scrub buttons that change playback rate while pressed
//! - Fullscreen through an ordered list of window capabilities
//! - Volume and seek sliders, elapsed/duration readout
//! - A headless [`PlayerController`] that drives any [`PlaybackHandle`]
//!
//! ## Example
//!
//! ```no_run
//! use gpui_tap_player::{Url, VideoPlayerWidget};
//!
//! let uri = Url::parse("file:///path/to/video.mp4").unwrap();
//! let player = VideoPlayerWidget::new(&uri).unwrap();
//! // Hand `player` to `cx.new(|_| player)` inside a GPUI window.
//! ```

mod config;
mod controller;
mod element;
mod error;
mod fullscreen;
mod gesture;
mod handle;
mod slider;
mod state;
mod time;
mod video;
mod video_player;

#[cfg(test)]
mod testing;

pub use config::PlayerConfig;
pub use controller::PlayerController;
pub use element::{VideoElement, video};
pub use error::Error;
pub use fullscreen::{FullscreenProbes, FullscreenWindow, window_fullscreen};
pub use gesture::{PendingReset, Side, Tap, TapGesture, TapOutcome};
pub use handle::{Listener, MediaSignal, PlaybackHandle, SignalHub, Subscription};
pub use slider::SliderRange;
pub use state::{PlayState, UiState};
pub use time::format_time;
pub use video::Video;
pub use video_player::{VideoPlayerEvent, VideoPlayerWidget};

// Re-export commonly used types
pub use gstreamer as gst;
pub use url::Url;
