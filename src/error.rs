use gstreamer as gst;
use thiserror::Error;

/// Errors raised while opening media.
///
/// Playback commands issued after construction never fail; the primitive
/// swallows them and the failure is only logged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Glib(#[from] glib::Error),
    #[error("{0}")]
    Bool(#[from] glib::BoolError),
    #[error("failed to get the gstreamer bus")]
    Bus,
    #[error("failed to get the video sink from the gstreamer pipeline")]
    AppSink,
    #[error("{0}")]
    StateChange(#[from] gst::StateChangeError),
    #[error("failed to cast gstreamer element")]
    Cast,
    #[error("failed to get media capabilities")]
    Caps,
    #[error("invalid framerate: {0}")]
    Framerate(f64),
}
