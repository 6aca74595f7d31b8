use crate::gesture::Side;

/// What the user asked the player to do.
///
/// This is tracked separately from the primitive's own paused flag so a hold
/// release can resume playback without being mistaken for an explicit pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Freshly mounted, never played.
    #[default]
    Idle,
    Playing,
    /// Paused by the user.
    Paused,
    /// A scrub button is held down.
    Scrubbing(Side),
}

impl PlayState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlayState::Playing | PlayState::Scrubbing(_))
    }
}

/// The player's view of playback, rebuilt on every mount.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub is_playing: bool,
    /// True until the first `MetadataReady`, never true again afterwards.
    pub is_loading: bool,
    pub current_time: f64,
    pub duration: f64,
    pub playback_rate: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_loading: true,
            current_time: 0.0,
            duration: 0.0,
            playback_rate: 1.0,
        }
    }
}
