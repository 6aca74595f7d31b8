use crate::Error;
use crate::config::PlayerConfig;
use crate::handle::{Listener, MediaSignal, PlaybackHandle, SignalHub, Subscription};
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_app::prelude::*;
use gstreamer_video as gst_video;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

fn clock_time(seconds: f64) -> gst::ClockTime {
    gst::ClockTime::from_nseconds(Duration::from_secs_f64(seconds.max(0.0)).as_nanos() as _)
}

fn seconds(time: gst::ClockTime) -> f64 {
    Duration::from_nanos(time.nseconds()).as_secs_f64()
}

#[derive(Debug)]
pub(crate) struct Frame(gst::Sample);

impl Frame {
    pub fn empty() -> Self {
        Self(gst::Sample::builder().build())
    }

    pub fn readable(&self) -> Option<gst::BufferMap<gst::buffer::Readable>> {
        self.0.buffer().and_then(|x| x.map_readable().ok())
    }
}

#[derive(Debug)]
pub(crate) struct Internal {
    pub(crate) id: u64,
    pub(crate) bus: gst::Bus,
    pub(crate) source: gst::Pipeline,
    pub(crate) alive: Arc<AtomicBool>,
    pub(crate) worker: Option<std::thread::JoinHandle<()>>,
    pub(crate) hub: SignalHub,

    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) speed: f64,

    pub(crate) frame: Arc<Mutex<Frame>>,
    pub(crate) upload_frame: Arc<AtomicBool>,
    pub(crate) is_eos: bool,
}

impl Internal {
    fn seek(&mut self, position: f64) -> Result<(), Error> {
        self.source.seek(
            self.speed,
            gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
            gst::SeekType::Set,
            clock_time(position),
            gst::SeekType::Set,
            gst::ClockTime::NONE,
        )?;
        self.is_eos = false;
        Ok(())
    }

    fn set_speed(&mut self, speed: f64) -> Result<(), Error> {
        self.speed = speed;
        // Before preroll there is no position yet; the rate applies on the next seek.
        let Some(position) = self.source.query_position::<gst::ClockTime>() else {
            return Ok(());
        };
        self.source.seek(
            speed,
            gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
            gst::SeekType::Set,
            position,
            gst::SeekType::End,
            gst::ClockTime::from_seconds(0),
        )?;
        Ok(())
    }

    fn set_state(&mut self, state: gst::State) {
        if let Err(err) = self.source.set_state(state) {
            log::warn!("video {}: failed to switch to {state:?}: {err}", self.id);
        }
    }

    fn play(&mut self) {
        if self.is_eos {
            log::debug!("video {}: restarting after end of stream", self.id);
            if let Err(err) = self.seek(0.0) {
                log::warn!("video {}: failed to rewind: {err}", self.id);
            }
        }
        self.set_state(gst::State::Playing);
    }

    fn paused(&self) -> bool {
        let (_, current, pending) = self.source.state(gst::ClockTime::ZERO);
        is_paused(self.is_eos, current, pending)
    }
}

/// A pipeline that is re-prerolling on its way back to `Playing` (after a
/// flushing seek or an async state change) still counts as playing.
fn is_paused(is_eos: bool, current: gst::State, pending: gst::State) -> bool {
    is_eos || (current != gst::State::Playing && pending != gst::State::Playing)
}

/// A video loaded from a URI (e.g., a local file path or HTTP stream).
///
/// This is the platform primitive behind the player: it decodes frames on a
/// worker thread and reports `MetadataReady` / `TimeUpdate` through its
/// [`SignalHub`]. Opening media does not start playback.
#[derive(Debug, Clone)]
pub struct Video(pub(crate) Arc<RwLock<Internal>>);

impl Drop for Video {
    fn drop(&mut self) {
        // Only cleanup if this is the last reference
        if Arc::strong_count(&self.0) == 1 {
            if let Some(mut inner) = self.0.try_write() {
                inner.set_state(gst::State::Null);

                inner.alive.store(false, Ordering::SeqCst);
                if let Some(worker) = inner.worker.take() {
                    if let Err(err) = worker.join() {
                        match err.downcast_ref::<String>() {
                            Some(e) => log::error!("Video thread panicked: {e}"),
                            None => log::error!("Video thread panicked with unknown reason"),
                        }
                    }
                }
            }
        }
    }
}

impl Video {
    /// Open the media at `uri` with default settings.
    pub fn new(uri: &url::Url) -> Result<Self, Error> {
        Self::open(uri, &PlayerConfig::default())
    }

    /// Open the media at `uri`, emitting time updates at the configured rate.
    pub fn open(uri: &url::Url, config: &PlayerConfig) -> Result<Self, Error> {
        gst::init()?;

        let pipeline = format!(
            "playbin uri=\"{}\" video-sink=\"videoscale ! videoconvert ! appsink name=tap_player_video drop=true caps=video/x-raw,format=NV12,pixel-aspect-ratio=1/1\"",
            uri.as_str()
        );
        let pipeline = gst::parse::launch(pipeline.as_ref())?
            .downcast::<gst::Pipeline>()
            .map_err(|_| Error::Cast)?;

        let video_sink: gst::Element = pipeline.property("video-sink");
        let bin = video_sink
            .pads()
            .first()
            .cloned()
            .and_then(|pad| pad.dynamic_cast::<gst::GhostPad>().ok())
            .and_then(|pad| pad.parent_element())
            .and_then(|element| element.downcast::<gst::Bin>().ok())
            .ok_or(Error::AppSink)?;
        let video_sink = bin
            .by_name("tap_player_video")
            .and_then(|element| element.downcast::<gst_app::AppSink>().ok())
            .ok_or(Error::AppSink)?;

        Self::from_gst_pipeline(pipeline, video_sink, config.time_update_interval)
    }

    /// Creates a new video based on an existing GStreamer pipeline and appsink.
    pub fn from_gst_pipeline(
        pipeline: gst::Pipeline,
        video_sink: gst_app::AppSink,
        time_update_interval: Duration,
    ) -> Result<Self, Error> {
        gst::init()?;
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

        macro_rules! cleanup {
            ($expr:expr) => {
                $expr.map_err(|e| {
                    let _ = pipeline.set_state(gst::State::Null);
                    e
                })
            };
        }

        let pad = cleanup!(video_sink.pads().first().cloned().ok_or(Error::AppSink))?;

        // Preroll without starting playback.
        cleanup!(pipeline.set_state(gst::State::Paused))?;
        cleanup!(pipeline.state(gst::ClockTime::from_seconds(5)).0)?;

        let caps = cleanup!(pad.current_caps().ok_or(Error::Caps))?;
        let s = cleanup!(caps.structure(0).ok_or(Error::Caps))?;
        let width = cleanup!(s.get::<i32>("width").map_err(|_| Error::Caps))?;
        let height = cleanup!(s.get::<i32>("height").map_err(|_| Error::Caps))?;
        let framerate = cleanup!(s.get::<gst::Fraction>("framerate").map_err(|_| Error::Caps))?;
        let framerate = framerate.numer() as f64 / framerate.denom() as f64;
        cleanup!(gst_video::VideoInfo::from_caps(&caps).map_err(|_| Error::Caps))?;

        if framerate.is_nan()
            || framerate.is_infinite()
            || framerate < 0.0
            || framerate.abs() < f64::EPSILON
        {
            let _ = pipeline.set_state(gst::State::Null);
            return Err(Error::Framerate(framerate));
        }

        let bus = cleanup!(pipeline.bus().ok_or(Error::Bus))?;

        let hub = SignalHub::new();
        if let Some(duration) = pipeline.query_duration::<gst::ClockTime>() {
            hub.emit(MediaSignal::MetadataReady {
                duration: seconds(duration),
            });
        }

        let frame = Arc::new(Mutex::new(Frame::empty()));
        let upload_frame = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));

        let frame_ref = Arc::clone(&frame);
        let upload_frame_ref = Arc::clone(&upload_frame);
        let alive_ref = Arc::clone(&alive);
        let hub_ref = hub.clone();
        let pipeline_ref = pipeline.clone();

        let worker = std::thread::spawn(move || {
            let mut last_time_update = Instant::now();
            let mut last_pts = None;

            while alive_ref.load(Ordering::Acquire) {
                let playing = pipeline_ref.state(gst::ClockTime::ZERO).1 == gst::State::Playing;

                if !hub_ref.metadata_ready() {
                    if let Some(duration) = pipeline_ref.query_duration::<gst::ClockTime>() {
                        hub_ref.emit(MediaSignal::MetadataReady {
                            duration: seconds(duration),
                        });
                    }
                }

                if video_sink.is_eos() {
                    std::thread::sleep(Duration::from_millis(16));
                    continue;
                }

                let sample = if playing {
                    video_sink.try_pull_sample(gst::ClockTime::from_mseconds(16))
                } else {
                    let sample = video_sink.try_pull_preroll(gst::ClockTime::from_mseconds(16));
                    // The preroll sample stays available while paused.
                    std::thread::sleep(Duration::from_millis(16));
                    sample
                };
                let Some(sample) = sample else {
                    continue;
                };

                let pts = sample.buffer().and_then(|buffer| buffer.pts());
                if !playing && pts.is_some() && pts == last_pts {
                    continue;
                }
                last_pts = pts;

                *frame_ref.lock() = Frame(sample);
                upload_frame_ref.store(true, Ordering::SeqCst);

                if playing && last_time_update.elapsed() >= time_update_interval {
                    if let Some(position) = pipeline_ref.query_position::<gst::ClockTime>() {
                        hub_ref.emit(MediaSignal::TimeUpdate {
                            current_time: seconds(position),
                        });
                    }
                    last_time_update = Instant::now();
                }
            }
        });

        log::debug!("video {id}: opened {width}x{height} @ {framerate:.2} fps");

        Ok(Video(Arc::new(RwLock::new(Internal {
            id,
            bus,
            source: pipeline,
            alive,
            worker: Some(worker),
            hub,

            width,
            height,
            speed: 1.0,

            frame,
            upload_frame,
            is_eos: false,
        }))))
    }

    pub(crate) fn read(&self) -> parking_lot::RwLockReadGuard<'_, Internal> {
        self.0.read()
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, Internal> {
        self.0.write()
    }

    /// Get the size/resolution of the video as `(width, height)`.
    pub fn size(&self) -> (i32, i32) {
        let inner = self.read();
        (inner.width, inner.height)
    }

    /// Get if the stream ended or not.
    pub fn eos(&self) -> bool {
        self.read().is_eos
    }

    /// Drain pending bus messages. Returns true when the stream just ended.
    ///
    /// Errors are logged and otherwise left to GStreamer.
    pub fn poll_bus(&self) -> bool {
        let mut inner = self.write();
        let mut ended = false;

        while let Some(msg) = inner
            .bus
            .pop_filtered(&[gst::MessageType::Error, gst::MessageType::Eos])
        {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    log::error!("video {}: GStreamer error: {}", inner.id, err.error());
                }
                gst::MessageView::Eos(_) => {
                    log::debug!("video {}: end of stream", inner.id);
                    inner.is_eos = true;
                    ended = true;
                }
                _ => {}
            }
        }

        ended
    }

    /// Consume the new-frame flag.
    pub fn take_frame_ready(&self) -> bool {
        self.read().upload_frame.swap(false, Ordering::SeqCst)
    }

    /// Get the current NV12 frame data if available.
    pub fn current_frame_data(&self) -> Option<(Vec<u8>, u32, u32)> {
        let inner = self.read();

        if let Some(readable) = inner.frame.lock().readable() {
            let data = readable.as_slice().to_vec();
            if !data.is_empty() {
                return Some((data, inner.width as u32, inner.height as u32));
            }
        }

        None
    }
}

impl PlaybackHandle for Video {
    fn paused(&self) -> bool {
        self.read().paused()
    }

    fn current_time(&self) -> f64 {
        self.read()
            .source
            .query_position::<gst::ClockTime>()
            .map_or(0.0, seconds)
    }

    fn set_current_time(&self, seconds: f64) {
        let hub = {
            let mut inner = self.write();
            match inner.seek(seconds) {
                Ok(()) => inner.hub.clone(),
                Err(err) => {
                    log::warn!("video {}: seek to {seconds:.3}s ignored: {err}", inner.id);
                    return;
                }
            }
        };
        hub.emit(MediaSignal::TimeUpdate {
            current_time: seconds.max(0.0),
        });
    }

    fn duration(&self) -> f64 {
        self.read()
            .source
            .query_duration::<gst::ClockTime>()
            .map_or(0.0, seconds)
    }

    fn volume(&self) -> f64 {
        self.read().source.property("volume")
    }

    fn set_volume(&self, volume: f64) {
        self.write().source.set_property("volume", volume);
    }

    fn playback_rate(&self) -> f64 {
        self.read().speed
    }

    fn set_playback_rate(&self, rate: f64) {
        let mut inner = self.write();
        if !rate.is_finite() || rate <= 0.0 {
            log::warn!("video {}: playback rate {rate} ignored", inner.id);
            return;
        }
        if let Err(err) = inner.set_speed(rate) {
            log::warn!("video {}: playback rate {rate} ignored: {err}", inner.id);
        }
    }

    fn play(&self) {
        self.write().play();
    }

    fn pause(&self) {
        self.write().set_state(gst::State::Paused);
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        // Clone first: a replayed MetadataReady must not run under the lock.
        let hub = self.read().hub.clone();
        hub.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preroll_towards_playing_is_not_paused() {
        assert!(!is_paused(false, gst::State::Playing, gst::State::VoidPending));
        assert!(!is_paused(false, gst::State::Paused, gst::State::Playing));
        assert!(!is_paused(false, gst::State::Ready, gst::State::Playing));
    }

    #[test]
    fn settled_pause_and_end_of_stream_are_paused() {
        assert!(is_paused(false, gst::State::Paused, gst::State::VoidPending));
        assert!(is_paused(true, gst::State::Playing, gst::State::VoidPending));
    }

    #[test]
    fn clock_time_clamps_negative_positions() {
        assert_eq!(clock_time(-3.0), gst::ClockTime::ZERO);
        assert_eq!(seconds(clock_time(2.5)), 2.5);
    }
}
