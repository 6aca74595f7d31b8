use crate::config::PlayerConfig;
use crate::controller::PlayerController;
use crate::element::video;
use crate::fullscreen::{FullscreenProbes, window_fullscreen};
use crate::gesture::{PendingReset, Side, TapOutcome};
use crate::slider::SliderRange;
use crate::state::PlayState;
use crate::video::Video;
use gpui::{
    Bounds, ClickEvent, Context, DispatchPhase, Div, EventEmitter, IntoElement, MouseButton,
    MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Point, Render, SharedString, Stateful,
    Task, Window, div, hsla, prelude::*, px, relative, rgb,
};
use std::time::Instant;

/// Events that can be emitted by the video player.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoPlayerEvent {
    /// Media metadata is known; the loading overlay is gone.
    Loaded { duration: f64 },
    /// Video reached end of stream.
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliderKind {
    Volume,
    Seek,
}

/// Video surface with an overlay control bar: play/pause, double-tap step
/// buttons, hold-to-scrub buttons, fullscreen, volume and seek sliders and an
/// elapsed/duration readout.
pub struct VideoPlayerWidget {
    video: Video,
    controller: PlayerController<Video>,
    fullscreen: FullscreenProbes<Window>,
    tap_reset: Option<Task<()>>,
    signal_pump: Option<Task<()>>,
    loaded: bool,
    volume_track: Option<Bounds<Pixels>>,
    seek_track: Option<Bounds<Pixels>>,
    dragging: Option<SliderKind>,
}

impl VideoPlayerWidget {
    /// Open the media at `uri` and mount a player on it.
    pub fn new(uri: &url::Url) -> Result<Self, crate::Error> {
        let config = PlayerConfig::default();
        let video = Video::open(uri, &config)?;
        Ok(Self::from_video(video, config))
    }

    /// Mount a player on an already opened video.
    pub fn from_video(video: Video, config: PlayerConfig) -> Self {
        Self {
            controller: PlayerController::mount(video.clone(), config),
            video,
            fullscreen: window_fullscreen(),
            tap_reset: None,
            signal_pump: None,
            loaded: false,
            volume_track: None,
            seek_track: None,
            dragging: None,
        }
    }

    /// Replace the fullscreen capabilities probed by the fullscreen button.
    pub fn with_fullscreen(mut self, probes: FullscreenProbes<Window>) -> Self {
        self.fullscreen = probes;
        self
    }

    pub fn video(&self) -> &Video {
        &self.video
    }

    pub fn controller(&self) -> &PlayerController<Video> {
        &self.controller
    }

    /// Cancel the tap timer and detach from the video. Also runs on drop.
    pub fn unmount(&mut self) {
        self.tap_reset = None;
        self.signal_pump = None;
        self.dragging = None;
        self.controller.unmount();
    }

    pub fn toggle_play_pause(&mut self, cx: &mut Context<Self>) {
        self.controller.toggle_play_pause();
        cx.notify();
    }

    pub fn register_tap(&mut self, side: Side, cx: &mut Context<Self>) {
        match self.controller.register_tap(side, Instant::now()) {
            TapOutcome::Armed(reset) => self.schedule_tap_reset(reset, cx),
            TapOutcome::DoubleTap { .. } => self.tap_reset = None,
            TapOutcome::Ignored => {}
        }
        cx.notify();
    }

    pub fn begin_hold(&mut self, side: Side, cx: &mut Context<Self>) {
        self.controller.begin_hold(side);
        cx.notify();
    }

    pub fn end_hold(&mut self, cx: &mut Context<Self>) {
        if self.controller.end_hold() {
            cx.notify();
        }
    }

    pub fn request_fullscreen(&mut self, window: &mut Window) {
        self.fullscreen.request(window);
    }

    /// Replacing the task drops, and so cancels, the previous window's timer.
    fn schedule_tap_reset(&mut self, reset: PendingReset, cx: &mut Context<Self>) {
        self.tap_reset = Some(cx.spawn(async move |this, cx| {
            cx.background_executor().timer(reset.after).await;
            this.update(cx, |this, cx| {
                if this.controller.fire_tap_reset(reset.generation) {
                    cx.notify();
                }
            })
            .ok();
        }));
    }

    /// Repaint when signals from the video change the UI state.
    fn ensure_signal_pump(&mut self, cx: &mut Context<Self>) {
        if self.signal_pump.is_some() || !self.controller.is_mounted() {
            return;
        }
        let interval = self.controller.config().time_update_interval;
        self.signal_pump = Some(cx.spawn(async move |this, cx| {
            loop {
                cx.background_executor().timer(interval).await;
                let alive = this.update(cx, |this, cx| {
                    if this.controller.take_dirty() {
                        cx.notify();
                    }
                });
                if alive.is_err() {
                    break;
                }
            }
        }));
    }

    fn set_track(&mut self, kind: SliderKind, bounds: Option<Bounds<Pixels>>) {
        match kind {
            SliderKind::Volume => self.volume_track = bounds,
            SliderKind::Seek => self.seek_track = bounds,
        }
    }

    fn slide(&mut self, kind: SliderKind, position: Point<Pixels>, cx: &mut Context<Self>) {
        let (track, range) = match kind {
            SliderKind::Volume => (self.volume_track, SliderRange::volume()),
            SliderKind::Seek => (self.seek_track, self.controller.seek_range()),
        };
        let Some(track) = track else {
            return;
        };
        if track.size.width <= px(0.0) {
            return;
        }

        let value = range.value_at((position.x - track.origin.x) / track.size.width);
        match kind {
            SliderKind::Volume => self.controller.set_volume(value),
            SliderKind::Seek => self.controller.seek_to(value),
        }
        cx.notify();
    }

    fn slider(
        kind: SliderKind,
        range: SliderRange,
        value: f64,
        cx: &mut Context<Self>,
    ) -> Stateful<Div> {
        let handle = cx.entity();
        let id = match kind {
            SliderKind::Volume => "volume-slider",
            SliderKind::Seek => "seek-slider",
        };

        div()
            .h(px(16.0))
            .flex()
            .items_center()
            .on_children_prepainted(move |bounds, _window, cx| {
                handle.update(cx, |this, _| this.set_track(kind, bounds.first().copied()));
            })
            .child(
                div()
                    .w_full()
                    .h(px(4.0))
                    .rounded_full()
                    .bg(hsla(0.0, 0.0, 1.0, 0.25))
                    .child(
                        div()
                            .h_full()
                            .w(relative(range.ratio_of(value)))
                            .rounded_full()
                            .bg(rgb(0xff6464)),
                    ),
            )
            .id(id)
            .cursor_pointer()
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |this, event: &MouseDownEvent, _window, cx| {
                    this.dragging = Some(kind);
                    this.slide(kind, event.position, cx);
                }),
            )
    }

    fn capture_pointer_release(&self, window: &mut Window, cx: &mut Context<Self>) {
        let scrubbing = matches!(self.controller.play_state(), PlayState::Scrubbing(_));
        if !scrubbing && self.dragging.is_none() {
            return;
        }

        if let Some(kind) = self.dragging {
            let handle = cx.entity();
            window.on_mouse_event(move |event: &MouseMoveEvent, phase, window, cx| {
                if phase != DispatchPhase::Capture {
                    return;
                }
                handle.update(cx, |this, cx| this.slide(kind, event.position, cx));
                window.refresh();
            });
        }

        // A hold ends even when the pointer is released outside its button.
        let handle = cx.entity();
        window.on_mouse_event(move |event: &MouseUpEvent, phase, window, cx| {
            if phase != DispatchPhase::Capture || event.button != MouseButton::Left {
                return;
            }
            handle.update(cx, |this, cx| {
                this.dragging = None;
                this.end_hold(cx);
            });
            window.refresh();
        });
    }
}

fn button(id: &'static str, label: impl Into<SharedString>) -> Stateful<Div> {
    div()
        .id(id)
        .px_2()
        .py_1()
        .rounded_md()
        .cursor_pointer()
        .hover(|style| style.bg(hsla(0.0, 0.0, 1.0, 0.15)))
        .child(label.into())
}

fn hold_button(
    id: &'static str,
    label: &'static str,
    side: Side,
    cx: &mut Context<VideoPlayerWidget>,
) -> Stateful<Div> {
    button(id, label)
        .on_mouse_down(
            MouseButton::Left,
            cx.listener(move |this, _: &MouseDownEvent, _window, cx| this.begin_hold(side, cx)),
        )
        .on_mouse_up(
            MouseButton::Left,
            cx.listener(|this, _: &MouseUpEvent, _window, cx| this.end_hold(cx)),
        )
        .on_hover(cx.listener(|this, hovered: &bool, _window, cx| {
            if !*hovered {
                this.end_hold(cx);
            }
        }))
}

impl EventEmitter<VideoPlayerEvent> for VideoPlayerWidget {}

impl Render for VideoPlayerWidget {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.ensure_signal_pump(cx);
        self.capture_pointer_release(window, cx);

        if self.video.poll_bus() {
            cx.emit(VideoPlayerEvent::EndOfStream);
        }

        let ui = self.controller.ui_state();
        if !ui.is_loading && !self.loaded {
            self.loaded = true;
            cx.emit(VideoPlayerEvent::Loaded {
                duration: ui.duration,
            });
        }

        let play_label = if ui.is_playing { "⏸" } else { "▶" };
        let volume = self.controller.volume();
        let seek_range = self.controller.seek_range();

        let controls = div()
            .absolute()
            .bottom_0()
            .left_0()
            .w_full()
            .px_3()
            .py_2()
            .flex()
            .items_center()
            .gap_2()
            .bg(hsla(0.0, 0.0, 0.0, 0.7))
            .occlude()
            .text_color(rgb(0xffffff))
            .text_sm()
            .child(
                button("btn-play-pause", play_label).on_click(cx.listener(
                    |this, _: &ClickEvent, _window, cx| this.toggle_play_pause(cx),
                )),
            )
            .child(
                button("btn-step-back", "⏪").on_click(cx.listener(
                    |this, _: &ClickEvent, _window, cx| this.register_tap(Side::Left, cx),
                )),
            )
            .child(
                button("btn-step-forward", "⏩").on_click(cx.listener(
                    |this, _: &ClickEvent, _window, cx| this.register_tap(Side::Right, cx),
                )),
            )
            .child(hold_button("btn-hold-back", "◀◀", Side::Left, cx))
            .child(hold_button("btn-hold-forward", "▶▶", Side::Right, cx))
            .child(
                button("btn-fullscreen", "⛶").on_click(cx.listener(
                    |this, _: &ClickEvent, window, _cx| this.request_fullscreen(window),
                )),
            )
            .child(
                Self::slider(SliderKind::Volume, SliderRange::volume(), volume, cx)
                    .w(px(80.0)),
            )
            .child(
                Self::slider(SliderKind::Seek, seek_range, ui.current_time, cx)
                    .flex_1(),
            )
            .child(self.controller.elapsed_label());

        div()
            .size_full()
            .relative()
            .bg(rgb(0x000000))
            .child(
                div()
                    .id("video-surface")
                    .size_full()
                    .on_click(cx.listener(|this, _: &ClickEvent, _window, cx| {
                        this.toggle_play_pause(cx)
                    }))
                    .child(video(self.video.clone()).id("video-frame")),
            )
            .when(ui.is_loading, |this| {
                this.child(
                    div()
                        .absolute()
                        .size_full()
                        .flex()
                        .items_center()
                        .justify_center()
                        .text_color(rgb(0xffffff))
                        .child("Loading video..."),
                )
            })
            .child(controls)
    }
}

impl Drop for VideoPlayerWidget {
    fn drop(&mut self) {
        self.unmount();
    }
}
