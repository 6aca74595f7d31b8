use gpui::{App, Application, Context, Entity, Render, Window, WindowOptions, div, prelude::*};
use gpui_tap_player::{VideoPlayerEvent, VideoPlayerWidget};
use std::path::PathBuf;
use url::Url;

struct PlayerExample {
    player: Entity<VideoPlayerWidget>,
}

impl PlayerExample {
    fn new(player: Entity<VideoPlayerWidget>, cx: &mut Context<Self>) -> Self {
        cx.subscribe(&player, |_, _, event: &VideoPlayerEvent, _| match event {
            VideoPlayerEvent::Loaded { duration } => log::info!("loaded, {duration:.1}s"),
            VideoPlayerEvent::EndOfStream => log::info!("end of stream"),
        })
        .detach();
        Self { player }
    }
}

impl Render for PlayerExample {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
        div().size_full().child(self.player.clone())
    }
}

fn main() {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/test.mp4"));

    Application::new().run(move |cx: &mut App| {
        let path = path.canonicalize().unwrap_or(path.clone());
        let uri = Url::from_file_path(&path).expect("invalid file path");

        cx.open_window(
            WindowOptions {
                focus: true,
                ..Default::default()
            },
            |_, cx| {
                let player = VideoPlayerWidget::new(&uri).expect("failed to open video");
                let player = cx.new(|_| player);
                cx.new(|cx| PlayerExample::new(player, cx))
            },
        )
        .unwrap();
        cx.activate(true);
    });
}
