use crate::handle::PlaybackHandle;
use crate::video::Video;
use gpui::{
    Bounds, Element, ElementId, GlobalElementId, InspectorElementId, IntoElement, LayoutId,
    Pixels, Window, point, px, size,
};
use image::{ImageBuffer, Rgba};
use smallvec::SmallVec;
use std::sync::Arc;
use yuv::{YuvBiPlanarImage, YuvConversionMode, YuvRange, YuvStandardMatrix, yuv_nv12_to_rgba};

/// Convert a tightly packed NV12 frame to RGBA.
///
/// Tries BT.709 limited range (what decoders emit for HD content) and falls
/// back to BT.601. Returns `None` when the buffer is short or both fail.
fn nv12_to_rgba(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let y_size = width as usize * height as usize;
    let uv_size = y_size / 2;
    if data.len() < y_size + uv_size {
        return None;
    }

    let image = YuvBiPlanarImage {
        y_plane: &data[..y_size],
        y_stride: width,
        uv_plane: &data[y_size..y_size + uv_size],
        uv_stride: width,
        width,
        height,
    };

    let mut rgba = vec![0u8; y_size * 4];
    for matrix in [YuvStandardMatrix::Bt709, YuvStandardMatrix::Bt601] {
        if yuv_nv12_to_rgba(
            &image,
            &mut rgba,
            width * 4,
            YuvRange::Limited,
            matrix,
            YuvConversionMode::Balanced,
        )
        .is_ok()
        {
            return Some(rgba);
        }
    }
    None
}

/// Largest rect with the frame's aspect ratio centred inside `bounds`.
fn contain(bounds: Bounds<Pixels>, width: u32, height: u32) -> Bounds<Pixels> {
    if width == 0 || height == 0 {
        return bounds;
    }
    let frame = size(px(width as f32), px(height as f32));
    let scale = (bounds.size.width / frame.width).min(bounds.size.height / frame.height);
    let fitted = size(frame.width * scale, frame.height * scale);
    let origin = point(
        bounds.origin.x + (bounds.size.width - fitted.width) * 0.5,
        bounds.origin.y + (bounds.size.height - fitted.height) * 0.5,
    );
    Bounds::new(origin, fitted)
}

/// The video surface: paints the latest decoded frame letterboxed into its
/// bounds and keeps repainting while playback runs.
pub struct VideoElement {
    video: Video,
    element_id: Option<ElementId>,
}

impl VideoElement {
    pub fn new(video: Video) -> Self {
        Self {
            video,
            element_id: None,
        }
    }

    pub fn id(mut self, id: impl Into<ElementId>) -> Self {
        self.element_id = Some(id.into());
        self
    }
}

impl Element for VideoElement {
    type RequestLayoutState = ();
    type PrepaintState = ();

    fn id(&self) -> Option<ElementId> {
        self.element_id.clone()
    }

    fn source_location(&self) -> Option<&'static core::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut gpui::App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let full = gpui::Length::Definite(gpui::DefiniteLength::Fraction(1.0));
        let style = gpui::Style {
            size: gpui::Size {
                width: full,
                height: full,
            },
            ..Default::default()
        };

        (window.request_layout(style, [], cx), ())
    }

    fn prepaint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        _bounds: Bounds<Pixels>,
        _request_layout_state: &mut Self::RequestLayoutState,
        window: &mut Window,
        _cx: &mut gpui::App,
    ) -> Self::PrepaintState {
        let has_new_frame = self.video.take_frame_ready();
        if !self.video.paused() || has_new_frame {
            window.request_animation_frame();
        }
    }

    fn paint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout_state: &mut Self::RequestLayoutState,
        _prepaint_state: &mut Self::PrepaintState,
        window: &mut Window,
        _cx: &mut gpui::App,
    ) {
        let Some((nv12, width, height)) = self.video.current_frame_data() else {
            return;
        };
        let Some(rgba) = nv12_to_rgba(&nv12, width, height) else {
            log::warn!("dropping undecodable {width}x{height} frame");
            return;
        };
        let Some(buffer) = ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba) else {
            return;
        };

        let frames: SmallVec<[image::Frame; 1]> =
            SmallVec::from_elem(image::Frame::new(buffer), 1);
        let image = Arc::new(gpui::RenderImage::new(frames));

        if let Err(err) = window.paint_image(
            contain(bounds, width, height),
            gpui::Corners::default(),
            image,
            0,
            false,
        ) {
            log::warn!("failed to paint video frame: {err}");
        }
    }
}

impl IntoElement for VideoElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

/// Helper function to create a video element
pub fn video(video: Video) -> VideoElement {
    VideoElement::new(video)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Bounds<Pixels> {
        Bounds::new(point(px(x), px(y)), size(px(w), px(h)))
    }

    #[test]
    fn wide_frame_is_letterboxed() {
        let fitted = contain(rect(0.0, 0.0, 400.0, 400.0), 200, 100);
        assert_eq!(fitted, rect(0.0, 100.0, 400.0, 200.0));
    }

    #[test]
    fn tall_frame_is_pillarboxed() {
        let fitted = contain(rect(10.0, 0.0, 300.0, 200.0), 100, 200);
        assert_eq!(fitted, rect(110.0, 0.0, 100.0, 200.0));
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(nv12_to_rgba(&[0u8; 10], 4, 4).is_none());
    }

    #[test]
    fn black_frame_converts() {
        let mut nv12 = vec![16u8; 16];
        nv12.extend(std::iter::repeat(128u8).take(8));
        let rgba = nv12_to_rgba(&nv12, 4, 4).expect("valid frame");
        assert_eq!(rgba.len(), 64);
        assert!(rgba.chunks(4).all(|p| p[0] < 8 && p[1] < 8 && p[2] < 8));
    }
}
