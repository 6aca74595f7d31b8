/// A named fullscreen capability. Returns `false` when the target lacks it.
type Probe<T> = Box<dyn Fn(&mut T) -> bool>;

/// Ordered fullscreen capabilities, tried first to last.
///
/// New variants are appended with [`FullscreenProbes::with`] without touching
/// the call site that requests fullscreen.
pub struct FullscreenProbes<T: ?Sized> {
    probes: Vec<(&'static str, Probe<T>)>,
}

impl<T: ?Sized> Default for FullscreenProbes<T> {
    fn default() -> Self {
        Self { probes: Vec::new() }
    }
}

impl<T: ?Sized> std::fmt::Debug for FullscreenProbes<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.probes.iter().map(|(name, _)| name))
            .finish()
    }
}

impl<T: ?Sized> FullscreenProbes<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, probe: impl Fn(&mut T) -> bool + 'static) -> Self {
        self.probes.push((name, Box::new(probe)));
        self
    }

    /// Invoke the first available capability and return its name.
    ///
    /// Nothing happens when no capability is available.
    pub fn request(&self, target: &mut T) -> Option<&'static str> {
        for (name, probe) in &self.probes {
            if probe(target) {
                log::debug!("fullscreen requested via {name}");
                return Some(name);
            }
        }
        log::debug!("no fullscreen capability available");
        None
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

/// The window operations the fullscreen probes rely on.
pub trait FullscreenWindow {
    fn is_fullscreen(&self) -> bool;
    fn toggle_fullscreen(&mut self);
    fn zoom(&mut self);
}

impl FullscreenWindow for gpui::Window {
    fn is_fullscreen(&self) -> bool {
        gpui::Window::is_fullscreen(self)
    }

    fn toggle_fullscreen(&mut self) {
        gpui::Window::toggle_fullscreen(self)
    }

    fn zoom(&mut self) {
        self.zoom_window()
    }
}

/// Fullscreen capabilities of a window, most specific first.
///
/// `native` only counts when the window actually ends up fullscreen. A
/// platform that ignores the toggle falls through to `zoom`.
pub fn window_fullscreen<W: FullscreenWindow + 'static>() -> FullscreenProbes<W> {
    FullscreenProbes::new()
        .with("native", |window: &mut W| {
            if !window.is_fullscreen() {
                window.toggle_fullscreen();
            }
            window.is_fullscreen()
        })
        .with("zoom", |window: &mut W| {
            window.zoom();
            true
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Surface {
        supports: Vec<&'static str>,
        calls: Vec<&'static str>,
    }

    fn probe(name: &'static str) -> impl Fn(&mut Surface) -> bool {
        move |surface: &mut Surface| {
            if surface.supports.contains(&name) {
                surface.calls.push(name);
                true
            } else {
                false
            }
        }
    }

    fn probes() -> FullscreenProbes<Surface> {
        FullscreenProbes::new()
            .with("standard", probe("standard"))
            .with("moz", probe("moz"))
            .with("webkit", probe("webkit"))
    }

    #[test]
    fn first_available_capability_wins() {
        let mut surface = Surface {
            supports: vec!["webkit", "moz"],
            ..Default::default()
        };

        assert_eq!(probes().request(&mut surface), Some("moz"));
        assert_eq!(surface.calls, vec!["moz"]);
    }

    #[test]
    fn no_capability_is_a_no_op() {
        let mut surface = Surface::default();

        assert_eq!(probes().request(&mut surface), None);
        assert!(surface.calls.is_empty());
        assert_eq!(FullscreenProbes::<Surface>::new().request(&mut surface), None);
    }

    #[derive(Default)]
    struct MockWindow {
        can_fullscreen: bool,
        fullscreen: bool,
        toggles: usize,
        zooms: usize,
    }

    impl FullscreenWindow for MockWindow {
        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }

        fn toggle_fullscreen(&mut self) {
            self.toggles += 1;
            if self.can_fullscreen {
                self.fullscreen = !self.fullscreen;
            }
        }

        fn zoom(&mut self) {
            self.zooms += 1;
        }
    }

    #[test]
    fn window_probes_are_native_then_zoom() {
        let probes = window_fullscreen::<MockWindow>();
        assert_eq!(probes.len(), 2);
        assert!(!probes.is_empty());
        assert_eq!(format!("{probes:?}"), r#"["native", "zoom"]"#);
    }

    #[test]
    fn native_fullscreen_skips_zoom() {
        let mut window = MockWindow {
            can_fullscreen: true,
            ..Default::default()
        };

        assert_eq!(window_fullscreen().request(&mut window), Some("native"));
        assert!(window.fullscreen);
        assert_eq!((window.toggles, window.zooms), (1, 0));
    }

    #[test]
    fn already_fullscreen_window_is_left_alone() {
        let mut window = MockWindow {
            can_fullscreen: true,
            fullscreen: true,
            ..Default::default()
        };

        assert_eq!(window_fullscreen().request(&mut window), Some("native"));
        assert!(window.fullscreen);
        assert_eq!((window.toggles, window.zooms), (0, 0));
    }

    #[test]
    fn ignored_toggle_falls_through_to_zoom() {
        let mut window = MockWindow::default();

        assert_eq!(window_fullscreen().request(&mut window), Some("zoom"));
        assert!(!window.fullscreen);
        assert_eq!((window.toggles, window.zooms), (1, 1));
    }
}
