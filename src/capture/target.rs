use serde::{Deserialize, Serialize};
use std::fmt;

/// Windows at or below this size (in either dimension) are not offered for capture.
const MIN_WINDOW_EDGE: u32 = 50;

/// Platform window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(u32);

impl WindowId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Return the raw platform handle.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window:{}", self.0)
    }
}

/// The window a capture run reads from, with its size at selection time.
///
/// Immutable for the duration of a run: the scheduler keeps its own copy
/// and only replaces it on the next `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureTarget {
    pub window_id: WindowId,
    pub width: u32,
    pub height: u32,
}

impl CaptureTarget {
    pub fn new(window_id: WindowId, width: u32, height: u32) -> Self {
        Self {
            window_id,
            width,
            height,
        }
    }

    /// Whether the target has a non-zero pixel area.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.window_id, self.width, self.height)
    }
}

/// An on-screen window as reported by the platform window list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: Option<String>,
    pub app_name: Option<String>,
    /// Bundle or package identifier of the owning application.
    pub bundle_id: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl WindowInfo {
    /// Label shown in a window picker: `"App - Title"`, or just the app name
    /// when the window has no title.
    pub fn display_name(&self) -> String {
        let app = self.app_name.as_deref().unwrap_or("Unknown");
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => format!("{app} - {title}"),
            _ => app.to_string(),
        }
    }

    /// Capture target for this window at its current size.
    pub fn target(&self) -> CaptureTarget {
        CaptureTarget::new(self.id, self.width, self.height)
    }
}

/// Filter a raw window list down to the windows worth offering for capture.
///
/// Drops untitled windows, windows owned by the host application itself, and
/// windows too small to be useful.
pub fn capturable_windows(windows: Vec<WindowInfo>, own_bundle_id: Option<&str>) -> Vec<WindowInfo> {
    windows
        .into_iter()
        .filter(|w| w.title.is_some())
        .filter(|w| match (own_bundle_id, w.bundle_id.as_deref()) {
            (Some(own), Some(bundle)) => own != bundle,
            _ => true,
        })
        .filter(|w| w.width > MIN_WINDOW_EDGE && w.height > MIN_WINDOW_EDGE)
        .collect()
}

/// Keep a selection only if its window survived the latest refresh.
pub fn reconcile_selection(
    selected: Option<WindowInfo>,
    available: &[WindowInfo],
) -> Option<WindowInfo> {
    selected.filter(|sel| available.iter().any(|w| w.id == sel.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: u32, title: Option<&str>, app: Option<&str>, size: (u32, u32)) -> WindowInfo {
        WindowInfo {
            id: WindowId::new(id),
            title: title.map(str::to_string),
            app_name: app.map(str::to_string),
            bundle_id: app.map(|a| format!("com.example.{}", a.to_lowercase())),
            width: size.0,
            height: size.1,
        }
    }

    #[test]
    fn display_name_joins_app_and_title() {
        let w = window(1, Some("README.md"), Some("Editor"), (800, 600));
        assert_eq!(w.display_name(), "Editor - README.md");
    }

    #[test]
    fn display_name_falls_back_to_app_name_for_empty_title() {
        let w = window(1, Some(""), Some("Terminal"), (800, 600));
        assert_eq!(w.display_name(), "Terminal");
    }

    #[test]
    fn display_name_uses_unknown_without_app_name() {
        let w = window(1, Some("Untitled"), None, (800, 600));
        assert_eq!(w.display_name(), "Unknown - Untitled");
    }

    #[test]
    fn capturable_windows_drops_untitled_own_and_tiny_windows() {
        let windows = vec![
            window(1, Some("Docs"), Some("Browser"), (1280, 720)),
            window(2, None, Some("Browser"), (1280, 720)),
            window(3, Some("Preview"), Some("Grayscaler"), (640, 480)),
            window(4, Some("Tooltip"), Some("Browser"), (50, 200)),
            window(5, Some("Badge"), Some("Dock"), (300, 40)),
        ];

        let kept = capturable_windows(windows, Some("com.example.grayscaler"));
        let ids: Vec<u32> = kept.iter().map(|w| w.id.get()).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn capturable_windows_keeps_everything_without_own_bundle() {
        let windows = vec![window(3, Some("Preview"), Some("Grayscaler"), (640, 480))];
        assert_eq!(capturable_windows(windows, None).len(), 1);
    }

    #[test]
    fn reconcile_selection_clears_vanished_window() {
        let selected = window(7, Some("Gone"), Some("App"), (400, 400));
        let available = vec![window(8, Some("Still here"), Some("App"), (400, 400))];
        assert!(reconcile_selection(Some(selected), &available).is_none());
    }

    #[test]
    fn reconcile_selection_keeps_present_window() {
        let selected = window(8, Some("Still here"), Some("App"), (400, 400));
        let available = vec![selected.clone()];
        assert_eq!(reconcile_selection(Some(selected.clone()), &available), Some(selected));
    }

    #[test]
    fn target_copies_window_dimensions() {
        let target = window(9, Some("T"), Some("A"), (1024, 768)).target();
        assert_eq!(target, CaptureTarget::new(WindowId::new(9), 1024, 768));
        assert!(target.has_area());
        assert_eq!(target.to_string(), "window:9 (1024x768)");
    }
}
