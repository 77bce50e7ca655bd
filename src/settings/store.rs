use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::capture::target::WindowId;
use crate::scheduler::config::ScheduleConfig;
use crate::settings::types::CaptureSettings;

/// Quiet period after the last change before settings hit the disk.
const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Persistent capture settings with debounced saving.
pub struct SettingsStore {
    path: PathBuf,
    data: Mutex<CaptureSettings>,
    save_notify: Notify,
    is_dirty: AtomicBool,
}

impl SettingsStore {
    /// Create a new store, loading from disk if the file exists.
    pub fn new(path: PathBuf) -> Self {
        let data = Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings from {}: {e}", path.display());
            CaptureSettings::default()
        });
        Self {
            path,
            data: Mutex::new(data),
            save_notify: Notify::new(),
            is_dirty: AtomicBool::new(false),
        }
    }

    /// Load settings from a JSON file, returning default on missing file.
    pub fn load(path: &Path) -> Result<CaptureSettings, String> {
        if !path.exists() {
            return Ok(CaptureSettings::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    }

    /// Save current settings to disk atomically (write .tmp then rename).
    pub fn save(&self) -> Result<(), String> {
        let data = self.data.lock().clone();
        let json = serde_json::to_string_pretty(&data).map_err(|e| e.to_string())?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| e.to_string())?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Current settings.
    pub fn get(&self) -> CaptureSettings {
        self.data.lock().clone()
    }

    /// Remember the rate and transforms of an accepted config.
    /// Triggers a debounced save.
    pub fn set_schedule(&self, config: &ScheduleConfig) {
        {
            let mut data = self.data.lock();
            data.frames_per_second = config.frames_per_second;
            data.grayscale = config.flags.grayscale;
            data.flip = config.flags.flip;
        }
        self.mark_dirty();
    }

    /// Remember which window was captured last. Triggers a debounced save.
    pub fn set_last_window(&self, id: Option<WindowId>) {
        self.data.lock().last_window_id = id;
        self.mark_dirty();
    }

    fn mark_dirty(&self) {
        self.is_dirty.store(true, Ordering::Release);
        self.save_notify.notify_one();
    }

    /// Start the debounce task: waits for a dirty notification, sleeps, then saves.
    ///
    /// Uses an `AtomicBool` dirty flag to avoid losing notifications that arrive
    /// between `save()` completing and `notified().await` re-registering.
    /// Must be called from within a tokio runtime.
    pub fn start_debounce_task(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                store.save_notify.notified().await;
                tokio::time::sleep(SAVE_DEBOUNCE).await;
                if store.is_dirty.swap(false, Ordering::AcqRel) {
                    if let Err(e) = store.save() {
                        tracing::warn!("Failed to save settings: {e}");
                    }
                }
            }
        })
    }
}
