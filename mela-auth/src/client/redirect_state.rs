use std::fs;
use std::path::PathBuf;

const PENDING_LIFF_ID_FILE: &str = "pending_liff_id";
const PENDING_RETURN_URL_FILE: &str = "pending_return_url";

/// Transient login state that must survive the full navigation out to the
/// identity provider and back.
///
/// Backed by files under the app cache directory; a store without a usable
/// root treats every operation as a no-op and every read as absent. There is
/// no expiry; the bootstrap clears the slots after consuming them.
pub struct RedirectStateStore {
    root: Option<PathBuf>,
}

impl RedirectStateStore {
    pub fn new() -> Self {
        Self::at(dirs::cache_dir().map(|d| d.join("mela")))
    }

    /// Store rooted at an explicit directory, or a no-op store when `None`.
    pub fn at(root: Option<PathBuf>) -> Self {
        let root = root.filter(|dir| fs::create_dir_all(dir).is_ok());
        Self { root }
    }

    pub fn set_pending_liff_id(&self, liff_id: &str) {
        self.write(PENDING_LIFF_ID_FILE, liff_id);
    }

    pub fn pending_liff_id(&self) -> Option<String> {
        self.read(PENDING_LIFF_ID_FILE)
    }

    pub fn clear_pending_liff_id(&self) {
        self.remove(PENDING_LIFF_ID_FILE);
    }

    pub fn set_pending_return_url(&self, url: &str) {
        self.write(PENDING_RETURN_URL_FILE, url);
    }

    pub fn pending_return_url(&self) -> Option<String> {
        self.read(PENDING_RETURN_URL_FILE)
    }

    pub fn clear_pending_return_url(&self) {
        self.remove(PENDING_RETURN_URL_FILE);
    }

    /// Clear both slots.
    pub fn clear(&self) {
        self.clear_pending_liff_id();
        self.clear_pending_return_url();
    }

    fn write(&self, name: &str, value: &str) {
        if let Some(root) = &self.root {
            if let Err(e) = fs::write(root.join(name), value) {
                tracing::warn!("Failed to persist redirect state {}: {}", name, e);
            }
        }
    }

    fn read(&self, name: &str) -> Option<String> {
        let root = self.root.as_ref()?;
        let value = fs::read_to_string(root.join(name)).ok()?;
        let value = value.trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn remove(&self, name: &str) {
        if let Some(root) = &self.root {
            let _ = fs::remove_file(root.join(name));
        }
    }
}

impl Default for RedirectStateStore {
    fn default() -> Self {
        Self::new()
    }
}
