use serde::Deserialize;

// =======================================================
// CACHE CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the `<N>.cache` files.
    pub dir: String,
    /// Bounds both connect and read of the If-Modified-Since check.
    pub revalidate_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: ".".into(),
            revalidate_timeout_secs: 20,
        }
    }
}

impl CacheConfig {
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn revalidate_timeout_secs(&self) -> u64 {
        self.revalidate_timeout_secs
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &CacheConfig) {
        if self.dir.trim().is_empty() {
            self.dir = defaults.dir.clone();
        }
        if self.revalidate_timeout_secs == 0 {
            self.revalidate_timeout_secs = defaults.revalidate_timeout_secs;
        }
    }
}
