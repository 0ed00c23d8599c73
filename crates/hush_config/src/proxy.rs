use serde::Deserialize;

// =======================================================
// PROXY CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    // Timeouts
    pub connect_timeout_secs: u64,
    /// Per-read timeout on the origin socket.
    pub read_timeout_millis: u64,
    /// Timed-out origin reads tolerated before the first byte arrives.
    pub max_idle_reads: u32,

    // Buffers (bytes)
    /// Size of the single client read. Larger requests are truncated.
    pub request_buffer_bytes: usize,
    pub response_buffer_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 20,
            read_timeout_millis: 1000,
            max_idle_reads: 20,
            request_buffer_bytes: 8192,
            response_buffer_bytes: 8192,
        }
    }
}

impl ProxyConfig {
    pub fn connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs
    }

    pub fn read_timeout_millis(&self) -> u64 {
        self.read_timeout_millis
    }

    pub fn max_idle_reads(&self) -> u32 {
        self.max_idle_reads
    }

    pub fn request_buffer_bytes(&self) -> usize {
        self.request_buffer_bytes
    }

    pub fn response_buffer_bytes(&self) -> usize {
        self.response_buffer_bytes
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &ProxyConfig) {
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = defaults.connect_timeout_secs;
        }
        if self.read_timeout_millis == 0 {
            self.read_timeout_millis = defaults.read_timeout_millis;
        }
        if self.max_idle_reads == 0 {
            self.max_idle_reads = defaults.max_idle_reads;
        }
        if self.request_buffer_bytes == 0 {
            self.request_buffer_bytes = defaults.request_buffer_bytes;
        }
        if self.response_buffer_bytes == 0 {
            self.response_buffer_bytes = defaults.response_buffer_bytes;
        }
    }
}
