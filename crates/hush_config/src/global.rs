use serde::Deserialize;

// =======================================================
// GLOBAL CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Address the proxy listens on, e.g. "0.0.0.0:8080".
    pub listen: String,
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".into(),
            log_level: "info".into(),
        }
    }
}

impl GlobalConfig {
    pub fn listen(&self) -> &str {
        &self.listen
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Replace the port of `listen`, keeping its host part.
    pub fn set_port(&mut self, port: u16) {
        let host = match self.listen.rsplit_once(':') {
            Some((host, _)) => host,
            None => self.listen.as_str(),
        };
        self.listen = format!("{host}:{port}");
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &GlobalConfig) {
        if self.listen.trim().is_empty() {
            self.listen = defaults.listen.clone();
        }
        if self.log_level.is_empty() {
            self.log_level = defaults.log_level.clone();
        }
    }
}
