use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CensorConfig {
    /// One censored word per line.
    pub word_file: String,
    pub replacement: String,
}

impl Default for CensorConfig {
    fn default() -> Self {
        Self {
            word_file: "censor.txt".into(),
            replacement: "---".into(),
        }
    }
}

impl CensorConfig {
    pub fn word_file(&self) -> &str {
        &self.word_file
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &CensorConfig) {
        if self.word_file.trim().is_empty() {
            self.word_file = defaults.word_file.clone();
        }
        if self.replacement.is_empty() {
            self.replacement = defaults.replacement.clone();
        }
    }
}
