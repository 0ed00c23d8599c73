use std::{net::SocketAddr, path::Path};

use crate::HushConfig;

/// Validation output for a loaded Hush configuration.
#[derive(Debug, Default)]
pub struct ConfigReport {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl ConfigReport {
    /// Returns true when no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true when at least one error was found.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Render warnings and errors into a readable, multi-line string.
    pub fn format(&self) -> String {
        let mut out = String::new();
        if !self.errors.is_empty() {
            out.push_str("Errors:\n");
            for err in &self.errors {
                out.push_str("  - ");
                out.push_str(err);
                out.push('\n');
            }
        }
        if !self.warnings.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("Warnings:\n");
            for warn in &self.warnings {
                out.push_str("  - ");
                out.push_str(warn);
                out.push('\n');
            }
        }
        out
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Validate a Hush configuration and return a report of issues.
pub fn validate(cfg: &HushConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    validate_global(cfg, &mut report);
    validate_proxy(cfg, &mut report);
    validate_cache(cfg, &mut report);
    validate_censor(cfg, &mut report);

    report
}

fn validate_global(cfg: &HushConfig, report: &mut ConfigReport) {
    if cfg.global.listen.parse::<SocketAddr>().is_err() {
        report.error(format!(
            "global.listen '{}' is not a valid socket address",
            cfg.global.listen
        ));
    }
}

fn validate_proxy(cfg: &HushConfig, report: &mut ConfigReport) {
    if cfg.proxy.request_buffer_bytes < 16 {
        report.error(format!(
            "proxy.request_buffer_bytes = {} cannot hold a request line",
            cfg.proxy.request_buffer_bytes
        ));
    }

    if cfg.proxy.response_buffer_bytes < 64 {
        report.warn(format!(
            "proxy.response_buffer_bytes = {} is tiny; response classification only sees the first read",
            cfg.proxy.response_buffer_bytes
        ));
    }

    let idle_budget_millis = cfg
        .proxy
        .read_timeout_millis
        .saturating_mul(u64::from(cfg.proxy.max_idle_reads));
    if idle_budget_millis > 120_000 {
        report.warn("proxy idle budget exceeds two minutes per response");
    }
}

fn validate_cache(cfg: &HushConfig, report: &mut ConfigReport) {
    let cache_path = Path::new(&cfg.cache.dir);
    if cache_path.exists() {
        if !cache_path.is_dir() {
            report.error(format!(
                "cache.dir '{}' exists but is not a directory",
                cfg.cache.dir
            ));
        }
    } else {
        report.warn(format!(
            "cache.dir '{}' does not exist; it will be created at runtime",
            cfg.cache.dir
        ));
    }
}

fn validate_censor(cfg: &HushConfig, report: &mut ConfigReport) {
    if cfg.censor.replacement.is_empty() {
        report.error("censor.replacement is empty");
    }

    if !Path::new(&cfg.censor.word_file).exists() {
        report.warn(format!(
            "censor.word_file '{}' not found; no words will be censored",
            cfg.censor.word_file
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::HushConfig;

    #[test]
    fn rejects_bad_listen_address() {
        let mut cfg = HushConfig::default();
        cfg.global.listen = "not-an-addr".into();
        let report = validate(&cfg);
        assert!(report.has_errors());
        assert!(report.format().contains("global.listen"));
    }

    #[test]
    fn cache_dir_that_is_a_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let mut cfg = HushConfig::default();
        cfg.cache.dir = file.path().to_string_lossy().into_owned();
        let report = validate(&cfg);
        assert!(report.errors().iter().any(|e| e.contains("cache.dir")));
    }

    #[test]
    fn missing_word_file_is_only_a_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = HushConfig::default();
        cfg.cache.dir = dir.path().to_string_lossy().into_owned();
        cfg.censor.word_file = dir.path().join("nope.txt").to_string_lossy().into_owned();
        let report = validate(&cfg);
        assert!(report.is_ok());
        assert!(report.warnings().iter().any(|w| w.contains("censor.word_file")));
    }

    #[test]
    fn huge_idle_budget_warns_instead_of_overflowing() {
        let mut cfg = HushConfig::default();
        cfg.proxy.read_timeout_millis = u64::MAX;
        cfg.proxy.max_idle_reads = u32::MAX;
        let report = validate(&cfg);
        assert!(report.warnings().iter().any(|w| w.contains("idle budget")));
    }
}
