use serde::Deserialize;

use crate::validation::{validate, ConfigReport};
use crate::{CacheConfig, CensorConfig, GlobalConfig, ProxyConfig};

/// Prefix of environment overrides, e.g. `HUSH__GLOBAL__LISTEN=127.0.0.1:3128`.
const ENV_PREFIX: &str = "HUSH";

// =======================================================
// HUSH CONFIG (main config)
// =======================================================
#[derive(Debug, Clone, Deserialize)]
pub struct HushConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub censor: CensorConfig,
}

impl Default for HushConfig {
    fn default() -> Self {
        let mut cfg = Self {
            global: GlobalConfig::default(),
            proxy: ProxyConfig::default(),
            cache: CacheConfig::default(),
            censor: CensorConfig::default(),
        };
        cfg.apply_defaults();
        cfg
    }
}

impl HushConfig {
    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn proxy(&self) -> &ProxyConfig {
        &self.proxy
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    pub fn censor(&self) -> &CensorConfig {
        &self.censor
    }

    /// Validate the configuration and return a report of warnings and errors.
    pub fn validate(&self) -> ConfigReport {
        validate(self)
    }

    /// Load `file_name` (TOML, optional) and layer `HUSH__*` environment
    /// variables on top of it.
    pub fn from_file(file_name: &str) -> Result<Self, config::ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::new(file_name, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: HushConfig = built.try_deserialize()?;

        cfg.apply_defaults();
        Ok(cfg)
    }

    pub fn from_file_or_default(file_name: &str) -> Self {
        match Self::from_file(file_name) {
            Ok(cfg) => {
                let report = cfg.validate();
                if report.has_errors() {
                    eprintln!("Invalid config in '{file_name}':");
                    eprintln!("{}", report.format());
                    eprintln!("Using default config (in-memory)...");
                    HushConfig::default()
                } else {
                    if !report.warnings().is_empty() {
                        eprintln!("Config warnings in '{file_name}':");
                        eprintln!("{}", report.format());
                    }
                    cfg
                }
            }
            Err(e) => {
                eprintln!("Error reading config '{file_name}': {e}");
                eprintln!("Using default config (in-memory)...");
                HushConfig::default()
            }
        }
    }

    fn apply_defaults(&mut self) {
        self.global.apply_defaults_from(&GlobalConfig::default());
        self.proxy.apply_defaults_from(&ProxyConfig::default());
        self.cache.apply_defaults_from(&CacheConfig::default());
        self.censor.apply_defaults_from(&CensorConfig::default());
    }

    pub fn print(&self) {
        println!("================ HUSH CONFIG =================");
        self.print_global();
        self.print_proxy();
        self.print_cache();
        self.print_censor();
        println!("==============================================");
    }

    fn print_global(&self) {
        println!("\n[global]");
        println!("  listen               = {}", self.global.listen);
        println!("  log_level            = {}", self.global.log_level);
    }

    fn print_proxy(&self) {
        println!("\n[proxy]");
        println!(
            "  connect_timeout_secs = {}",
            self.proxy.connect_timeout_secs
        );
        println!(
            "  read_timeout_millis  = {}",
            self.proxy.read_timeout_millis
        );
        println!("  max_idle_reads       = {}", self.proxy.max_idle_reads);
        println!(
            "  request_buffer_bytes = {}",
            self.proxy.request_buffer_bytes
        );
        println!(
            "  response_buffer_bytes = {}",
            self.proxy.response_buffer_bytes
        );
    }

    fn print_cache(&self) {
        println!("\n[cache]");
        println!("  dir                  = {}", self.cache.dir);
        println!(
            "  revalidate_timeout_secs = {}",
            self.cache.revalidate_timeout_secs
        );
    }

    fn print_censor(&self) {
        println!("\n[censor]");
        println!("  word_file            = {}", self.censor.word_file);
        println!("  replacement          = {:?}", self.censor.replacement);
    }
}
