use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `RUST_LOG` wins; otherwise the `hush*`
/// targets log at `level` and everything else at `warn`.
pub fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();
}

fn default_directives(level: &str) -> String {
    let level = match level.trim() {
        "" => "info",
        other => other,
    };
    format!("warn,hush={level},hush_core={level},hush_proxy={level},hush_cache={level}")
}

#[cfg(test)]
mod tests {
    use super::default_directives;

    #[test]
    fn directives_scope_level_to_proxy_targets() {
        let d = default_directives("debug");
        assert!(d.starts_with("warn,"));
        assert!(d.contains("hush=debug"));
        assert!(d.contains("hush_proxy=debug"));
        assert_eq!(default_directives(" "), default_directives("info"));
    }
}
