//! Structured logging for the Strata engine.
//!
//! Installs a `tracing` subscriber with console output (uptime timestamps,
//! module paths, severity) and optional JSON file logging for post-mortem
//! analysis. The default filter quiets `wgpu` and `naga` to warnings; the
//! config's `debug.log_level` or `RUST_LOG` override it.

use std::path::Path;

use strata_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Initialize the global tracing subscriber.
///
/// The filter is resolved in priority order: the `RUST_LOG` environment
/// variable, then the config's `debug.log_level` (prefixed onto the wgpu
/// quieting directives), then the default. When `log_dir` is given, a
/// second layer writes JSON lines to `strata.log` in that directory.
pub fn init_logging(log_dir: Option<&Path>, config: Option<&Config>) {
    let filter_str = match config {
        Some(config) if !config.debug.log_level.is_empty() => {
            format!("{},wgpu=warn,naga=warn", config.debug.log_level)
        }
        _ => DEFAULT_FILTER.to_string(),
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("strata.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// The default filter: `info` everywhere, `wgpu`/`naga` quieted to `warn`.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_gpu_crates() {
        let filter_str = format!("{}", default_env_filter());
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_config_level_prefixes_filter() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        let filter_str = format!("{},wgpu=warn,naga=warn", config.debug.log_level);
        let filter = EnvFilter::new(&filter_str);
        assert!(format!("{filter}").contains("debug"));
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,strata_render=trace",
            "warn,strata_world=debug,strata_mesh=trace",
            "error",
        ];
        for filter_str in &valid_filters {
            assert!(
                EnvFilter::try_from(*filter_str).is_ok(),
                "failed to parse filter: {filter_str}"
            );
        }
    }

    #[test]
    fn test_log_file_path_shape() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_file_path = temp_dir.path().join("strata.log");
        assert_eq!(log_file_path.file_name().unwrap(), "strata.log");
    }
}
