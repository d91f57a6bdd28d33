use log::{warn, LevelFilter};

/// Installs the global logger. `RUST_LOG` overrides the default `info` level.
/// A second call keeps the logger already installed.
pub fn init_logging() {
    if let Err(err) = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init()
    {
        warn!("Logger already initialized: {err}");
    }
}
