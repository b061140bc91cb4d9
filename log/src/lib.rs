use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root logger: JSON lines on stderr, written from a
/// background thread.
///
/// With `env_logging`, records are filtered by `RUST_LOG` and the
/// `log` facade used by warp and sqlx is routed into the same drain.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);

    #[cfg(feature = "env_logging")]
    let drain = slog_envlogger::new(drain);

    let drain = Async::new(drain).build().fuse();

    let logger = Logger::root(
        drain,
        o!(
            "service" => info::SERVICE_NAME,
            "version" => info::VERSION,
            "revision" => info::REVISION,
            "build_timestamp" => info::BUILD_TIMESTAMP
        ),
    );

    #[cfg(feature = "env_logging")]
    bridge_std_log(&logger);

    logger
}

/// A logger that drops everything, for tests and tooling.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}

#[cfg(feature = "env_logging")]
fn bridge_std_log(logger: &Logger) {
    // the guard would reset the global logger on drop
    slog_scope::set_global_logger(logger.clone()).cancel_reset();

    // only fails if another logger was installed first, in which case
    // the facade already goes somewhere
    let _ = slog_stdlog::init();
}
