use flexi_logger::{Logger, LoggerHandle};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Initializes stderr logging once per process.
///
/// Level comes from RUST_LOG, defaulting to `warn` so diagnostics stay out
/// of normal command output. A failed init is reported and ignored; the CLI
/// still works without logging.
pub fn init() {
    let result = LOGGER.get_or_try_init(|| {
        Logger::try_with_env_or_str("warn")
            .map_err(|err| err.to_string())?
            .log_to_stderr()
            .start()
            .map_err(|err| err.to_string())
    });

    if let Err(err) = result {
        eprintln!("Failed to initialize logging: {}", err);
    }
}
