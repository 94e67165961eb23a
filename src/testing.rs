use std::sync::Once;

static INIT_LOG: Once = Once::new();

/// Initialises the logger once per test binary. Use `RUST_LOG` to enable log records.
pub fn init_logging() {
    INIT_LOG.call_once(pretty_env_logger::init);
}
