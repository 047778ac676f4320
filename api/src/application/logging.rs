use tracing_subscriber::EnvFilter;

use crate::args::LogArgs;

/// `RUST_LOG` takes precedence over the `--debug` switch.
pub fn init_logger(args: &LogArgs) {
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
