use tracing_subscriber::EnvFilter;

/// RUST_LOG wins when set; otherwise `info`, or `debug` with `--verbose`.
/// Call after `.env` is loaded so a RUST_LOG set there is honored.
pub fn init_logger(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("RUST_LOG", verbose))
        .with_writer(std::io::stderr)
        .init();
}

fn env_filter(var: &str, verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default_level))
}
