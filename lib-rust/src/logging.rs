use log::LevelFilter;

/// Initialize diagnostics on stderr.
///
/// Stdout is kept for the per-file report, so everything here goes through
/// `log`. `RUST_LOG` overrides the level chosen by `verbose`, e.g.
/// `RUST_LOG=camtrap_banner::region=trace`.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // `try_init` so that tests and embedding applications can call this more
    // than once.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
