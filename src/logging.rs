use log::{Level, LevelFilter, Metadata};

/// Target of the fatal error `main` reports before exiting.
const FATAL_TARGET: &str = "quad";

/// Installs `env_logger` as the `log` backend.
///
/// `filter` takes precedence over `RUST_LOG`; without either, `info` and
/// above is printed. Errors from this crate are printed whatever the filter
/// says. Calling this more than once has no effect.
pub fn init_logging(filter: Option<&str>) {
    let mut builder = env_logger::Builder::new();

    match filter.map(str::to_owned).or_else(|| std::env::var("RUST_LOG").ok()) {
        Some(filter) => {
            builder.parse_filters(&filter);
            if !fatal_errors_enabled(&filter) {
                builder.filter_module(FATAL_TARGET, LevelFilter::Error);
            }
        }
        None => {
            builder.filter_level(LevelFilter::Info);
        }
    }

    if builder.try_init().is_ok() {
        log::debug!("logging initialized");
    }
}

fn fatal_errors_enabled(filter: &str) -> bool {
    let filter = env_logger::filter::Builder::new().parse(filter).build();

    filter.enabled(&fatal_error())
}

fn fatal_error() -> Metadata<'static> {
    Metadata::builder()
        .level(Level::Error)
        .target(FATAL_TARGET)
        .build()
}
