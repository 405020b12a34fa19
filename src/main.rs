use clap::Parser;

use quad::app::{self, exit_code};
use quad::args::Args;
use quad::config::AppConfig;
use quad::logging::init_logging;

fn main() {
    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();
    let config = AppConfig::from(args);
    init_logging(config.log_filter.as_deref());

    let result = app::run(&config);
    if let Err(e) = &result {
        log::error!("{e}");
    }

    std::process::exit(exit_code(&result));
}
