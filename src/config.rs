//! Logging setup

use tracing::log::LevelFilter;

/// Dependencies that are chatty at info level, and the level they get when
/// debug logging is off.
const QUIET_MODULES: [(&str, LevelFilter); 6] = [
    ("tracing", LevelFilter::Warn),
    ("rustls", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("reqwest", LevelFilter::Info),
    ("h2", LevelFilter::Info),
];

fn base_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let mut logger = simple_logger::SimpleLogger::new().with_level(base_level(debug));
    if !debug {
        for (module, level) in QUIET_MODULES {
            logger = logger.with_module_level(module, level);
        }
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}
