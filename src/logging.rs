//! log4rs setup.
//!
//! stdout belongs to the result document, so the fallback logger writes to stderr.

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

/// Initialise logging from `config_file`, or warn-level stderr logging if it is missing.
pub fn init_logging(config_file: &str) -> Result<(), Box<dyn std::error::Error>> {
    if Path::new(config_file).exists() {
        log4rs::init_file(config_file, Default::default())?;
        log::debug!("Logging configured from {config_file}");
        return Ok(());
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
    log4rs::init_config(config)?;
    Ok(())
}
