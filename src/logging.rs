//! Tracing setup shared by the binaries
//!
//! `RUST_LOG` wins when set; otherwise the filter is built from
//! `logging.level`. `logging.format = "json"` switches to JSON lines and
//! `logging.file` appends to a file instead of stdout.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is unset
pub fn default_directives(level: &str) -> String {
    format!("fitlog={level},fitlog_core={level},tower_http=debug")
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_ansi(config.file.is_none()).with_writer(writer))
            .try_init()
    };

    result.map_err(std::io::Error::other)
}
