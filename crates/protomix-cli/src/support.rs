use crate::config::{Config, ConfigError};
use serde::Serialize;
use serde_json::Value as Json;
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PROTOMIX_LOG";

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn exit_with(message: impl Display, code: i32) -> ! {
    eprintln!("error: {message}");
    std::process::exit(code);
}

pub fn load_config_or_exit(path: &str) -> Config {
    Config::load(Path::new(path)).unwrap_or_else(|e| exit_with(e, 1))
}

/// Read JSON from a file, or from stdin when `path` is `-`.
pub fn read_json(path: &str) -> Result<Json, ConfigError> {
    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| ConfigError::ReadFile {
                path: "<stdin>".to_string(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_string(),
            source,
        })?
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::ParseJson {
        path: path.to_string(),
        source,
    })
}

pub fn read_json_or_exit(path: &str) -> Json {
    read_json(path).unwrap_or_else(|e| exit_with(e, 1))
}

pub fn print_json(payload: &impl Serialize, compact: bool) {
    let rendered = if compact {
        serde_json::to_string(payload)
    } else {
        serde_json::to_string_pretty(payload)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(err) => exit_with(format!("failed to render json: {err}"), 2),
    }
}
