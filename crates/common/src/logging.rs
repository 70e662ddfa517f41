//! Logging and tracing initialization.

use std::sync::Arc;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// When `config.file` is set the output goes to that file (appending,
/// parent directories created as needed); an unopenable file falls
/// back to the console with a note on stderr.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder().with_env_filter(env_filter);

    match open_log_file(config) {
        Some(file) => {
            let builder = builder.with_writer(Arc::new(file)).with_ansi(false);
            if config.json {
                tracing::subscriber::set_global_default(builder.json().finish()).ok();
            } else {
                tracing::subscriber::set_global_default(builder.with_target(true).finish()).ok();
            }
        }
        None => {
            if config.json {
                tracing::subscriber::set_global_default(builder.json().finish()).ok();
            } else {
                let subscriber = builder
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .finish();
                tracing::subscriber::set_global_default(subscriber).ok();
            }
        }
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

fn open_log_file(config: &LoggingConfig) -> Option<std::fs::File> {
    let path = config.file.as_ref()?;
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Cannot create log directory {}: {e}", parent.display());
            return None;
        }
    }
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created_with_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("vertcut-log-test-{}", std::process::id()));
        let path = dir.join("nested").join("app.log");
        let config = LoggingConfig {
            level: "info".to_string(),
            json: false,
            file: Some(path.clone()),
        };

        assert!(open_log_file(&config).is_some());
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn no_configured_file_means_no_file() {
        assert!(open_log_file(&LoggingConfig::default()).is_none());
    }
}
