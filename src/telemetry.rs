use std::fs::create_dir_all;
use std::path::PathBuf;
use std::sync::Mutex;

use logs_wheel::LogFileInitializer;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

/// Initializes logging: line-delimited JSON written through a size-capped,
/// rolling log file (`log/app.log`, a handful of old files retained).
pub fn init_tracing() -> crate::Result<()> {
    let log_dir = PathBuf::new().join("log");
    create_dir_all(&log_dir)?;
    let log_file = LogFileInitializer {
        max_n_old_files: 2,
        directory: log_dir,
        filename: "app.log",
        preferred_max_file_size_mib: 1,
    }
    .init()?;
    let writer = Mutex::new(log_file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish()
        .with(fmt::Layer::default().json().with_writer(writer).with_ansi(false));
    tracing::subscriber::set_global_default(subscriber).expect("failed to set global default subscriber");

    Ok(())
}
