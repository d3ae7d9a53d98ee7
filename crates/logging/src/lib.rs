use once_cell::sync::OnceCell;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(not(test))]
use tracing_appender::non_blocking::WorkerGuard;

pub const DEFAULT_LOG_DIR: &str = "./logs";

#[cfg(not(test))]
static TRACING: OnceCell<WorkerGuard> = OnceCell::new();

#[cfg(test)]
static TRACING: OnceCell<()> = OnceCell::new();

/// Sends every `tracing` event of the process to `./logs/<module>.log`.
/// Only the first call installs the subscriber.
pub fn init_tracing(module: &str) {
    init_tracing_in(DEFAULT_LOG_DIR, module);
}

/// Same as [`init_tracing`] with a custom log directory.
pub fn init_tracing_in<P: AsRef<Path>>(directory: P, module: &str) {
    TRACING.get_or_init(|| {
        let file_appender =
            tracing_appender::rolling::never(directory, format!("{}.log", module));

        // Tests write synchronously so the file can be read back right away.
        #[cfg(test)]
        let (writer, guard) = (file_appender, ());

        #[cfg(not(test))]
        let (writer, guard) = tracing_appender::non_blocking(file_appender);

        #[cfg(test)]
        let filter = EnvFilter::new("debug");

        #[cfg(not(test))]
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("debug"));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
            .with_ansi(false)
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .try_init();

        if let Err(err) = installed {
            eprintln!("tracing subscriber already installed: {err}");
        }

        guard
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_module_file() {
        // RUST_LOG must not hide the event below
        unsafe { std::env::set_var("RUST_LOG", "error") };

        let dir = std::env::temp_dir().join(format!("torus-logging-{}", std::process::id()));

        init_tracing_in(&dir, "unit");
        // second call is a no-op
        init_tracing_in(&dir, "ignored");

        tracing::info!(capacity = 4, "logging smoke event");

        let content = std::fs::read_to_string(dir.join("unit.log")).unwrap();
        assert!(content.contains("logging smoke event"));
        assert!(content.contains("capacity=4"));
        assert!(!dir.join("ignored.log").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
