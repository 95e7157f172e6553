pub const LOG_FILE_BASENAME: &str = "smart-tasks";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 5;

/// Picks the log spec: `SMART_TASKS_LOG`, then `RUST_LOG`, then `default_spec`.
pub fn resolve_log_spec(
    app_var: Option<String>,
    rust_log: Option<String>,
    default_spec: &str,
) -> String {
    app_var
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

/// Starts file logging in `data_dir`. Keep the returned handle alive until exit
/// so buffered lines are flushed.
#[cfg(all(feature = "cli", not(test)))]
pub fn init_logging(
    data_dir: &std::path::Path,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    let default_spec = if cfg!(debug_assertions) {
        "warn,task_manager_lib=debug"
    } else {
        "warn,task_manager_lib=info"
    };
    let spec = resolve_log_spec(
        std::env::var("SMART_TASKS_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
        default_spec,
    );

    let handle = Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(data_dir)
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        // The menu owns stdout; only warnings go to the terminal.
        .duplicate_to_stderr(Duplicate::Warn)
        .start()?;

    install_panic_hook();

    log::info!(
        "logger initialized dir={} rotate_size_bytes={} keep_files={}",
        data_dir.display(),
        LOG_ROTATE_SIZE_BYTES,
        LOG_ROTATE_KEEP_FILES
    );
    Ok(handle)
}

#[cfg(all(feature = "cli", not(test)))]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");
        let location = info
            .location()
            .map(|loc| format!("{loc}"))
            .unwrap_or_else(|| "<unknown>".to_string());
        let backtrace = std::backtrace::Backtrace::force_capture();

        // Runs the default hook even when the logger has already shut down.
        log::error!("panic: payload={payload} location={location}\nbacktrace:\n{backtrace}");
        default_hook(info);
    }));
}
