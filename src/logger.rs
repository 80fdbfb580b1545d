use anyhow::Result;
use flexi_logger::{detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::settings::LogSettings;

/// Starts the global logger. Keep the returned handle alive for as long as
/// logging is needed.
pub fn setup_logger(settings: &LogSettings) -> Result<LoggerHandle> {
    let logger = Logger::try_with_str(&settings.spec)?;

    let logger = match &settings.directory {
        Some(directory) => logger
            .log_to_file(FileSpec::default().directory(directory).basename("boss-spawn-tracker"))
            .rotate(
                Criterion::Size(settings.rotate_over_bytes),
                Naming::Numbers,
                Cleanup::KeepLogFiles(settings.keep_files),
            )
            .duplicate_to_stderr(Duplicate::Warn),
        None => logger.log_to_stderr(),
    };

    Ok(logger.format(detailed_format).start()?)
}
