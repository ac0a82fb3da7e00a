// SPDX-License-Identifier: GPL-3.0-or-later

use std::env;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

#[cfg(windows)]
mod debugger {
    use std::io::Result;

    use flexi_logger::{DeferredNow, writers::LogWriter};
    use log::Log;

    pub(super) struct WinDbgLogWriter;

    impl LogWriter for WinDbgLogWriter {
        fn write(&self, _now: &mut DeferredNow, record: &log::Record) -> Result<()> {
            win_dbg_logger::DEBUGGER_LOGGER.log(record);
            Ok(())
        }
        fn flush(&self) -> Result<()> {
            win_dbg_logger::DEBUGGER_LOGGER.flush();
            Ok(())
        }
    }
}

/// Starts logging to `ime_test.log` in the temp directory.
///
/// `RUST_LOG` takes precedence over `level`.
pub(crate) fn init_logger(level: &str) -> Option<LoggerHandle> {
    let file_spec = FileSpec::default()
        .directory(env::temp_dir())
        .basename("ime_test")
        .suppress_timestamp();
    let logger = Logger::try_with_env_or_str(level).ok()?;
    #[cfg(windows)]
    let logger = logger
        .log_to_file_and_writer(file_spec, Box::new(debugger::WinDbgLogWriter))
        .use_windows_line_ending();
    #[cfg(not(windows))]
    let logger = logger.log_to_file(file_spec);
    logger
        .rotate(
            Criterion::Size(1024 * 1024),
            Naming::Numbers,
            Cleanup::KeepLogFiles(3),
        )
        .append()
        .write_mode(WriteMode::BufferAndFlush)
        .start()
        .ok()
}
