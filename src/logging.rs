//! Opt-in log output for binaries using this crate.
//!
//! The library itself only emits records through the `log` facade and never
//! installs a logger. Call [`init`] once at startup to get the classic
//! `timestamp - name - level - message` lines on stdout.

use log::LevelFilter;
use std::io::Write;

pub fn level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs a stdout logger. Returns an error if a logger is already set.
pub fn init(verbose: bool) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level(verbose))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                buf.timestamp_millis(),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .try_init()
}
