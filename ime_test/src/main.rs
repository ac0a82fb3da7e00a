// SPDX-License-Identifier: GPL-3.0-or-later

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![cfg_attr(not(windows), allow(dead_code))]

#[cfg(windows)]
mod app;
mod composition;
mod config;
#[cfg(windows)]
mod font;
#[cfg(windows)]
mod ime;
mod input;
mod logging;
#[cfg(windows)]
mod main_window;
mod status;
#[cfg(windows)]
mod status_bar;
#[cfg(windows)]
mod window;

use anyhow::Result;

use config::Config;

fn main() -> Result<()> {
    let config = Config::load();
    let _logger = logging::init_logger(&config.log_level);
    log::info!(
        "{} {} started",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    run(config)
}

#[cfg(windows)]
fn run(config: Config) -> Result<()> {
    app::run(config)
}

#[cfg(not(windows))]
fn run(_config: Config) -> Result<()> {
    anyhow::bail!("ime-test drives the Win32 IME and only runs on Windows")
}
