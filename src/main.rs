// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

mod animation;
mod capabilities;
mod cli;
mod config;
mod error;
mod file_utils;
mod media;
mod render;
mod services;
mod sidecar;
mod startup;
mod state;
mod ui;

#[cfg(test)]
mod test_support;

use clap::Parser;

fn init_logging(filter: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    #[cfg(debug_assertions)]
    builder.filter_level(log::LevelFilter::Debug);
    #[cfg(not(debug_assertions))]
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_env(env_logger::Env::default());
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();
    init_logging(cli.log_level.as_deref());

    let capabilities = capabilities::Capabilities::detect();
    let app = AppWindow::new()?;
    let app_state = state::AppState::new(cli.settings(), capabilities);

    // Setup all UI event handlers
    let viewer = ui::setup_handlers(&app, app_state);
    startup::configure_startup(&viewer);

    app.run()?;

    Ok(())
}
