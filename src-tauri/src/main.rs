//! AutoGest Desktop - Main Entry Point
//!
//! Desktop client for the AutoGest vehicle inventory service.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Context;
use tracing::info;

use autogest_lib::{commands, config::Config, logging, AppState};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("invalid configuration")?;

    logging::init(&config.log_dir());
    info!("AutoGest Desktop starting against {}", config.api_url);

    let app_state = AppState::from_config(&config).context("failed to build API client")?;

    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            commands::has_session,
            commands::login,
            commands::register,
            commands::load_dashboard,
            commands::load_vehicles,
            commands::create_vehicle,
            commands::sell_vehicle,
            commands::delete_vehicle,
            commands::lookup_plate,
            commands::renave_document,
            commands::logout,
        ])
        .setup(|_app| {
            info!("Application setup complete");
            Ok(())
        })
        .run(tauri::generate_context!())
        .context("error running AutoGest")?;

    Ok(())
}
