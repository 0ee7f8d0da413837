//! Tauri Commands Module
//!
//! IPC commands exposed to the frontend. Each one delegates to a page flow
//! and hands its outcome back unchanged.

use tauri::{command, State};
use tracing::debug;

use crate::auth::Credentials;
use crate::models::{DashboardSummary, NewVehicle, RenaveDocument, SaleDetails, Vehicle, VehicleLookup};
use crate::pages::Outcome;
use crate::AppState;

/// Whether a stored session exists (entry page routing)
#[command]
pub fn has_session(state: State<'_, AppState>) -> bool {
    debug!("Checking stored session");
    state.pages.api().auth().is_authenticated()
}

#[command]
pub async fn login(
    email: String,
    password: String,
    state: State<'_, AppState>,
) -> Result<Outcome<()>, String> {
    Ok(state.pages.login(Credentials { email, password }).await)
}

#[command]
pub async fn register(
    email: String,
    password: String,
    state: State<'_, AppState>,
) -> Result<Outcome<()>, String> {
    Ok(state.pages.register(Credentials { email, password }).await)
}

#[command]
pub async fn load_dashboard(state: State<'_, AppState>) -> Result<Outcome<DashboardSummary>, String> {
    Ok(state.pages.open_dashboard().await)
}

#[command]
pub async fn load_vehicles(state: State<'_, AppState>) -> Result<Outcome<Vec<Vehicle>>, String> {
    Ok(state.pages.open_vehicles().await)
}

#[command]
pub async fn create_vehicle(
    vehicle: NewVehicle,
    state: State<'_, AppState>,
) -> Result<Outcome<Vec<Vehicle>>, String> {
    Ok(state.pages.create_vehicle(vehicle).await)
}

#[command]
pub async fn sell_vehicle(
    id: i64,
    sale: SaleDetails,
    state: State<'_, AppState>,
) -> Result<Outcome<Vec<Vehicle>>, String> {
    Ok(state.pages.sell_vehicle(id, sale).await)
}

#[command]
pub async fn delete_vehicle(
    id: i64,
    state: State<'_, AppState>,
) -> Result<Outcome<Vec<Vehicle>>, String> {
    Ok(state.pages.delete_vehicle(id).await)
}

#[command]
pub async fn lookup_plate(
    plate: String,
    state: State<'_, AppState>,
) -> Result<Outcome<VehicleLookup>, String> {
    Ok(state.pages.lookup_plate(plate).await)
}

#[command]
pub async fn renave_document(
    id: i64,
    state: State<'_, AppState>,
) -> Result<Outcome<RenaveDocument>, String> {
    Ok(state.pages.renave_document(id).await)
}

#[command]
pub fn logout(state: State<'_, AppState>) -> Outcome<()> {
    state.pages.logout()
}
