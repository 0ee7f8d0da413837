//! Page Flows
//!
//! What each screen does when it loads or when the user acts on it. Every
//! flow ends in an [`Outcome`] the frontend applies as-is: render data,
//! navigate, or show a notification.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{Credentials, Session};
use crate::models::{
    DashboardSummary, NewVehicle, RenaveDocument, SaleDetails, Vehicle, VehicleLookup,
};

/// Screens the frontend can be sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Login,
    Dashboard,
    Entry,
}

/// Result of a page flow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome<T> {
    Render { data: T },
    Navigate { to: Surface },
    Notify { message: String },
    /// The same action is already in flight; nothing was sent
    Busy,
}

impl<T> Outcome<T> {
    fn render(data: T) -> Self {
        Outcome::Render { data }
    }

    fn navigate(to: Surface) -> Self {
        Outcome::Navigate { to }
    }

    fn notify(message: impl Into<String>) -> Self {
        Outcome::Notify {
            message: message.into(),
        }
    }
}

/// Names of actions currently awaiting the network
#[derive(Default)]
struct InFlight {
    actions: Mutex<HashSet<&'static str>>,
}

impl InFlight {
    fn acquire(&self, action: &'static str) -> Option<InFlightGuard<'_>> {
        let mut actions = self.actions.lock().ok()?;
        if actions.insert(action) {
            Some(InFlightGuard { owner: self, action })
        } else {
            debug!("Ignoring repeated {} while in flight", action);
            None
        }
    }
}

struct InFlightGuard<'a> {
    owner: &'a InFlight,
    action: &'static str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut actions) = self.owner.actions.lock() {
            actions.remove(self.action);
        }
    }
}

/// Page flows over a shared API client
pub struct Pages {
    api: ApiClient,
    in_flight: InFlight,
}

impl Pages {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            in_flight: InFlight::default(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Login form submit
    pub async fn login(&self, credentials: Credentials) -> Outcome<()> {
        let Some(_guard) = self.in_flight.acquire("login") else {
            return Outcome::Busy;
        };

        match self.api.login(&credentials).await {
            Ok(_) => Outcome::navigate(Surface::Dashboard),
            Err(e) => {
                warn!("Login failed: {}", e);
                Outcome::notify(e.to_string())
            }
        }
    }

    /// Account creation form submit
    pub async fn register(&self, credentials: Credentials) -> Outcome<()> {
        let Some(_guard) = self.in_flight.acquire("register") else {
            return Outcome::Busy;
        };

        match self.api.register(&credentials).await {
            Ok(()) => Outcome::notify("Account created, you can log in now"),
            Err(e) => {
                warn!("Registration failed: {}", e);
                Outcome::notify(format!("Could not create account: {}", e))
            }
        }
    }

    /// Dashboard page load
    pub async fn open_dashboard(&self) -> Outcome<DashboardSummary> {
        let Ok(session) = self.api.auth().require_session() else {
            return Outcome::navigate(Surface::Login);
        };

        match self.api.dashboard_summary(&session).await {
            Ok(summary) => Outcome::render(summary),
            Err(e) => failure("Could not load dashboard", e),
        }
    }

    /// Vehicle list page load
    pub async fn open_vehicles(&self) -> Outcome<Vec<Vehicle>> {
        let Ok(session) = self.api.auth().require_session() else {
            return Outcome::navigate(Surface::Login);
        };
        self.relist(&session).await
    }

    /// Creation modal submit; renders the refreshed list on success
    pub async fn create_vehicle(&self, vehicle: NewVehicle) -> Outcome<Vec<Vehicle>> {
        let Ok(session) = self.api.auth().require_session() else {
            return Outcome::navigate(Surface::Login);
        };
        let Some(_guard) = self.in_flight.acquire("create_vehicle") else {
            return Outcome::Busy;
        };

        match self.api.create_vehicle(&session, vehicle).await {
            Ok(_) => self.relist(&session).await,
            Err(e) => failure("Could not register vehicle", e),
        }
    }

    /// Sale modal submit; renders the refreshed list on success
    pub async fn sell_vehicle(&self, id: i64, sale: SaleDetails) -> Outcome<Vec<Vehicle>> {
        let Ok(session) = self.api.auth().require_session() else {
            return Outcome::navigate(Surface::Login);
        };
        let Some(_guard) = self.in_flight.acquire("sell_vehicle") else {
            return Outcome::Busy;
        };

        match self.api.sell_vehicle(&session, id, sale).await {
            Ok(_) => self.relist(&session).await,
            Err(e) => failure("Could not register sale", e),
        }
    }

    /// Delete button; the list is re-read whether or not the delete succeeded
    pub async fn delete_vehicle(&self, id: i64) -> Outcome<Vec<Vehicle>> {
        let Ok(session) = self.api.auth().require_session() else {
            return Outcome::navigate(Surface::Login);
        };
        let Some(_guard) = self.in_flight.acquire("delete_vehicle") else {
            return Outcome::Busy;
        };

        match self.api.delete_vehicle(&session, id).await {
            Err(ApiError::Unauthorized) => Outcome::navigate(Surface::Login),
            Err(e) => {
                warn!("Delete of vehicle {} failed: {}", id, e);
                self.relist(&session).await
            }
            Ok(()) => self.relist(&session).await,
        }
    }

    /// Registry lookup from the creation modal
    pub async fn lookup_plate(&self, plate: String) -> Outcome<VehicleLookup> {
        let Ok(session) = self.api.auth().require_session() else {
            return Outcome::navigate(Surface::Login);
        };
        let Some(_guard) = self.in_flight.acquire("lookup_plate") else {
            return Outcome::Busy;
        };

        match self.api.lookup_by_plate(&session, &plate).await {
            Ok(lookup) => Outcome::render(lookup),
            Err(ApiError::NotFound(_)) => Outcome::notify("Vehicle not found"),
            Err(e) => failure("Lookup failed", e),
        }
    }

    /// RENAVE document button
    pub async fn renave_document(&self, id: i64) -> Outcome<RenaveDocument> {
        let Ok(session) = self.api.auth().require_session() else {
            return Outcome::navigate(Surface::Login);
        };
        let Some(_guard) = self.in_flight.acquire("renave_document") else {
            return Outcome::Busy;
        };

        match self.api.renave_document(&session, id).await {
            Ok(document) => Outcome::render(document),
            Err(e) => failure("Could not generate RENAVE document", e),
        }
    }

    /// Logout button
    pub fn logout(&self) -> Outcome<()> {
        self.api.logout();
        Outcome::navigate(Surface::Entry)
    }

    async fn relist(&self, session: &Session) -> Outcome<Vec<Vehicle>> {
        match self.api.list_vehicles(session).await {
            Ok(vehicles) => Outcome::render(vehicles),
            Err(e) => failure("Could not load vehicles", e),
        }
    }
}

/// Map an error to what the user sees; 401 always goes back to login
fn failure<T>(context: &str, err: ApiError) -> Outcome<T> {
    match err {
        ApiError::Unauthorized | ApiError::InvalidCredentials => {
            info!("{}: session no longer valid", context);
            Outcome::navigate(Surface::Login)
        }
        other => {
            error!("{}: {}", context, other);
            Outcome::notify(format!("{}: {}", context, other))
        }
    }
}
