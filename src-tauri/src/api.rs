//! API Module
//!
//! Handles HTTP communication with the AutoGest API.
//!
//! Every authenticated request goes through [`ApiClient::authorized`],
//! which attaches the bearer token and turns a 401 into a cleared session.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::auth::{AuthManager, Credentials, Session};
use crate::models::{
    normalize_plate, DashboardSummary, NewVehicle, RenaveDocument, SaleDetails, Vehicle,
    VehicleLookup,
};

/// API client for the AutoGest backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
    auth: Arc<AuthManager>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout: Duration, auth: Arc<AuthManager>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Network(format!("invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Network(format!("invalid base URL: {}", base_url)));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            auth,
        })
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Endpoint URL under the base; each segment is percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Exchange credentials for a token and store the session
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let url = self.url(&["auth", "login"]);

        debug!("Logging in at: {}", url);

        let response = self
            .client
            .post(url)
            .json(&LoginRequest::from(credentials))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            warn!("Login rejected with status {}", response.status());
            return Err(ApiError::InvalidCredentials);
        }

        // The service answers bad credentials with 200 and no token
        let token = response
            .json::<LoginResponse>()
            .await
            .ok()
            .and_then(|data| data.access_token)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::InvalidCredentials)?;

        let session = Session {
            access_token: token,
            email: credentials.email.trim().to_string(),
        };
        self.auth
            .set_session(session.clone())
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        info!("Logged in as {}", session.email);
        Ok(session)
    }

    /// Create a user account
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let url = self.url(&["auth", "register"]);

        let response = self
            .client
            .post(url)
            .json(&LoginRequest::from(credentials))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        info!("Registered account {}", credentials.email.trim());
        Ok(())
    }

    /// Fetch dashboard counters
    pub async fn dashboard_summary(&self, session: &Session) -> Result<DashboardSummary, ApiError> {
        let response = self
            .authorized(session, Method::GET, &["dashboard", ""], |req| req)
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Network(format!("Status: {}", response.status())));
        }
        parse(response).await
    }

    /// List vehicles in server order
    pub async fn list_vehicles(&self, session: &Session) -> Result<Vec<Vehicle>, ApiError> {
        let response = self
            .authorized(session, Method::GET, &["veiculos"], |req| req)
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Network(format!("Status: {}", response.status())));
        }
        let vehicles: Vec<Vehicle> = parse(response).await?;
        debug!("Listed {} vehicles", vehicles.len());
        Ok(vehicles)
    }

    /// Create a vehicle; fields are validated and the plate upper-cased first
    pub async fn create_vehicle(
        &self,
        session: &Session,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, ApiError> {
        let vehicle = vehicle.prepare().map_err(ApiError::Validation)?;

        info!("Creating vehicle: {} {} ({})", vehicle.brand, vehicle.model, vehicle.plate);

        let response = self
            .authorized(session, Method::POST, &["veiculos"], |req| req.json(&vehicle))
            .await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let created: Vehicle = parse(response).await?;

        info!("Vehicle created with id {}", created.id);
        Ok(created)
    }

    /// Mark a vehicle as sold
    pub async fn sell_vehicle(
        &self,
        session: &Session,
        id: i64,
        sale: SaleDetails,
    ) -> Result<Vehicle, ApiError> {
        let sale = sale.prepare().map_err(ApiError::Validation)?;
        let id_segment = id.to_string();

        info!("Selling vehicle {}", id);

        let response = self
            .authorized(session, Method::PUT, &["veiculos", &id_segment, "vender"], |req| req.json(&sale))
            .await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        parse(response).await
    }

    /// Delete a vehicle
    pub async fn delete_vehicle(&self, session: &Session, id: i64) -> Result<(), ApiError> {
        let id_segment = id.to_string();

        let response = self
            .authorized(session, Method::DELETE, &["veiculos", &id_segment], |req| req)
            .await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        info!("Vehicle {} deleted", id);
        Ok(())
    }

    /// Resolve a plate through the registry
    ///
    /// Any non-2xx answer other than 401 means "not found".
    pub async fn lookup_by_plate(
        &self,
        session: &Session,
        plate: &str,
    ) -> Result<VehicleLookup, ApiError> {
        let plate = normalize_plate(plate).ok_or_else(|| ApiError::NotFound(String::new()))?;
        let response = self
            .authorized(session, Method::GET, &["renave", "consultar", &plate], |req| req)
            .await?;
        if !response.status().is_success() {
            debug!("Plate {} not found (status {})", plate, response.status());
            return Err(ApiError::NotFound(plate));
        }
        parse(response).await
    }

    /// Ask the service to generate the RENAVE document for a vehicle
    pub async fn renave_document(
        &self,
        session: &Session,
        id: i64,
    ) -> Result<RenaveDocument, ApiError> {
        let id_segment = id.to_string();

        let response = self
            .authorized(session, Method::GET, &["renave", &id_segment], |req| req)
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::NotFound(format!("vehicle {}", id)));
        }
        let document: RenaveDocument = parse(response).await?;

        info!("RENAVE document generated: {}", document.file);
        Ok(document)
    }

    /// Drop the local session; the server is not contacted
    pub fn logout(&self) {
        info!("Logging out");
        self.auth.clear_session();
    }

    /// Send a bearer-authenticated request
    ///
    /// A 401 clears the stored session and yields [`ApiError::Unauthorized`];
    /// other statuses are left to the caller.
    async fn authorized<F>(
        &self,
        session: &Session,
        method: Method,
        segments: &[&str],
        build: F,
    ) -> Result<Response, ApiError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(segments);
        debug!("{} {}", method, url);

        let request = self
            .client
            .request(method, url.clone())
            .bearer_auth(&session.access_token);

        let response = build(request).send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ApiError::Network(e.to_string())
        })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Session rejected by server, clearing it");
            self.auth.clear_session();
            return Err(ApiError::Unauthorized);
        }

        Ok(response)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

async fn rejection(response: Response) -> ApiError {
    let status = response.status();
    let detail = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.detail.or(body.erro).or(body.msg))
        .unwrap_or_else(|| format!("Status: {}", status));
    ApiError::Validation(detail)
}

// Request/Response types

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    senha: &'a str,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            email: credentials.email.trim(),
            senha: &credentials.password,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: Option<String>,
    erro: Option<String>,
    msg: Option<String>,
}

/// API errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session expired or invalid")]
    Unauthorized,

    #[error("Rejected: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Could not save session: {0}")]
    Storage(String),
}
