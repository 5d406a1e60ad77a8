// src/services/api_server.rs
//! API Server for the Path2Zero certificate authentication service
//!
//! This module provides the REST API used by the marketplace front end:
//! - Certificate upload and authentication against the carbon registry
//! - Field extraction, authentication and validation for typed-in certificates
//! - Creating marketplace listings and serving the listing feed
//!
//! Every response uses the `{ success, data?, error? }` envelope from
//! [`crate::services::responses`].

use crate::matching::extraction::extract_certificate_fields;
use crate::matching::validation::{validate_certificate, ValidationReport};
use crate::models::authentication::AuthenticationResult;
use crate::models::certificate::CertificateFields;
use crate::models::marketplace::{category_image, MarketplaceListing, Seller};
use crate::services::authenticator::{CertificateAuthenticator, CertificateCheck};
use crate::services::responses::{ApiError, ApiResponse};
use crate::storage::listing_store::ListingStore;
use crate::utils::pdf;
use crate::utils::serialization::{coerce_to_f64, coerce_to_string};
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Json,
        Multipart, State,
    },
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

pub const AUTHENTICATE_CERTIFICATE_ROUTE: &str = "/server/api/authenticate-certificate";
pub const LIST_CERTIFICATE_ROUTE: &str = "/server/api/list-certificate";
pub const MARKETPLACE_LISTINGS_ROUTE: &str = "/server/api/marketplace-listings";
pub const EXTRACT_ROUTE: &str = "/api/carbon/extract";
pub const AUTHENTICATE_ROUTE: &str = "/api/carbon/authenticate";
pub const VALIDATE_ROUTE: &str = "/api/carbon/validate";
pub const HEALTH_ROUTE: &str = "/health";

const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type. Please upload a PDF certificate.";
const UNPROCESSABLE_CERTIFICATE: &str = "Unable to extract certificate fields from PDF";

/// Accepted listing vintages
const VINTAGE_YEARS: std::ops::RangeInclusive<i64> = 1900..=2100;

// API request structures

/// Request payload for extracting fields from certificate text
#[derive(Deserialize)]
struct ExtractRequest {
    #[serde(default)]
    text: String,
}

/// Request payload carrying certificate fields
#[derive(Deserialize)]
struct CertificateRequest {
    #[serde(default)]
    certificate: CertificateFields,
}

/// Seller-entered listing details; numbers may arrive as strings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingPayload {
    project_name: String,
    owner_name: String,
    category: String,
    registry: String,
    credits: Value,
    vintage_year: Value,
    price_per_tonne: Value,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    seller_id: Option<String>,
    #[serde(default)]
    seller_email: Option<String>,
}

/// Request payload for creating a marketplace listing
///
/// `authentication` is the `{ certificate, result }` object returned by the
/// certificate upload endpoint.
#[derive(Deserialize)]
struct ListCertificateRequest {
    #[serde(default)]
    listing: Option<ListingPayload>,
    #[serde(default)]
    authentication: Option<Value>,
}

/// A file part read from a multipart upload
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// API server state containing all service dependencies
pub struct ApiServer {
    /// Service matching certificates against the registry
    authenticator: Arc<CertificateAuthenticator>,

    /// Store for seller-created marketplace listings
    listing_store: Arc<ListingStore>,

    /// Request body cap, certificate uploads included
    max_upload_bytes: usize,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `authenticator` - Certificate authentication service
    /// * `listing_store` - Marketplace listing store
    /// * `max_upload_bytes` - Largest accepted request body
    pub fn new(
        authenticator: CertificateAuthenticator,
        listing_store: ListingStore,
        max_upload_bytes: usize,
    ) -> Self {
        ApiServer {
            authenticator: Arc::new(authenticator),
            listing_store: Arc::new(listing_store),
            max_upload_bytes,
        }
    }

    /// Builds the router with every API route
    ///
    /// Known paths answer other methods with 405; unknown paths with 404.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .max_age(Duration::from_secs(60 * 60));

        Router::new()
            .route(
                HEALTH_ROUTE,
                get(Self::health_handler).fallback(Self::method_not_allowed_handler),
            )
            .route(
                AUTHENTICATE_CERTIFICATE_ROUTE,
                post(Self::authenticate_certificate_handler)
                    .fallback(Self::method_not_allowed_handler),
            )
            .route(
                LIST_CERTIFICATE_ROUTE,
                post(Self::list_certificate_handler).fallback(Self::method_not_allowed_handler),
            )
            .route(
                MARKETPLACE_LISTINGS_ROUTE,
                get(Self::marketplace_listings_handler)
                    .fallback(Self::method_not_allowed_handler),
            )
            .route(
                EXTRACT_ROUTE,
                post(Self::extract_handler).fallback(Self::method_not_allowed_handler),
            )
            .route(
                AUTHENTICATE_ROUTE,
                post(Self::authenticate_handler).fallback(Self::method_not_allowed_handler),
            )
            .route(
                VALIDATE_ROUTE,
                post(Self::validate_handler).fallback(Self::method_not_allowed_handler),
            )
            .fallback(Self::not_found_handler)
            .layer(
                ServiceBuilder::new()
                    .layer(cors)
                    .layer(DefaultBodyLimit::max(self.max_upload_bytes)),
            )
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and serves requests until Ctrl-C
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3001")
    ///
    /// # Errors
    /// Returns the I/O error if the address cannot be bound.
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API server running at http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    // =====================
    // Certificate Handlers
    // =====================

    /// Authenticates an uploaded PDF certificate
    ///
    /// # Endpoint
    /// POST /server/api/authenticate-certificate (multipart, field `file`)
    ///
    /// # Responses
    /// - 200 OK, `success: true`: certificate matched a registry listing
    /// - 200 OK, `success: false`: wrong file type, no extractable fields, or
    ///   confidence below the threshold (with `data` attached)
    /// - 400 Bad Request: no multipart body or no `file` part
    /// - 500 Internal Server Error: registry unavailable
    async fn authenticate_certificate_handler(
        State(state): State<Arc<ApiServer>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Json<ApiResponse<CertificateCheck>>, ApiError> {
        let mut multipart = multipart.map_err(|_| ApiError::MissingFile)?;
        let upload = read_upload(&mut multipart, "file")
            .await?
            .ok_or(ApiError::MissingFile)?;

        if !pdf::is_pdf(upload.content_type.as_deref()) {
            return Ok(Json(ApiResponse::failure(UNSUPPORTED_FILE_TYPE)));
        }

        let text = match pdf::extract_text(upload.data).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "could not read {}: {}",
                    upload.file_name.as_deref().unwrap_or("uploaded PDF"),
                    e
                );
                return Ok(Json(ApiResponse::failure(UNPROCESSABLE_CERTIFICATE)));
            }
        };

        let response = match state.authenticator.authenticate_text(&text).await? {
            None => ApiResponse::failure(UNPROCESSABLE_CERTIFICATE),
            Some(check) if check.result.authenticated => ApiResponse::ok(check),
            Some(check) => ApiResponse::rejected(check),
        };
        Ok(Json(response))
    }

    /// Extracts certificate fields from plain text
    ///
    /// # Endpoint
    /// POST /api/carbon/extract
    ///
    /// # Request Body
    /// `{ "text": "..." }`
    async fn extract_handler(
        payload: Result<Json<ExtractRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<CertificateFields>>, ApiError> {
        let request = json_body(payload)?;
        Ok(Json(ApiResponse::ok(extract_certificate_fields(&request.text))))
    }

    /// Authenticates certificate fields entered by hand
    ///
    /// # Endpoint
    /// POST /api/carbon/authenticate
    ///
    /// # Request Body
    /// `{ "certificate": { "project_name": ..., ... } }`
    ///
    /// # Responses
    /// - 200 OK: the result; `success` mirrors `authenticated`
    /// - 500 Internal Server Error: registry unavailable
    async fn authenticate_handler(
        State(state): State<Arc<ApiServer>>,
        payload: Result<Json<CertificateRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<AuthenticationResult>>, ApiError> {
        let request = json_body(payload)?;
        let result = state.authenticator.authenticate(&request.certificate).await?;

        if result.authenticated {
            Ok(Json(ApiResponse::ok(result)))
        } else {
            Ok(Json(ApiResponse::rejected(result)))
        }
    }

    /// Checks certificate fields for completeness
    ///
    /// # Endpoint
    /// POST /api/carbon/validate
    async fn validate_handler(
        payload: Result<Json<CertificateRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<ValidationReport>>, ApiError> {
        let request = json_body(payload)?;
        Ok(Json(ApiResponse::ok(validate_certificate(&request.certificate))))
    }

    // =====================
    // Marketplace Handlers
    // =====================

    /// Creates a marketplace listing for an authenticated certificate
    ///
    /// # Endpoint
    /// POST /server/api/list-certificate
    ///
    /// # Responses
    /// - 200 OK: the stored listing
    /// - 400 Bad Request: missing listing data or invalid numbers
    /// - 500 Internal Server Error: the store could not be written
    async fn list_certificate_handler(
        State(state): State<Arc<ApiServer>>,
        payload: Result<Json<ListCertificateRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<MarketplaceListing>>, ApiError> {
        let request = json_body(payload)?;
        let listing = request
            .listing
            .ok_or_else(|| ApiError::BadRequest("Missing listing data".into()))?;

        let authentication = request.authentication.unwrap_or(Value::Null);
        let certificate = authentication.get("certificate").cloned().filter(|v| !v.is_null());
        let result = authentication.get("result").cloned().filter(|v| !v.is_null());

        let new_listing = build_listing(listing, certificate, result)?;
        state.listing_store.prepend(new_listing.clone()).await?;
        info!("listed {} ({} credits)", new_listing.title, new_listing.credits);

        Ok(Json(ApiResponse::ok(new_listing)))
    }

    /// Returns every stored marketplace listing, newest first
    ///
    /// # Endpoint
    /// GET /server/api/marketplace-listings
    async fn marketplace_listings_handler(
        State(state): State<Arc<ApiServer>>,
    ) -> Result<Json<ApiResponse<Vec<MarketplaceListing>>>, ApiError> {
        let listings = state.listing_store.read_listings().await?;
        Ok(Json(ApiResponse::ok(listings)))
    }

    // =====================
    // Misc
    // =====================

    async fn health_handler() -> Json<Value> {
        Json(json!({ "success": true }))
    }

    async fn method_not_allowed_handler() -> ApiError {
        ApiError::MethodNotAllowed
    }

    async fn not_found_handler() -> ApiError {
        ApiError::NotFound
    }
}

// Implement Clone for ApiServer to use with Axum's State
impl Clone for ApiServer {
    fn clone(&self) -> Self {
        ApiServer {
            authenticator: Arc::clone(&self.authenticator),
            listing_store: Arc::clone(&self.listing_store),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Unwraps a JSON body, turning extractor rejections into 400s.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Reads the first multipart part named `field_name`.
async fn read_upload(multipart: &mut Multipart, field_name: &str) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        return Ok(Some(Upload {
            file_name,
            content_type,
            data,
        }));
    }
    Ok(None)
}

/// Turns a seller submission into a stored listing.
///
/// The country falls back to the authenticated certificate's country, then
/// to "Unknown".
fn build_listing(
    payload: ListingPayload,
    certificate: Option<Value>,
    authentication: Option<Value>,
) -> Result<MarketplaceListing, ApiError> {
    let credits = number_field(&payload.credits, "credits")?;
    let price_per_tonne = number_field(&payload.price_per_tonne, "pricePerTonne")?;
    let vintage = number_field(&payload.vintage_year, "vintageYear")?;
    if vintage.fract() != 0.0 || !VINTAGE_YEARS.contains(&(vintage as i64)) {
        return Err(ApiError::BadRequest("Invalid value for vintageYear".into()));
    }

    let country = payload
        .country
        .or_else(|| {
            certificate
                .as_ref()
                .and_then(|c| c.get("country"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let credits_text = coerce_to_string(&payload.credits).unwrap_or_else(|| credits.to_string());

    Ok(MarketplaceListing {
        id: uuid::Uuid::new_v4().to_string(),
        description: format!(
            "Listed by {}. {} credits available.",
            payload.owner_name, credits_text
        ),
        title: payload.project_name,
        image: category_image(&payload.category).to_string(),
        price_per_tonne,
        country,
        category: payload.category,
        vintage: vintage as i64,
        verified: true,
        registry: payload.registry,
        credits,
        seller: Seller {
            id: payload.seller_id,
            name: payload.owner_name,
            email: payload.seller_email,
        },
        certificate,
        authentication,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn number_field(value: &Value, name: &str) -> Result<f64, ApiError> {
    coerce_to_f64(value).ok_or_else(|| ApiError::BadRequest(format!("Invalid value for {name}")))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!("failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
