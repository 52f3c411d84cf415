//! Defines the Axum API routes and the public (unauthenticated) handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::auth::{AccessGuard, CredentialStore, InMemoryAttemptStore, SystemClock};
use crate::config::{Config, ConfigError};
use crate::store::{
    AnalyticsEvent, ContactSubmission, InMemorySubmissionStore, QuestionnaireResponse,
    SubmissionStore,
};
use crate::web::admin;
use crate::web::error::AppError;
use crate::web::models::{
    AnalyticsEventRequest, ContactReceipt, ContactRequest, QuestionnaireReceipt,
    QuestionnaireSubmission,
};

pub struct AppStateInner {
    pub guard: AccessGuard,
    pub store: Arc<dyn SubmissionStore>,
}
pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(guard: AccessGuard, store: Arc<dyn SubmissionStore>) -> AppState {
        Arc::new(Self { guard, store })
    }

    /// Guard from the configured admin identity and lockout policy, backed by
    /// an empty in-memory store.
    pub fn from_config(config: &Config) -> Result<AppState, ConfigError> {
        let credentials = CredentialStore::new(
            config.admin.username.as_deref(),
            config.admin.password_hash.as_deref(),
        )?;
        if !credentials.is_configured() {
            warn!("ADMIN_USERNAME or ADMIN_PASSWORD_HASH not set, admin API disabled");
        }

        let guard = AccessGuard::with_parts(
            credentials,
            config.auth.lockout_policy(),
            InMemoryAttemptStore::new(),
            Arc::new(SystemClock),
        );
        Ok(Self::new(guard, Arc::new(InMemorySubmissionStore::new())))
    }
}

/// Creates the Axum router with all the API endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(root))
        .route("/api/questionnaire", post(submit_questionnaire))
        .route("/api/contact", post(submit_contact))
        .route("/api/analytics/event", post(track_event))
        .route("/api/admin/auth/verify", post(admin::verify))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/questionnaire", get(admin::list_questionnaires))
        .route(
            "/api/admin/questionnaire/{id}",
            get(admin::get_questionnaire)
                .patch(admin::update_questionnaire)
                .delete(admin::delete_questionnaire),
        )
        .route("/api/admin/contact", get(admin::list_contacts))
        .route(
            "/api/admin/contact/{id}",
            get(admin::get_contact)
                .patch(admin::update_contact)
                .delete(admin::delete_contact),
        )
        .with_state(state)
}

/// CORS for the configured origins. `*` allows any origin without
/// credentials; an explicit list also allows credentialed requests.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!("Ignoring invalid CORS origin '{}'", origin))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "HILLIA Governance Backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/questionnaire
async fn submit_questionnaire(
    State(state): State<AppState>,
    Json(payload): Json<QuestionnaireSubmission>,
) -> Result<Json<QuestionnaireReceipt>, AppError> {
    if !payload.consent {
        return Err(AppError::ConsentRequired);
    }

    let response = QuestionnaireResponse::new(
        &payload.session_id,
        payload.sections,
        payload.free_text,
        payload.contact_info,
        payload.wants_contact,
    );
    let receipt = QuestionnaireReceipt {
        response_id: response.response_id,
        timestamp: response.timestamp,
        status: "received",
    };
    state.store.insert_questionnaire(response).await;

    info!("Questionnaire submitted: {}", receipt.response_id);
    Ok(Json(receipt))
}

/// POST /api/contact
async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ContactReceipt>, AppError> {
    if !payload.consent {
        return Err(AppError::ConsentRequired);
    }

    let submission = ContactSubmission::new(payload.into_details());
    let receipt = ContactReceipt {
        submission_id: submission.submission_id,
        timestamp: submission.timestamp,
    };
    state.store.insert_contact(submission).await;

    info!("Contact submitted: {}", receipt.submission_id);
    Ok(Json(receipt))
}

/// POST /api/analytics/event -- recorded only with consent.
async fn track_event(
    State(state): State<AppState>,
    Json(payload): Json<AnalyticsEventRequest>,
) -> Json<Value> {
    if !payload.consent {
        return Json(json!({ "status": "skipped", "reason": "no consent" }));
    }

    let event = AnalyticsEvent::new(&payload.session_id, payload.event_type, payload.event_data);
    let event_id = event.event_id;
    state.store.insert_event(event).await;

    Json(json!({ "status": "recorded", "event_id": event_id }))
}
