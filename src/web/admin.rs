//! Admin handlers. Every handler here takes an [`AdminUser`], so none of
//! them run unless the access guard accepted the request.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::stats::{AdminStats, summarize};
use crate::store::{
    ContactStatus, ContactSubmission, InternalScore, ListFilter, QuestionnaireResponse,
    ResponseStatus, StoreError,
};
use crate::web::api::AppState;
use crate::web::auth::AdminUser;
use crate::web::error::AppError;
use crate::web::models::{AuthVerifyResponse, ContactPatch, ListQuery, QuestionnairePatch};

const RESPONSE: &str = "Response";
const SUBMISSION: &str = "Submission";

/// An id that is not a UUID cannot name a stored record.
fn parse_id(raw: &str, kind: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Store(StoreError::NotFound(kind)))
}

/// POST /api/admin/auth/verify
pub async fn verify(AdminUser(username): AdminUser) -> Json<AuthVerifyResponse> {
    Json(AuthVerifyResponse {
        status: "authenticated",
        username,
    })
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>, _admin: AdminUser) -> Json<AdminStats> {
    let responses = state.store.list_questionnaires(&ListFilter::all()).await;
    let contacts = state.store.list_contacts(&ListFilter::all()).await;
    Json(summarize(&responses, &contacts))
}

pub async fn list_questionnaires(
    State(state): State<AppState>,
    _admin: AdminUser,
    query: Result<Query<ListQuery<ResponseStatus>>, QueryRejection>,
) -> Result<Json<Vec<QuestionnaireResponse>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.store.list_questionnaires(&query.into_filter()).await))
}

pub async fn get_questionnaire(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<QuestionnaireResponse>, AppError> {
    let id = parse_id(&id, RESPONSE)?;
    Ok(Json(state.store.get_questionnaire(id).await?))
}

/// PATCH /api/admin/questionnaire/{id}
///
/// Status, notes and the watched flag come from the query string; an
/// optional JSON body carries the reviewer score.
pub async fn update_questionnaire(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    patch: Result<Query<QuestionnairePatch>, QueryRejection>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let Query(patch) = patch?;
    let mut update = patch.into_update();
    if !body.is_empty() {
        let score: InternalScore = serde_json::from_slice(&body)
            .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
        update.internal_score = Some(score);
    }
    if update.is_empty() {
        return Err(AppError::NoUpdateData);
    }

    let id = parse_id(&id, RESPONSE)?;
    state.store.update_questionnaire(id, update).await?;

    info!("Questionnaire {} updated by {}", id, admin);
    Ok(Json(json!({ "status": "updated", "response_id": id })))
}

pub async fn delete_questionnaire(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, RESPONSE)?;
    state.store.delete_questionnaire(id).await?;

    info!("Questionnaire {} deleted by {}", id, admin);
    Ok(Json(json!({ "status": "deleted", "response_id": id })))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    _admin: AdminUser,
    query: Result<Query<ListQuery<ContactStatus>>, QueryRejection>,
) -> Result<Json<Vec<ContactSubmission>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.store.list_contacts(&query.into_filter()).await))
}

pub async fn get_contact(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ContactSubmission>, AppError> {
    let id = parse_id(&id, SUBMISSION)?;
    Ok(Json(state.store.get_contact(id).await?))
}

pub async fn update_contact(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    patch: Result<Query<ContactPatch>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(patch) = patch?;
    let update = patch.into_update();
    if update.is_empty() {
        return Err(AppError::NoUpdateData);
    }

    let id = parse_id(&id, SUBMISSION)?;
    state.store.update_contact(id, update).await?;

    info!("Contact {} updated by {}", id, admin);
    Ok(Json(json!({ "status": "updated", "submission_id": id })))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, SUBMISSION)?;
    state.store.delete_contact(id).await?;

    info!("Contact {} deleted by {}", id, admin);
    Ok(Json(json!({ "status": "deleted", "submission_id": id })))
}
