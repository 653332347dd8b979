use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{BlockError, CreateBlockedSlotRequest};
use crate::services::{BlockService, DirectoryService};

#[derive(Debug, Deserialize)]
pub struct DoctorsQuery {
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddSpecialtyRequest {
    pub name: String,
}

fn map_block_error(error: BlockError) -> AppError {
    match error {
        BlockError::InvalidRange(e) => AppError::BadRequest(e.to_string()),
        BlockError::Overlap => {
            AppError::Conflict("Time range overlaps an existing blocked slot or appointment".to_string())
        }
        BlockError::NotFound => AppError::NotFound("Blocked slot not found".to_string()),
        BlockError::Store(msg) => AppError::Store(msg),
    }
}

/// A doctor manages their own blocks; admins can manage anyone's.
fn authorize_block_access(user: &User, doctor_id: Uuid) -> Result<(), AppError> {
    let is_owner = user.is_doctor() && user.id == doctor_id.to_string();
    if !is_owner && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to manage this doctor's blocked slots".to_string(),
        ));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<DoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);

    let doctors = directory
        .list_doctors(query.specialty.as_deref(), auth.token())
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

    Ok(Json(json!({ "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn list_specialties(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);

    let specialties = directory
        .list_specialties(auth.token())
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

    Ok(Json(json!({ "specialties": specialties })))
}

#[axum::debug_handler]
pub async fn add_specialty(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<AddSpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Auth("Only admins can add specialties".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Specialty name must not be empty".to_string()));
    }

    let directory = DirectoryService::new(&state);
    directory
        .add_specialty(&request.name, auth.token())
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn list_blocked_slots(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    authorize_block_access(&user, doctor_id)?;

    let blocks = BlockService::new(&state)
        .list_blocks(doctor_id, auth.token())
        .await
        .map_err(map_block_error)?;

    Ok(Json(json!({ "blocks": blocks })))
}

#[axum::debug_handler]
pub async fn create_blocked_slot(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<CreateBlockedSlotRequest>,
) -> Result<Json<Value>, AppError> {
    authorize_block_access(&user, doctor_id)?;

    let created = BlockService::new(&state)
        .create_block(doctor_id, request, auth.token())
        .await
        .map_err(map_block_error)?;

    Ok(Json(json!({ "success": true, "block": created })))
}

#[axum::debug_handler]
pub async fn delete_blocked_slot(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path((doctor_id, block_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    authorize_block_access(&user, doctor_id)?;

    BlockService::new(&state)
        .delete_block(block_id, auth.token())
        .await
        .map_err(map_block_error)?;

    Ok(Json(json!({ "success": true })))
}
