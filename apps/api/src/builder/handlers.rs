use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::builder::pipeline::{run_analysis, session_not_found};
use crate::builder::session::{
    PreviewBundle, Session, SessionView, Step, TransitionError, UploadError,
};
use crate::errors::AppError;
use crate::extraction::UploadedFile;
use crate::models::customization::CustomizationPatch;
use crate::models::template::{find_template, template_catalog, PortfolioTemplate};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Deserialize)]
pub struct StepRequest {
    pub step: Step,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    pub template_id: String,
}

#[derive(Deserialize)]
pub struct ProfileEditRequest {
    pub path: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct EnhanceRequest {
    pub section: String,
}

#[derive(Serialize)]
pub struct EnhanceResponse {
    pub section: String,
    pub content: String,
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<PortfolioTemplate>> {
    Json(template_catalog())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    (StatusCode::CREATED, Json(state.sessions.create().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .view(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

/// POST /api/v1/sessions/:id/upload
///
/// Expects a multipart body with the résumé in a `file` field.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        upload = Some(UploadedFile::new(file_name, media_type, bytes));
        break;
    }
    let file = upload.ok_or_else(|| {
        AppError::Validation(format!("Multipart field '{FILE_FIELD}' is required"))
    })?;

    let view = state
        .sessions
        .update(id, |s: &mut Session| -> Result<SessionView, UploadError> {
            s.accept_file(file)?;
            Ok(s.view())
        })
        .await
        .ok_or_else(|| session_not_found(id))??;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/analyze
///
/// Runs extraction and parsing for the current file and returns the updated
/// session. Repeated calls for the same file do not re-run the pipeline.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    run_analysis(&state.sessions, &state.parser, id).await?;
    handle_get_session(State(state), Path(id)).await
}

/// PUT /api/v1/sessions/:id/step
pub async fn handle_set_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StepRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .update(id, |s: &mut Session| -> Result<SessionView, TransitionError> {
            s.go_to(req.step)?;
            Ok(s.view())
        })
        .await
        .ok_or_else(|| session_not_found(id))??;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let template = find_template(&req.template_id)
        .ok_or_else(|| AppError::NotFound(format!("Template {} not found", req.template_id)))?;
    let view = state
        .sessions
        .update(id, |s| {
            s.select_template(template);
            s.view()
        })
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view))
}

/// PATCH /api/v1/sessions/:id/customization
pub async fn handle_update_customization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CustomizationPatch>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .update(id, |s| {
            s.update_customization(patch);
            s.view()
        })
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:id/profile
pub async fn handle_replace_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(raw): Json<Value>,
) -> Result<Json<SessionView>, AppError> {
    if !raw.is_object() {
        return Err(AppError::Validation(
            "Profile body must be a JSON object".to_string(),
        ));
    }
    let view = state
        .sessions
        .update(id, |s| {
            s.replace_profile(&raw);
            s.view()
        })
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view))
}

/// PATCH /api/v1/sessions/:id/profile
pub async fn handle_edit_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileEditRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .update(id, |s: &mut Session| -> Result<SessionView, TransitionError> {
            s.edit_profile_field(&req.path, req.value)?;
            Ok(s.view())
        })
        .await
        .ok_or_else(|| session_not_found(id))??;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/enhance
pub async fn handle_enhance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    let section = req.section.trim().to_string();
    if section.is_empty() {
        return Err(AppError::Validation("section must not be empty".to_string()));
    }

    let profile = state
        .sessions
        .read(id, |s| s.profile().cloned())
        .await
        .ok_or_else(|| session_not_found(id))?
        .ok_or(TransitionError::MissingProfile)?;

    let content = state.parser.enhance_section(&profile, &section).await;
    Ok(Json(EnhanceResponse { section, content }))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PreviewBundle>, AppError> {
    let bundle = state
        .sessions
        .read(id, Session::preview)
        .await
        .ok_or_else(|| session_not_found(id))??;
    Ok(Json(bundle))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .update(id, |s| {
            s.reset();
            s.view()
        })
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view))
}
