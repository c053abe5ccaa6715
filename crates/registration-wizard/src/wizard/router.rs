use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::controller::ControllerError;
use super::domain::WizardStep;
use super::service::{SessionId, SessionRegistry, WizardService, WizardServiceError};
use super::session::SessionError;

#[derive(Debug, Deserialize)]
pub struct FieldEditRequest {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct FieldRequest {
    pub field: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub step: WizardStep,
}

/// Router builder exposing the wizard session endpoints.
pub fn wizard_router<R>(service: Arc<WizardService<R>>) -> Router
where
    R: SessionRegistry + 'static,
{
    Router::new()
        .route("/api/v1/wizard/sessions", post(create_handler::<R>))
        .route(
            "/api/v1/wizard/sessions/:session_id",
            get(view_handler::<R>).delete(close_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/fields",
            post(edit_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/focus",
            post(focus_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/blur",
            post(blur_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/submit",
            post(submit_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/navigate",
            post(navigate_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/previous",
            post(previous_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/summary/edit",
            post(summary_edit_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/summary/new",
            post(new_form_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/export",
            get(export_handler::<R>),
        )
        .route(
            "/api/v1/wizard/sessions/:session_id/settle",
            post(settle_handler::<R>),
        )
        .with_state(service)
}

impl WizardServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WizardServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            WizardServiceError::Session(SessionError::Controller(
                ControllerError::UnknownField { .. },
            )) => StatusCode::BAD_REQUEST,
            WizardServiceError::Session(
                SessionError::NoForm(_) | SessionError::Unavailable { .. },
            ) => StatusCode::CONFLICT,
            WizardServiceError::Session(SessionError::Export(_))
            | WizardServiceError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WizardServiceError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
        });
        (self.status_code(), Json(payload)).into_response()
    }
}

fn respond<T: serde::Serialize>(result: Result<T, WizardServiceError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn create_handler<R>(State(service): State<Arc<WizardService<R>>>) -> Response
where
    R: SessionRegistry + 'static,
{
    match service.create().await {
        Ok(envelope) => (StatusCode::CREATED, Json(envelope)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn view_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.view(&SessionId(session_id)).await)
}

pub(crate) async fn close_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    match service.close(&SessionId(session_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn edit_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
    Json(request): Json<FieldEditRequest>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(
        service
            .edit(&SessionId(session_id), &request.field, &request.value)
            .await,
    )
}

pub(crate) async fn focus_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
    Json(request): Json<FieldRequest>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.focus(&SessionId(session_id), &request.field).await)
}

pub(crate) async fn blur_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
    Json(request): Json<FieldRequest>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.blur(&SessionId(session_id), &request.field).await)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.submit(&SessionId(session_id)).await)
}

pub(crate) async fn navigate_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
    Json(request): Json<NavigateRequest>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.navigate(&SessionId(session_id), request.step).await)
}

pub(crate) async fn previous_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.previous(&SessionId(session_id)).await)
}

pub(crate) async fn summary_edit_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.summary_edit(&SessionId(session_id)).await)
}

pub(crate) async fn new_form_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.new_form(&SessionId(session_id)).await)
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    match service.export(&SessionId(session_id)).await {
        Ok(Some(document)) => {
            let disposition = format!("attachment; filename=\"{}\"", document.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, document.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn settle_handler<R>(
    State(service): State<Arc<WizardService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRegistry + 'static,
{
    respond(service.settle(&SessionId(session_id)).await)
}
