use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::wizard::service::WizardServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Wizard(WizardServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Wizard(err) => write!(f, "wizard error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Wizard(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Wizard(err) => err.status_code(),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<WizardServiceError> for AppError {
    fn from(value: WizardServiceError) -> Self {
        Self::Wizard(value)
    }
}

impl From<crate::wizard::session::SessionError> for AppError {
    fn from(value: crate::wizard::session::SessionError) -> Self {
        Self::Wizard(WizardServiceError::Session(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::service::SessionId;
    use crate::wizard::session::SessionError;
    use crate::wizard::controller::ControllerError;
    use crate::wizard::domain::WizardStep;
    use std::error::Error as _;

    #[test]
    fn wizard_errors_map_to_client_statuses() {
        let missing = AppError::from(WizardServiceError::NotFound(SessionId("wiz-1".into())));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let misuse = AppError::from(SessionError::NoForm(WizardStep::Summary));
        assert!(misuse.source().is_some());
        assert_eq!(misuse.into_response().status(), StatusCode::CONFLICT);

        let unknown = AppError::from(SessionError::Controller(ControllerError::UnknownField {
            step: WizardStep::PersonalData,
            field: "nickname".to_string(),
        }));
        assert_eq!(unknown.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_errors_are_internal() {
        let error = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(error.to_string().starts_with("io error"));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
