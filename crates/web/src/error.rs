use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt;
use storage::error::StorageError;
use storage::services::points_sheet::PointsSheetError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::NotFound => StatusCode::NOT_FOUND,
        StorageError::ConstraintViolation(_) | StorageError::Conflict(_) => StatusCode::CONFLICT,
        StorageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        StorageError::Scoring(e) if e.is_conflict() => StatusCode::CONFLICT,
        StorageError::Scoring(_) => StatusCode::BAD_REQUEST,
        StorageError::Schedule(_) | StorageError::PointsSheet(_) => StatusCode::BAD_REQUEST,
        StorageError::Database(_) | StorageError::Migration(_) | StorageError::Corrupt(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn storage_body(error: &StorageError) -> Value {
    match error {
        StorageError::NotFound => json!({ "error": "Resource not found" }),
        StorageError::PointsSheet(PointsSheetError::InvalidRows(rows)) => {
            let details: Vec<String> = rows.iter().map(ToString::to_string).collect();
            json!({
                "error": "Points sheet contains invalid rows",
                "details": details
            })
        }
        StorageError::ConstraintViolation(msg)
        | StorageError::Conflict(msg)
        | StorageError::InvalidInput(msg) => json!({ "error": msg }),
        StorageError::Scoring(e) => json!({ "error": e.to_string() }),
        StorageError::Schedule(e) => json!({ "error": e.to_string() }),
        StorageError::PointsSheet(e) => json!({ "error": e.to_string() }),
        StorageError::Database(_) | StorageError::Migration(_) | StorageError::Corrupt(_) => {
            tracing::error!("Storage error: {:?}", error);
            json!({ "error": "An internal error occurred" })
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, body) = match &self {
            Self::Storage(e) => (storage_status(e), storage_body(e)),
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Validation failed",
                        "details": field_errors
                    }),
                )
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use storage::services::match_state::ScoringError;
    use storage::services::points_sheet::RowError;
    use storage::services::schedule::ScheduleError;
    use uuid::Uuid;

    use super::*;

    async fn render(error: WebError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) = render(StorageError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Resource not found");
    }

    #[tokio::test]
    async fn test_scoring_errors_split_between_400_and_409() {
        let (status, _) = render(StorageError::from(ScoringError::SetAlreadyDecided(3)).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let invalid = ScoringError::InvalidSetScore {
            set_number: 1,
            local: 26,
            visitor: 23,
            threshold: 25,
        };
        let (status, body) = render(StorageError::from(invalid).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("26-23"));

        let (status, _) =
            render(StorageError::from(ScoringError::TeamNotInMatch(Uuid::nil())).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_schedule_error_is_bad_request() {
        let (status, body) = render(StorageError::from(ScheduleError::NotEnoughTeams(1)).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("At least 2 teams"));
    }

    #[tokio::test]
    async fn test_duplicates_conflict() {
        let error = StorageError::ConstraintViolation("A team with this name already exists".into());
        let (status, body) = render(error.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "A team with this name already exists");
    }

    #[tokio::test]
    async fn test_sheet_rows_are_listed() {
        let error = PointsSheetError::InvalidRows(vec![RowError {
            line: 4,
            message: "invalid digit".into(),
        }]);
        let (status, body) = render(StorageError::from(error).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0], "line 4: invalid digit");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = render(StorageError::Corrupt("bad tally".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }
}
