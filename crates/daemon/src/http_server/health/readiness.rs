use std::path::Path;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::time::timeout;

use crate::ServiceState;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    match timeout(HEALTH_CHECK_TIMEOUT, storage_ready(state.lister().root())).await {
        Ok(Ok(())) => {
            let msg = serde_json::json!({"status": "ok"});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Ok(Err(e)) => handle_error(e),
        Err(_) => {
            let msg = serde_json::json!({
                "status": "failure",
                "message": "health check timed out"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
    }
}

async fn storage_ready(root: &Path) -> Result<(), ReadinessError> {
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(|_| ReadinessError::StorageUnavailable)?;
    if !metadata.is_dir() {
        return Err(ReadinessError::StorageUnavailable);
    }
    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|_| ReadinessError::StorageUnreadable)?;
    entries
        .next_entry()
        .await
        .map_err(|_| ReadinessError::StorageUnreadable)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum ReadinessError {
    #[error("upload directory is missing")]
    StorageUnavailable,
    #[error("upload directory can't be read")]
    StorageUnreadable,
}

fn handle_error(err: ReadinessError) -> Response {
    tracing::warn!("readiness check failed: {}", err);
    let msg = serde_json::json!({"status": "failure", "message": err.to_string()});
    (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
}
