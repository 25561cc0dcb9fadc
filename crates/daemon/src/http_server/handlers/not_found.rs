use askama::Template;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub path: String,
}

/// Fallback for anything no route or public asset answers.
/// Speaks JSON to API clients and HTML to browsers.
pub async fn not_found_handler(uri: Uri, headers: HeaderMap) -> Response {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());

    match accept {
        Some(accept_str) if accept_str.contains("application/json") => {
            let err_msg = serde_json::json!({"msg": "not found"});
            (StatusCode::NOT_FOUND, Json(err_msg)).into_response()
        }
        Some(accept_str) if accept_str.contains("text/html") => {
            let template = NotFoundTemplate {
                path: uri.path().to_string(),
            };
            match template.render() {
                Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
                Err(e) => {
                    tracing::error!("failed to render not found page: {}", e);
                    plain_not_found()
                }
            }
        }
        _ => plain_not_found(),
    }
}

fn plain_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "not found",
    )
        .into_response()
}
